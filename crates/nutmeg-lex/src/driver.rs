//! Driver: the outer tokenization loop (spec.md §4.5).
//!
//! Owns the per-run state spec.md §5 scopes to a single call: the cursor,
//! the expectation stack, and the output buffer all live on `Driver` and
//! are dropped with it. Nothing here is global or shared across runs.

use tracing::{debug_span, trace, warn};

use crate::classifier::classify;
use crate::cursor::Cursor;
use crate::number::NumericMatcher;
use crate::rules::RuleTable;
use crate::string::StringMatcher;
use crate::token::{Token, TokenKind};

/// Tokenizes `source` against the default rule set.
pub fn tokenize(source: &str) -> Vec<Token> {
    tokenize_with_rules(source, RuleTable::default_rules())
}

/// Tokenizes `source` against a caller-supplied [`RuleTable`].
pub fn tokenize_with_rules(source: &str, table: RuleTable) -> Vec<Token> {
    Driver::new(source, table).run()
}

/// The runtime expectation stack (spec.md §3 "ExpectationStack"): a stack
/// of ordered follower-lists, consulted only by wildcard resolution.
type ExpectationStack = Vec<Vec<String>>;

struct Driver<'a> {
    cursor: Cursor<'a>,
    table: RuleTable,
    stack: ExpectationStack,
}

impl<'a> Driver<'a> {
    fn new(source: &'a str, table: RuleTable) -> Self {
        Self {
            cursor: Cursor::new(source),
            table,
            stack: Vec::new(),
        }
    }

    fn run(mut self) -> Vec<Token> {
        let span = debug_span!("tokenize", len = self.cursor.source().len());
        let _enter = span.enter();

        let mut output = Vec::new();
        loop {
            let ln_before = self.skip_trivia();
            if !self.cursor.has_more() {
                break;
            }

            let mut token = self.next_token();
            token.ln_before = ln_before;
            token.ln_after = self.peek_trivia_newline();

            self.apply_stack_effect(&token.kind);

            match &token.kind {
                TokenKind::Exception { reason } => {
                    warn!(reason = %reason, text = %token.text, "token resolved to exception");
                    output.push(token);
                    break;
                }
                other => {
                    trace!(tag = other.tag(), text = %token.text, "token");
                    output.push(token);
                }
            }
        }
        output
    }

    fn next_token(&mut self) -> Token {
        if let Some(t) = StringMatcher::try_match(&mut self.cursor) {
            return t;
        }
        if let Some(t) = NumericMatcher::try_match(&mut self.cursor) {
            return t;
        }
        let expected = self.stack.last().map(|frame| frame.as_slice());
        classify(&mut self.cursor, &self.table, expected)
    }

    /// Consumes whitespace and `###` line comments, reporting whether any
    /// newline occurred in the run. A comment line counts as containing a
    /// newline even at end of input with no trailing `\n` (spec.md §4.5).
    fn skip_trivia(&mut self) -> bool {
        let mut saw_newline = false;
        loop {
            match self.cursor.peek() {
                ' ' | '\t' | '\r' => {
                    self.cursor.consume();
                }
                '\n' => {
                    saw_newline = true;
                    self.cursor.consume();
                }
                '#' if self.cursor.peek_n(1) == '#' && self.cursor.peek_n(2) == '#' => {
                    saw_newline = true;
                    self.cursor.consume();
                    self.cursor.consume();
                    self.cursor.consume();
                    while self.cursor.has_more() && self.cursor.peek() != '\n' {
                        self.cursor.consume();
                    }
                }
                _ => break,
            }
        }
        saw_newline
    }

    /// Looks ahead over trivia without consuming it, for the trailing
    /// `ln_after` flag (spec.md §4.5: "peek ahead (without committing)").
    fn peek_trivia_newline(&mut self) -> bool {
        self.cursor.mark();
        let saw = self.skip_trivia();
        self.cursor.reset();
        saw
    }

    fn apply_stack_effect(&mut self, kind: &TokenKind) {
        match kind {
            TokenKind::Start(d) => {
                if !d.expecting.is_empty() {
                    self.stack.push(d.expecting.clone());
                }
            }
            TokenKind::End { .. } => {
                self.stack.pop();
            }
            TokenKind::Bridge(d) => {
                if let Some(top) = self.stack.last_mut() {
                    *top = d.expecting.clone();
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn def_block_balances_the_stack() {
        let tokens = tokenize("def foo(x) x + 1 end");
        let tags: Vec<&str> = tokens.iter().map(|t| t.kind.tag()).collect();
        assert_eq!(tags, ["S", "V", "[", "V", "]", "V", "O", "n", "E"]);
        assert!(matches!(&tokens[0].kind, TokenKind::Start(d) if d.expecting == ["=>>"]));
    }

    #[test]
    fn if_then_endif_tracks_newline_and_wildcard() {
        let tokens = tokenize("if x:\n  y\nendif");
        let tags: Vec<&str> = tokens.iter().map(|t| t.kind.tag()).collect();
        assert_eq!(tags, ["S", "V", "B", "V", "E"]);
        match &tokens[2].kind {
            TokenKind::Bridge(b) => assert_eq!(b.alias.as_deref(), Some("then")),
            other => panic!("expected Bridge, got {other:?}"),
        }
        assert!(tokens[3].ln_before);
        assert!(tokens[4].ln_before);
    }

    #[test]
    fn comment_only_line_sets_ln_before() {
        let tokens = tokenize("### a comment\nfoo");
        assert_eq!(tokens.len(), 1);
        assert!(tokens[0].ln_before);
    }

    #[test]
    fn exception_halts_the_stream() {
        let tokens = tokenize("10rAB foo");
        assert_eq!(tokens.len(), 1);
        assert!(tokens[0].kind.is_exception());
    }

    #[test]
    fn running_twice_is_idempotent() {
        let src = "if x:\n  y\nendif";
        assert_eq!(tokenize(src), tokenize(src));
    }
}
