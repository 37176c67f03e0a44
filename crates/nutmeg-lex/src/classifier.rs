//! Identifier/operator classification and wildcard resolution
//! (spec.md §4.4).

use nutmeg_util::Span;

use crate::cursor::Cursor;
use crate::precedence::derive_precedence;
use crate::rules::{RuleKind, RuleTable};
use crate::token::{BridgeData, OpenDelimData, StartData, Token, TokenKind};
use crate::unicode::{is_ident_continue, is_ident_start, is_operator_char};

/// What kind of run produced the candidate lexeme, needed to decide the
/// fallback when the RuleTable doesn't claim it (spec.md §4.4 "Miss").
#[derive(Clone, Copy, PartialEq, Eq)]
enum RunKind {
    Identifier,
    Operator,
    Single,
}

/// Builds a `TokenKind` from a resolved rule. `alias` is `Some(donor)` only
/// when this rule was reached indirectly through wildcard resolution.
fn token_kind_from_rule(rule: &RuleKind, alias: Option<String>) -> TokenKind {
    match rule {
        RuleKind::Wildcard => unreachable!("wildcard hits are resolved by resolve_wildcard"),
        RuleKind::Start {
            expecting,
            closed_by,
            arity,
        } => TokenKind::Start(StartData {
            expecting: expecting.clone(),
            closed_by: closed_by.clone(),
            arity: *arity,
            alias,
        }),
        RuleKind::End => TokenKind::End { alias },
        RuleKind::Bridge {
            expecting,
            in_containers,
            arity,
        } => TokenKind::Bridge(BridgeData {
            expecting: expecting.clone(),
            in_containers: in_containers.clone(),
            arity: *arity,
            alias,
        }),
        RuleKind::Prefix => TokenKind::Prefix,
        RuleKind::Operator {
            prefix,
            infix,
            postfix,
        } => TokenKind::Operator(crate::token::Precedence {
            prefix: *prefix,
            infix: *infix,
            postfix: *postfix,
        }),
        RuleKind::OpenDelim {
            closed_by,
            infix,
            prefix,
        } => TokenKind::OpenDelim(OpenDelimData {
            closed_by: closed_by.clone(),
            infix: *infix,
            prefix: *prefix,
        }),
        RuleKind::CloseDelim => TokenKind::CloseDelim,
        RuleKind::Mark => TokenKind::Mark,
    }
}

/// Resolves a Wildcard hit: looks up the currently-expected lexeme `E` and
/// classifies the wildcard as if it had matched `E` literally, recording
/// the donor via `alias` (spec.md §4.4, §9 "Wildcard fidelity").
fn resolve_wildcard(table: &RuleTable, expected_head: Option<&[String]>) -> TokenKind {
    let Some(frame) = expected_head else {
        return TokenKind::Unclassified;
    };
    let Some(expected) = frame.first() else {
        return TokenKind::Unclassified;
    };

    match table.lookup(expected) {
        Some(rule @ RuleKind::Bridge { .. }) => token_kind_from_rule(rule, Some(expected.clone())),
        Some(rule @ RuleKind::Start { .. }) => token_kind_from_rule(rule, Some(expected.clone())),
        _ if expected.starts_with("end") => TokenKind::End {
            alias: Some(expected.clone()),
        },
        _ => TokenKind::Unclassified,
    }
}

/// Entry point used by the Driver: tries a Wildcard-aware classification
/// first, falling back to [`next_token`]'s generic run scan.
pub fn classify(cursor: &mut Cursor, table: &RuleTable, expected_head: Option<&[String]>) -> Token {
    let start = cursor.position();
    cursor.mark();

    let run_kind = if is_ident_start(cursor.peek()) {
        cursor.consume();
        while is_ident_continue(cursor.peek()) {
            cursor.consume();
        }
        RunKind::Identifier
    } else if is_operator_char(cursor.peek()) {
        cursor.consume();
        while is_operator_char(cursor.peek()) {
            cursor.consume();
        }
        RunKind::Operator
    } else {
        cursor.consume();
        RunKind::Single
    };

    let lexeme = cursor.pop_mark().to_string();
    let end = cursor.position();
    let span = Span::new(start, end);

    if let Some(rule) = table.lookup(&lexeme) {
        let kind = if matches!(rule, RuleKind::Wildcard) {
            resolve_wildcard(table, expected_head)
        } else {
            token_kind_from_rule(rule, None)
        };
        return Token::new(lexeme, span, kind);
    }

    match run_kind {
        RunKind::Identifier => Token::new(lexeme, span, TokenKind::Variable),
        RunKind::Operator => {
            let p = derive_precedence(&lexeme);
            Token::new(lexeme, span, TokenKind::Operator(p))
        }
        RunKind::Single => Token::new(lexeme, span, TokenKind::Unclassified),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleTable;

    #[test]
    fn identifier_run_misses_to_variable() {
        let table = RuleTable::default_rules();
        let mut c = Cursor::new("foo");
        let t = classify(&mut c, &table, None);
        assert_eq!(t.kind, TokenKind::Variable);
        assert_eq!(t.text, "foo");
    }

    #[test]
    fn keyword_hits_start_rule() {
        let table = RuleTable::default_rules();
        let mut c = Cursor::new("if");
        let t = classify(&mut c, &table, None);
        assert!(matches!(t.kind, TokenKind::Start(_)));
    }

    #[test]
    fn operator_falls_back_to_derived_precedence() {
        let table = RuleTable::default_rules();
        let mut c = Cursor::new("+");
        let t = classify(&mut c, &table, None);
        match t.kind {
            TokenKind::Operator(p) => assert_eq!(p.infix, 80 + 2000),
            other => panic!("expected Operator, got {other:?}"),
        }
    }

    #[test]
    fn wildcard_resolves_against_expectation_head() {
        let table = RuleTable::default_rules();
        let mut c = Cursor::new(":");
        let expected = vec!["then".to_string()];
        let t = classify(&mut c, &table, Some(&expected));
        match t.kind {
            TokenKind::Bridge(b) => assert_eq!(b.alias.as_deref(), Some("then")),
            other => panic!("expected Bridge, got {other:?}"),
        }
        assert_eq!(t.text, ":");
    }

    #[test]
    fn wildcard_with_empty_stack_is_unclassified() {
        let table = RuleTable::default_rules();
        let mut c = Cursor::new(":");
        let t = classify(&mut c, &table, None);
        assert_eq!(t.kind, TokenKind::Unclassified);
    }
}
