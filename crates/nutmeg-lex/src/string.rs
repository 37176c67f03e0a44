//! StringMatcher: single/triple-quoted, raw, and interpolated string
//! literals (spec.md §4.3).
//!
//! The interpolation interior is its own two-state machine
//! (`InExpression`/`InString`) per spec.md §9's design note, rather than
//! recursion into the Driver — it only needs bracket/quote balance, not
//! full tokenization.

use nutmeg_util::{Position, Span};

use crate::cursor::Cursor;
use crate::token::{MultiLineData, QuoteKind, StringData, Token, TokenKind};
use crate::unicode::{is_ident_continue, is_ident_start, parse_unicode_escape};

pub struct StringMatcher;

impl StringMatcher {
    /// Attempts to match a string literal at the cursor. Returns `None`
    /// (cursor untouched) if the input isn't the start of one.
    pub fn try_match(cursor: &mut Cursor) -> Option<Token> {
        let start = cursor.position();
        cursor.mark();

        let mut raw = false;
        if cursor.peek() == '@' {
            raw = true;
            cursor.consume();
        }

        let mut specifier = if raw { scan_optional_identifier(cursor) } else { None };

        let Some(quote) = QuoteKind::from_opener(cursor.peek()) else {
            cursor.reset();
            return None;
        };
        let open = open_char(quote);

        let result = if cursor.peek_n(1) == open && cursor.peek_n(2) == open {
            cursor.consume();
            cursor.consume();
            cursor.consume();
            if specifier.is_none() {
                specifier = scan_optional_identifier(cursor);
            }
            scan_multiline_body(cursor, quote, raw, specifier)
        } else {
            cursor.consume(); // opening quote
            if raw {
                scan_raw_body(cursor, quote, specifier)
            } else {
                scan_cooked_body(cursor, quote)
            }
        };

        let end = cursor.position();
        let text = cursor.pop_mark().to_string();
        let span = Span::new(start, end);

        Some(match result {
            Ok(kind) => Token::new(text, span, kind),
            Err(reason) => Token::exception(text, span, reason),
        })
    }
}

fn open_char(kind: QuoteKind) -> char {
    match kind {
        QuoteKind::Single => '\'',
        QuoteKind::Double => '"',
        QuoteKind::Backtick => '`',
        QuoteKind::GuillemetLiteral => '\u{00AB}',
    }
}

fn scan_optional_identifier(cursor: &mut Cursor) -> Option<String> {
    if !is_ident_start(cursor.peek()) {
        return None;
    }
    cursor.mark();
    cursor.consume();
    while is_ident_continue(cursor.peek()) {
        cursor.consume();
    }
    Some(cursor.pop_mark().to_string())
}

/// Raw single-line string: copied verbatim, no escapes, no interpolation.
/// Unlike the cooked form, an embedded newline is not an error (spec.md
/// §4.3: the bare-newline exception is scoped to non-raw single-line
/// strings).
fn scan_raw_body(cursor: &mut Cursor, quote: QuoteKind, specifier: Option<String>) -> Result<TokenKind, &'static str> {
    let closer = quote.closer();
    cursor.mark();
    loop {
        if !cursor.has_more() {
            cursor.pop_mark();
            return Err("unterminated literal");
        }
        if cursor.peek() == closer {
            break;
        }
        cursor.consume();
    }
    let value = cursor.pop_mark().to_string();
    cursor.consume(); // closing quote
    Ok(TokenKind::Str(StringData {
        value,
        quote: Some(quote),
        specifier,
        subtokens: None,
    }))
}

/// Cooked single-line string: escapes, `\uXXXX`, and `\(`/`\[`/`\{`
/// interpolation.
fn scan_cooked_body(cursor: &mut Cursor, quote: QuoteKind) -> Result<TokenKind, &'static str> {
    let closer = quote.closer();
    let mut value = String::new();
    let mut subtokens: Vec<Token> = Vec::new();
    let mut chunk = String::new();
    let mut chunk_start = cursor.position();

    loop {
        if !cursor.has_more() {
            return Err("unterminated literal");
        }
        let c = cursor.peek();
        if c == closer {
            break;
        }
        if c == '\n' {
            return Err("newline not allowed in string literal");
        }
        if c == '\\' {
            cursor.consume();
            match cursor.peek() {
                '(' | '[' | '{' => {
                    let open = cursor.consume();
                    let close = matching_close(open);
                    if !chunk.is_empty() {
                        subtokens.push(string_chunk_token(chunk_start, cursor.position(), std::mem::take(&mut chunk)));
                    }
                    let (expr_text, expr_start, expr_end) = scan_interpolation(cursor, open, close)?;
                    subtokens.push(Token::new(expr_text, Span::new(expr_start, expr_end), TokenKind::Expr));
                    chunk_start = cursor.position();
                }
                _ => {
                    let lit = scan_escape(cursor);
                    value.push_str(&lit);
                    chunk.push_str(&lit);
                }
            }
            continue;
        }
        cursor.consume();
        value.push(c);
        chunk.push(c);
    }

    if !chunk.is_empty() {
        subtokens.push(string_chunk_token(chunk_start, cursor.position(), chunk));
    }

    cursor.consume(); // closing quote

    Ok(TokenKind::Str(StringData {
        value,
        quote: Some(quote),
        specifier: None,
        subtokens: if subtokens.is_empty() { None } else { Some(subtokens) },
    }))
}

fn matching_close(open: char) -> char {
    match open {
        '(' => ')',
        '[' => ']',
        _ => '}',
    }
}

fn string_chunk_token(start: Position, end: Position, value: String) -> Token {
    Token::new(
        value.clone(),
        Span::new(start, end),
        TokenKind::Str(StringData {
            value,
            quote: None,
            specifier: None,
            subtokens: None,
        }),
    )
}

/// Interprets one escape sequence (the cursor sits just past the `\`).
fn scan_escape(cursor: &mut Cursor) -> String {
    let c = cursor.consume();
    match c {
        'n' => "\n".to_string(),
        't' => "\t".to_string(),
        'r' => "\r".to_string(),
        'b' => "\u{8}".to_string(),
        'f' => "\u{C}".to_string(),
        '\\' => "\\".to_string(),
        '/' => "/".to_string(),
        '"' => "\"".to_string(),
        '\'' => "'".to_string(),
        '`' => "`".to_string(),
        '\u{00BB}' => "\u{00BB}".to_string(),
        '_' => String::new(),
        'u' => {
            cursor.mark();
            let mut hex = String::new();
            for _ in 0..4 {
                if cursor.peek().is_ascii_hexdigit() {
                    hex.push(cursor.consume());
                } else {
                    break;
                }
            }
            if hex.len() == 4 {
                if let Some(ch) = parse_unicode_escape(&hex) {
                    cursor.pop_mark();
                    return ch.to_string();
                }
            }
            cursor.reset();
            "\\u".to_string()
        }
        other => {
            let mut s = String::new();
            s.push('\\');
            s.push(other);
            s
        }
    }
}

/// The interpolation interior's pushdown automaton: tracks bracket depth
/// and re-enters string mode on nested quote characters, so a `)` inside a
/// nested string literal doesn't prematurely close the interpolation.
fn scan_interpolation(cursor: &mut Cursor, open: char, close: char) -> Result<(String, Position, Position), &'static str> {
    enum St {
        Expr,
        Str(char),
    }

    let expr_start = cursor.position();
    cursor.mark();
    let mut depth = 1u32;
    let mut stack = vec![St::Expr];

    loop {
        if !cursor.has_more() {
            cursor.pop_mark();
            return Err("unterminated literal");
        }
        let c = cursor.peek();
        match stack.last().unwrap() {
            St::Expr => {
                if c == open {
                    depth += 1;
                    stack.push(St::Expr);
                    cursor.consume();
                } else if c == close {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                    cursor.consume();
                    stack.pop();
                } else if matches!(c, '"' | '\'' | '`' | '\u{00AB}') {
                    let q = QuoteKind::from_opener(c).unwrap();
                    stack.push(St::Str(q.closer()));
                    cursor.consume();
                } else if c == '\n' {
                    cursor.pop_mark();
                    return Err("newline not allowed in interpolation expression");
                } else {
                    cursor.consume();
                }
            }
            St::Str(closer) => {
                let closer = *closer;
                if c == '\\' {
                    cursor.consume();
                    if cursor.has_more() {
                        cursor.consume();
                    }
                } else if c == closer {
                    stack.pop();
                    cursor.consume();
                } else if c == '\n' {
                    cursor.pop_mark();
                    return Err("newline not allowed in interpolation expression");
                } else {
                    cursor.consume();
                }
            }
        }
    }

    let interior = cursor.pop_mark().to_string();
    let expr_end = cursor.position();
    cursor.consume(); // the closing bracket
    Ok((interior, expr_start, expr_end))
}

/// Triple-quoted block: consumes the rest of the opening line, then scans
/// content lines looking for the line whose sole non-whitespace content is
/// the matching triple closer; that line's leading whitespace is the
/// closing indent, stripped from every content line before each is
/// re-lexed as a single-line string body.
fn scan_multiline_body(cursor: &mut Cursor, quote: QuoteKind, raw: bool, specifier: Option<String>) -> Result<TokenKind, &'static str> {
    while cursor.has_more() && cursor.peek() != '\n' {
        cursor.consume();
    }
    if cursor.has_more() {
        cursor.consume();
    }

    let closer = quote.closer();
    let close_pattern: String = std::iter::repeat(closer).take(3).collect();

    let mut lines: Vec<String> = Vec::new();
    let mut closing_indent: Option<String> = None;

    loop {
        if !cursor.has_more() {
            return Err("missing closing triple quote");
        }
        let mut line = String::new();
        while cursor.has_more() && cursor.peek() != '\n' {
            line.push(cursor.consume());
        }
        if cursor.has_more() {
            cursor.consume();
        }

        let trimmed = line.trim_start();
        if trimmed == close_pattern {
            closing_indent = Some(line[..line.len() - trimmed.len()].to_string());
            break;
        }
        lines.push(line);
    }

    let indent = closing_indent.unwrap_or_default();
    for line in &lines {
        if line.trim().is_empty() {
            continue;
        }
        if !line.starts_with(&indent) {
            return Err("inconsistent indentation in multi-line string");
        }
    }

    let line_count = lines.len();
    let mut value_lines = Vec::with_capacity(line_count);
    let mut subtokens: Vec<Token> = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        let stripped = if line.len() >= indent.len() && line.starts_with(&indent) {
            &line[indent.len()..]
        } else {
            line.as_str()
        };
        let (line_value, line_subs) = if raw { (stripped.to_string(), Vec::new()) } else { cook_line(stripped) };
        value_lines.push(line_value);
        for mut sub in line_subs {
            if i + 1 < line_count {
                if let TokenKind::Str(data) = &mut sub.kind {
                    data.value.push('\n');
                }
                sub.text.push('\n');
            }
            subtokens.push(sub);
        }
    }

    Ok(TokenKind::MultiLine(MultiLineData {
        value: value_lines.join("\n"),
        quote: Some(quote),
        specifier,
        subtokens: if subtokens.is_empty() { None } else { Some(subtokens) },
        indent,
    }))
}

/// Cooks one already-dedented line of a multi-line string body: escapes and
/// interpolation apply exactly as in a single-line cooked string. Sub-token
/// spans here are relative to the line's own temporary cursor, not the
/// document, since a dedented line no longer occupies a single contiguous
/// source range.
fn cook_line(line: &str) -> (String, Vec<Token>) {
    let mut value = String::new();
    let mut subtokens = Vec::new();
    let mut chunk = String::new();
    let mut cursor = Cursor::new(line);
    let mut chunk_start = cursor.position();

    while cursor.has_more() {
        let c = cursor.peek();
        if c == '\\' {
            cursor.consume();
            match cursor.peek() {
                '(' | '[' | '{' => {
                    let open = cursor.consume();
                    let close = matching_close(open);
                    if !chunk.is_empty() {
                        subtokens.push(string_chunk_token(chunk_start, cursor.position(), std::mem::take(&mut chunk)));
                    }
                    if let Ok((expr_text, expr_start, expr_end)) = scan_interpolation(&mut cursor, open, close) {
                        subtokens.push(Token::new(expr_text, Span::new(expr_start, expr_end), TokenKind::Expr));
                    }
                    chunk_start = cursor.position();
                }
                _ => {
                    let lit = scan_escape(&mut cursor);
                    value.push_str(&lit);
                    chunk.push_str(&lit);
                }
            }
        } else {
            cursor.consume();
            value.push(c);
            chunk.push(c);
        }
    }
    if !chunk.is_empty() {
        subtokens.push(string_chunk_token(chunk_start, cursor.position(), chunk));
    }
    (value, subtokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_one(src: &str) -> Token {
        let mut c = Cursor::new(src);
        StringMatcher::try_match(&mut c).expect("expected a string match")
    }

    #[test]
    fn empty_double_quoted() {
        let t = lex_one("\"\"");
        match t.kind {
            TokenKind::Str(d) => assert_eq!(d.value, ""),
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn escapes_are_interpreted() {
        let t = lex_one(r#""a\nb""#);
        match t.kind {
            TokenKind::Str(d) => assert_eq!(d.value, "a\nb"),
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn interpolation_produces_subtokens() {
        let t = lex_one(r#""Hello, \(name)!""#);
        match t.kind {
            TokenKind::Str(d) => {
                let subs = d.subtokens.expect("expected subtokens");
                assert_eq!(subs.len(), 3);
                assert!(matches!(subs[0].kind, TokenKind::Str(_)));
                assert!(matches!(subs[1].kind, TokenKind::Expr));
                assert_eq!(subs[1].text, "name");
                assert!(matches!(subs[2].kind, TokenKind::Str(_)));
            }
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn bare_newline_is_an_exception() {
        let t = lex_one("\"abc\ndef\"");
        assert!(t.kind.is_exception());
    }

    #[test]
    fn unterminated_string_is_an_exception() {
        let t = lex_one("\"abc");
        assert!(t.kind.is_exception());
    }

    #[test]
    fn raw_string_skips_escapes() {
        let t = lex_one(r#"@"a\nb""#);
        match t.kind {
            TokenKind::Str(d) => assert_eq!(d.value, "a\\nb"),
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn raw_string_allows_embedded_newline() {
        let t = lex_one("@\"a\nb\"");
        match t.kind {
            TokenKind::Str(d) => assert_eq!(d.value, "a\nb"),
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn triple_quoted_strips_common_indent() {
        let src = "\"\"\"\n    first\n    second\n    \"\"\"";
        let t = lex_one(src);
        match t.kind {
            TokenKind::MultiLine(d) => {
                assert_eq!(d.value, "first\nsecond");
                assert_eq!(d.indent, "    ");
            }
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn triple_quoted_rejects_short_indent() {
        let src = "\"\"\"\n    first\n  second\n    \"\"\"";
        let t = lex_one(src);
        assert!(t.kind.is_exception());
    }

    #[test]
    fn not_a_string_leaves_cursor_alone() {
        let mut c = Cursor::new("abc");
        assert!(StringMatcher::try_match(&mut c).is_none());
        assert_eq!(c.byte_pos(), 0);
    }
}
