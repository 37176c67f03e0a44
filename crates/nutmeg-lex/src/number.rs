//! NumericMatcher: decimal and radix-prefixed literals (spec.md §4.2).
//!
//! Scans by hand over the `Cursor` rather than through the `regex` crate —
//! the "regular expression of shape ..." language in the spec describes the
//! recognized grammar, not an implementation mandate, and a hand-rolled
//! scan matches how every matcher in the teacher crate (`faxc-lex`'s
//! `lexer/number.rs`) is written.

use nutmeg_util::Span;

use crate::cursor::Cursor;
use crate::token::{NumericData, Token, TokenKind};
use crate::unicode::is_valid_digit;

/// Scans a run of ASCII alphanumerics and underscores (the generic
/// "digits, optionally underscore-separated" shape shared by mantissa and
/// fraction in the radix grammar). Digit validity against a particular base
/// is checked afterward, once the base is known.
///
/// Lowercase `e` is never consumed here even in bases where it would
/// otherwise be a valid digit (>= 15): it is reserved for the exponent
/// marker, which is how `16rDEAD.BEEFe10` disambiguates "one more hex
/// digit" from "start of exponent" — the uppercase mantissa/fraction
/// digits (`DEAD`, `BEEF`) are hex, the lowercase `e` is always the
/// exponent.
fn scan_alnum_underscore_run(cursor: &mut Cursor) -> String {
    let mut out = String::new();
    loop {
        let c = cursor.peek();
        if c == 'e' {
            break;
        }
        if c.is_ascii_alphanumeric() || c == '_' {
            out.push(cursor.consume());
        } else {
            break;
        }
    }
    out
}

fn strip_underscores(s: &str) -> String {
    s.chars().filter(|c| *c != '_').collect()
}

fn validate_digits(text: &str, base: u32, balanced: bool) -> bool {
    text.chars()
        .filter(|c| *c != '_')
        .all(|c| is_valid_digit(c, base, balanced))
}

struct RadixRule {
    letter: char,
    base: u32,
    balanced: bool,
    /// What the digits preceding the radix letter must look like.
    prefix_requirement: PrefixRequirement,
}

enum PrefixRequirement {
    /// Must be exactly "0" (x/o/b/t forms).
    ExactlyZero,
    /// Any decimal integer in 2..=36 (the `r` form); the value becomes the base.
    DecimalBase,
}

fn radix_rule(letter: char) -> Option<RadixRule> {
    match letter {
        'x' => Some(RadixRule {
            letter,
            base: 16,
            balanced: false,
            prefix_requirement: PrefixRequirement::ExactlyZero,
        }),
        'o' => Some(RadixRule {
            letter,
            base: 8,
            balanced: false,
            prefix_requirement: PrefixRequirement::ExactlyZero,
        }),
        'b' => Some(RadixRule {
            letter,
            base: 2,
            balanced: false,
            prefix_requirement: PrefixRequirement::ExactlyZero,
        }),
        't' => Some(RadixRule {
            letter,
            base: 3,
            balanced: true,
            prefix_requirement: PrefixRequirement::ExactlyZero,
        }),
        'r' => Some(RadixRule {
            letter,
            // Base is derived from the prefix digits below; 0 is a
            // placeholder overwritten once we know the prefix.
            base: 0,
            balanced: false,
            prefix_requirement: PrefixRequirement::DecimalBase,
        }),
        _ => None,
    }
}

pub struct NumericMatcher;

impl NumericMatcher {
    /// Attempts to match a numeric literal at the cursor. Returns `None`
    /// (and leaves the cursor untouched) if the input doesn't start with a
    /// decimal digit.
    pub fn try_match(cursor: &mut Cursor) -> Option<Token> {
        if !cursor.peek().is_ascii_digit() {
            return None;
        }

        let start = cursor.position();
        cursor.mark();

        let mut prefix_digits = String::new();
        while cursor.peek().is_ascii_digit() {
            prefix_digits.push(cursor.consume());
        }

        let radix_letter = cursor.peek();
        if let Some(rule) = radix_rule(radix_letter) {
            cursor.consume();
            return Some(Self::finish_radix_form(cursor, start, prefix_digits, rule));
        }

        Some(Self::finish_decimal_form(cursor, start, prefix_digits))
    }

    fn finish_radix_form(cursor: &mut Cursor, start: nutmeg_util::Position, prefix: String, rule: RadixRule) -> Token {
        let mantissa_raw = scan_alnum_underscore_run(cursor);
        let mut fraction_raw = None;
        if cursor.peek() == '.' {
            cursor.consume();
            fraction_raw = Some(scan_alnum_underscore_run(cursor));
        }
        let exponent = scan_optional_exponent(cursor);

        let end = cursor.position();
        let text = cursor.pop_mark().to_string();
        let span = Span::new(start, end);

        let base = match rule.prefix_requirement {
            PrefixRequirement::ExactlyZero => {
                if prefix != "0" {
                    return Token::exception(text, span, "invalid literal");
                }
                rule.base
            }
            PrefixRequirement::DecimalBase => match prefix.parse::<u32>() {
                Ok(b) if (2..=36).contains(&b) => b,
                _ => return Token::exception(text, span, "invalid literal"),
            },
        };

        if mantissa_raw.is_empty() || !validate_digits(&mantissa_raw, base, rule.balanced) {
            return Token::exception(text, span, "invalid literal");
        }
        if let Some(f) = &fraction_raw {
            if !validate_digits(f, base, rule.balanced) {
                return Token::exception(text, span, "invalid literal");
            }
        }
        let exponent = match exponent {
            Ok(e) => e,
            Err(()) => return Token::exception(text, span, "invalid literal"),
        };

        let radix_text = format!("{prefix}{}", rule.letter);
        Token::new(
            text,
            span,
            TokenKind::Numeric(NumericData {
                radix: radix_text,
                base,
                mantissa: strip_underscores(&mantissa_raw),
                fraction: fraction_raw.map(|f| strip_underscores(&f)),
                exponent: exponent.filter(|e| *e != 0),
                balanced: rule.balanced,
            }),
        )
    }

    fn finish_decimal_form(cursor: &mut Cursor, start: nutmeg_util::Position, prefix: String) -> Token {
        let mut mantissa_raw = prefix;
        // Decimal form allows underscore-separated digit groups in the
        // leading run too (unlike the radix form's plain-digits prefix).
        while cursor.peek() == '_' && cursor.peek_n(1).is_ascii_digit() {
            mantissa_raw.push(cursor.consume());
            while cursor.peek().is_ascii_digit() {
                mantissa_raw.push(cursor.consume());
            }
        }

        let mut fraction_raw = None;
        if cursor.peek() == '.' && cursor.peek_n(1).is_ascii_digit() {
            cursor.consume();
            let mut frac = String::new();
            while cursor.peek().is_ascii_digit() || cursor.peek() == '_' {
                frac.push(cursor.consume());
            }
            fraction_raw = Some(frac);
        }

        let exponent = scan_optional_exponent(cursor);

        let end = cursor.position();
        let text = cursor.pop_mark().to_string();
        let span = Span::new(start, end);

        let exponent = match exponent {
            Ok(e) => e,
            Err(()) => return Token::exception(text, span, "invalid literal"),
        };

        Token::new(
            text,
            span,
            TokenKind::Numeric(NumericData {
                radix: String::new(),
                base: 10,
                mantissa: strip_underscores(&mantissa_raw),
                fraction: fraction_raw.map(|f| strip_underscores(&f)),
                exponent: exponent.filter(|e| *e != 0),
                balanced: false,
            }),
        )
    }
}

/// Scans an optional `e[+-]?DIGITS+` suffix. `Ok(None)` if absent,
/// `Err(())` if `e`/`e+`/`e-` appears with no digits following.
fn scan_optional_exponent(cursor: &mut Cursor) -> Result<Option<i64>, ()> {
    if cursor.peek() != 'e' {
        return Ok(None);
    }
    cursor.mark();
    cursor.consume();
    let mut sign = 1i64;
    if cursor.peek() == '+' || cursor.peek() == '-' {
        if cursor.consume() == '-' {
            sign = -1;
        }
    }
    let mut digits = String::new();
    while cursor.peek().is_ascii_digit() {
        digits.push(cursor.consume());
    }
    if digits.is_empty() {
        cursor.reset();
        return Err(());
    }
    cursor.pop_mark();
    let magnitude: i64 = digits.parse().unwrap_or(i64::MAX);
    Ok(Some(sign * magnitude))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_one(src: &str) -> Token {
        let mut c = Cursor::new(src);
        NumericMatcher::try_match(&mut c).expect("expected a numeric match")
    }

    #[test]
    fn plain_decimal() {
        let t = lex_one("42");
        match t.kind {
            TokenKind::Numeric(d) => {
                assert_eq!(d.base, 10);
                assert_eq!(d.mantissa, "42");
                assert_eq!(d.radix, "");
            }
            _ => panic!(),
        }
    }

    #[test]
    fn hex_radix_with_fraction_and_exponent() {
        let t = lex_one("16rDEAD.BEEFe10");
        match t.kind {
            TokenKind::Numeric(d) => {
                assert_eq!(d.radix, "16r");
                assert_eq!(d.base, 16);
                assert_eq!(d.mantissa, "DEAD");
                assert_eq!(d.fraction.as_deref(), Some("BEEF"));
                assert_eq!(d.exponent, Some(10));
            }
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn balanced_ternary() {
        let t = lex_one("0t1T0.01e-4");
        match t.kind {
            TokenKind::Numeric(d) => {
                assert_eq!(d.radix, "0t");
                assert_eq!(d.base, 3);
                assert!(d.balanced);
                assert_eq!(d.mantissa, "1T0");
                assert_eq!(d.fraction.as_deref(), Some("01"));
                assert_eq!(d.exponent, Some(-4));
            }
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn invalid_digit_for_base_is_an_exception() {
        let t = lex_one("10rAB");
        assert!(t.kind.is_exception());
        assert_eq!(t.text, "10rAB");
    }

    #[test]
    fn underscore_separators_are_stripped() {
        let t = lex_one("1_000_000");
        match t.kind {
            TokenKind::Numeric(d) => assert_eq!(d.mantissa, "1000000"),
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn zero_exponent_is_omitted() {
        let t = lex_one("1e0");
        match t.kind {
            TokenKind::Numeric(d) => assert_eq!(d.exponent, None),
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn x_radix_requires_leading_zero() {
        let t = lex_one("5x3");
        assert!(t.kind.is_exception());
    }

    #[test]
    fn not_a_number_leaves_cursor_alone() {
        let mut c = Cursor::new("abc");
        assert!(NumericMatcher::try_match(&mut c).is_none());
        assert_eq!(c.byte_pos(), 0);
    }
}
