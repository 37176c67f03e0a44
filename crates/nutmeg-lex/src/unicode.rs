//! Character classification helpers shared by the matchers.
//!
//! Identifier boundaries stay ASCII per spec.md §4.4 (`[A-Za-z_][A-Za-z0-9_]*`);
//! the interesting generalization over the teacher's version is digit
//! validity, which here spans every base from 2 to 36 plus the balanced
//! ternary `T` digit rather than just `{2, 8, 10, 16}`.

/// Start of an identifier run.
pub fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_ascii_alphabetic()
}

/// Continuation of an identifier run.
pub fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_ascii_alphanumeric()
}

/// Operator glyphs recognized by the classifier's operator-run scan
/// (spec.md §4.4: "the exact set is a configuration constant; `:` participates").
pub const OPERATOR_CHARS: &str = ".*/%+-<>~!&^|?=:$";

pub fn is_operator_char(c: char) -> bool {
    OPERATOR_CHARS.contains(c)
}

/// Value of an alphanumeric digit in bases up to 36 (`0-9`, `a-z`/`A-Z` ==
/// 10-35). `None` for anything else, including the balanced-ternary `T`
/// digit, which callers special-case separately since its value (-1) isn't
/// expressible as a `u32` digit value.
pub fn digit_value(c: char) -> Option<u32> {
    match c {
        '0'..='9' => Some(c as u32 - '0' as u32),
        'a'..='z' => Some(c as u32 - 'a' as u32 + 10),
        'A'..='Z' => Some(c as u32 - 'A' as u32 + 10),
        _ => None,
    }
}

/// Whether `c` is a valid digit for `base`, honoring the balanced-ternary
/// `T` digit (value -1) when `balanced` is set.
pub fn is_valid_digit(c: char, base: u32, balanced: bool) -> bool {
    if balanced && c == 'T' {
        return true;
    }
    matches!(digit_value(c), Some(v) if v < base)
}

/// Parses a `\uXXXX` payload (exactly 4 hex digits) into a `char`. Returns
/// `None` for anything malformed, including well-formed-but-surrogate
/// codepoints — callers retain the escape verbatim in that case per
/// spec.md §4.3.
pub fn parse_unicode_escape(hex: &str) -> Option<char> {
    if hex.len() != 4 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let value = u32::from_str_radix(hex, 16).ok()?;
    char::from_u32(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digit_values_cover_base_36() {
        assert_eq!(digit_value('0'), Some(0));
        assert_eq!(digit_value('9'), Some(9));
        assert_eq!(digit_value('a'), Some(10));
        assert_eq!(digit_value('Z'), Some(35));
        assert_eq!(digit_value('!'), None);
    }

    #[test]
    fn balanced_ternary_accepts_t() {
        assert!(is_valid_digit('T', 3, true));
        assert!(!is_valid_digit('T', 3, false));
        assert!(is_valid_digit('2', 3, true));
        assert!(!is_valid_digit('3', 3, true));
    }

    #[test]
    fn unicode_escape_rejects_surrogates() {
        assert_eq!(parse_unicode_escape("0041"), Some('A'));
        assert_eq!(parse_unicode_escape("D800"), None);
        assert_eq!(parse_unicode_escape("12"), None);
        assert_eq!(parse_unicode_escape("zzzz"), None);
    }
}
