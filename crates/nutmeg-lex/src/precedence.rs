//! Operator precedence derivation (spec.md §4.4 "Operator precedence
//! derivation").
//!
//! Consulted only as a fallback: `rules.rs`'s `RuleTable::lookup` wins
//! whenever an operator glyph run has an explicit `Operator` rule; this
//! module supplies a precedence for everything else, per spec.md §9's
//! "rule-table wins when present; derivation is the fallback."

use crate::token::Precedence;

fn base_precedence(glyph: char) -> i32 {
    match glyph {
        '.' => 10,
        '(' => 20,
        '[' => 30,
        '{' => 40,
        '*' => 50,
        '/' => 60,
        '%' => 70,
        '+' => 80,
        '-' => 90,
        '<' => 100,
        '>' => 110,
        '~' => 120,
        '!' => 130,
        '&' => 140,
        '^' => 150,
        '|' => 160,
        '?' => 170,
        '=' => 180,
        ':' => 190,
        _ => 1000,
    }
}

/// Glyphs whose prefix role is enabled by default (spec.md §4.4: "at
/// minimum `-`, plus optionally `+`" — both are enabled here).
fn is_prefix_capable(glyph: char) -> bool {
    matches!(glyph, '-' | '+')
}

/// Derives a [`Precedence`] for an operator lexeme with no explicit rule.
///
/// `b` is the first glyph's base precedence, minus one if that glyph
/// repeats immediately (`==` gets `=`'s base minus one, not `=`'s base).
/// Infix is enabled for every operator (`b + 2000`); prefix only for the
/// glyphs explicitly marked prefix-capable; postfix is disabled unless a
/// rule-table entry says otherwise (this function never enables it).
pub fn derive_precedence(op: &str) -> Precedence {
    let mut chars = op.chars();
    let first = chars.next().unwrap_or('\0');
    let mut b = base_precedence(first);
    if chars.next() == Some(first) {
        b -= 1;
    }
    Precedence {
        prefix: if is_prefix_capable(first) { b } else { 0 },
        infix: b + 2000,
        postfix: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_glyph_uses_base() {
        let p = derive_precedence("+");
        assert_eq!(p.infix, 80 + 2000);
        assert_eq!(p.prefix, 80);
        assert_eq!(p.postfix, 0);
    }

    #[test]
    fn repeated_glyph_subtracts_one() {
        let p = derive_precedence("==");
        assert_eq!(p.infix, 180 - 1 + 2000);
        assert_eq!(p.prefix, 0);
    }

    #[test]
    fn unknown_first_glyph_falls_back_to_1000() {
        let p = derive_precedence("$");
        assert_eq!(p.infix, 1000 + 2000);
    }

    #[test]
    fn non_prefix_capable_glyph_disables_prefix() {
        let p = derive_precedence("*");
        assert_eq!(p.prefix, 0);
    }
}
