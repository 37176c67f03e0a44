//! The token data model and its hand-written JSON wire format.
//!
//! Mirrors spec.md §3 (DATA MODEL) and §6 (Token output contract). The
//! externally-visible shape — a flat object keyed by `text`/`span`/`type`
//! plus kind-specific conditional keys — doesn't line up with what
//! `#[derive(Serialize)]` produces for a Rust enum (internally tagged enums
//! still nest variant fields under their own object), so `Token` implements
//! `Serialize`/`Deserialize` by hand, the same way `nutmeg_util::Span`
//! hand-writes its flat `[sl, sc, el, ec]` array instead of deriving a
//! struct-of-two-Positions shape.

use nutmeg_util::Span;
use serde::de::Error as DeError;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// How many sub-clauses a Start/Bridge construct admits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arity {
    Zero,
    One,
    Many,
}

impl Arity {
    fn as_u8(self) -> u8 {
        match self {
            Arity::Zero => 0,
            Arity::One => 1,
            Arity::Many => 2,
        }
    }

    fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Arity::Zero),
            1 => Some(Arity::One),
            2 => Some(Arity::Many),
            _ => None,
        }
    }
}

/// The `quote` field on single/multi-line string tokens.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuoteKind {
    Single,
    Double,
    Backtick,
    GuillemetLiteral,
}

impl QuoteKind {
    pub fn from_opener(c: char) -> Option<Self> {
        match c {
            '\'' => Some(QuoteKind::Single),
            '"' => Some(QuoteKind::Double),
            '`' => Some(QuoteKind::Backtick),
            '\u{00AB}' => Some(QuoteKind::GuillemetLiteral),
            _ => None,
        }
    }

    pub fn closer(self) -> char {
        match self {
            QuoteKind::Single => '\'',
            QuoteKind::Double => '"',
            QuoteKind::Backtick => '`',
            QuoteKind::GuillemetLiteral => '\u{00BB}',
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            QuoteKind::Single => "single",
            QuoteKind::Double => "double",
            QuoteKind::Backtick => "backtick",
            QuoteKind::GuillemetLiteral => "\u{00AB}-literal",
        }
    }

    fn from_str(s: &str) -> Option<Self> {
        match s {
            "single" => Some(QuoteKind::Single),
            "double" => Some(QuoteKind::Double),
            "backtick" => Some(QuoteKind::Backtick),
            "\u{00AB}-literal" => Some(QuoteKind::GuillemetLiteral),
            _ => None,
        }
    }
}

/// Prefix/infix/postfix precedence triple carried by an `O` Operator token.
/// Zero means "role disabled" per spec.md §3.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Precedence {
    pub prefix: i32,
    pub infix: i32,
    pub postfix: i32,
}

impl Precedence {
    pub fn is_zero(&self) -> bool {
        self.prefix == 0 && self.infix == 0 && self.postfix == 0
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct StartData {
    pub expecting: Vec<String>,
    pub closed_by: Vec<String>,
    pub arity: Arity,
    /// Set when this Start token was produced by resolving a wildcard.
    pub alias: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BridgeData {
    pub expecting: Vec<String>,
    pub in_containers: Vec<String>,
    pub arity: Arity,
    pub alias: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct OpenDelimData {
    pub closed_by: Vec<String>,
    pub infix: i32,
    pub prefix: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NumericData {
    pub radix: String,
    pub base: u32,
    pub mantissa: String,
    pub fraction: Option<String>,
    pub exponent: Option<i64>,
    pub balanced: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StringData {
    pub value: String,
    pub quote: Option<QuoteKind>,
    pub specifier: Option<String>,
    pub subtokens: Option<Vec<Token>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MultiLineData {
    pub value: String,
    pub quote: Option<QuoteKind>,
    pub specifier: Option<String>,
    pub subtokens: Option<Vec<Token>>,
    pub indent: String,
}

/// The discriminated payload of a [`Token`], one variant per tag letter in
/// spec.md §3/§6.
#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    Numeric(NumericData),
    Str(StringData),
    MultiLine(MultiLineData),
    Expr,
    Start(StartData),
    End { alias: Option<String> },
    Bridge(BridgeData),
    Prefix,
    Variable,
    Operator(Precedence),
    OpenDelim(OpenDelimData),
    CloseDelim,
    Mark,
    Unclassified,
    Exception { reason: String },
}

impl TokenKind {
    pub fn tag(&self) -> &'static str {
        match self {
            TokenKind::Numeric(_) => "n",
            TokenKind::Str(_) => "s",
            TokenKind::MultiLine(_) => "m",
            TokenKind::Expr => "e",
            TokenKind::Start(_) => "S",
            TokenKind::End { .. } => "E",
            TokenKind::Bridge(_) => "B",
            TokenKind::Prefix => "P",
            TokenKind::Variable => "V",
            TokenKind::Operator(_) => "O",
            TokenKind::OpenDelim(_) => "[",
            TokenKind::CloseDelim => "]",
            TokenKind::Mark => "M",
            TokenKind::Unclassified => "U",
            TokenKind::Exception { .. } => "X",
        }
    }

    pub fn is_exception(&self) -> bool {
        matches!(self, TokenKind::Exception { .. })
    }
}

/// A single emitted token: shared fields (spec.md §3 "Shared fields") plus
/// its discriminated kind.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub text: String,
    pub span: Span,
    pub ln_before: bool,
    pub ln_after: bool,
    pub kind: TokenKind,
}

impl Token {
    pub fn new(text: impl Into<String>, span: Span, kind: TokenKind) -> Self {
        Self {
            text: text.into(),
            span,
            ln_before: false,
            ln_after: false,
            kind,
        }
    }

    pub fn exception(text: impl Into<String>, span: Span, reason: impl Into<String>) -> Self {
        Self::new(text, span, TokenKind::Exception { reason: reason.into() })
    }
}

impl Serialize for Token {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("text", &self.text)?;
        map.serialize_entry("span", &self.span)?;
        map.serialize_entry("type", self.kind.tag())?;

        match &self.kind {
            TokenKind::Numeric(d) => {
                map.serialize_entry("radix", &d.radix)?;
                map.serialize_entry("base", &d.base)?;
                map.serialize_entry("mantissa", &d.mantissa)?;
                if let Some(f) = &d.fraction {
                    map.serialize_entry("fraction", f)?;
                }
                if let Some(e) = &d.exponent {
                    map.serialize_entry("exponent", e)?;
                }
                if d.balanced {
                    map.serialize_entry("balanced", &true)?;
                }
            }
            TokenKind::Str(d) => {
                map.serialize_entry("value", &d.value)?;
                if let Some(q) = d.quote {
                    map.serialize_entry("quote", q.as_str())?;
                }
                if let Some(spec) = &d.specifier {
                    map.serialize_entry("specifier", spec)?;
                }
                if let Some(subs) = &d.subtokens {
                    map.serialize_entry("subtokens", subs)?;
                }
            }
            TokenKind::MultiLine(d) => {
                map.serialize_entry("value", &d.value)?;
                if let Some(q) = d.quote {
                    map.serialize_entry("quote", q.as_str())?;
                }
                if let Some(spec) = &d.specifier {
                    map.serialize_entry("specifier", spec)?;
                }
                if let Some(subs) = &d.subtokens {
                    map.serialize_entry("subtokens", subs)?;
                }
                map.serialize_entry("indent", &d.indent)?;
            }
            TokenKind::Start(d) => {
                map.serialize_entry("expecting", &d.expecting)?;
                map.serialize_entry("closed_by", &d.closed_by)?;
                map.serialize_entry("arity", &d.arity.as_u8())?;
                if let Some(a) = &d.alias {
                    map.serialize_entry("alias", a)?;
                }
            }
            TokenKind::End { alias } => {
                if let Some(a) = alias {
                    map.serialize_entry("alias", a)?;
                }
            }
            TokenKind::Bridge(d) => {
                map.serialize_entry("expecting", &d.expecting)?;
                map.serialize_entry("in", &d.in_containers)?;
                map.serialize_entry("arity", &d.arity.as_u8())?;
                if let Some(a) = &d.alias {
                    map.serialize_entry("alias", a)?;
                }
            }
            TokenKind::Operator(p) => {
                if !p.is_zero() {
                    map.serialize_entry("precedence", &[p.prefix, p.infix, p.postfix])?;
                }
            }
            TokenKind::OpenDelim(d) => {
                map.serialize_entry("closed_by", &d.closed_by)?;
                if d.infix != 0 {
                    map.serialize_entry("infix", &d.infix)?;
                }
                map.serialize_entry("prefix", &d.prefix)?;
            }
            TokenKind::Exception { reason } => {
                map.serialize_entry("reason", reason)?;
            }
            _ => {}
        }

        if self.ln_before {
            map.serialize_entry("ln_before", &true)?;
        }
        if self.ln_after {
            map.serialize_entry("ln_after", &true)?;
        }

        map.end()
    }
}

impl<'de> Deserialize<'de> for Token {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut obj: Map<String, Value> = Map::deserialize(deserializer)?;

        let text = take_string(&mut obj, "text")?;
        let span: Span = take(&mut obj, "span")?;
        let tag = take_string(&mut obj, "type")?;
        let ln_before = take_bool_default(&mut obj, "ln_before");
        let ln_after = take_bool_default(&mut obj, "ln_after");

        let kind = match tag.as_str() {
            "n" => TokenKind::Numeric(NumericData {
                radix: take_string(&mut obj, "radix")?,
                base: take(&mut obj, "base")?,
                mantissa: take_string(&mut obj, "mantissa")?,
                fraction: take_opt_string(&mut obj, "fraction"),
                exponent: take_opt(&mut obj, "exponent"),
                balanced: take_bool_default(&mut obj, "balanced"),
            }),
            "s" => TokenKind::Str(StringData {
                value: take_string(&mut obj, "value")?,
                quote: take_opt_string(&mut obj, "quote").and_then(|s| QuoteKind::from_str(&s)),
                specifier: take_opt_string(&mut obj, "specifier"),
                subtokens: take_opt(&mut obj, "subtokens"),
            }),
            "m" => TokenKind::MultiLine(MultiLineData {
                value: take_string(&mut obj, "value")?,
                quote: take_opt_string(&mut obj, "quote").and_then(|s| QuoteKind::from_str(&s)),
                specifier: take_opt_string(&mut obj, "specifier"),
                subtokens: take_opt(&mut obj, "subtokens"),
                indent: take_string(&mut obj, "indent")?,
            }),
            "e" => TokenKind::Expr,
            "S" => TokenKind::Start(StartData {
                expecting: take(&mut obj, "expecting")?,
                closed_by: take(&mut obj, "closed_by")?,
                arity: Arity::from_u8(take(&mut obj, "arity")?)
                    .ok_or_else(|| D::Error::custom("invalid arity"))?,
                alias: take_opt_string(&mut obj, "alias"),
            }),
            "E" => TokenKind::End {
                alias: take_opt_string(&mut obj, "alias"),
            },
            "B" => TokenKind::Bridge(BridgeData {
                expecting: take(&mut obj, "expecting")?,
                in_containers: take(&mut obj, "in")?,
                arity: Arity::from_u8(take(&mut obj, "arity")?)
                    .ok_or_else(|| D::Error::custom("invalid arity"))?,
                alias: take_opt_string(&mut obj, "alias"),
            }),
            "P" => TokenKind::Prefix,
            "V" => TokenKind::Variable,
            "O" => {
                let precedence: Option<[i32; 3]> = take_opt(&mut obj, "precedence");
                let p = precedence.unwrap_or([0, 0, 0]);
                TokenKind::Operator(Precedence {
                    prefix: p[0],
                    infix: p[1],
                    postfix: p[2],
                })
            }
            "[" => TokenKind::OpenDelim(OpenDelimData {
                closed_by: take(&mut obj, "closed_by")?,
                infix: take_opt(&mut obj, "infix").unwrap_or(0),
                prefix: take_bool_default(&mut obj, "prefix"),
            }),
            "]" => TokenKind::CloseDelim,
            "M" => TokenKind::Mark,
            "U" => TokenKind::Unclassified,
            "X" => TokenKind::Exception {
                reason: take_string(&mut obj, "reason")?,
            },
            other => return Err(D::Error::custom(format!("unknown token type {other:?}"))),
        };

        Ok(Token {
            text,
            span,
            ln_before,
            ln_after,
            kind,
        })
    }
}

fn take<T: for<'de2> Deserialize<'de2>, E: DeError>(
    map: &mut Map<String, Value>,
    key: &str,
) -> Result<T, E> {
    let v = map
        .remove(key)
        .ok_or_else(|| E::custom(format!("missing field `{key}`")))?;
    serde_json::from_value(v).map_err(E::custom)
}

fn take_opt<T: for<'de2> Deserialize<'de2>>(map: &mut Map<String, Value>, key: &str) -> Option<T> {
    map.remove(key).and_then(|v| serde_json::from_value(v).ok())
}

fn take_string<E: DeError>(map: &mut Map<String, Value>, key: &str) -> Result<String, E> {
    take(map, key)
}

fn take_opt_string(map: &mut Map<String, Value>, key: &str) -> Option<String> {
    take_opt(map, key)
}

fn take_bool_default(map: &mut Map<String, Value>, key: &str) -> bool {
    take_opt(map, key).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nutmeg_util::Position;

    fn span() -> Span {
        Span::new(Position::new(1, 1), Position::new(1, 4))
    }

    #[test]
    fn numeric_round_trips() {
        let t = Token::new(
            "0x1",
            span(),
            TokenKind::Numeric(NumericData {
                radix: "0x".into(),
                base: 16,
                mantissa: "1".into(),
                fraction: None,
                exponent: None,
                balanced: false,
            }),
        );
        let json = serde_json::to_string(&t).unwrap();
        let back: Token = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn operator_omits_zero_precedence() {
        let t = Token::new("+", span(), TokenKind::Operator(Precedence::default()));
        let json = serde_json::to_value(&t).unwrap();
        assert!(json.get("precedence").is_none());
    }

    #[test]
    fn exception_carries_reason() {
        let t = Token::exception("10rAB", span(), "invalid literal");
        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(json["reason"], "invalid literal");
        assert_eq!(json["type"], "X");
    }
}
