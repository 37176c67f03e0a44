//! Source positions and spans.
//!
//! Positions are 1-based (line, column) pairs, matching how editors and
//! diagnostics report locations. A [`Span`] is a half-open range between two
//! positions and is the unit every emitted token carries.

use serde::de::{SeqAccess, Visitor};
use serde::ser::SerializeTuple;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A single point in source text, 1-based on both axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    pub const fn start() -> Self {
        Self { line: 1, column: 1 }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A contiguous range of source text, from `start` (inclusive) to `end`
/// (exclusive in the column direction on the same line, and generally
/// "one past the last consumed character").
///
/// Serializes to the wire contract's flat 4-element array `[sl, sc, el, ec]`
/// rather than nested objects, which is why this type hand-writes
/// `Serialize`/`Deserialize` instead of deriving them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    pub fn at(line: u32, column: u32) -> Self {
        let p = Position::new(line, column);
        Self::new(p, p)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

impl Serialize for Span {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut tup = serializer.serialize_tuple(4)?;
        tup.serialize_element(&self.start.line)?;
        tup.serialize_element(&self.start.column)?;
        tup.serialize_element(&self.end.line)?;
        tup.serialize_element(&self.end.column)?;
        tup.end()
    }
}

struct SpanVisitor;

impl<'de> Visitor<'de> for SpanVisitor {
    type Value = Span;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a 4-element array [start_line, start_column, end_line, end_column]")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Span, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let sl: u32 = seq
            .next_element()?
            .ok_or_else(|| serde::de::Error::invalid_length(0, &self))?;
        let sc: u32 = seq
            .next_element()?
            .ok_or_else(|| serde::de::Error::invalid_length(1, &self))?;
        let el: u32 = seq
            .next_element()?
            .ok_or_else(|| serde::de::Error::invalid_length(2, &self))?;
        let ec: u32 = seq
            .next_element()?
            .ok_or_else(|| serde::de::Error::invalid_length(3, &self))?;
        Ok(Span::new(Position::new(sl, sc), Position::new(el, ec)))
    }
}

impl<'de> Deserialize<'de> for Span {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_tuple(4, SpanVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_round_trips_as_flat_array() {
        let span = Span::new(Position::new(1, 1), Position::new(2, 4));
        let json = serde_json::to_string(&span).unwrap();
        assert_eq!(json, "[1,1,2,4]");
        let back: Span = serde_json::from_str(&json).unwrap();
        assert_eq!(back, span);
    }
}
