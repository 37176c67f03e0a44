//! nutmeg-util - foundation types shared by the lexer crate.
//!
//! Keeps exactly two things: source [`Position`]/[`Span`] and the
//! [`error::RuleTableError`] raised when a rule table's configuration is
//! self-contradictory. Everything else a compiler front end eventually wants
//! (symbol interning, incremental caches, diagnostics routing) belongs to
//! whatever sits downstream of the lexer, not to it.

pub mod error;
pub mod span;

pub use error::{RuleTableError, RuleTableResult};
pub use span::{Position, Span};
