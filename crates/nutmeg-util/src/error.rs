//! Error types shared across the lexing crates.

use thiserror::Error;

/// Raised when a rule table's configuration is internally inconsistent.
///
/// Construction-time failures only: a lexeme claimed by two incompatible
/// rule kinds. Nothing about tokenizing a particular source file can
/// produce this error once a `RuleTable` exists.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuleTableError {
    /// The same lexeme was claimed by two rule kinds that cannot coexist.
    #[error("rule conflict for {lexeme:?}: already defined as {first_kind}, cannot also define as {second_kind}")]
    Conflict {
        lexeme: String,
        first_kind: &'static str,
        second_kind: &'static str,
    },
}

/// Result alias for rule-table construction.
pub type RuleTableResult<T> = std::result::Result<T, RuleTableError>;
