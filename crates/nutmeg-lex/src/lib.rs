//! Context-sensitive lexical analyzer for a block-structured language.
//!
//! Source text goes in once and a linear token stream comes out: numeric
//! literals across 35 radixes (including balanced ternary), layered string
//! literals (single/triple-quoted, raw, interpolated), and identifier/
//! operator runs classified against a configurable [`RuleTable`]. A wildcard
//! lexeme (`:` by default) resolves its classification against whatever the
//! surrounding construct currently expects, tracked by an expectation stack
//! private to the [`Driver`][driver] that runs it.
//!
//! ```
//! let tokens = nutmeg_lex::tokenize("if x:\n  y\nendif");
//! assert_eq!(tokens.len(), 5);
//! ```
//!
//! Rule-file loading, JSON Lines writing, and process/CLI concerns are left
//! to callers; this crate's surface is [`tokenize`], [`tokenize_with_rules`],
//! and the [`Token`]/[`RuleTable`]/[`RuleInput`] types.

mod classifier;
mod cursor;
mod driver;
mod number;
mod precedence;
mod rules;
mod string;
mod token;
mod unicode;

pub use driver::{tokenize, tokenize_with_rules};
pub use rules::{BracketRule, BridgeRule, OperatorRule, RuleInput, RuleKind, RuleTable, StartRule};
pub use token::{
    Arity, BridgeData, MultiLineData, NumericData, OpenDelimData, Precedence, QuoteKind, StartData, StringData, Token,
    TokenKind,
};
