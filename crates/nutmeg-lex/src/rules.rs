//! RuleTable: the single authoritative lexeme → classification lookup.
//!
//! Spec.md §9 calls out the reference implementation's overlapping
//! `matchIdentifier`/`matchOperator`/`matchDelimiter` cascade as dead-code
//! prone and asks for "a single authoritative lookup (the RuleTable) keyed
//! by the candidate lexeme" instead — that's what this module builds, once,
//! from the defaults plus whatever a `RuleInput` overrides.

use indexmap::IndexMap;
use nutmeg_util::{RuleTableError, RuleTableResult};
use serde::Deserialize;

use crate::token::Arity;

/// Semantic classification of one lexeme, independent of where in the
/// source it's matched. End/CloseDelim entries are derived from the
/// closers a Start/OpenDelim rule references (spec.md §3: "End and
/// CloseDelim entries are derived ... and may be shared across
/// originators").
#[derive(Clone, Debug, PartialEq)]
pub enum RuleKind {
    Wildcard,
    Start {
        expecting: Vec<String>,
        closed_by: Vec<String>,
        arity: Arity,
    },
    End,
    Bridge {
        expecting: Vec<String>,
        in_containers: Vec<String>,
        arity: Arity,
    },
    Prefix,
    Operator {
        prefix: i32,
        infix: i32,
        postfix: i32,
    },
    OpenDelim {
        closed_by: Vec<String>,
        infix: i32,
        prefix: bool,
    },
    CloseDelim,
    Mark,
}

impl RuleKind {
    fn label(&self) -> &'static str {
        match self {
            RuleKind::Wildcard => "wildcard",
            RuleKind::Start { .. } => "start",
            RuleKind::End => "end",
            RuleKind::Bridge { .. } => "bridge",
            RuleKind::Prefix => "prefix",
            RuleKind::Operator { .. } => "operator",
            RuleKind::OpenDelim { .. } => "open-delimiter",
            RuleKind::CloseDelim => "close-delimiter",
            RuleKind::Mark => "mark",
        }
    }
}

/// The rule-table lookup, built once per `Driver` run and never mutated
/// afterward (spec.md §9: "immutable values computed once at program
/// start").
#[derive(Clone, Debug, Default)]
pub struct RuleTable {
    rules: IndexMap<String, RuleKind>,
}

impl RuleTable {
    pub fn lookup(&self, lexeme: &str) -> Option<&RuleKind> {
        self.rules.get(lexeme)
    }

    fn insert(&mut self, lexeme: String, kind: RuleKind) -> RuleTableResult<()> {
        match self.rules.get(&lexeme) {
            None => {
                self.rules.insert(lexeme, kind);
                Ok(())
            }
            Some(existing) => {
                // A derived End/CloseDelim entry may legitimately be
                // claimed by more than one originating Start/OpenDelim
                // (spec.md §3: "may be shared across originators").
                let compatible = matches!(
                    (existing, &kind),
                    (RuleKind::End, RuleKind::End) | (RuleKind::CloseDelim, RuleKind::CloseDelim)
                );
                if compatible {
                    return Ok(());
                }
                Err(RuleTableError::Conflict {
                    lexeme,
                    first_kind: existing.label(),
                    second_kind: kind.label(),
                })
            }
        }
    }

    /// The canonical default rule set (spec.md §4.4 "Default rule set").
    /// Where the reference carries mutually inconsistent defaults (the
    /// open ambiguity spec.md §9 calls out), this picks one canonical
    /// shape and documents it in DESIGN.md rather than guessing at intent.
    pub fn default_rules() -> RuleTable {
        RuleTable::build(RuleInput::defaults()).expect("default rule set is self-consistent")
    }

    /// Builds a table from a [`RuleInput`], applying defaults for any
    /// absent category (spec.md §6: "Each category's presence replaces the
    /// corresponding default map in its entirety; absence leaves defaults
    /// in place").
    pub fn build(input: RuleInput) -> RuleTableResult<RuleTable> {
        let defaults = RuleInput::defaults();
        let mut table = RuleTable::default();

        let wildcards = input.wildcards.unwrap_or(defaults.wildcards.unwrap());
        let starts = input.starts.unwrap_or(defaults.starts.unwrap());
        let bridges = input.bridges.unwrap_or(defaults.bridges.unwrap());
        let prefixes = input.prefixes.unwrap_or(defaults.prefixes.unwrap());
        let operators = input.operators.unwrap_or(defaults.operators.unwrap());
        let brackets = input.brackets.unwrap_or(defaults.brackets.unwrap());
        let marks = input.marks.unwrap_or(defaults.marks.unwrap());

        for w in wildcards {
            table.insert(w, RuleKind::Wildcard)?;
        }

        for s in starts {
            let closers = s.closed_by.clone();
            table.insert(
                s.lexeme.clone(),
                RuleKind::Start {
                    expecting: s.expecting,
                    closed_by: s.closed_by,
                    arity: s.arity,
                },
            )?;
            for closer in closers {
                table.insert(closer, RuleKind::End)?;
            }
        }

        for b in bridges {
            table.insert(
                b.lexeme.clone(),
                RuleKind::Bridge {
                    expecting: b.expecting,
                    in_containers: b.in_containers,
                    arity: b.arity,
                },
            )?;
        }

        for p in prefixes {
            table.insert(p, RuleKind::Prefix)?;
        }

        for op in operators {
            table.insert(
                op.lexeme,
                RuleKind::Operator {
                    prefix: op.prefix,
                    infix: op.infix,
                    postfix: op.postfix,
                },
            )?;
        }

        for br in brackets {
            let closers = vec![br.closed_by.clone()];
            table.insert(
                br.lexeme.clone(),
                RuleKind::OpenDelim {
                    closed_by: closers.clone(),
                    infix: br.infix,
                    prefix: br.prefix,
                },
            )?;
            for closer in closers {
                table.insert(closer, RuleKind::CloseDelim)?;
            }
        }

        for m in marks {
            table.insert(m, RuleKind::Mark)?;
        }

        Ok(table)
    }
}

/// A single Start-category entry as the (out-of-scope) rule-file loader
/// would hand it to this crate.
#[derive(Clone, Debug, Deserialize)]
pub struct StartRule {
    pub lexeme: String,
    #[serde(default)]
    pub expecting: Vec<String>,
    pub closed_by: Vec<String>,
    pub arity: Arity,
}

#[derive(Clone, Debug, Deserialize)]
pub struct BridgeRule {
    pub lexeme: String,
    #[serde(default)]
    pub expecting: Vec<String>,
    #[serde(rename = "in")]
    pub in_containers: Vec<String>,
    pub arity: Arity,
}

#[derive(Clone, Debug, Deserialize)]
pub struct OperatorRule {
    pub lexeme: String,
    #[serde(default)]
    pub prefix: i32,
    #[serde(default)]
    pub infix: i32,
    #[serde(default)]
    pub postfix: i32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct BracketRule {
    pub lexeme: String,
    pub closed_by: String,
    #[serde(default)]
    pub infix: i32,
    #[serde(default)]
    pub prefix: bool,
}

impl<'de> Deserialize<'de> for Arity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        match raw.as_str() {
            "Zero" | "zero" => Ok(Arity::Zero),
            "One" | "one" => Ok(Arity::One),
            "Many" | "many" => Ok(Arity::Many),
            other => Err(serde::de::Error::custom(format!(
                "invalid arity {other:?}, expected Zero/One/Many"
            ))),
        }
    }
}

/// The shape of a rule file's composed record once the (out-of-scope) YAML
/// loader has parsed it (spec.md §6 "Rule input"). Each `Option` category
/// that is `None` leaves the corresponding default map untouched; `Some`
/// replaces it wholesale.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RuleInput {
    pub brackets: Option<Vec<BracketRule>>,
    pub prefixes: Option<Vec<String>>,
    pub starts: Option<Vec<StartRule>>,
    pub bridges: Option<Vec<BridgeRule>>,
    pub wildcards: Option<Vec<String>>,
    pub operators: Option<Vec<OperatorRule>>,
    pub marks: Option<Vec<String>>,
}

impl RuleInput {
    /// The canonical default tables (spec.md §4.4).
    pub fn defaults() -> RuleInput {
        let start = |lexeme: &str, expecting: &[&str], arity: Arity| StartRule {
            lexeme: lexeme.to_string(),
            expecting: expecting.iter().map(|s| s.to_string()).collect(),
            closed_by: vec!["end".to_string(), format!("end{lexeme}")],
            arity,
        };
        let bridge = |lexeme: &str, in_containers: &[&str], expecting: &[&str], arity: Arity| BridgeRule {
            lexeme: lexeme.to_string(),
            expecting: expecting.iter().map(|s| s.to_string()).collect(),
            in_containers: in_containers.iter().map(|s| s.to_string()).collect(),
            arity,
        };
        let bracket = |lexeme: &str, closed_by: &str, infix: i32| BracketRule {
            lexeme: lexeme.to_string(),
            closed_by: closed_by.to_string(),
            infix,
            prefix: true,
        };

        RuleInput {
            brackets: Some(vec![
                bracket("(", ")", 20),
                bracket("[", "]", 30),
                bracket("{", "}", 40),
            ]),
            prefixes: Some(vec!["return".to_string(), "yield".to_string()]),
            starts: Some(vec![
                start("def", &["=>>"], Arity::One),
                start("fn", &["=>>"], Arity::One),
                start("if", &["then"], Arity::Many),
                start("ifnot", &["then"], Arity::Many),
                start("for", &["do"], Arity::One),
                start("class", &[], Arity::Zero),
                start("interface", &[], Arity::Zero),
                start("try", &["catch", "else"], Arity::Many),
                start("transaction", &["catch"], Arity::One),
                start("let", &["=>>"], Arity::Zero),
                start("switch", &["case"], Arity::Many),
            ]),
            bridges: Some(vec![
                bridge("=>>", &["def", "fn", "let", "transaction"], &[], Arity::Zero),
                bridge("then", &["if", "ifnot"], &["else", "elseif", "elseifnot"], Arity::One),
                bridge("else", &["if", "ifnot", "try"], &[], Arity::Zero),
                bridge("elseif", &["if"], &["else", "elseif"], Arity::Many),
                bridge("elseifnot", &["ifnot"], &["else", "elseifnot"], Arity::Many),
                bridge("do", &["for"], &[], Arity::Zero),
                bridge("catch", &["try", "transaction"], &["catch", "else"], Arity::Many),
                bridge("case", &["switch"], &["case"], Arity::Many),
            ]),
            wildcards: Some(vec![":".to_string()]),
            operators: Some(Vec::new()),
            marks: Some(vec![",".to_string(), ";".to_string()]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_build_without_conflict() {
        let table = RuleTable::default_rules();
        assert!(matches!(table.lookup("if"), Some(RuleKind::Start { .. })));
        assert!(matches!(table.lookup("end"), Some(RuleKind::End)));
        assert!(matches!(table.lookup("endif"), Some(RuleKind::End)));
        assert!(matches!(table.lookup(":"), Some(RuleKind::Wildcard)));
        assert!(matches!(table.lookup("("), Some(RuleKind::OpenDelim { .. })));
        assert!(matches!(table.lookup(")"), Some(RuleKind::CloseDelim)));
        assert!(matches!(table.lookup(","), Some(RuleKind::Mark)));
    }

    #[test]
    fn shared_end_closer_is_not_a_conflict() {
        // Both `if` and `ifnot` close with the bare "end" keyword.
        let table = RuleTable::default_rules();
        assert!(matches!(table.lookup("end"), Some(RuleKind::End)));
    }

    #[test]
    fn conflicting_custom_rules_are_rejected() {
        let mut input = RuleInput::defaults();
        // Redeclare "if" as a Mark too -> conflict with the Start already
        // claiming it.
        input.marks = Some(vec!["if".to_string()]);
        let err = RuleTable::build(input).unwrap_err();
        assert!(matches!(err, RuleTableError::Conflict { .. }));
    }
}
