//! Validation routines for Tree-sitter grammars.
//!
//! This module performs structural checks over parsed
//! [`Grammar`](crate::grammar::Grammar) definitions before generation:
//! verifying symbol references, flagging unreachable rules, and confirming
//! precedence consistency. Hard violations are errors; advisory findings are
//! returned as warnings for the caller to report, so the analysis core never
//! prints.

use crate::grammar::{Grammar, Rule, RuleKind};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// An advisory finding that does not block generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    /// The descriptive human-readable message.
    pub message: String,
}

/// Represents a validation failure encountered when checking a grammar.
#[derive(Debug, Clone)]
pub enum ValidationError {
    /// The grammar defines no rules at all.
    NoRules,
    /// Symbol references to rules the grammar never defines, aggregated so
    /// the grammar can be fixed in one pass.
    UndefinedSymbols(Vec<UndefinedSymbol>),
}

/// One dangling symbol reference.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct UndefinedSymbol {
    /// The referenced rule name that is not defined.
    pub symbol: String,
    /// The top-level rule the reference was found under.
    pub referenced_by: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ValidationError::NoRules => f.write_str("grammar has no rules"),
            ValidationError::UndefinedSymbols(refs) => {
                write!(f, "undefined symbols:")?;
                for r in refs {
                    write!(f, " '{}' (in rule '{}')", r.symbol, r.referenced_by)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Performs semantic validation of a parsed [`Grammar`](crate::grammar::Grammar).
///
/// Runs three consistency passes:
///
/// - Checks that all referenced symbols are defined (error, aggregated).
/// - Flags unreachable rules (warning).
/// - Flags rules carrying multiple precedence levels (warning).
///
/// Rules are assumed to classify cleanly; run
/// [`Grammar::classify_all`](crate::grammar::Grammar::classify_all) first.
///
/// # Errors
///
/// Returns a [`ValidationError`] if the grammar is empty or references
/// undefined symbols.
pub fn validate(grammar: &Grammar) -> Result<Vec<Warning>, ValidationError> {
    if grammar.rules.is_empty() {
        return Err(ValidationError::NoRules);
    }

    check_undefined_symbols(grammar)?;

    let mut warnings = Vec::new();
    check_unreachable_rules(grammar, &mut warnings);
    check_precedence(grammar, &mut warnings);
    Ok(warnings)
}

fn check_undefined_symbols(grammar: &Grammar) -> Result<(), ValidationError> {
    let defined: HashSet<&str> = grammar.rules.keys().map(String::as_str).collect();

    let mut undefined = Vec::new();
    for (rule_name, rule) in &grammar.rules {
        collect_undefined(rule, &defined, rule_name, &mut undefined);
    }

    if undefined.is_empty() {
        Ok(())
    } else {
        undefined.sort();
        undefined.dedup();
        Err(ValidationError::UndefinedSymbols(undefined))
    }
}

fn collect_undefined(
    rule: &Rule,
    defined: &HashSet<&str>,
    context: &str,
    out: &mut Vec<UndefinedSymbol>,
) {
    if let Some(name) = rule.symbol_name() {
        if !defined.contains(name) {
            out.push(UndefinedSymbol {
                symbol: name.to_owned(),
                referenced_by: context.to_owned(),
            });
        }
    }
    for child in rule.child_rules() {
        collect_undefined(child, defined, context, out);
    }
}

fn check_unreachable_rules(grammar: &Grammar, warnings: &mut Vec<Warning>) {
    // Rule-map order is not preserved through parsing, so the conventional
    // "first rule is the entry point" cannot be applied deterministically.
    // Reachability starts from `source_file` when present and is otherwise
    // skipped.
    let Some(entry) = grammar.rules.get_key_value("source_file") else {
        return;
    };

    let mut reachable: HashSet<&str> = HashSet::new();
    let mut to_visit: Vec<&str> = vec![entry.0.as_str()];

    while let Some(rule_name) = to_visit.pop() {
        if !reachable.insert(rule_name) {
            continue;
        }
        if let Some(rule) = grammar.rules.get(rule_name) {
            collect_referenced_symbols(rule, &mut to_visit);
        }
    }

    let inline: HashSet<&str> = grammar
        .inline
        .iter()
        .flatten()
        .map(String::as_str)
        .collect();

    let mut names: Vec<&String> = grammar.rules.keys().collect();
    names.sort();
    for rule_name in names {
        if !reachable.contains(rule_name.as_str()) && !inline.contains(rule_name.as_str()) {
            warnings.push(Warning {
                message: format!("unreachable rule '{rule_name}'"),
            });
        }
    }
}

fn collect_referenced_symbols<'a>(rule: &'a Rule, symbols: &mut Vec<&'a str>) {
    if let Some(name) = rule.symbol_name() {
        symbols.push(name);
    }
    for child in rule.child_rules() {
        collect_referenced_symbols(child, symbols);
    }
}

fn check_precedence(grammar: &Grammar, warnings: &mut Vec<Warning>) {
    let mut levels: BTreeMap<&str, BTreeSet<i32>> = BTreeMap::new();

    for (rule_name, rule) in &grammar.rules {
        collect_precedence_levels(rule, rule_name, &mut levels);
    }

    for (rule, seen) in &levels {
        if seen.len() > 1 {
            let list: Vec<String> = seen.iter().map(ToString::to_string).collect();
            warnings.push(Warning {
                message: format!(
                    "rule '{rule}' has multiple precedence levels: {}",
                    list.join(", ")
                ),
            });
        }
    }
}

fn collect_precedence_levels<'a>(
    rule: &Rule,
    context: &'a str,
    levels: &mut BTreeMap<&'a str, BTreeSet<i32>>,
) {
    if let Ok(
        RuleKind::Prec { .. }
        | RuleKind::PrecLeft { .. }
        | RuleKind::PrecRight { .. }
        | RuleKind::PrecDynamic { .. },
    ) = rule.classify()
    {
        if let Some(p) = rule.precedence() {
            levels.entry(context).or_default().insert(p);
        }
    }
    for child in rule.child_rules() {
        collect_precedence_levels(child, context, levels);
    }
}
