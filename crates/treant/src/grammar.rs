//! Core structures and parsing logic for Tree-sitter grammars.
//!
//! This module defines the internal representation of a grammar as parsed from
//! Tree-sitter's JSON format. It uses [`serde_json`] for deserialization and
//! provides ergonomic accessors for inspecting rule properties and structure.

pub mod rules;

use serde::Deserialize;
use std::collections::HashMap;

pub use rules::{NotOptional, Rule, RuleKind, RuleType, RuleValue, Unclassifiable};

/// Represents a full Tree-sitter grammar definition.
///
/// This structure directly mirrors the serialized JSON format produced by
/// `tree-sitter generate --json`. It captures the complete rule set along with
/// auxiliary metadata such as precedences, conflicts, and supertypes.
///
/// See <https://tree-sitter.github.io/tree-sitter/assets/schemas/grammar.schema.json>
#[derive(Debug, Clone, Deserialize)]
pub struct Grammar {
    /// Optional `$schema` field from the JSON, typically used for schema
    /// validation or editor integration. Absent in grammars emitted by older
    /// Tree-sitter versions.
    #[serde(rename = "$schema", default)]
    pub schema: Option<String>,

    /// The short name of the grammar (e.g. `"javascript"` or `"rust"`).
    pub name: String,

    /// Optional name of a base grammar that this one inherits from.
    #[serde(default)]
    pub inherits: Option<String>,

    /// Map of all rule identifiers to their corresponding definitions.
    pub rules: HashMap<String, Rule>,

    /// “Extras” that may appear between other tokens, such as whitespace or comments.
    #[serde(default)]
    pub extras: Option<Vec<Rule>>,

    /// Rules implemented externally via a scanner.
    #[serde(default)]
    pub externals: Option<Vec<Rule>>,

    /// Names of rules that should be inlined into other rules.
    #[serde(default)]
    pub inline: Option<Vec<String>>,

    /// Precedence declarations that control operator binding order.
    #[serde(default)]
    pub precedences: Option<Vec<Vec<Precedence>>>,

    /// Explicit conflict groups expected during parsing.
    #[serde(default)]
    pub conflicts: Option<Vec<Vec<String>>>,

    /// Context-specific reserved word definitions.
    #[serde(default)]
    pub reserved: Option<HashMap<String, Vec<Rule>>>,

    /// The special rule name used to identify word tokens (keywords, identifiers, etc.).
    #[serde(default)]
    pub word: Option<String>,

    /// A list of node supertypes, grouping related syntactic forms.
    #[serde(default)]
    pub supertypes: Option<Vec<String>>,
}

/// A single precedence entry, either a named symbol or a literal string value.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Precedence {
    /// A literal precedence string.
    String(String),

    /// A symbolic precedence name.
    Symbol {
        /// The identifier of the referenced symbol.
        name: String,
    },
}

/// Parse a JSON grammar definition into a strongly typed [`Grammar`] structure.
///
/// # Errors
///
/// Returns [`GrammarError::JsonParse`] if the provided string is not valid JSON
/// or fails schema deserialization.
pub fn parse_grammar(json: &str) -> Result<Grammar, GrammarError> {
    serde_json::from_str(json).map_err(|e| GrammarError::JsonParse(e.to_string()))
}

/// Possible errors raised during grammar parsing or classification.
#[derive(Debug)]
pub enum GrammarError {
    /// The input JSON was syntactically invalid or structurally mismatched.
    JsonParse(String),

    /// A rule inside the named grammar rule failed classification.
    Unclassifiable {
        /// The grammar rule the malformed node was found under.
        rule: String,
        /// The classification failure itself.
        source: Unclassifiable,
    },
}

impl std::fmt::Display for GrammarError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            GrammarError::JsonParse(e) => write!(f, "JSON parse error: {e}"),
            GrammarError::Unclassifiable { rule, source } => {
                write!(f, "unclassifiable rule in '{rule}': {source}")
            }
        }
    }
}

impl std::error::Error for GrammarError {}

impl Grammar {
    /// Classifies every rule node in the grammar, depth first.
    ///
    /// Run before analysis so a grammar written for an incompatible format
    /// version is refused as a whole rather than failing mid-emission. Rules
    /// are visited in sorted name order, so the reported failure is stable.
    ///
    /// # Errors
    ///
    /// Returns [`GrammarError::Unclassifiable`] naming the top-level rule the
    /// malformed node was found under.
    pub fn classify_all(&self) -> Result<(), GrammarError> {
        let mut names: Vec<&String> = self.rules.keys().collect();
        names.sort();
        for name in names {
            classify_tree(&self.rules[name]).map_err(|source| GrammarError::Unclassifiable {
                rule: name.clone(),
                source,
            })?;
        }
        Ok(())
    }
}

fn classify_tree(rule: &Rule) -> Result<(), Unclassifiable> {
    rule.classify()?;
    for child in rule.child_rules() {
        classify_tree(child)?;
    }
    Ok(())
}
