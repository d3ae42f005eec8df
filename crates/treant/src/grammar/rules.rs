//! Core types for representing Tree-sitter grammar rules.
//!
//! This module contains the types used to model grammar rules and their
//! structure according to the Tree-sitter JSON schema, together with the
//! classification layer ([`RuleKind`]) that the analysis passes consume.

use serde::Deserialize;

/// Represents a grammar rule in the Tree-sitter format.
///
/// Each rule corresponds to a node in the grammar's rule graph, identified by a
/// [`RuleType`] and containing type-specific fields such as `members` or
/// `content`.
///
/// A `Rule` can be atomic (like a literal or regex) or composite
/// (like a sequence, choice, or precedence group). Cross-references between
/// rules are expressed as `SYMBOL` names resolved through the grammar's rule
/// table, never as direct object cycles.
#[derive(Debug, Clone, Deserialize)]
pub struct Rule {
    /// The discriminant identifying what kind of rule this is.
    #[serde(rename = "type")]
    pub rule_type: RuleType,

    /// Optional literal or numeric value, depending on rule kind.
    #[serde(default)]
    pub value: Option<RuleValue>,

    /// Optional name used by `SYMBOL`, `FIELD`, or `ALIAS` rules.
    #[serde(default)]
    pub name: Option<String>,

    /// Optional nested rule for unary constructs such as `REPEAT` or `PREC`.
    #[serde(default)]
    pub content: Option<Box<Rule>>,

    /// List of child rules for compound constructs (`SEQ`, `CHOICE`, etc.).
    #[serde(default)]
    pub members: Vec<Rule>,

    /// Whether the node produced by this rule is named.
    #[serde(default)]
    pub named: Option<bool>,

    /// Internal or generator-specific modifier flags.
    #[serde(default)]
    pub flags: Option<String>,

    /// Optional context label used for reserved-word handling.
    #[serde(default)]
    pub context_name: Option<String>,
}

/// A literal or numeric value attached to a rule node.
///
/// `RuleValue` abstracts small scalar payloads that alter how a rule behaves,
/// such as precedence numbers or literal match text. The JSON carries these
/// as bare scalars (`"value": "+"`, `"value": 1`), hence the untagged
/// representation.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RuleValue {
    /// A string literal value (e.g. `"+"`, `"if"`).
    String(String),

    /// An integer numeric value (used by precedence modifiers).
    Integer(i32),
}

/// The enumeration of all recognized Tree-sitter rule types.
///
/// Each variant corresponds to one of the `type` strings found in the JSON
/// grammar format. A `type` string outside this set is preserved in
/// [`RuleType::Unknown`] and refused at classification time, so a grammar
/// produced by an incompatible format version is reported as unclassifiable
/// (naming the offending type string) rather than as a generic parse error.
#[derive(Debug, Clone)]
pub enum RuleType {
    /// An empty (ε) production.
    Blank,
    /// A literal string token.
    String,
    /// A regular-expression pattern token.
    Pattern,
    /// A reference to another named rule.
    Symbol,
    /// A rule that matches one of several alternatives.
    Choice,
    /// A sequential composition of member rules.
    Seq,
    /// A zero-or-more repetition of a rule.
    Repeat,
    /// A one-or-more repetition of a rule.
    Repeat1,
    /// A generic precedence wrapper.
    Prec,
    /// A left-associative precedence wrapper.
    PrecLeft,
    /// A right-associative precedence wrapper.
    PrecRight,
    /// A dynamic (runtime) precedence wrapper.
    PrecDynamic,
    /// A named field applied to a subrule.
    Field,
    /// An alias providing an alternate node name.
    Alias,
    /// A tokenization wrapper.
    Token,
    /// A token that must appear immediately without leading trivia.
    ImmediateToken,
    /// A context-dependent reserved word wrapper.
    Reserved,
    /// A `type` string this format version does not recognize, kept verbatim
    /// for diagnostics.
    Unknown(String),
}

impl<'de> Deserialize<'de> for RuleType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.as_str() {
            "BLANK" => RuleType::Blank,
            "STRING" => RuleType::String,
            "PATTERN" => RuleType::Pattern,
            "SYMBOL" => RuleType::Symbol,
            "CHOICE" => RuleType::Choice,
            "SEQ" => RuleType::Seq,
            "REPEAT" => RuleType::Repeat,
            "REPEAT1" => RuleType::Repeat1,
            "PREC" => RuleType::Prec,
            "PREC_LEFT" => RuleType::PrecLeft,
            "PREC_RIGHT" => RuleType::PrecRight,
            "PREC_DYNAMIC" => RuleType::PrecDynamic,
            "FIELD" => RuleType::Field,
            "ALIAS" => RuleType::Alias,
            "TOKEN" => RuleType::Token,
            "IMMEDIATE_TOKEN" => RuleType::ImmediateToken,
            "RESERVED" => RuleType::Reserved,
            _ => RuleType::Unknown(raw),
        })
    }
}

/// A structural classification of a [`Rule`], borrowed from the rule tree.
///
/// Where [`RuleType`] is the raw JSON discriminant, `RuleKind` is the
/// semantic view: each variant carries exactly the payload that kind of rule
/// is allowed to have, so downstream passes never re-check which optional
/// fields are populated.
#[derive(Debug, Clone, Copy)]
pub enum RuleKind<'a> {
    /// An empty (ε) production.
    Blank,
    /// A literal string token.
    Str(&'a str),
    /// A regular-expression pattern token.
    Pattern(&'a str),
    /// A reference to another named rule, resolved through the rule table.
    Symbol(&'a str),
    /// An ordered sequence of member rules.
    Seq(&'a [Rule]),
    /// A choice between member rules.
    Choice(&'a [Rule]),
    /// Zero-or-more repetition of the content rule.
    Repeat(&'a Rule),
    /// One-or-more repetition of the content rule.
    Repeat1(&'a Rule),
    /// A named field wrapping the content rule.
    Field {
        /// The field name.
        name: &'a str,
        /// The wrapped rule.
        content: &'a Rule,
    },
    /// An alias giving the content rule an alternate node name.
    Alias {
        /// The alternate node name.
        value: &'a str,
        /// Whether the aliased node is named.
        named: bool,
        /// The wrapped rule.
        content: &'a Rule,
    },
    /// A tokenization wrapper.
    Token(&'a Rule),
    /// A tokenization wrapper that forbids leading trivia.
    ImmediateToken(&'a Rule),
    /// A generic precedence wrapper.
    Prec {
        /// The precedence value, numeric or symbolic.
        value: Option<&'a RuleValue>,
        /// The wrapped rule.
        content: &'a Rule,
    },
    /// A left-associative precedence wrapper.
    PrecLeft {
        /// The precedence value, numeric or symbolic.
        value: Option<&'a RuleValue>,
        /// The wrapped rule.
        content: &'a Rule,
    },
    /// A right-associative precedence wrapper.
    PrecRight {
        /// The precedence value, numeric or symbolic.
        value: Option<&'a RuleValue>,
        /// The wrapped rule.
        content: &'a Rule,
    },
    /// A dynamic (runtime) precedence wrapper.
    PrecDynamic {
        /// The precedence value, numeric or symbolic.
        value: Option<&'a RuleValue>,
        /// The wrapped rule.
        content: &'a Rule,
    },
    /// A context-dependent reserved word wrapper.
    Reserved {
        /// The reserved-word context label.
        context: Option<&'a str>,
        /// The wrapped rule.
        content: &'a Rule,
    },
}

/// Raised when a rule node does not match the shape its `type` promises.
///
/// This indicates a malformed or incompatibly-versioned grammar document,
/// e.g. a `SYMBOL` without a `name` or a `REPEAT` without `content`.
#[derive(Debug, Clone)]
pub struct Unclassifiable {
    /// The `type` string of the offending rule.
    pub type_name: String,
    /// What was wrong with it.
    pub detail: &'static str,
}

impl std::fmt::Display for Unclassifiable {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} rule {}", self.type_name, self.detail)
    }
}

impl std::error::Error for Unclassifiable {}

/// Raised by [`Rule::optional_content`] when the rule is not an optional
/// choice.
#[derive(Debug, Clone)]
pub struct NotOptional;

impl std::fmt::Display for NotOptional {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str("rule is not an optional choice")
    }
}

impl std::error::Error for NotOptional {}

impl Rule {
    /// Returns the canonical string name of this rule type.
    #[must_use]
    pub fn type_name(&self) -> &str {
        match &self.rule_type {
            RuleType::Blank => "BLANK",
            RuleType::String => "STRING",
            RuleType::Pattern => "PATTERN",
            RuleType::Symbol => "SYMBOL",
            RuleType::Choice => "CHOICE",
            RuleType::Seq => "SEQ",
            RuleType::Repeat => "REPEAT",
            RuleType::Repeat1 => "REPEAT1",
            RuleType::Prec => "PREC",
            RuleType::PrecLeft => "PREC_LEFT",
            RuleType::PrecRight => "PREC_RIGHT",
            RuleType::PrecDynamic => "PREC_DYNAMIC",
            RuleType::Field => "FIELD",
            RuleType::Alias => "ALIAS",
            RuleType::Token => "TOKEN",
            RuleType::ImmediateToken => "IMMEDIATE_TOKEN",
            RuleType::Reserved => "RESERVED",
            RuleType::Unknown(raw) => raw,
        }
    }

    /// Classifies this rule into its semantic [`RuleKind`] view.
    ///
    /// Total over well-formed rules: every rule a current Tree-sitter
    /// `grammar.json` can contain maps to exactly one variant.
    ///
    /// # Errors
    ///
    /// Returns [`Unclassifiable`] when the rule's populated fields do not
    /// match its declared `type` (a format version mismatch).
    pub fn classify(&self) -> Result<RuleKind<'_>, Unclassifiable> {
        let missing = |detail: &'static str| Unclassifiable {
            type_name: self.type_name().to_owned(),
            detail,
        };
        let string_payload = || match self.value.as_ref() {
            Some(RuleValue::String(s)) => Ok(s.as_str()),
            Some(RuleValue::Integer(_)) | None => Err(missing("is missing a string value")),
        };
        let content = || {
            self.content
                .as_deref()
                .ok_or_else(|| missing("is missing its content"))
        };

        Ok(match &self.rule_type {
            RuleType::Blank => RuleKind::Blank,
            RuleType::String => RuleKind::Str(string_payload()?),
            RuleType::Pattern => RuleKind::Pattern(string_payload()?),
            RuleType::Symbol => RuleKind::Symbol(
                self.name
                    .as_deref()
                    .ok_or_else(|| missing("is missing a name"))?,
            ),
            RuleType::Seq => RuleKind::Seq(&self.members),
            RuleType::Choice => RuleKind::Choice(&self.members),
            RuleType::Repeat => RuleKind::Repeat(content()?),
            RuleType::Repeat1 => RuleKind::Repeat1(content()?),
            RuleType::Field => RuleKind::Field {
                name: self
                    .name
                    .as_deref()
                    .ok_or_else(|| missing("is missing a name"))?,
                content: content()?,
            },
            RuleType::Alias => RuleKind::Alias {
                value: string_payload()?,
                named: self.named.unwrap_or(false),
                content: content()?,
            },
            RuleType::Token => RuleKind::Token(content()?),
            RuleType::ImmediateToken => RuleKind::ImmediateToken(content()?),
            RuleType::Prec => RuleKind::Prec {
                value: self.value.as_ref(),
                content: content()?,
            },
            RuleType::PrecLeft => RuleKind::PrecLeft {
                value: self.value.as_ref(),
                content: content()?,
            },
            RuleType::PrecRight => RuleKind::PrecRight {
                value: self.value.as_ref(),
                content: content()?,
            },
            RuleType::PrecDynamic => RuleKind::PrecDynamic {
                value: self.value.as_ref(),
                content: content()?,
            },
            RuleType::Reserved => RuleKind::Reserved {
                context: self.context_name.as_deref(),
                content: content()?,
            },
            RuleType::Unknown(raw) => {
                return Err(Unclassifiable {
                    type_name: raw.clone(),
                    detail: "is not a recognized rule type",
                })
            }
        })
    }

    /// Returns `true` if this rule represents a terminal (lexical) token.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self.rule_type, RuleType::String | RuleType::Pattern)
    }

    /// Returns `true` if this rule is a symbol reference.
    #[must_use]
    pub fn is_symbol(&self) -> bool {
        matches!(self.rule_type, RuleType::Symbol)
    }

    /// Returns the referenced symbol name, if applicable.
    #[must_use]
    pub fn symbol_name(&self) -> Option<&str> {
        if self.is_symbol() {
            self.name.as_deref()
        } else {
            None
        }
    }

    /// Returns `true` if this rule is a `CHOICE` of exactly two members, one
    /// of which is `BLANK` — the shape Tree-sitter uses for `optional(X)`.
    #[must_use]
    pub fn is_optional(&self) -> bool {
        matches!(self.rule_type, RuleType::Choice)
            && self.members.len() == 2
            && self
                .members
                .iter()
                .filter(|m| matches!(m.rule_type, RuleType::Blank))
                .count()
                == 1
    }

    /// Returns the non-blank member of an optional choice.
    ///
    /// # Errors
    ///
    /// Returns [`NotOptional`] when [`Rule::is_optional`] is false.
    pub fn optional_content(&self) -> Result<&Rule, NotOptional> {
        if !self.is_optional() {
            return Err(NotOptional);
        }
        self.members
            .iter()
            .find(|m| !matches!(m.rule_type, RuleType::Blank))
            .ok_or(NotOptional)
    }

    /// Returns the numeric precedence value if this rule is a precedence wrapper.
    #[must_use]
    pub fn precedence(&self) -> Option<i32> {
        match self.rule_type {
            RuleType::Prec | RuleType::PrecLeft | RuleType::PrecRight | RuleType::PrecDynamic => {
                self.value.as_ref().and_then(|v| match v {
                    RuleValue::Integer(i) => Some(*i),
                    RuleValue::String(_) => None,
                })
            }
            _ => None,
        }
    }

    /// Returns the literal string value if this is a `STRING` rule.
    #[must_use]
    pub fn string_value(&self) -> Option<&str> {
        if matches!(self.rule_type, RuleType::String) {
            self.value.as_ref().and_then(|v| match v {
                RuleValue::String(s) => Some(s.as_str()),
                RuleValue::Integer(_) => None,
            })
        } else {
            None
        }
    }

    /// Returns the pattern source if this is a `PATTERN` rule.
    #[must_use]
    pub fn pattern_value(&self) -> Option<&str> {
        if matches!(self.rule_type, RuleType::Pattern) {
            self.value.as_ref().and_then(|v| match v {
                RuleValue::String(s) => Some(s.as_str()),
                RuleValue::Integer(_) => None,
            })
        } else {
            None
        }
    }

    /// Iterates over the rules nested directly inside this one, whether held
    /// as `content` or as `members`.
    pub fn child_rules(&self) -> impl Iterator<Item = &Rule> {
        self.content.as_deref().into_iter().chain(self.members.iter())
    }
}

impl RuleKind<'_> {
    /// Returns `true` for kinds that wrap a single inline content rule.
    ///
    /// Every kind is either content-carrying or member-carrying or neither;
    /// the match is written without a wildcard arm so adding a kind forces
    /// this function (and [`RuleKind::has_members`]) to be revisited.
    #[must_use]
    pub fn has_content(&self) -> bool {
        match self {
            RuleKind::Repeat(_)
            | RuleKind::Repeat1(_)
            | RuleKind::Field { .. }
            | RuleKind::Alias { .. }
            | RuleKind::Token(_)
            | RuleKind::ImmediateToken(_)
            | RuleKind::Prec { .. }
            | RuleKind::PrecLeft { .. }
            | RuleKind::PrecRight { .. }
            | RuleKind::PrecDynamic { .. }
            | RuleKind::Reserved { .. } => true,
            RuleKind::Blank
            | RuleKind::Str(_)
            | RuleKind::Pattern(_)
            | RuleKind::Symbol(_)
            | RuleKind::Seq(_)
            | RuleKind::Choice(_) => false,
        }
    }

    /// Returns `true` for kinds that carry an ordered member list.
    #[must_use]
    pub fn has_members(&self) -> bool {
        match self {
            RuleKind::Seq(_) | RuleKind::Choice(_) => true,
            RuleKind::Blank
            | RuleKind::Str(_)
            | RuleKind::Pattern(_)
            | RuleKind::Symbol(_)
            | RuleKind::Repeat(_)
            | RuleKind::Repeat1(_)
            | RuleKind::Field { .. }
            | RuleKind::Alias { .. }
            | RuleKind::Token(_)
            | RuleKind::ImmediateToken(_)
            | RuleKind::Prec { .. }
            | RuleKind::PrecLeft { .. }
            | RuleKind::PrecRight { .. }
            | RuleKind::PrecDynamic { .. }
            | RuleKind::Reserved { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule_from(json: &str) -> Rule {
        serde_json::from_str(json).unwrap_or_else(|e| {
            panic!("JSON parse error:\n{e}");
        })
    }

    #[test]
    fn test_parse_bare_scalar_values() {
        let rule = rule_from(r#"{"type": "STRING", "value": "hello"}"#);
        assert_eq!(rule.string_value(), Some("hello"));

        let rule = rule_from(
            r#"{"type": "PREC", "value": 1, "content": {"type": "BLANK"}}"#,
        );
        assert!(matches!(rule.value, Some(RuleValue::Integer(1))));
        assert_eq!(rule.precedence(), Some(1));

        let rule = rule_from(
            r#"{"type": "PREC", "value": "member", "content": {"type": "BLANK"}}"#,
        );
        assert!(matches!(rule.value, Some(RuleValue::String(ref s)) if s == "member"));
        assert_eq!(rule.precedence(), None);
    }

    #[test]
    fn test_unknown_type_string_survives_parsing() {
        let rule = rule_from(r#"{"type": "WIDGET", "name": "x"}"#);
        assert_eq!(rule.type_name(), "WIDGET");
        let err = rule.classify().unwrap_err();
        assert_eq!(err.type_name, "WIDGET");
    }

    #[test]
    fn test_classify_symbol() {
        let rule = rule_from(r#"{"type": "SYMBOL", "name": "expression"}"#);
        assert!(matches!(
            rule.classify().unwrap(),
            RuleKind::Symbol("expression")
        ));
    }

    #[test]
    fn test_classify_malformed_symbol() {
        let rule = rule_from(r#"{"type": "SYMBOL"}"#);
        let err = rule.classify().unwrap_err();
        assert_eq!(err.type_name, "SYMBOL");
    }

    #[test]
    fn test_classify_field() {
        let rule = rule_from(
            r#"{
                "type": "FIELD",
                "name": "left",
                "content": {"type": "SYMBOL", "name": "expression"}
            }"#,
        );
        match rule.classify().unwrap() {
            RuleKind::Field { name, content } => {
                assert_eq!(name, "left");
                assert!(content.is_symbol());
            }
            other => panic!("expected FIELD, got {other:?}"),
        }
    }

    #[test]
    fn test_content_members_partition() {
        let samples = [
            r#"{"type": "BLANK"}"#,
            r#"{"type": "STRING", "value": "+"}"#,
            r#"{"type": "SEQ", "members": []}"#,
            r#"{"type": "CHOICE", "members": []}"#,
            r#"{"type": "REPEAT", "content": {"type": "BLANK"}}"#,
            r#"{"type": "TOKEN", "content": {"type": "STRING", "value": "x"}}"#,
            r#"{"type": "FIELD", "name": "f", "content": {"type": "BLANK"}}"#,
        ];
        for json in samples {
            let rule = rule_from(json);
            let kind = rule.classify().unwrap();
            // Exactly one of the two holds, or neither (atoms), never both.
            assert!(!(kind.has_content() && kind.has_members()), "{json}");
        }
    }

    #[test]
    fn test_is_optional() {
        let rule = rule_from(
            r#"{
                "type": "CHOICE",
                "members": [
                    {"type": "SYMBOL", "name": "expression"},
                    {"type": "BLANK"}
                ]
            }"#,
        );
        assert!(rule.is_optional());
        let inner = rule.optional_content().unwrap();
        assert_eq!(inner.symbol_name(), Some("expression"));
    }

    #[test]
    fn test_three_member_choice_is_not_optional() {
        let rule = rule_from(
            r#"{
                "type": "CHOICE",
                "members": [
                    {"type": "SYMBOL", "name": "a"},
                    {"type": "SYMBOL", "name": "b"},
                    {"type": "BLANK"}
                ]
            }"#,
        );
        assert!(!rule.is_optional());
        assert!(rule.optional_content().is_err());
    }

    #[test]
    fn test_double_blank_choice_is_not_optional() {
        let rule = rule_from(
            r#"{
                "type": "CHOICE",
                "members": [{"type": "BLANK"}, {"type": "BLANK"}]
            }"#,
        );
        assert!(!rule.is_optional());
    }

    #[test]
    fn test_parse_precedence() {
        let rule = rule_from(
            r#"{
                "type": "PREC_LEFT",
                "value": 1,
                "content": {
                    "type": "SEQ",
                    "members": [
                        {"type": "SYMBOL", "name": "expr"},
                        {"type": "STRING", "value": "+"},
                        {"type": "SYMBOL", "name": "expr"}
                    ]
                }
            }"#,
        );
        assert_eq!(rule.precedence(), Some(1));
        assert!(matches!(rule.rule_type, RuleType::PrecLeft));
        assert!(rule.classify().unwrap().has_content());
    }
}
