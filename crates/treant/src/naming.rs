//! Naming and classification: casing conventions, anonymous-node
//! categorisation, and resolution of the generated SDK's namespace symbol.
//!
//! Everything here is a pure function of its inputs; the emitter derives all
//! artifact paths and generated identifiers through this module so that
//! output names never depend on iteration order.

/// The fixed tool identifier used as the default namespace prefix.
pub const TOOL_PREFIX: &str = "Treant";

/// Category of an anonymous (unnamed) node, judged by its literal text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenCategory {
    /// A single symbol character, e.g. `(` or `;`.
    Punctuation,
    /// A multi-character symbolic literal, e.g. `==` or `=>`.
    Operator,
    /// A word-shaped literal, e.g. `if` or `return`.
    Keyword,
}

impl TokenCategory {
    /// The name of the literal-union type this category maps to in emitted
    /// code.
    #[must_use]
    pub fn union_name(self) -> &'static str {
        match self {
            TokenCategory::Punctuation => "Punctuation",
            TokenCategory::Operator => "Operator",
            TokenCategory::Keyword => "Keyword",
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Classifies an anonymous node's literal text.
///
/// Word-shaped literals are keywords; anything containing a symbol character
/// is punctuation when a single character and an operator otherwise. Total
/// and order-independent: every literal maps to exactly one category.
#[must_use]
pub fn classify_anonymous(text: &str) -> TokenCategory {
    if text.chars().all(is_word_char) {
        TokenCategory::Keyword
    } else if text.chars().count() == 1 {
        TokenCategory::Punctuation
    } else {
        TokenCategory::Operator
    }
}

/// Converts a name to `PascalCase`, splitting on `_`, `-`, and spaces.
#[must_use]
pub fn pascal_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = true;
    for c in name.chars() {
        if matches!(c, '_' | '-' | ' ') {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Converts a name to `snake_case`.
#[must_use]
pub fn snake_case(name: &str) -> String {
    separated_case(name, '_')
}

/// Converts a name to `kebab-case`.
#[must_use]
pub fn kebab_case(name: &str) -> String {
    separated_case(name, '-')
}

fn separated_case(name: &str, sep: char) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_lower = false;
    for c in name.chars() {
        if matches!(c, '_' | '-' | ' ') {
            if !out.ends_with(sep) && !out.is_empty() {
                out.push(sep);
            }
            prev_lower = false;
        } else if c.is_uppercase() {
            if prev_lower && !out.ends_with(sep) {
                out.push(sep);
            }
            out.extend(c.to_lowercase());
            prev_lower = false;
        } else {
            out.push(c);
            prev_lower = true;
        }
    }
    out
}

/// Derives the generated identifier for an anonymous node.
///
/// Keywords become `<Pascal>Keyword`; punctuation and operators map each
/// character through a fixed symbol-name table (`(` → `LParen`, `==` →
/// `EqEq`). Characters outside the table fall back to their code point, so
/// the function is total and deterministic for any literal.
#[must_use]
pub fn token_type_name(literal: &str) -> String {
    match classify_anonymous(literal) {
        TokenCategory::Keyword => format!("{}Keyword", pascal_case(literal)),
        TokenCategory::Punctuation | TokenCategory::Operator => {
            let mut out = String::new();
            for c in literal.chars() {
                match symbol_char_name(c) {
                    Some(name) => out.push_str(name),
                    None => {
                        out.push('U');
                        out.push_str(&format!("{:04X}", c as u32));
                    }
                }
            }
            out
        }
    }
}

fn symbol_char_name(c: char) -> Option<&'static str> {
    Some(match c {
        '(' => "LParen",
        ')' => "RParen",
        '{' => "LBrace",
        '}' => "RBrace",
        '[' => "LBracket",
        ']' => "RBracket",
        '<' => "Lt",
        '>' => "Gt",
        '=' => "Eq",
        '!' => "Bang",
        '+' => "Plus",
        '-' => "Minus",
        '*' => "Star",
        '/' => "Slash",
        '%' => "Percent",
        '^' => "Caret",
        '&' => "Amp",
        '|' => "Pipe",
        '~' => "Tilde",
        '@' => "At",
        '#' => "Hash",
        '$' => "Dollar",
        ',' => "Comma",
        '.' => "Dot",
        ';' => "Semicolon",
        ':' => "Colon",
        '?' => "Question",
        '\'' => "Quote",
        '"' => "DoubleQuote",
        '`' => "Backtick",
        '\\' => "Backslash",
        _ => return None,
    })
}

/// How the namespace prefix and base name are joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConcatMode {
    /// Direct Pascal concatenation: `TreantGraphql`.
    #[default]
    Pascal,
    /// Lower kebab-case: `treant-graphql`.
    Kebab,
    /// Lower snake_case: `treant_graphql`.
    Snake,
}

/// Configuration for the emitted namespace symbol.
///
/// `prefix` is doubly optional: absent means "use the tool identifier",
/// explicitly null means "no prefix at all".
#[derive(Debug, Clone, Default)]
pub struct NamespaceConfig {
    /// Outer `None`: default to [`TOOL_PREFIX`]. `Some(None)`: suppress the
    /// prefix entirely. `Some(Some(p))`: use `p`.
    pub prefix: Option<Option<String>>,
    /// Overrides the grammar-derived base name.
    pub name: Option<String>,
    /// Joiner between prefix and base; no effect when the prefix is
    /// suppressed.
    pub concat_mode: ConcatMode,
}

/// Raised when a namespace prefix or name fails identifier validation.
#[derive(Debug, Clone)]
pub struct InvalidNamespaceConfig {
    /// Which configuration field failed, `"prefix"` or `"name"`.
    pub field: &'static str,
    /// The offending value.
    pub value: String,
}

impl std::fmt::Display for InvalidNamespaceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "invalid namespace {}: '{}' must start with a non-digit identifier character",
            self.field, self.value
        )
    }
}

impl std::error::Error for InvalidNamespaceConfig {}

fn check_identifier(field: &'static str, value: &str) -> Result<(), InvalidNamespaceConfig> {
    let starts_ok = value
        .chars()
        .next()
        .is_some_and(|c| !c.is_ascii_digit());
    if starts_ok {
        Ok(())
    } else {
        Err(InvalidNamespaceConfig {
            field,
            value: value.to_owned(),
        })
    }
}

/// Resolves the namespace symbol for a generation run.
///
/// The default base name is the Pascal-cased grammar name prefixed with the
/// tool identifier: `resolve_namespace(&default, "graphql")` is
/// `"TreantGraphql"`. An explicit `name` overrides the base; a suppressed
/// prefix emits the base alone, ignoring the concat mode.
///
/// # Errors
///
/// Returns [`InvalidNamespaceConfig`] naming the field whose value starts
/// with a digit or is empty.
pub fn resolve_namespace(
    config: &NamespaceConfig,
    grammar_name: &str,
) -> Result<String, InvalidNamespaceConfig> {
    if let Some(name) = &config.name {
        check_identifier("name", name)?;
    }
    if let Some(Some(prefix)) = &config.prefix {
        check_identifier("prefix", prefix)?;
    }

    let base = config
        .name
        .clone()
        .unwrap_or_else(|| pascal_case(grammar_name));

    let prefix = match &config.prefix {
        None => Some(TOOL_PREFIX.to_owned()),
        Some(None) => None,
        Some(Some(p)) => Some(p.clone()),
    };

    let Some(prefix) = prefix else {
        return Ok(base);
    };

    Ok(match config.concat_mode {
        ConcatMode::Pascal => format!("{prefix}{base}"),
        ConcatMode::Kebab => format!("{}-{}", kebab_case(&prefix), kebab_case(&base)),
        ConcatMode::Snake => format!("{}_{}", snake_case(&prefix), snake_case(&base)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_anonymous() {
        assert_eq!(classify_anonymous("("), TokenCategory::Punctuation);
        assert_eq!(classify_anonymous(";"), TokenCategory::Punctuation);
        assert_eq!(classify_anonymous("=="), TokenCategory::Operator);
        assert_eq!(classify_anonymous("=>"), TokenCategory::Operator);
        assert_eq!(classify_anonymous("if"), TokenCategory::Keyword);
        assert_eq!(classify_anonymous("return"), TokenCategory::Keyword);
        assert_eq!(classify_anonymous("_"), TokenCategory::Keyword);
        // mixed word/symbol literals count by their symbol content
        assert_eq!(classify_anonymous("#if"), TokenCategory::Operator);
    }

    #[test]
    fn test_casing() {
        assert_eq!(pascal_case("source_file"), "SourceFile");
        assert_eq!(pascal_case("graphql"), "Graphql");
        assert_eq!(snake_case("MyTool"), "my_tool");
        assert_eq!(kebab_case("MyTool"), "my-tool");
        assert_eq!(kebab_case("Graphql"), "graphql");
    }

    #[test]
    fn test_token_type_name() {
        assert_eq!(token_type_name("if"), "IfKeyword");
        assert_eq!(token_type_name("("), "LParen");
        assert_eq!(token_type_name("=="), "EqEq");
        assert_eq!(token_type_name("=>"), "EqGt");
        assert_eq!(token_type_name("§"), "U00A7");
    }

    #[test]
    fn test_resolve_namespace_defaults() {
        let ns = resolve_namespace(&NamespaceConfig::default(), "graphql").unwrap();
        assert_eq!(ns, "TreantGraphql");
    }

    #[test]
    fn test_resolve_namespace_custom_prefix() {
        let config = NamespaceConfig {
            prefix: Some(Some("My".to_owned())),
            ..NamespaceConfig::default()
        };
        assert_eq!(resolve_namespace(&config, "graphql").unwrap(), "MyGraphql");
    }

    #[test]
    fn test_resolve_namespace_suppressed_prefix() {
        let config = NamespaceConfig {
            prefix: Some(None),
            ..NamespaceConfig::default()
        };
        assert_eq!(resolve_namespace(&config, "graphql").unwrap(), "Graphql");
    }

    #[test]
    fn test_resolve_namespace_kebab() {
        let config = NamespaceConfig {
            prefix: Some(Some("My".to_owned())),
            concat_mode: ConcatMode::Kebab,
            ..NamespaceConfig::default()
        };
        assert_eq!(resolve_namespace(&config, "graphql").unwrap(), "my-graphql");
    }

    #[test]
    fn test_resolve_namespace_snake() {
        let config = NamespaceConfig {
            prefix: Some(Some("My".to_owned())),
            concat_mode: ConcatMode::Snake,
            ..NamespaceConfig::default()
        };
        assert_eq!(resolve_namespace(&config, "graphql").unwrap(), "my_graphql");
    }

    #[test]
    fn test_concat_mode_ignored_without_prefix() {
        let config = NamespaceConfig {
            prefix: Some(None),
            concat_mode: ConcatMode::Kebab,
            ..NamespaceConfig::default()
        };
        assert_eq!(resolve_namespace(&config, "graphql").unwrap(), "Graphql");
    }

    #[test]
    fn test_invalid_prefix_is_rejected() {
        let config = NamespaceConfig {
            prefix: Some(Some("1bad".to_owned())),
            ..NamespaceConfig::default()
        };
        let err = resolve_namespace(&config, "graphql").unwrap_err();
        assert_eq!(err.field, "prefix");
    }

    #[test]
    fn test_invalid_name_is_rejected() {
        let config = NamespaceConfig {
            name: Some(String::new()),
            ..NamespaceConfig::default()
        };
        let err = resolve_namespace(&config, "graphql").unwrap_err();
        assert_eq!(err.field, "name");
    }
}
