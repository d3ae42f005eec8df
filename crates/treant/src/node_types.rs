//! The node-type catalogue: Tree-sitter's `node-types.json` document.
//!
//! Where the grammar rule tree describes how text is *produced*, the
//! catalogue describes the flat set of concrete syntax node shapes a parser
//! can emit: named and anonymous node descriptors, their allowed children,
//! and supertype groupings. It is the sole input of the navigation graph.

use serde::Deserialize;
use std::collections::BTreeSet;
use std::collections::HashMap;

/// One entry of `node-types.json`: the shape of a single syntax node type.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeTypeInfo {
    /// The node type name: a rule name for named nodes, the literal text for
    /// anonymous ones.
    #[serde(rename = "type")]
    pub kind: String,

    /// Whether nodes of this type are named (correspond to a grammar rule).
    pub named: bool,

    /// Allowed children keyed by field name.
    #[serde(default)]
    pub fields: HashMap<String, ChildSpec>,

    /// Allowed children that are not captured by any field.
    #[serde(default)]
    pub children: Option<ChildSpec>,

    /// Concrete member types, present only on supertype descriptors.
    #[serde(default)]
    pub subtypes: Vec<TypeRef>,

    /// Whether this is the grammar's root node type (newer Tree-sitter only).
    #[serde(default)]
    pub root: Option<bool>,

    /// Whether this node is an extra (trivia) node (newer Tree-sitter only).
    #[serde(default)]
    pub extra: Option<bool>,
}

/// Cardinality and allowed types for one child slot (a field or the
/// unnamed child list).
#[derive(Debug, Clone, Deserialize)]
pub struct ChildSpec {
    /// Whether more than one child may occupy this slot.
    pub multiple: bool,

    /// Whether at least one child always occupies this slot.
    pub required: bool,

    /// The node types allowed in this slot.
    pub types: Vec<TypeRef>,
}

/// A reference to a node type by name.
#[derive(Debug, Clone, Deserialize)]
pub struct TypeRef {
    /// The referenced node type name.
    #[serde(rename = "type")]
    pub kind: String,

    /// Whether the referenced node type is named.
    pub named: bool,
}

/// Possible errors raised while reading the node-type catalogue.
#[derive(Debug)]
pub enum NodeTypesError {
    /// The input JSON was syntactically invalid or structurally mismatched.
    JsonParse(String),
}

impl std::fmt::Display for NodeTypesError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            NodeTypesError::JsonParse(e) => write!(f, "JSON parse error: {e}"),
        }
    }
}

impl std::error::Error for NodeTypesError {}

/// Parse a `node-types.json` document into descriptor entries.
///
/// # Errors
///
/// Returns [`NodeTypesError::JsonParse`] if the provided string is not valid
/// JSON or fails schema deserialization.
pub fn parse_node_types(json: &str) -> Result<Vec<NodeTypeInfo>, NodeTypesError> {
    serde_json::from_str(json).map_err(|e| NodeTypesError::JsonParse(e.to_string()))
}

impl NodeTypeInfo {
    /// Returns `true` if this descriptor stands for a union of subtypes.
    ///
    /// Supertypes are never instantiated; everywhere another descriptor
    /// references one, it denotes the union of its concrete members.
    #[must_use]
    pub fn is_supertype(&self) -> bool {
        !self.subtypes.is_empty()
    }

    /// Iterates over every child slot of this descriptor: all fields in
    /// sorted field-name order, then the unnamed child list.
    pub fn child_specs(&self) -> impl Iterator<Item = &ChildSpec> {
        let mut names: Vec<&String> = self.fields.keys().collect();
        names.sort();
        names
            .into_iter()
            .map(|n| &self.fields[n])
            .chain(self.children.iter())
            .collect::<Vec<_>>()
            .into_iter()
    }
}

/// A name-indexed view over the flat descriptor list.
///
/// Rule-tree cross-references and child-type references are plain strings;
/// the catalogue resolves them without any cyclic ownership, and expands
/// supertype references into their concrete member sets.
pub struct Catalogue<'a> {
    entries: &'a [NodeTypeInfo],
    by_name: HashMap<&'a str, &'a NodeTypeInfo>,
}

impl<'a> Catalogue<'a> {
    /// Builds the index over a parsed descriptor list.
    #[must_use]
    pub fn new(entries: &'a [NodeTypeInfo]) -> Self {
        let by_name = entries.iter().map(|e| (e.kind.as_str(), e)).collect();
        Self { entries, by_name }
    }

    /// Looks up a descriptor by type name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&'a NodeTypeInfo> {
        self.by_name.get(name).copied()
    }

    /// Returns `true` if the named type exists and is a supertype.
    #[must_use]
    pub fn is_supertype(&self, name: &str) -> bool {
        self.get(name).is_some_and(NodeTypeInfo::is_supertype)
    }

    /// Iterates over concrete (non-supertype) descriptors in sorted name
    /// order. Sorted iteration is what makes downstream emission
    /// deterministic regardless of document order.
    pub fn concrete(&self) -> impl Iterator<Item = &'a NodeTypeInfo> + '_ {
        let mut out: Vec<&NodeTypeInfo> = self
            .entries
            .iter()
            .filter(|e| !e.is_supertype())
            .collect();
        out.sort_by(|a, b| a.kind.cmp(&b.kind));
        out.into_iter()
    }

    /// Iterates over supertype descriptors in sorted name order.
    pub fn supertypes(&self) -> impl Iterator<Item = &'a NodeTypeInfo> + '_ {
        let mut out: Vec<&NodeTypeInfo> = self.entries.iter().filter(|e| e.is_supertype()).collect();
        out.sort_by(|a, b| a.kind.cmp(&b.kind));
        out.into_iter()
    }

    /// Resolves a list of type references to the set of concrete type names
    /// it denotes, expanding supertypes recursively.
    ///
    /// References to types absent from the catalogue are pushed onto
    /// `missing` (paired with `referenced_by`) instead of aborting, so the
    /// caller can aggregate every dangling reference in one pass.
    pub fn expand_refs(
        &self,
        refs: &[TypeRef],
        referenced_by: &str,
        missing: &mut Vec<(String, String)>,
    ) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        let mut visited = BTreeSet::new();
        self.expand_into(refs, referenced_by, missing, &mut visited, &mut out);
        out
    }

    fn expand_into(
        &self,
        refs: &[TypeRef],
        referenced_by: &str,
        missing: &mut Vec<(String, String)>,
        visited: &mut BTreeSet<String>,
        out: &mut BTreeSet<String>,
    ) {
        for r in refs {
            match self.get(&r.kind) {
                None => missing.push((r.kind.clone(), referenced_by.to_owned())),
                Some(info) if info.is_supertype() => {
                    // Guard against supertype cycles in malformed catalogues.
                    if visited.insert(info.kind.clone()) {
                        self.expand_into(&info.subtypes, &info.kind, missing, visited, out);
                    }
                }
                Some(info) => {
                    out.insert(info.kind.clone());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOGUE: &str = r#"[
        {
            "type": "source_file",
            "named": true,
            "fields": {},
            "children": {
                "multiple": false,
                "required": true,
                "types": [{"type": "_expression", "named": true}]
            }
        },
        {
            "type": "_expression",
            "named": true,
            "subtypes": [
                {"type": "identifier", "named": true},
                {"type": "number", "named": true}
            ]
        },
        {"type": "identifier", "named": true},
        {"type": "number", "named": true},
        {"type": "+", "named": false}
    ]"#;

    #[test]
    fn test_parse_and_index() {
        let entries = parse_node_types(CATALOGUE).unwrap();
        assert_eq!(entries.len(), 5);
        let cat = Catalogue::new(&entries);
        assert!(cat.is_supertype("_expression"));
        assert!(!cat.is_supertype("identifier"));
        assert!(cat.get("missing").is_none());
        assert_eq!(cat.concrete().count(), 4);
        assert_eq!(cat.supertypes().count(), 1);
    }

    #[test]
    fn test_supertype_expansion() {
        let entries = parse_node_types(CATALOGUE).unwrap();
        let cat = Catalogue::new(&entries);
        let root = cat.get("source_file").unwrap();
        let spec = root.children.as_ref().unwrap();

        let mut missing = Vec::new();
        let expanded = cat.expand_refs(&spec.types, "source_file", &mut missing);
        assert!(missing.is_empty());
        let names: Vec<&str> = expanded.iter().map(String::as_str).collect();
        assert_eq!(names, ["identifier", "number"]);
    }

    #[test]
    fn test_dangling_reference_is_collected() {
        let entries = parse_node_types(
            r#"[
                {
                    "type": "source_file",
                    "named": true,
                    "children": {
                        "multiple": false,
                        "required": true,
                        "types": [{"type": "ghost", "named": true}]
                    }
                }
            ]"#,
        )
        .unwrap();
        let cat = Catalogue::new(&entries);
        let spec = entries[0].children.as_ref().unwrap();

        let mut missing = Vec::new();
        let expanded = cat.expand_refs(&spec.types, "source_file", &mut missing);
        assert!(expanded.is_empty());
        assert_eq!(missing, [("ghost".to_owned(), "source_file".to_owned())]);
    }
}
