//! The SDK emitter: turns the analysed grammar into generated TypeScript
//! artifacts.
//!
//! Emission is a pure function of the catalogue, the navigation graph, and
//! the resolved namespace. Every iteration is over sorted names and every
//! artifact path comes from the naming module's casing rules, so identical
//! inputs always produce a byte-identical artifact list.

use crate::nav::{Direction, NavigationGraph, Reachable};
use crate::naming::{classify_anonymous, pascal_case, token_type_name, TokenCategory};
use crate::node_types::{Catalogue, NodeTypeInfo};
use std::collections::BTreeMap;
use std::fmt::Write;

/// One generated output file: a path relative to the SDK root and its full
/// text content. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Output path relative to the SDK root, `/`-separated.
    pub path: String,
    /// Full file content.
    pub content: String,
}

const BANNER: &str = "// Generated by treant. Do not edit.\n";

/// One artifact path claimed by more than one node type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathCollision {
    /// The contested output path.
    pub path: String,
    /// The node type names whose cased module name maps to it, sorted.
    pub types: Vec<String>,
}

/// Raised when distinct node type names case-fold to the same per-node
/// module path (for example `foo_bar` and `fooBar`). Emitting both would
/// silently drop one, so the set is refused with every collision listed.
#[derive(Debug, Clone)]
pub struct DuplicateArtifactPath {
    /// Every contested path, sorted.
    pub collisions: Vec<PathCollision>,
}

impl std::fmt::Display for DuplicateArtifactPath {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "duplicate artifact paths:")?;
        for c in &self.collisions {
            write!(f, " '{}' (from {})", c.path, c.types.join(", "))?;
        }
        Ok(())
    }
}

impl std::error::Error for DuplicateArtifactPath {}

/// Walks the analysis outputs and produces the closed artifact set.
pub struct Emitter<'a> {
    catalogue: &'a Catalogue<'a>,
    graph: &'a NavigationGraph,
    namespace: &'a str,
    grammar_json: &'a str,
    node_types_json: &'a str,
}

impl<'a> Emitter<'a> {
    /// Bundles the emitter inputs. `grammar_json` and `node_types_json` are
    /// the verbatim input documents, embedded unchanged as provenance.
    #[must_use]
    pub fn new(
        catalogue: &'a Catalogue<'a>,
        graph: &'a NavigationGraph,
        namespace: &'a str,
        grammar_json: &'a str,
        node_types_json: &'a str,
    ) -> Self {
        Self {
            catalogue,
            graph,
            namespace,
            grammar_json,
            node_types_json,
        }
    }

    /// Produces the full artifact list, in its fixed documented order:
    /// root module, anonymous module, cursor module, navigator module,
    /// per-named-node modules (sorted), provenance copies.
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateArtifactPath`] when two named node types map to
    /// the same per-node module path, listing every collision.
    pub fn emit(&self) -> Result<Vec<Artifact>, DuplicateArtifactPath> {
        let mut by_path: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for info in self.named_nodes() {
            by_path
                .entry(format!("nodes/{}.ts", pascal_case(&info.kind)))
                .or_default()
                .push(info.kind.clone());
        }
        let collisions: Vec<PathCollision> = by_path
            .into_iter()
            .filter(|(_, types)| types.len() > 1)
            .map(|(path, types)| PathCollision { path, types })
            .collect();
        if !collisions.is_empty() {
            return Err(DuplicateArtifactPath { collisions });
        }

        let mut artifacts = vec![
            Artifact {
                path: "index.ts".to_owned(),
                content: self.emit_index(),
            },
            Artifact {
                path: "anonymous.ts".to_owned(),
                content: self.emit_anonymous(),
            },
            Artifact {
                path: "cursor.ts".to_owned(),
                content: self.emit_cursor(),
            },
            Artifact {
                path: "navigator.ts".to_owned(),
                content: self.emit_navigator(),
            },
        ];
        for info in self.named_nodes() {
            artifacts.push(Artifact {
                path: format!("nodes/{}.ts", pascal_case(&info.kind)),
                content: self.emit_node(info),
            });
        }
        artifacts.push(Artifact {
            path: "provenance/grammar.json".to_owned(),
            content: self.grammar_json.to_owned(),
        });
        artifacts.push(Artifact {
            path: "provenance/node-types.json".to_owned(),
            content: self.node_types_json.to_owned(),
        });
        Ok(artifacts)
    }

    fn named_nodes(&self) -> Vec<&'a NodeTypeInfo> {
        self.catalogue.concrete().filter(|e| e.named).collect()
    }

    fn anonymous_nodes(&self) -> Vec<&'a NodeTypeInfo> {
        self.catalogue.concrete().filter(|e| !e.named).collect()
    }

    fn emit_index(&self) -> String {
        let mut out = String::from(BANNER);
        out.push('\n');
        let _ = writeln!(
            out,
            "/** Resolved namespace identifier for this generated SDK. */"
        );
        let _ = writeln!(
            out,
            "export const NAMESPACE = {} as const;\n",
            ts_string(self.namespace)
        );
        out.push_str("export * from \"./anonymous\";\n");
        out.push_str("export * from \"./cursor\";\n");
        out.push_str("export * from \"./navigator\";\n");
        for info in self.named_nodes() {
            let _ = writeln!(out, "export * from \"./nodes/{}\";", pascal_case(&info.kind));
        }
        out
    }

    fn emit_anonymous(&self) -> String {
        let anonymous = self.anonymous_nodes();
        let mut out = String::from(BANNER);
        out.push('\n');
        out.push_str("import type { SyntaxNode } from \"./cursor\";\n\n");

        for category in [
            TokenCategory::Keyword,
            TokenCategory::Operator,
            TokenCategory::Punctuation,
        ] {
            let members: Vec<&str> = anonymous
                .iter()
                .filter(|e| classify_anonymous(&e.kind) == category)
                .map(|e| e.kind.as_str())
                .collect();
            let _ = writeln!(out, "/** Anonymous {} literals. */", category.union_name());
            if members.is_empty() {
                let _ = writeln!(out, "export type {} = never;\n", category.union_name());
            } else {
                let union = members
                    .iter()
                    .map(|m| ts_string(m))
                    .collect::<Vec<_>>()
                    .join(" | ");
                let _ = writeln!(out, "export type {} = {union};\n", category.union_name());
            }
        }

        out.push_str("/** Every anonymous node type in this grammar. */\n");
        out.push_str("export type AnonymousName = Keyword | Operator | Punctuation;\n\n");

        out.push_str("/** An unnamed token node with literal type `T`. */\n");
        out.push_str(
            "export interface AnonymousNode<T extends AnonymousName = AnonymousName>\n  \
             extends SyntaxNode {\n  readonly type: T;\n  readonly isNamed: false;\n}\n",
        );

        for info in &anonymous {
            let literal = ts_string(&info.kind);
            let ident = token_type_name(&info.kind);
            let _ = writeln!(out, "\n/** Typed view of the {literal} token. */");
            let _ = writeln!(out, "export type {ident}Node = AnonymousNode<{literal}>;");
            let _ = writeln!(out, "\n/** Returns true when `node` is a {literal} token. */");
            let _ = writeln!(
                out,
                "export function is{ident}Node(node: SyntaxNode): node is {ident}Node {{\n  \
                 return node.type === {literal} && !node.isNamed;\n}}"
            );
        }
        out
    }

    fn emit_cursor(&self) -> String {
        let mut out = String::from(BANNER);
        out.push('\n');
        out.push_str("/** Minimal capability a runtime syntax node must provide. */\n");
        out.push_str(
            "export interface SyntaxNode {\n  \
             readonly type: string;\n  \
             readonly isNamed: boolean;\n  \
             readonly firstChild: SyntaxNode | null;\n  \
             readonly nextSibling: SyntaxNode | null;\n  \
             readonly previousSibling: SyntaxNode | null;\n  \
             readonly parent: SyntaxNode | null;\n  \
             childForFieldName(name: string): SyntaxNode | null;\n}\n\n",
        );

        out.push_str("/** Every concrete node type this grammar can produce. */\n");
        let mut names = self.graph.node_names().peekable();
        if names.peek().is_none() {
            out.push_str("export type NodeName = never;\n\n");
        } else {
            out.push_str("export type NodeName =");
            for name in names {
                let _ = write!(out, "\n  | {}", ts_string(name));
            }
            out.push_str(";\n\n");
        }

        for info in self.catalogue.supertypes() {
            let mut missing = Vec::new();
            let members = self
                .catalogue
                .expand_refs(&info.subtypes, &info.kind, &mut missing);
            let union = members
                .iter()
                .map(|m| ts_string(m))
                .collect::<Vec<_>>()
                .join(" | ");
            let _ = writeln!(
                out,
                "/** Concrete member types of the `{}` supertype. */",
                info.kind
            );
            let _ = writeln!(
                out,
                "export type {}Name = {union};\n",
                pascal_case(&info.kind)
            );
        }

        out.push_str(
            "/** Navigation transition table: node type and direction to the\n \
             * set of reachable node types (`null` marks \"no node\"). */\n",
        );
        out.push_str("export const transitions = {\n");
        for name in self.graph.node_names() {
            let _ = writeln!(out, "  {}: {{", ts_string(name));
            for direction in Direction::ALL {
                // Rows exist for every table key, so the lookup cannot miss.
                let Some(reachable) = self.graph.reachable(name, direction) else {
                    continue;
                };
                let _ = writeln!(
                    out,
                    "    {}: [{}],",
                    direction.accessor(),
                    transition_list(reachable)
                );
            }
            out.push_str("  },\n");
        }
        out.push_str("} as const;\n\n");

        out.push_str("/** Node names reachable from `T` by navigation step `D`. */\n");
        out.push_str(
            "export type Reachable<\n  \
             T extends keyof typeof transitions,\n  \
             D extends keyof (typeof transitions)[T],\n\
             > = (typeof transitions)[T][D][number];\n",
        );
        out
    }

    fn emit_navigator(&self) -> String {
        let mut out = String::from(BANNER);
        out.push('\n');
        out.push_str("import type { SyntaxNode } from \"./cursor\";\n\n");

        out.push_str("/** Raised when an expected child is missing or mistyped. */\n");
        out.push_str(
            "export class NavigationExpectationError extends Error {\n  \
             constructor(\n    \
             readonly expected: string,\n    \
             readonly actual: string | null,\n    \
             readonly path: readonly string[],\n  \
             ) {\n    \
             super(\n      \
             `expected ${expected} at ${path.join(\".\")}, found ${actual ?? \"nothing\"}`,\n    \
             );\n    \
             this.name = \"NavigationExpectationError\";\n  \
             }\n}\n\n",
        );

        out.push_str("/** Allowed child types per `\"<node type>.<field>\"` key. */\n");
        out.push_str("export const fieldTypes = {\n");
        for info in self.named_nodes() {
            let mut field_names: Vec<&String> = info.fields.keys().collect();
            field_names.sort();
            for field in field_names {
                let mut missing = Vec::new();
                let types =
                    self.catalogue
                        .expand_refs(&info.fields[field].types, &info.kind, &mut missing);
                let list = types
                    .iter()
                    .map(|t| ts_string(t))
                    .collect::<Vec<_>>()
                    .join(", ");
                let _ = writeln!(
                    out,
                    "  {}: [{list}],",
                    ts_string(&format!("{}.{field}", info.kind))
                );
            }
        }
        out.push_str("} as const;\n\n");

        out.push_str("/** Typed field navigation over a syntax node, with path tracking. */\n");
        out.push_str(
            "export class Navigator {\n  \
             constructor(\n    \
             readonly node: SyntaxNode,\n    \
             readonly path: readonly string[] = [],\n  \
             ) {}\n\n  \
             /** Returns the child for `name` or throws NavigationExpectationError. */\n  \
             field(name: string): Navigator {\n    \
             const key = `${this.node.type}.${name}`;\n    \
             const expected =\n      \
             (fieldTypes as Record<string, readonly string[] | undefined>)[key] ?? [];\n    \
             const child = this.node.childForFieldName(name);\n    \
             const next = [...this.path, key];\n    \
             if (child === null) {\n      \
             throw new NavigationExpectationError(expected.join(\" | \"), null, next);\n    \
             }\n    \
             if (expected.length > 0 && !expected.includes(child.type)) {\n      \
             throw new NavigationExpectationError(\n        \
             expected.join(\" | \"),\n        \
             child.type,\n        \
             next,\n      \
             );\n    \
             }\n    \
             return new Navigator(child, next);\n  \
             }\n}\n",
        );
        out
    }

    fn emit_node(&self, info: &NodeTypeInfo) -> String {
        let ident = pascal_case(&info.kind);
        let literal = ts_string(&info.kind);
        let mut out = String::from(BANNER);
        out.push('\n');
        out.push_str("import type { SyntaxNode } from \"../cursor\";\n\n");
        let _ = writeln!(out, "/** Typed view of a {literal} syntax node. */");
        let _ = writeln!(
            out,
            "export interface {ident}Node extends SyntaxNode {{\n  \
             readonly type: {literal};\n  \
             readonly isNamed: true;\n}}"
        );
        let _ = writeln!(out, "\n/** Returns true when `node` is a {literal} node. */");
        let _ = writeln!(
            out,
            "export function is{ident}Node(node: SyntaxNode): node is {ident}Node {{\n  \
             return node.type === {literal};\n}}"
        );
        out
    }
}

/// Renders a reachable set as a transition tuple: sorted name literals, with
/// a trailing `null` when the step can land nowhere, or `null` alone for an
/// empty set.
fn transition_list(reachable: &Reachable) -> String {
    let mut parts: Vec<String> = reachable.types.iter().map(|t| ts_string(t)).collect();
    if reachable.none || parts.is_empty() {
        parts.push("null".to_owned());
    }
    parts.join(", ")
}

/// Escapes a string as a double-quoted TypeScript literal.
fn ts_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nav::NavigationGraph;
    use crate::node_types::parse_node_types;

    const NODE_TYPES: &str = r#"[
        {
            "type": "source_file",
            "named": true,
            "children": {
                "multiple": true,
                "required": false,
                "types": [{"type": "expression", "named": true}]
            }
        },
        {
            "type": "expression",
            "named": true,
            "fields": {
                "operand": {
                    "multiple": false,
                    "required": true,
                    "types": [{"type": "expression", "named": true}]
                }
            }
        },
        {"type": "if", "named": false},
        {"type": "==", "named": false},
        {"type": "(", "named": false}
    ]"#;

    const GRAMMAR: &str = r#"{"name": "demo", "rules": {}}"#;

    fn artifacts_for(node_types: &str) -> Result<Vec<Artifact>, DuplicateArtifactPath> {
        let entries = parse_node_types(node_types).unwrap();
        let catalogue = Catalogue::new(&entries);
        let graph = NavigationGraph::build(&catalogue).unwrap();
        Emitter::new(&catalogue, &graph, "TreantDemo", GRAMMAR, node_types).emit()
    }

    fn artifacts() -> Vec<Artifact> {
        artifacts_for(NODE_TYPES).unwrap()
    }

    fn find<'a>(artifacts: &'a [Artifact], path: &str) -> &'a Artifact {
        artifacts
            .iter()
            .find(|a| a.path == path)
            .unwrap_or_else(|| panic!("no artifact at {path}"))
    }

    #[test]
    fn test_artifact_order_is_fixed() {
        let paths: Vec<String> = artifacts().into_iter().map(|a| a.path).collect();
        assert_eq!(
            paths,
            [
                "index.ts",
                "anonymous.ts",
                "cursor.ts",
                "navigator.ts",
                "nodes/Expression.ts",
                "nodes/SourceFile.ts",
                "provenance/grammar.json",
                "provenance/node-types.json",
            ]
        );
    }

    #[test]
    fn test_index_names_namespace() {
        let artifacts = artifacts();
        let index = find(&artifacts, "index.ts");
        assert!(index
            .content
            .contains("export const NAMESPACE = \"TreantDemo\" as const;"));
        assert!(index.content.contains("export * from \"./nodes/SourceFile\";"));
    }

    #[test]
    fn test_node_interface_and_guard() {
        let artifacts = artifacts();
        let node = find(&artifacts, "nodes/SourceFile.ts");
        assert!(node
            .content
            .contains("export interface SourceFileNode extends SyntaxNode {"));
        assert!(node.content.contains("readonly type: \"source_file\";"));
        assert!(node
            .content
            .contains("export function isSourceFileNode(node: SyntaxNode): node is SourceFileNode {"));
    }

    #[test]
    fn test_anonymous_classification_module() {
        let artifacts = artifacts();
        let anon = find(&artifacts, "anonymous.ts");
        assert!(anon.content.contains("export type Keyword = \"if\";"));
        assert!(anon.content.contains("export type Operator = \"==\";"));
        assert!(anon.content.contains("export type Punctuation = \"(\";"));
        assert!(anon.content.contains("export type EqEqNode = AnonymousNode<\"==\">;"));
        assert!(anon
            .content
            .contains("return node.type === \"(\" && !node.isNamed;"));
    }

    #[test]
    fn test_cursor_transitions() {
        let artifacts = artifacts();
        let cursor = find(&artifacts, "cursor.ts");
        assert!(cursor.content.contains("export const transitions = {"));
        // expression's operand field is required, so firstChild cannot be null
        assert!(cursor.content.contains("firstChild: [\"expression\"],"));
        // source_file is uncontained: parent is null alone
        assert!(cursor.content.contains("parent: [null],"));
    }

    #[test]
    fn test_navigator_field_table() {
        let artifacts = artifacts();
        let nav = find(&artifacts, "navigator.ts");
        assert!(nav
            .content
            .contains("\"expression.operand\": [\"expression\"],"));
        assert!(nav.content.contains("class NavigationExpectationError"));
    }

    #[test]
    fn test_provenance_round_trips() {
        let artifacts = artifacts();
        assert_eq!(find(&artifacts, "provenance/grammar.json").content, GRAMMAR);
        assert_eq!(
            find(&artifacts, "provenance/node-types.json").content,
            NODE_TYPES
        );
    }

    #[test]
    fn test_emission_is_deterministic() {
        assert_eq!(artifacts(), artifacts());
    }

    #[test]
    fn test_empty_catalogue_emits_never_node_name() {
        let artifacts = artifacts_for("[]").unwrap();
        let cursor = find(&artifacts, "cursor.ts");
        assert!(cursor.content.contains("export type NodeName = never;"));
        assert!(!cursor.content.contains("export type NodeName =;"));
    }

    #[test]
    fn test_colliding_module_paths_are_refused() {
        let err = artifacts_for(
            r#"[
                {"type": "foo_bar", "named": true},
                {"type": "fooBar", "named": true}
            ]"#,
        )
        .unwrap_err();
        assert_eq!(err.collisions.len(), 1);
        assert_eq!(err.collisions[0].path, "nodes/FooBar.ts");
        assert_eq!(err.collisions[0].types, ["fooBar", "foo_bar"]);
        assert!(err.to_string().contains("nodes/FooBar.ts"));
    }

    #[test]
    fn test_ts_string_escaping() {
        assert_eq!(ts_string("\""), "\"\\\"\"");
        assert_eq!(ts_string("\\"), "\"\\\\\"");
        assert_eq!(ts_string("a\nb"), "\"a\\nb\"");
    }
}
