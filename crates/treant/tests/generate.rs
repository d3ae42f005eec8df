//! End-to-end generation tests over a small but complete grammar.

use treant::naming::NamespaceConfig;
use treant::{generate, GenerateError, GenerateRequest};

const GRAMMAR: &str = r#"{
    "name": "demo",
    "rules": {
        "source_file": {
            "type": "SYMBOL",
            "name": "expression"
        },
        "expression": {
            "type": "STRING",
            "value": "hello"
        }
    }
}"#;

const NODE_TYPES: &str = r#"[
    {
        "type": "source_file",
        "named": true,
        "children": {
            "multiple": false,
            "required": true,
            "types": [{"type": "expression", "named": true}]
        }
    },
    {
        "type": "expression",
        "named": true
    },
    {"type": "hello", "named": false}
]"#;

fn request() -> GenerateRequest<'static> {
    GenerateRequest {
        grammar_json: GRAMMAR,
        node_types_json: NODE_TYPES,
        namespace: NamespaceConfig::default(),
    }
}

#[test]
fn generates_interface_guard_pairs_for_each_named_type() {
    let artifacts = generate(&request()).unwrap();

    let source_file = artifacts
        .iter()
        .find(|a| a.path == "nodes/SourceFile.ts")
        .expect("source_file module");
    assert!(source_file.content.contains("export interface SourceFileNode"));
    assert!(source_file.content.contains("export function isSourceFileNode"));

    let expression = artifacts
        .iter()
        .find(|a| a.path == "nodes/Expression.ts")
        .expect("expression module");
    assert!(expression.content.contains("export interface ExpressionNode"));
    assert!(expression.content.contains("export function isExpressionNode"));
}

#[test]
fn names_the_resolved_namespace_in_the_root_module() {
    let artifacts = generate(&request()).unwrap();
    let index = artifacts.iter().find(|a| a.path == "index.ts").unwrap();
    assert!(index
        .content
        .contains("export const NAMESPACE = \"TreantDemo\" as const;"));
}

#[test]
fn provenance_copies_are_verbatim() {
    let artifacts = generate(&request()).unwrap();
    let grammar = artifacts
        .iter()
        .find(|a| a.path == "provenance/grammar.json")
        .unwrap();
    assert_eq!(grammar.content, GRAMMAR);
    let node_types = artifacts
        .iter()
        .find(|a| a.path == "provenance/node-types.json")
        .unwrap();
    assert_eq!(node_types.content, NODE_TYPES);
}

#[test]
fn generation_is_deterministic() {
    let first = generate(&request()).unwrap();
    let second = generate(&request()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn dangling_child_type_fails_with_missing_node_type() {
    let node_types = r#"[
        {
            "type": "source_file",
            "named": true,
            "children": {
                "multiple": false,
                "required": true,
                "types": [{"type": "phantom", "named": true}]
            }
        }
    ]"#;
    let request = GenerateRequest {
        grammar_json: GRAMMAR,
        node_types_json: node_types,
        namespace: NamespaceConfig::default(),
    };

    match generate(&request).unwrap_err() {
        GenerateError::MissingNodeType(err) => {
            assert_eq!(err.refs.len(), 1);
            assert_eq!(err.refs[0].missing, "phantom");
            assert_eq!(err.refs[0].referenced_by, "source_file");
        }
        other => panic!("expected MissingNodeType, got {other}"),
    }
}

#[test]
fn failure_returns_no_artifacts() {
    let request = GenerateRequest {
        grammar_json: GRAMMAR,
        node_types_json: "not json",
        namespace: NamespaceConfig::default(),
    };
    assert!(generate(&request).is_err());
}
