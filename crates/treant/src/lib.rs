//! A typed SDK generator for tree-sitter grammars.
#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(clippy::multiple_crate_versions)]

/// Core structures and parsing logic for Tree-sitter grammars.
///
/// This module defines how treant understands the declarative shape of a
/// language: the grammar rule tree and its classification into rule kinds.
/// Everything else in the generator builds upon these types.
pub mod grammar;

/// The node-type catalogue: the flat list of concrete syntax node shapes a
/// parser for the grammar can produce, and the name-indexed view the
/// analysis passes resolve references through.
pub mod node_types;

/// The navigation graph: the precomputed mapping from (node type, navigation
/// direction) to the set of reachable node types.
pub mod nav;

/// Naming and classification: casing conventions, anonymous-node
/// categorisation, and namespace resolution for the emitted SDK.
pub mod naming;

/// The SDK emitter, producing the generated artifact set as in-memory text
/// buffers for an external file writer to persist.
pub mod emit;

/// The generation entry point tying parsing, analysis, and emission into one
/// pure, all-or-nothing call.
pub mod generate;

/// Grammar validation and consistency checking utilities.
///
/// Validation exists to protect downstream stages (analysis and emission)
/// from malformed grammars. It enforces Tree-sitter's invariants and ensures
/// that what's parsed is also semantically meaningful.
pub mod validate;

pub use emit::{Artifact, DuplicateArtifactPath};
pub use generate::{generate, GenerateError, GenerateRequest};
pub use grammar::{parse_grammar, Grammar, GrammarError, Rule, RuleKind};
pub use naming::{ConcatMode, NamespaceConfig};
pub use node_types::{parse_node_types, Catalogue, NodeTypeInfo};
pub use validate::{validate, ValidationError};
