//! The generation entry point: one pure call from input documents to a
//! complete artifact set.
//!
//! A generation run either completes with every artifact or fails with one
//! error and no artifacts; a partially-consistent SDK is worse than a
//! refused generation, so nothing is silently recovered. Two runs share no
//! state and may proceed concurrently.

use crate::emit::{Artifact, DuplicateArtifactPath, Emitter};
use crate::grammar::{parse_grammar, GrammarError};
use crate::nav::{MissingNodeType, NavigationGraph};
use crate::naming::{resolve_namespace, InvalidNamespaceConfig, NamespaceConfig};
use crate::node_types::{parse_node_types, Catalogue, NodeTypesError};

/// Everything one generation run consumes.
///
/// The two documents are kept as raw text because their bytes round-trip
/// unchanged into the provenance artifacts.
#[derive(Debug, Clone)]
pub struct GenerateRequest<'a> {
    /// The grammar rule tree (`grammar.json`), verbatim.
    pub grammar_json: &'a str,
    /// The node-type catalogue (`node-types.json`), verbatim.
    pub node_types_json: &'a str,
    /// Namespace configuration for the emitted SDK.
    pub namespace: NamespaceConfig,
}

/// Any failure a generation run can end with.
#[derive(Debug)]
pub enum GenerateError {
    /// The grammar document failed to parse or contained an unclassifiable
    /// rule.
    Grammar(GrammarError),
    /// The node-type catalogue failed to parse.
    NodeTypes(NodeTypesError),
    /// The catalogue references node types it does not define.
    MissingNodeType(MissingNodeType),
    /// The namespace configuration failed validation.
    InvalidNamespace(InvalidNamespaceConfig),
    /// Distinct node type names mapped to the same output path.
    DuplicateArtifactPath(DuplicateArtifactPath),
}

impl std::fmt::Display for GenerateError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            GenerateError::Grammar(e) => write!(f, "grammar: {e}"),
            GenerateError::NodeTypes(e) => write!(f, "node types: {e}"),
            GenerateError::MissingNodeType(e) => write!(f, "{e}"),
            GenerateError::InvalidNamespace(e) => write!(f, "{e}"),
            GenerateError::DuplicateArtifactPath(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for GenerateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GenerateError::Grammar(e) => Some(e),
            GenerateError::NodeTypes(e) => Some(e),
            GenerateError::MissingNodeType(e) => Some(e),
            GenerateError::InvalidNamespace(e) => Some(e),
            GenerateError::DuplicateArtifactPath(e) => Some(e),
        }
    }
}

impl From<GrammarError> for GenerateError {
    fn from(e: GrammarError) -> Self {
        GenerateError::Grammar(e)
    }
}

impl From<NodeTypesError> for GenerateError {
    fn from(e: NodeTypesError) -> Self {
        GenerateError::NodeTypes(e)
    }
}

impl From<MissingNodeType> for GenerateError {
    fn from(e: MissingNodeType) -> Self {
        GenerateError::MissingNodeType(e)
    }
}

impl From<InvalidNamespaceConfig> for GenerateError {
    fn from(e: InvalidNamespaceConfig) -> Self {
        GenerateError::InvalidNamespace(e)
    }
}

impl From<DuplicateArtifactPath> for GenerateError {
    fn from(e: DuplicateArtifactPath) -> Self {
        GenerateError::DuplicateArtifactPath(e)
    }
}

/// Runs one full generation: parse, classify, build the navigation graph,
/// resolve the namespace, emit.
///
/// Deterministic: identical inputs yield a byte-identical artifact list.
///
/// # Errors
///
/// Returns a [`GenerateError`] and no artifacts if any stage fails; see the
/// variants for the possible causes.
pub fn generate(request: &GenerateRequest<'_>) -> Result<Vec<Artifact>, GenerateError> {
    let grammar = parse_grammar(request.grammar_json)?;
    // Classify the whole rule tree first so a format mismatch is refused
    // before any analysis output exists.
    grammar.classify_all()?;

    let entries = parse_node_types(request.node_types_json)?;
    let catalogue = Catalogue::new(&entries);
    let graph = NavigationGraph::build(&catalogue)?;

    let namespace = resolve_namespace(&request.namespace, &grammar.name)?;

    let emitter = Emitter::new(
        &catalogue,
        &graph,
        &namespace,
        request.grammar_json,
        request.node_types_json,
    );
    Ok(emitter.emit()?)
}
