//! The navigation graph: which node types each tree-walking step can reach.
//!
//! For every concrete node type `T` and every direction (first child, next
//! sibling, previous sibling, parent) this module precomputes the set of node
//! types reachable by that step, with supertypes expanded to their concrete
//! members. The graph is built once from the node-type catalogue, is
//! read-only afterwards, and is the single source the emitter consults — no
//! reachability is recomputed at lookup time.

use crate::node_types::{Catalogue, NodeTypeInfo};
use std::collections::{BTreeMap, BTreeSet};

/// A tree-navigation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Descend to the first child.
    FirstChild,
    /// Move to the next sibling.
    NextSibling,
    /// Move to the previous sibling.
    PrevSibling,
    /// Ascend to the parent.
    Parent,
}

impl Direction {
    /// All directions, in table order.
    pub const ALL: [Direction; 4] = [
        Direction::FirstChild,
        Direction::NextSibling,
        Direction::PrevSibling,
        Direction::Parent,
    ];

    /// The camel-cased accessor name this direction maps to in emitted code.
    #[must_use]
    pub fn accessor(self) -> &'static str {
        match self {
            Direction::FirstChild => "firstChild",
            Direction::NextSibling => "nextSibling",
            Direction::PrevSibling => "previousSibling",
            Direction::Parent => "parent",
        }
    }

    fn index(self) -> usize {
        match self {
            Direction::FirstChild => 0,
            Direction::NextSibling => 1,
            Direction::PrevSibling => 2,
            Direction::Parent => 3,
        }
    }
}

/// The set of node types one navigation step can land on.
///
/// `none` records whether the step can also land nowhere (for example a
/// childless node's first child, or the next sibling of a last child).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reachable {
    /// Concrete node type names reachable by the step, sorted.
    pub types: BTreeSet<String>,
    /// Whether the step may yield no node at all.
    pub none: bool,
}

impl Reachable {
    fn none_only() -> Self {
        Reachable {
            types: BTreeSet::new(),
            none: true,
        }
    }

    /// Returns `true` when the step can only yield nothing.
    #[must_use]
    pub fn is_none_only(&self) -> bool {
        self.types.is_empty()
    }
}

/// A dangling child-type reference found while building the graph.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct MissingRef {
    /// The referenced type name absent from the catalogue.
    pub missing: String,
    /// The descriptor that referenced it.
    pub referenced_by: String,
}

/// Aggregated structural-inconsistency error: every dangling reference in
/// the catalogue, reported at once so the grammar can be fixed in one pass.
#[derive(Debug, Clone)]
pub struct MissingNodeType {
    /// Every dangling reference found, sorted and deduplicated.
    pub refs: Vec<MissingRef>,
}

impl std::fmt::Display for MissingNodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "missing node types:")?;
        for r in &self.refs {
            write!(f, " '{}' (referenced by '{}')", r.missing, r.referenced_by)?;
        }
        Ok(())
    }
}

impl std::error::Error for MissingNodeType {}

/// The precomputed `(node type, direction) -> reachable set` table.
#[derive(Debug)]
pub struct NavigationGraph {
    table: BTreeMap<String, [Reachable; 4]>,
}

impl NavigationGraph {
    /// Builds the graph from a node-type catalogue.
    ///
    /// Supertype references are expanded to concrete member unions at build
    /// time; sibling sets are the union over every parent context a type can
    /// appear in (the catalogue does not record child order, so this
    /// context-insensitive union is the reference behavior). A type in a
    /// `multiple: true` slot reaches itself as a sibling; that falls out of
    /// the union without special-casing.
    ///
    /// # Errors
    ///
    /// Returns [`MissingNodeType`] listing every reference to a type absent
    /// from the catalogue, not just the first one found.
    pub fn build(catalogue: &Catalogue<'_>) -> Result<Self, MissingNodeType> {
        let mut missing: Vec<(String, String)> = Vec::new();
        let mut table: BTreeMap<String, [Reachable; 4]> = BTreeMap::new();

        // Containment per parent: the expanded set of types each concrete
        // descriptor can hold, plus whether any slot is required.
        let mut contained: BTreeMap<&str, (BTreeSet<String>, bool)> = BTreeMap::new();

        for info in catalogue.concrete() {
            let (types, any_required) = contained_types(catalogue, info, &mut missing);
            contained.insert(info.kind.as_str(), (types, any_required));
        }

        if !missing.is_empty() {
            let mut refs: Vec<MissingRef> = missing
                .into_iter()
                .map(|(missing, referenced_by)| MissingRef {
                    missing,
                    referenced_by,
                })
                .collect();
            refs.sort();
            refs.dedup();
            return Err(MissingNodeType { refs });
        }

        // First child: the union of declared member types, direct from the
        // descriptor. A node with no declared children reaches only None.
        for info in catalogue.concrete() {
            let (types, any_required) = &contained[info.kind.as_str()];
            let first_child = if types.is_empty() {
                Reachable::none_only()
            } else {
                Reachable {
                    types: types.clone(),
                    none: !*any_required,
                }
            };
            table.insert(
                info.kind.clone(),
                [
                    first_child,
                    Reachable::none_only(),
                    Reachable::none_only(),
                    Reachable::none_only(),
                ],
            );
        }

        // Parent and siblings: one reverse pass over direct containment.
        // The catalogue already encodes who can hold whom, so no fixed-point
        // search is needed.
        for (parent, (types, _)) in &contained {
            for child in types {
                // Every contained type was resolved against the catalogue
                // above, so the row is always present.
                let Some(row) = table.get_mut(child) else {
                    continue;
                };
                row[Direction::Parent.index()]
                    .types
                    .insert((*parent).to_owned());
                row[Direction::Parent.index()].none = false;
                for dir in [Direction::NextSibling, Direction::PrevSibling] {
                    let slot = &mut row[dir.index()];
                    slot.types.extend(types.iter().cloned());
                    slot.none = true;
                }
            }
        }

        // A type no descriptor contains is a root: its parent is only None.
        for row in table.values_mut() {
            let parent = &mut row[Direction::Parent.index()];
            if parent.types.is_empty() {
                parent.none = true;
            }
        }

        Ok(NavigationGraph { table })
    }

    /// Looks up the reachable set for one node type and direction.
    #[must_use]
    pub fn reachable(&self, node_type: &str, direction: Direction) -> Option<&Reachable> {
        self.table.get(node_type).map(|row| &row[direction.index()])
    }

    /// Iterates over node type names in the table, in sorted order.
    pub fn node_names(&self) -> impl Iterator<Item = &str> {
        self.table.keys().map(String::as_str)
    }
}

/// Expands every child slot of `info` into one union of concrete type names,
/// recording whether any slot is required (a required slot guarantees the
/// node has a first child).
fn contained_types(
    catalogue: &Catalogue<'_>,
    info: &NodeTypeInfo,
    missing: &mut Vec<(String, String)>,
) -> (BTreeSet<String>, bool) {
    let mut types = BTreeSet::new();
    let mut any_required = false;
    for spec in info.child_specs() {
        any_required |= spec.required;
        types.extend(catalogue.expand_refs(&spec.types, &info.kind, missing));
    }
    (types, any_required)
}
