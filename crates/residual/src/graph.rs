//! Term identities and the inspectable term graph.
//!
//! Every term carries a [`TermId`] distinct from structurally equal
//! siblings; derivative memoization and the fix-point engine key on it.
//! [`TermGraph`] is the labeled DAG a graph walk yields for consumers such
//! as debuggers or DOT renderers. Rendering is the consumer's concern; the
//! walk only supplies identities, labels, and child edges.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;

/// Process-stable identity of a term.
///
/// Identities are allocated from a monotone counter, so two terms created
/// in the same process never collide even when structurally equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TermId(u64);

impl TermId {
    pub(crate) fn fresh() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        TermId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for TermId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// Human-readable tag of a term variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    EmptySet,
    EmptyString,
    Terminal,
    Union,
    Concatenation,
    Reduction,
    Kleene,
    Recursive,
    Future,
}

impl Label {
    /// The fixed tag rendered for this variant.
    pub fn as_str(self) -> &'static str {
        match self {
            Label::EmptySet => "Empty_Set",
            Label::EmptyString => "Empty_String",
            Label::Terminal => "TerminalParser",
            Label::Union => "Union",
            Label::Concatenation => "Concatenation",
            Label::Reduction => "ReductionOperation",
            Label::Kleene => "Kleene",
            Label::Recursive => "RecursiveParser",
            Label::Future => "DerivativeFuture",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reachable term in a graph walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermNode {
    /// Identity of the term.
    pub id: TermId,
    /// Variant tag.
    pub label: Label,
    /// Identities of the term's children, in structural order.
    pub children: Vec<TermId>,
}

/// The labeled DAG of every term reachable from a root.
///
/// Nodes are kept in first-visit order so repeated walks over an unchanged
/// graph render identically.
#[derive(Debug, Default, Clone)]
pub struct TermGraph {
    nodes: IndexMap<TermId, TermNode>,
}

impl TermGraph {
    pub(crate) fn new() -> Self {
        TermGraph::default()
    }

    pub(crate) fn visited(&self, id: TermId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub(crate) fn record(&mut self, node: TermNode) {
        self.nodes.insert(node.id, node);
    }

    /// Number of reachable terms.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Looks up a node by identity.
    pub fn get(&self, id: TermId) -> Option<&TermNode> {
        self.nodes.get(&id)
    }

    /// Iterates nodes in first-visit order.
    pub fn iter(&self) -> impl Iterator<Item = &TermNode> {
        self.nodes.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn term_ids_are_unique_and_monotone() {
        let a = TermId::fresh();
        let b = TermId::fresh();
        assert_ne!(a, b, "fresh ids must not collide");
        assert!(a < b, "ids are allocated monotonically");
    }

    #[test]
    fn labels_render_fixed_tags() {
        assert_eq!(Label::EmptySet.as_str(), "Empty_Set");
        assert_eq!(Label::EmptyString.as_str(), "Empty_String");
        assert_eq!(Label::Terminal.as_str(), "TerminalParser");
        assert_eq!(Label::Union.as_str(), "Union");
        assert_eq!(Label::Concatenation.as_str(), "Concatenation");
        assert_eq!(Label::Reduction.as_str(), "ReductionOperation");
        assert_eq!(Label::Kleene.as_str(), "Kleene");
        assert_eq!(Label::Recursive.as_str(), "RecursiveParser");
        assert_eq!(Label::Future.as_str(), "DerivativeFuture");
    }

    #[test]
    fn graph_preserves_first_visit_order() {
        let mut graph = TermGraph::new();
        let a = TermId::fresh();
        let b = TermId::fresh();
        graph.record(TermNode { id: b, label: Label::Union, children: vec![a] });
        graph.record(TermNode { id: a, label: Label::Terminal, children: vec![] });

        let order: Vec<TermId> = graph.iter().map(|n| n.id).collect();
        assert_eq!(order, vec![b, a]);
        assert!(graph.visited(a));
        assert_eq!(graph.len(), 2);
    }
}
