//! Per-node decisions recorded during subsetting.
//!
//! Decisions are kept in a trie shaped like the document: one node per path
//! segment, with `HashMap` children for O(1) descent by key or index.

use std::collections::HashMap;

use crate::{Path, PathSegment};

/// The verdict a pattern left on a node.
///
/// `sequence` is the position of the pattern in its collection. Between two
/// decisions for the same node the higher sequence wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Decision {
    sequence: usize,
    remove: bool,
}

impl Decision {
    /// A decision made by pattern number `sequence`.
    #[must_use]
    pub fn new(sequence: usize, remove: bool) -> Self {
        Self { sequence, remove }
    }

    /// Position of the pattern that made this decision.
    #[must_use]
    pub fn sequence(&self) -> usize {
        self.sequence
    }

    /// Returns `true` if the node should go.
    #[must_use]
    pub fn remove(&self) -> bool {
        self.remove
    }

    /// The more recent of two optional decisions.
    ///
    /// ```
    /// use loca::Decision;
    ///
    /// let old = Decision::new(0, true);
    /// let new = Decision::new(3, false);
    /// assert_eq!(Decision::newer(Some(old), Some(new)), Some(new));
    /// assert_eq!(Decision::newer(Some(old), None), Some(old));
    /// assert_eq!(Decision::newer(None, None), None);
    /// ```
    #[must_use]
    pub fn newer(a: Option<Self>, b: Option<Self>) -> Option<Self> {
        match (a, b) {
            (Some(a), Some(b)) => Some(if b.sequence > a.sequence { b } else { a }),
            (a, None) => a,
            (None, b) => b,
        }
    }
}

/// Decisions keyed by concrete path.
#[derive(Debug, Clone, Default)]
pub(crate) struct DecisionTree {
    root: DecisionNode,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct DecisionNode {
    /// Decision recorded for exactly this node, if any.
    decision: Option<Decision>,
    keys: HashMap<String, DecisionNode>,
    indices: HashMap<usize, DecisionNode>,
}

impl DecisionTree {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Record `decision` for `path`, replacing whatever was there.
    pub(crate) fn record(&mut self, path: &Path, decision: Decision) {
        let mut node = &mut self.root;
        for segment in path {
            node = match segment {
                PathSegment::Key(key) => node.keys.entry(key.clone()).or_default(),
                PathSegment::Index(index) => node.indices.entry(*index).or_default(),
            };
        }
        node.decision = Some(decision);
    }

    pub(crate) fn root(&self) -> &DecisionNode {
        &self.root
    }

    /// Returns `true` if nothing was recorded.
    pub(crate) fn is_empty(&self) -> bool {
        self.root.decision.is_none() && self.root.is_leaf()
    }
}

impl DecisionNode {
    pub(crate) fn decision(&self) -> Option<Decision> {
        self.decision
    }

    pub(crate) fn key(&self, key: &str) -> Option<&DecisionNode> {
        self.keys.get(key)
    }

    pub(crate) fn index(&self, index: usize) -> Option<&DecisionNode> {
        self.indices.get(&index)
    }

    fn is_leaf(&self) -> bool {
        self.keys.is_empty() && self.indices.is_empty()
    }
}
