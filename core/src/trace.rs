//! Subsetting trace types for debugging pattern behavior.
//!
//! [`subset_with_trace`](crate::subset_with_trace) prunes exactly like
//! [`subset`](crate::subset) and additionally reports what every pattern
//! matched and how much was removed.
//!
//! # Example
//!
//! ```
//! use loca::{subset_with_trace, PatternCollection};
//! use serde_json::json;
//!
//! let patterns = PatternCollection::parse("k1\nk9").unwrap();
//! let mut doc = json!({ "k1": "v1", "k2": "v2" });
//!
//! let trace = subset_with_trace(&mut doc, &patterns);
//! for step in &trace.steps {
//!     println!("pattern[{}] {}: matched={}", step.index, step.pattern, step.matched);
//! }
//! assert_eq!(trace.unmatched().count(), 1);
//! assert_eq!(trace.removed_leaves, 1);
//! ```

use std::fmt;

/// Trace of one subsetting pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubsetTrace {
    /// One entry per pattern, in collection order.
    pub steps: Vec<PatternStep>,
    /// Scalars (and containers that were empty to begin with) removed by a decision.
    pub removed_leaves: usize,
    /// Containers removed because the pass emptied them.
    pub removed_containers: usize,
}

impl SubsetTrace {
    /// Total number of removed nodes.
    #[must_use]
    pub fn removed(&self) -> usize {
        self.removed_leaves + self.removed_containers
    }

    /// Patterns that matched nothing. They still consumed a sequence number.
    pub fn unmatched(&self) -> impl Iterator<Item = &PatternStep> {
        self.steps.iter().filter(|step| step.matched == 0)
    }
}

/// One pattern's evaluation in a trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternStep {
    /// Position in the collection; also the decision's sequence number.
    pub index: usize,
    /// The pattern as written (`!` included).
    pub pattern: String,
    /// Whether the pattern keeps what it matches.
    pub negated: bool,
    /// Number of nodes the query matched.
    pub matched: usize,
}

impl fmt::Display for PatternStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} ({} matched)", self.index, self.pattern, self.matched)
    }
}
