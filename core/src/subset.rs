//! The subsetting engine.
//!
//! Two phases:
//!
//! 1. Every pattern is evaluated against the untouched document. Each matched
//!    node gets a [`Decision`] tagged with the pattern's position, replacing
//!    any earlier decision for that exact node.
//! 2. One post-order walk computes each node's effective decision (the newer
//!    of its own and its parent's) and removes leaves marked for removal.
//!    A container the walk empties is removed too; the root never is.

use serde_json::Value;

use crate::decision::{DecisionNode, DecisionTree};
use crate::{Decision, PatternCollection, PatternStep, SubsetTrace};

/// Prune `document` in place according to `patterns`.
///
/// Later patterns win over earlier ones wherever both match. An empty
/// collection leaves the document untouched.
///
/// # Example
///
/// ```
/// use loca::{subset, PatternCollection};
/// use serde_json::json;
///
/// let patterns = PatternCollection::from_patterns(["[0]", "[1]", "[2]", "![0]", "![1]"]).unwrap();
/// let mut doc = json!(["v1", "v2", "v3"]);
/// subset(&mut doc, &patterns);
/// assert_eq!(doc, json!(["v1", "v2"]));
/// ```
pub fn subset(document: &mut Value, patterns: &PatternCollection) {
    subset_with_trace(document, patterns);
}

/// Like [`subset`], and report what each pattern matched.
pub fn subset_with_trace(document: &mut Value, patterns: &PatternCollection) -> SubsetTrace {
    let mut trace = SubsetTrace::default();
    if patterns.is_empty() {
        return trace;
    }

    let mut decisions = DecisionTree::new();
    for (index, pattern) in patterns.iter().enumerate() {
        let matched = pattern.query().select(document);
        tracing::trace!(
            index,
            pattern = %pattern,
            matched = matched.len(),
            "pattern evaluated"
        );
        let decision = Decision::new(index, pattern.removes());
        for path in &matched {
            decisions.record(path, decision);
        }
        trace.steps.push(PatternStep {
            index,
            pattern: pattern.to_string(),
            negated: pattern.is_negated(),
            matched: matched.len(),
        });
    }

    if decisions.is_empty() {
        tracing::debug!(patterns = patterns.len(), "no pattern matched, nothing to prune");
        return trace;
    }

    let root = decisions.root();
    let effective = Decision::newer(None, root.decision());
    prune_children(document, effective, Some(root), &mut trace);

    tracing::debug!(
        patterns = patterns.len(),
        removed_leaves = trace.removed_leaves,
        removed_containers = trace.removed_containers,
        "subset complete"
    );
    trace
}

/// Prune below a non-root node, returning whether the node itself stays.
fn prune(
    value: &mut Value,
    inherited: Option<Decision>,
    recorded: Option<&DecisionNode>,
    trace: &mut SubsetTrace,
) -> bool {
    let effective = Decision::newer(inherited, recorded.and_then(DecisionNode::decision));

    if is_container(value) {
        prune_children(value, effective, recorded, trace);
        if is_container(value) {
            return true;
        }
        trace.removed_containers += 1;
        return false;
    }

    if effective.is_some_and(|d| d.remove()) {
        trace.removed_leaves += 1;
        return false;
    }
    true
}

/// Prune the children of `value` under its effective decision.
fn prune_children(
    value: &mut Value,
    effective: Option<Decision>,
    recorded: Option<&DecisionNode>,
    trace: &mut SubsetTrace,
) {
    match value {
        Value::Object(map) => {
            map.retain(|key, child| prune(child, effective, recorded.and_then(|n| n.key(key)), trace));
        }
        Value::Array(items) => {
            let mut index = 0;
            items.retain_mut(|child| {
                let keep = prune(child, effective, recorded.and_then(|n| n.index(index)), trace);
                index += 1;
                keep
            });
        }
        _ => {}
    }
}

/// A non-empty object or array. Empty containers count as leaves.
fn is_container(value: &Value) -> bool {
    match value {
        Value::Object(map) => !map.is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => false,
    }
}
