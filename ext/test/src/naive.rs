//! A deliberately naive subsetting algorithm, used as a test oracle.
//!
//! Instead of recording decisions and inheriting them on one walk, every
//! pattern directly re-marks each leaf below each node it matches. Afterwards
//! the marked leaves are removed one at a time and emptied containers are
//! removed on the way up. [`loca::subset`] must always agree with it.

use std::collections::HashMap;

use loca::{Path, PathSegment, PatternCollection};
use serde_json::Value;

use crate::generate::leaf_paths;

/// Prune `document` by marking leaves pattern by pattern.
pub fn naive_subset(document: &mut Value, patterns: &PatternCollection) {
    let leaves = leaf_paths(document);
    let mut remove: HashMap<Path, bool> = leaves.iter().map(|p| (p.clone(), false)).collect();

    for pattern in patterns {
        for matched in pattern.query().select(document) {
            for leaf in leaves.iter().filter(|leaf| matched.is_prefix_of(leaf)) {
                remove.insert(leaf.clone(), pattern.removes());
            }
        }
    }

    let mut doomed: Vec<Path> = remove
        .into_iter()
        .filter_map(|(path, remove)| remove.then_some(path))
        .collect();
    // Deepest and rightmost first, so pending paths never shift.
    doomed.sort_unstable_by(|a, b| b.cmp(a));

    for path in doomed {
        let mut current = path;
        while remove_at(document, &current) {
            match current.parent() {
                Some(parent) if !parent.is_empty() && is_empty_container(document, &parent) => {
                    current = parent;
                }
                _ => break,
            }
        }
    }
}

fn is_empty_container(document: &Value, path: &Path) -> bool {
    match crate::generate::lookup(document, path) {
        Some(Value::Object(map)) => map.is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        _ => false,
    }
}

/// Remove the node at `path` from its container. Returns `false` if absent.
fn remove_at(document: &mut Value, path: &Path) -> bool {
    let Some((last, init)) = path.segments().split_last() else {
        return false;
    };

    let mut container = document;
    for segment in init {
        let next = match (segment, container) {
            (PathSegment::Key(key), Value::Object(map)) => map.get_mut(key),
            (PathSegment::Index(index), Value::Array(items)) => items.get_mut(*index),
            _ => None,
        };
        match next {
            Some(next) => container = next,
            None => return false,
        }
    }

    match (last, container) {
        (PathSegment::Key(key), Value::Object(map)) => map.shift_remove(key).is_some(),
        (PathSegment::Index(index), Value::Array(items)) if *index < items.len() => {
            items.remove(*index);
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(doc: Value, patterns: &[&str]) -> Value {
        let patterns = PatternCollection::from_patterns(patterns).unwrap();
        let mut doc = doc;
        naive_subset(&mut doc, &patterns);
        doc
    }

    #[test]
    fn removes_marked_leaves() {
        let doc = json!({ "k1": "v1", "k2": "v2", "k3": "v3" });
        assert_eq!(run(doc, &["k1"]), json!({ "k2": "v2", "k3": "v3" }));
    }

    #[test]
    fn later_marks_win() {
        let doc = json!(["v1", "v2", "v3"]);
        let out = run(doc, &["[0]", "[1]", "[2]", "![0]", "![1]"]);
        assert_eq!(out, json!(["v1", "v2"]));
    }

    #[test]
    fn cascades_to_root_but_not_past_it() {
        let doc = json!([[[["v"], ["v"]]]]);
        assert_eq!(run(doc, &["[0][0][*][0]"]), json!([]));
    }

    #[test]
    fn removes_several_siblings_in_one_array() {
        let doc = json!([["a", "b", "c"], ["d"]]);
        assert_eq!(run(doc, &["[0][0]", "[0][2]", "[1]"]), json!([["b"]]));
    }
}
