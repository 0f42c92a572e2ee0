//! Property tests: the subsetting engine against the naive oracle
//!
//! Documents are perfect trees with random object/array containers. Patterns
//! are drawn from the document's own container paths, half negated, with some
//! digit runs wildcarded. A second case mix adds `$` and `$..<digit>` patterns
//! and documents whose leaves are partly empty objects and arrays.

use loca_test::prelude::*;
use proptest::prelude::*;
use serde_json::{json, Value};

// ── Strategies ──────────────────────────────────────────────────────────

fn document_strategy() -> impl Strategy<Value = Value> {
    (2usize..=4, 2usize..=5).prop_flat_map(|(arity, depth)| perfect_tree(arity, depth))
}

fn case_strategy() -> impl Strategy<Value = (Value, Vec<String>)> {
    document_strategy().prop_flat_map(|document| {
        let patterns = patterns_for(&document, 50);
        (Just(document), patterns)
    })
}

fn descent_case_strategy() -> impl Strategy<Value = (Value, Vec<String>)> {
    (2usize..=4, 2usize..=4)
        .prop_flat_map(|(arity, depth)| with_empty_leaves(arity, depth))
        .prop_flat_map(|document| {
            let patterns = patterns_with_descent(&document, 20);
            (Just(document), patterns)
        })
}

fn run_both(document: &Value, patterns: &PatternCollection) -> (Value, Value) {
    let mut fast = document.clone();
    subset(&mut fast, patterns);

    let mut slow = document.clone();
    naive_subset(&mut slow, patterns);

    (fast, slow)
}

// ── Engine / oracle equivalence ─────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Both algorithms produce the same document.
    #[test]
    fn prop_engine_matches_oracle((document, patterns) in case_strategy()) {
        let patterns = PatternCollection::from_patterns(&patterns).unwrap();
        let (fast, slow) = run_both(&document, &patterns);
        prop_assert_eq!(fast, slow);
    }

    /// Root, descent and empty-container leaves agree too.
    #[test]
    fn prop_engine_matches_oracle_with_descent((document, patterns) in descent_case_strategy()) {
        let patterns = PatternCollection::from_patterns(&patterns).unwrap();
        let (fast, slow) = run_both(&document, &patterns);
        prop_assert_eq!(fast, slow);
    }

    /// The trace never changes the outcome.
    #[test]
    fn prop_trace_is_observational((document, patterns) in case_strategy()) {
        let patterns = PatternCollection::from_patterns(&patterns).unwrap();

        let mut plain = document.clone();
        subset(&mut plain, &patterns);

        let mut traced = document;
        let trace = subset_with_trace(&mut traced, &patterns);

        prop_assert_eq!(&plain, &traced);
        prop_assert_eq!(trace.steps.len(), patterns.len());
    }

    /// The root survives whatever the patterns say.
    #[test]
    fn prop_root_survives((document, patterns) in case_strategy()) {
        let patterns = PatternCollection::from_patterns(&patterns).unwrap();
        let mut pruned = document;
        subset(&mut pruned, &patterns);
        prop_assert!(pruned.is_object());
    }

    /// Removing every top-level member leaves an empty root, and stays that way.
    #[test]
    fn prop_remove_all_is_idempotent(document in document_strategy()) {
        let patterns = PatternCollection::parse("*").unwrap();
        let mut pruned = document;
        subset(&mut pruned, &patterns);
        prop_assert_eq!(&pruned, &json!({}));
        subset(&mut pruned, &patterns);
        prop_assert_eq!(&pruned, &json!({}));
    }

    /// Subsetting never adds leaves.
    #[test]
    fn prop_result_is_a_subset((document, patterns) in case_strategy()) {
        let patterns = PatternCollection::from_patterns(&patterns).unwrap();
        let mut pruned = document.clone();
        subset(&mut pruned, &patterns);

        let original_leaves = leaf_paths(&document).len();
        let remaining = leaf_paths(&pruned).len();
        prop_assert!(remaining <= original_leaves);
    }
}

// ── Precedence ──────────────────────────────────────────────────────────

proptest! {
    /// Exclude-then-include keeps a key; include-then-exclude removes it.
    #[test]
    fn prop_later_pattern_dominates(
        document in document_strategy(),
        key in 0usize..2,
    ) {
        let key = key.to_string();
        let keep = PatternCollection::builder()
            .exclude(&key).unwrap()
            .include(&key).unwrap()
            .build();
        let drop = PatternCollection::builder()
            .include(&key).unwrap()
            .exclude(&key).unwrap()
            .build();

        let mut kept = document.clone();
        subset(&mut kept, &keep);
        prop_assert_eq!(&kept, &document);

        let mut dropped = document.clone();
        subset(&mut dropped, &drop);
        prop_assert!(dropped.get(&key).is_none());
        prop_assert_eq!(dropped.as_object().map(|m| m.len()), document.as_object().map(|m| m.len() - 1));
    }
}

// ── Cascading removal ───────────────────────────────────────────────────

#[test]
fn cascading_removal_stops_at_root() {
    let patterns = PatternCollection::parse("[0][0][0]").unwrap();

    let mut document = json!([[["v"]]]);
    subset(&mut document, &patterns);
    assert_eq!(document, json!([]));

    let mut document = json!({ "a": { "b": { "c": "v" } }, "d": "w" });
    subset(&mut document, &PatternCollection::parse("a.b.c").unwrap());
    assert_eq!(document, json!({ "d": "w" }));
}

#[test]
fn empty_leaves_stay_unless_removed() {
    let original = json!({ "a": { "b": {}, "c": "x" }, "d": [[], "y"] });
    let cases: &[(&[&str], Value)] = &[
        (&[], original.clone()),
        (&["a.c"], json!({ "a": { "b": {} }, "d": [[], "y"] })),
        (&["$..b"], json!({ "a": { "c": "x" }, "d": [[], "y"] })),
        (&["d[1]"], json!({ "a": { "b": {}, "c": "x" }, "d": [[]] })),
        (&["$", "!a.b"], json!({ "a": { "b": {} } })),
        (&["a", "!$"], original.clone()),
    ];

    for (patterns, expected) in cases {
        let patterns = PatternCollection::from_patterns(*patterns).unwrap();
        let (fast, slow) = run_both(&original, &patterns);
        assert_eq!(&fast, expected);
        assert_eq!(&slow, expected);
    }
}

#[test]
fn hand_written_cases_agree_with_oracle() {
    let original = json!([
        { "k1": "v1", "k2": "v2" },
        { "k1": "v1", "k2": "v2" },
        { "k1": "v1", "k2": "v2" }
    ]);
    let cases: &[(&[&str], Value)] = &[
        (&["[*].k2", "[2].k1", "![2].k2"], json!([{ "k1": "v1" }, { "k1": "v1" }, { "k2": "v2" }])),
        (&["[*].k2", "[2]"], json!([{ "k1": "v1" }, { "k1": "v1" }])),
        (&["[*]", "![*]", "[1]", "[2]", "[0].k2", "![1].k2"], json!([{ "k1": "v1" }, { "k2": "v2" }])),
    ];

    for (patterns, expected) in cases {
        let patterns = PatternCollection::from_patterns(*patterns).unwrap();
        let mut fast = original.clone();
        subset(&mut fast, &patterns);
        let mut slow = original.clone();
        naive_subset(&mut slow, &patterns);
        assert_eq!(&fast, expected);
        assert_eq!(&slow, expected);
    }
}
