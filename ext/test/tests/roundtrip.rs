//! Property tests for the path tree store
//!
//! Trees are built from generated documents under a handful of locales, then
//! serialized and decoded again.

use loca_test::prelude::*;
use proptest::prelude::*;
use proptest::sample::select;
use serde_json::Value;

const LOCALES: &[&str] = &["en", "en-GB", "de", "zh-Hant-TW", "none"];

fn locale_strategy() -> impl Strategy<Value = Locale> {
    select(LOCALES).prop_map(|code| code.parse().unwrap())
}

fn documents_strategy() -> impl Strategy<Value = Vec<(Locale, Value)>> {
    prop::collection::vec(
        (locale_strategy(), (2usize..=3, 1usize..=4).prop_flat_map(|(a, d)| perfect_tree(a, d))),
        1..5,
    )
}

fn build(documents: &[(Locale, Value)]) -> PathTree {
    let mut tree = PathTree::new();
    for (locale, document) in documents {
        tree.add_document(locale, document).unwrap();
    }
    tree
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Decoding an encoded tree gives back an equal tree.
    #[test]
    fn prop_bytes_round_trip(documents in documents_strategy()) {
        let tree = build(&documents);
        let bytes = tree.to_bytes().unwrap();
        let decoded = PathTree::from_bytes(&bytes).unwrap();
        prop_assert_eq!(&decoded, &tree);
        prop_assert_eq!(decoded.node_count(), tree.node_count());
    }

    /// Every leaf of every document can be read back, last write winning.
    #[test]
    fn prop_values_read_back(documents in documents_strategy()) {
        let tree = build(&documents);
        let decoded = PathTree::from_bytes(&tree.to_bytes().unwrap()).unwrap();

        for (i, (locale, document)) in documents.iter().enumerate() {
            let overwritten = documents[i + 1..].iter().any(|(later, _)| later == locale);
            if overwritten {
                continue;
            }
            for path in leaf_paths(document) {
                let Some(Value::String(expected)) = loca_test::generate::lookup(document, &path) else {
                    continue;
                };
                let node = decoded.select_path(&path).unwrap();
                prop_assert_eq!(node.value(locale).unwrap(), Some(expected.as_str()));
            }
        }
    }

    /// Node paths survive the round trip.
    #[test]
    fn prop_paths_survive(documents in documents_strategy()) {
        let tree = build(&documents);
        let decoded = PathTree::from_bytes(&tree.to_bytes().unwrap()).unwrap();

        for (_, document) in &documents {
            for path in leaf_paths(document) {
                let node = decoded.select_path(&path).unwrap();
                prop_assert_eq!(node.path(), path);
            }
        }
    }

    /// Changing one stored value breaks equality.
    #[test]
    fn prop_mutation_breaks_equality(
        documents in documents_strategy(),
        pick in any::<prop::sample::Index>(),
    ) {
        let tree = build(&documents);
        let (locale, document) = &documents[documents.len() - 1];
        let leaves = leaf_paths(document);
        let path = pick.get(&leaves);

        let mut changed = PathTree::from_bytes(&tree.to_bytes().unwrap()).unwrap();
        changed.add_path(locale, path, "changed!").unwrap();
        prop_assert_ne!(&changed, &tree);
    }

    /// Adding the same document twice changes nothing.
    #[test]
    fn prop_adding_twice_is_idempotent(documents in documents_strategy()) {
        let once = build(&documents);
        let mut twice = build(&documents);
        for (locale, document) in &documents {
            twice.add_document(locale, document).unwrap();
        }
        prop_assert_eq!(twice.value_table().len(), once.value_table().len());
        prop_assert_eq!(twice.node_count(), once.node_count());
    }
}

#[test]
fn insertion_order_does_not_affect_equality() {
    let en: Locale = "en".parse().unwrap();
    let de: Locale = "de".parse().unwrap();

    let mut a = PathTree::new();
    a.add(&en, "x.y", "1").unwrap();
    a.add(&de, "x.z", "2").unwrap();

    let mut b = PathTree::new();
    b.add(&de, "x.z", "2").unwrap();
    b.add(&en, "x.y", "1").unwrap();

    assert_eq!(a, b);
    assert_eq!(PathTree::from_bytes(&a.to_bytes().unwrap()).unwrap(), b);
}

#[test]
fn builder_output_round_trips() {
    let patterns = PatternCollection::parse("*.1\n!0.1").unwrap();
    let mut builder = TreeBuilder::new(patterns);
    for (arity, code) in [(2, "en"), (3, "fr"), (4, "ja")] {
        let locale: Locale = code.parse().unwrap();
        let document = perfect_tree_with(arity, 3, &mut || true);
        builder.add_document(Some(&locale), document).unwrap();
    }
    builder.add_document(None, perfect_tree_with(2, 2, &mut || true)).unwrap();
    let tree = builder.finish();

    assert_eq!(tree.locales().len(), 4);
    assert!(tree.select("1.1").unwrap().is_none());
    assert!(tree.select("0.1").unwrap().is_some());

    let decoded = PathTree::from_bytes(&tree.to_bytes().unwrap()).unwrap();
    assert_eq!(decoded, tree);
}
