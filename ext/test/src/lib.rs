//! loca-test: Test support for the loca subsetting engine and tree store
//!
//! Provides document and pattern generators, a deliberately naive subsetting
//! oracle, and (with the `fixtures` feature) a YAML conformance runner.
//!
//! # Example
//!
//! ```
//! use loca_test::prelude::*;
//! use serde_json::json;
//!
//! let patterns = PatternCollection::parse("[*].k2\n![2].k2").unwrap();
//! let original = json!([{ "k1": 1, "k2": 2 }, { "k1": 1, "k2": 2 }, { "k1": 1, "k2": 2 }]);
//!
//! let mut fast = original.clone();
//! subset(&mut fast, &patterns);
//!
//! let mut slow = original;
//! naive_subset(&mut slow, &patterns);
//!
//! assert_eq!(fast, slow);
//! ```

#[cfg(feature = "fixtures")]
pub mod fixture;

pub mod naive;

pub use naive::naive_subset;

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::generate::{
        leaf_paths, patterns_for, patterns_with_descent, perfect_tree, perfect_tree_with,
        with_empty_leaves,
    };
    pub use super::naive::naive_subset;
    pub use loca::prelude::*;
}
