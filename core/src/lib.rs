//! loca - subsetting and compact storage for hierarchical locale data
//!
//! Locale data (CLDR JSON and similar) arrives as many per-locale documents that
//! repeat the same structure and, very often, the same strings. This crate prunes
//! those documents with gitignore-style rules and folds what survives into one
//! interned, serializable tree.
//!
//! # Architecture
//!
//! - [`Path`] — Parsed address of a node (`main.en.dates[0]['a.b']`)
//! - [`Query`] — Path expression with wildcards and recursive descent
//! - [`Pattern`] / [`PatternCollection`] — Ordered include/exclude rules
//! - [`subset()`] — Prunes a [`serde_json::Value`] in place, later rules win
//! - [`LocaleFilter`] — Include/exclude wildcards over locale codes
//! - [`PathTree`] — Arena of path-segment nodes with interned locales and values
//! - [`TreeBuilder`] — Subsets documents and folds their leaves into a tree
//!
//! # Key Design Insights
//!
//! 1. **Recency wins**: every pattern carries its position as a sequence number.
//!    A node's effective decision is the most recent one among its own and its
//!    ancestors', so a later rule overrides an earlier one on any overlap.
//!
//! 2. **Removal is bottom-up**: children are decided before their container, and
//!    a container emptied by the pass goes with them. The root always stays.
//!
//! 3. **Ids, not strings**: a tree stores `u32` ids at every node. Distinct values
//!    and locales live once in the tree's [`Interner`] tables.
//!
//! # Example
//!
//! ```
//! use loca::prelude::*;
//! use serde_json::json;
//!
//! // Drop everything but the gregorian calendar.
//! let patterns = PatternCollection::parse("dates\n!dates.calendars.gregorian").unwrap();
//!
//! let mut document = json!({
//!     "dates": {
//!         "calendars": {
//!             "gregorian": { "months": "January" },
//!             "buddhist": { "months": "January" }
//!         }
//!     }
//! });
//! subset(&mut document, &patterns);
//!
//! let en = Locale::new("en");
//! let mut tree = PathTree::new();
//! tree.add_document(&en, &document).unwrap();
//!
//! let months = tree.value("dates.calendars.gregorian.months", &en).unwrap();
//! assert_eq!(months, Some("January"));
//! assert!(tree.select("dates.calendars.buddhist").unwrap().is_none());
//! ```
//!
//! # Concurrency
//!
//! Everything here is synchronous. A [`PathTree`] is built by one writer; once
//! building is done it is plain immutable data and can be shared across threads.

// ═══════════════════════════════════════════════════════════════════════════════
// Modules
// ═══════════════════════════════════════════════════════════════════════════════

mod builder;
mod config;
mod decision;
mod filter;
mod interner;
mod locale;
mod path;
mod pattern;
mod query;
mod subset;
mod trace;
mod tree;

// ═══════════════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════════════

// Addressing and querying
pub use path::{Path, PathSegment};
pub use query::{Query, Selector};

// Subsetting
pub use decision::Decision;
pub use filter::LocaleFilter;
pub use pattern::{Pattern, PatternCollection, PatternCollectionBuilder};
pub use subset::{subset, subset_with_trace};
pub use trace::{PatternStep, SubsetTrace};

// Storage
pub use builder::TreeBuilder;
pub use interner::Interner;
pub use locale::Locale;
pub use tree::{NodeId, NodeRef, PathTree};

// Config
pub use config::{ExcludeRule, IncludeRule, LocaleFilterConfig, RuleConfig, SubsetConfig};

// ═══════════════════════════════════════════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════════════════════════════════════════

/// Prelude module for convenient imports.
///
/// ```
/// use loca::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Subsetting
        subset,
        subset_with_trace,
        // Storage
        Locale,
        LocaleFilter,
        NodeRef,
        // Addressing
        Path,
        PathError,
        PathSegment,
        PathTree,
        Pattern,
        PatternCollection,
        PatternError,
        Query,
        StoreError,
        SubsetTrace,
        TreeBuilder,
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════════════════════════

/// Maximum length in bytes of a path or query expression.
///
/// Real CLDR paths stay well under a few hundred bytes. The cap keeps a
/// malformed patterns file from feeding megabyte-long lines to the parser.
pub const MAX_EXPRESSION_LENGTH: usize = 8192;

// ═══════════════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// A path or query expression failed to parse.
///
/// Raised when the expression is parsed, never later while matching.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid path \"{input}\" at offset {offset}: {kind}")]
pub struct PathError {
    /// The expression that failed to parse.
    pub input: String,
    /// Byte offset of the offending segment.
    pub offset: usize,
    /// What went wrong.
    pub kind: PathErrorKind,
}

impl PathError {
    pub(crate) fn new(input: &str, offset: usize, kind: PathErrorKind) -> Self {
        Self {
            input: input.to_owned(),
            offset,
            kind,
        }
    }
}

/// The reason a [`PathError`] was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PathErrorKind {
    /// Input does not start a valid segment at this offset.
    #[error("unexpected input")]
    Unexpected,
    /// A bare key after the first segment must be written as `.key`.
    #[error("key segments after the first must be prefixed with '.'")]
    MissingDot,
    /// `[*]` appeared in an addressing path.
    #[error("wildcards are only allowed in patterns")]
    Wildcard,
    /// `..` appeared in an addressing path.
    #[error("recursive descent is only allowed in patterns")]
    Descent,
    /// `$` appeared anywhere but at the start of a query.
    #[error("'$' may only start a query")]
    MisplacedRoot,
    /// `..*` is not a supported form.
    #[error("recursive descent needs a key")]
    EmptyDescent,
    /// An array index does not fit in `usize`.
    #[error("array index is too large")]
    IndexOverflow,
    /// The expression exceeds [`MAX_EXPRESSION_LENGTH`].
    #[error("expression is longer than {MAX_EXPRESSION_LENGTH} bytes")]
    TooLong,
}

/// A locale code could not be split into subtags.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid locale code \"{0}\"")]
pub struct InvalidLocale(pub String);

/// A pattern in a collection failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid pattern on line {line}: {source}")]
pub struct PatternError {
    /// 1-based line (or position) of the offending pattern.
    pub line: usize,
    /// The underlying syntax error.
    #[source]
    pub source: PathError,
}

/// Errors from building, querying and (de)serializing a [`PathTree`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A path given to the tree is malformed.
    #[error(transparent)]
    Path(#[from] PathError),

    /// The locale was never added to this tree.
    ///
    /// This is not a plain "not found": it means the caller is asking a tree
    /// about data it was never built from.
    #[error("locale \"{code}\" is unknown to this tree")]
    UnknownLocale {
        /// Code of the unknown locale.
        code: String,
    },

    /// A node id does not belong to this tree.
    #[error("node {id} does not exist in this tree")]
    UnknownNode {
        /// The offending id.
        id: u32,
    },

    /// An interning table ran out of `u32` ids.
    #[error("the {table} table is full")]
    CapacityExceeded {
        /// Which table overflowed (`"value"` or `"locale"`).
        table: &'static str,
    },

    /// Serialization failed.
    #[error("failed to encode tree: {0}")]
    Encode(#[source] postcard::Error),

    /// The bytes are not a serialized tree.
    #[error("failed to decode tree: {0}")]
    Decode(#[source] postcard::Error),

    /// The bytes decoded, but describe an impossible tree.
    #[error("corrupt tree: {reason}")]
    Corrupt {
        /// What the validation pass found.
        reason: String,
    },
}
