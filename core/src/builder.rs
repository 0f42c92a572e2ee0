//! `TreeBuilder` — subset documents and fold them into one tree.
//!
//! The surrounding pipeline finds, reads and classifies source files. It hands
//! each parsed document to the builder together with its locale, if it has
//! one, and takes the finished [`PathTree`] at the end. Documents whose locale
//! the builder's [`LocaleFilter`] rejects are skipped before subsetting.

use serde_json::Value;

use crate::{subset, Locale, LocaleFilter, PathTree, PatternCollection, StoreError};

/// Documents between two progress log lines.
const PROGRESS_INTERVAL: usize = 100;

/// Accumulates documents into a [`PathTree`].
///
/// # Example
///
/// ```
/// use loca::{Locale, PatternCollection, TreeBuilder};
/// use serde_json::json;
///
/// let patterns = PatternCollection::parse("*.identity").unwrap();
/// let mut builder = TreeBuilder::new(patterns);
///
/// let en = Locale::new("en");
/// builder
///     .add_document(Some(&en), json!({ "main": { "identity": "x", "name": "English" } }))
///     .unwrap();
/// builder
///     .add_document(None, json!({ "supplemental": { "version": "47" } }))
///     .unwrap();
///
/// let tree = builder.finish();
/// assert_eq!(tree.value("main.name", &en).unwrap(), Some("English"));
/// assert_eq!(tree.value("main.identity", &en).unwrap(), None);
/// assert_eq!(tree.value("supplemental.version", &Locale::none()).unwrap(), Some("47"));
/// ```
#[derive(Debug)]
pub struct TreeBuilder {
    patterns: PatternCollection,
    locales: LocaleFilter,
    tree: PathTree,
    documents: usize,
    skipped: usize,
    values: usize,
}

impl TreeBuilder {
    /// A builder applying `patterns` to every document.
    #[must_use]
    pub fn new(patterns: PatternCollection) -> Self {
        Self {
            patterns,
            locales: LocaleFilter::all(),
            tree: PathTree::new(),
            documents: 0,
            skipped: 0,
            values: 0,
        }
    }

    /// Only keep documents whose locale `filter` allows.
    ///
    /// Documents added without a locale are always kept.
    #[must_use]
    pub fn with_locale_filter(mut self, filter: LocaleFilter) -> Self {
        self.locales = filter;
        self
    }

    /// Subset `document` and add its leaves under `locale`.
    ///
    /// Documents without a locale are stored under [`Locale::none()`]. Each
    /// `(locale, path)` should come from one document only; a repeat
    /// overwrites. Returns `false` if the locale filter skipped the document.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::CapacityExceeded`] if the tree runs out of ids.
    pub fn add_document(
        &mut self,
        locale: Option<&Locale>,
        mut document: Value,
    ) -> Result<bool, StoreError> {
        if let Some(locale) = locale {
            if !self.locales.allows(locale) {
                self.skipped += 1;
                tracing::debug!(locale = %locale, "locale filtered out, skipping document");
                return Ok(false);
            }
        }
        subset(&mut document, &self.patterns);

        let added = match locale {
            Some(locale) => self.tree.add_document(locale, &document)?,
            None => self.tree.add_document(&Locale::none(), &document)?,
        };
        self.documents += 1;
        self.values += added;

        if self.documents % PROGRESS_INTERVAL == 0 {
            tracing::info!(
                documents = self.documents,
                values = self.values,
                distinct_values = self.tree.value_table().len(),
                nodes = self.tree.node_count(),
                "building tree"
            );
        }
        Ok(true)
    }

    /// Number of documents added so far, not counting skipped ones.
    #[must_use]
    pub fn documents(&self) -> usize {
        self.documents
    }

    /// Number of documents the locale filter skipped.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// The tree built so far.
    #[must_use]
    pub fn tree(&self) -> &PathTree {
        &self.tree
    }

    /// Finish building.
    #[must_use]
    pub fn finish(self) -> PathTree {
        tracing::info!(
            documents = self.documents,
            skipped = self.skipped,
            values = self.values,
            distinct_values = self.tree.value_table().len(),
            locales = self.tree.locales().len(),
            nodes = self.tree.node_count(),
            "tree built"
        );
        self.tree
    }
}
