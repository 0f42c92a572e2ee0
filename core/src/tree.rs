//! The interned path tree.
//!
//! One node per path segment, stored in an arena. A node holds its object
//! children by key, its array children by position and, for every locale that
//! has a value at this path, a `locale id → value id` pair. Strings live once
//! in the tree's two [`Interner`] tables.
//!
//! Parent links are arena indices. They are not serialized; loading relinks
//! them in one top-down pass and validates the arena on the way.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::{Interner, Locale, Path, PathError, PathSegment, StoreError};

/// Index of a node in a [`PathTree`]'s arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u32);

impl NodeId {
    /// The root node. Every tree has one.
    pub const ROOT: Self = Self(0);

    /// Position in the arena.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Node {
    #[serde(skip)]
    parent: Option<NodeId>,
    keyed: BTreeMap<String, NodeId>,
    indexed: Vec<NodeId>,
    /// locale id → value id
    values: BTreeMap<u32, u32>,
}

impl Node {
    fn with_parent(parent: NodeId) -> Self {
        Self {
            parent: Some(parent),
            ..Self::default()
        }
    }

    fn children(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.keyed.values().chain(self.indexed.iter()).copied()
    }
}

/// Per-document state for [`PathTree::add_document`].
struct FoldState<'a> {
    locale: &'a Locale,
    /// Set when the first leaf is recorded.
    locale_id: Option<u32>,
    added: usize,
}

/// Compact storage for (locale, path, value) triples.
///
/// Built by a single writer through [`add`](Self::add) and
/// [`add_document`](Self::add_document); read-only afterwards.
///
/// # Example
///
/// ```
/// use loca::{Locale, PathTree};
///
/// let en = Locale::new("en");
/// let fr = Locale::new("fr");
///
/// let mut tree = PathTree::new();
/// tree.add(&en, "a.b.c", "x").unwrap();
/// tree.add(&fr, "a.b.c", "x").unwrap();
///
/// let node = tree.select("a.b.c").unwrap().unwrap();
/// assert_eq!(node.value(&en).unwrap(), Some("x"));
/// assert_eq!(tree.value_table().len(), 1);
///
/// let bytes = tree.to_bytes().unwrap();
/// assert_eq!(PathTree::from_bytes(&bytes).unwrap(), tree);
/// ```
#[derive(Debug, Clone)]
pub struct PathTree {
    nodes: Vec<Node>,
    values: Interner<String>,
    locales: Interner<Locale>,
}

impl Default for PathTree {
    fn default() -> Self {
        Self::new()
    }
}

impl PathTree {
    /// An empty tree: just the root.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::default()],
            values: Interner::new("value"),
            locales: Interner::new("locale"),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Building
    // ═══════════════════════════════════════════════════════════════════════

    /// Record `value` for `locale` at `path`, creating nodes as needed.
    ///
    /// Index segments past the end of an array pad it with empty nodes.
    /// Adding the same `(locale, path)` twice keeps the last value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Path`] for a malformed path and
    /// [`StoreError::CapacityExceeded`] if a table runs out of ids.
    pub fn add(&mut self, locale: &Locale, path: &str, value: &str) -> Result<NodeId, StoreError> {
        let path = Path::parse(path)?;
        self.add_path(locale, &path, value)
    }

    /// Like [`add`](Self::add), with an already-parsed path.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::CapacityExceeded`] if a table runs out of ids.
    pub fn add_path(
        &mut self,
        locale: &Locale,
        path: &Path,
        value: &str,
    ) -> Result<NodeId, StoreError> {
        let locale_id = self.locales.intern(locale)?;
        let mut node = NodeId::ROOT;
        for segment in path {
            node = match segment {
                PathSegment::Key(key) => self.key_child(node, key)?,
                PathSegment::Index(index) => self.index_child(node, *index)?,
            };
        }
        self.record(node, locale_id, value)?;
        Ok(node)
    }

    /// Fold every scalar leaf of `document` into the tree under `locale`.
    ///
    /// Strings are stored verbatim, numbers and booleans in their JSON text
    /// form. `null` leaves are skipped. Returns the number of values recorded.
    /// The locale is only registered once its first value is recorded, so a
    /// document with no scalar leaves leaves [`locales`](Self::locales) as is.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::CapacityExceeded`] if a table runs out of ids.
    pub fn add_document(&mut self, locale: &Locale, document: &Value) -> Result<usize, StoreError> {
        let mut state = FoldState {
            locale,
            locale_id: None,
            added: 0,
        };
        self.fold(NodeId::ROOT, document, &mut state)?;
        tracing::trace!(locale = %locale, added = state.added, "document folded");
        Ok(state.added)
    }

    fn fold(
        &mut self,
        node: NodeId,
        value: &Value,
        state: &mut FoldState<'_>,
    ) -> Result<(), StoreError> {
        match value {
            Value::Null => {}
            Value::Bool(b) => self.fold_leaf(node, if *b { "true" } else { "false" }, state)?,
            Value::Number(n) => self.fold_leaf(node, &n.to_string(), state)?,
            Value::String(s) => self.fold_leaf(node, s, state)?,
            Value::Array(items) => {
                for (index, item) in items.iter().enumerate() {
                    let child = self.index_child(node, index)?;
                    self.fold(child, item, state)?;
                }
            }
            Value::Object(map) => {
                for (key, item) in map {
                    let child = self.key_child(node, key)?;
                    self.fold(child, item, state)?;
                }
            }
        }
        Ok(())
    }

    fn fold_leaf(
        &mut self,
        node: NodeId,
        value: &str,
        state: &mut FoldState<'_>,
    ) -> Result<(), StoreError> {
        let locale_id = match state.locale_id {
            Some(id) => id,
            None => {
                let id = self.locales.intern(state.locale)?;
                state.locale_id = Some(id);
                id
            }
        };
        self.record(node, locale_id, value)?;
        state.added += 1;
        Ok(())
    }

    fn record(&mut self, node: NodeId, locale_id: u32, value: &str) -> Result<(), StoreError> {
        let value_id = self.values.intern(value)?;
        let previous = self.nodes[node.index()].values.insert(locale_id, value_id);
        if previous.is_some_and(|p| p != value_id) {
            tracing::debug!(
                path = %self.node(node).map(|n| n.path()).unwrap_or_default(),
                locale_id,
                "overwriting value, last write wins"
            );
        }
        Ok(())
    }

    fn push_node(&mut self, parent: NodeId) -> Result<NodeId, StoreError> {
        let id = u32::try_from(self.nodes.len())
            .map_err(|_| StoreError::CapacityExceeded { table: "node" })?;
        self.nodes.push(Node::with_parent(parent));
        Ok(NodeId(id))
    }

    fn key_child(&mut self, parent: NodeId, key: &str) -> Result<NodeId, StoreError> {
        if let Some(&id) = self.nodes[parent.index()].keyed.get(key) {
            return Ok(id);
        }
        let id = self.push_node(parent)?;
        self.nodes[parent.index()].keyed.insert(key.to_owned(), id);
        Ok(id)
    }

    fn index_child(&mut self, parent: NodeId, index: usize) -> Result<NodeId, StoreError> {
        while self.nodes[parent.index()].indexed.len() <= index {
            let id = self.push_node(parent)?;
            self.nodes[parent.index()].indexed.push(id);
        }
        Ok(self.nodes[parent.index()].indexed[index])
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Reading
    // ═══════════════════════════════════════════════════════════════════════

    /// The root node.
    #[must_use]
    pub fn root(&self) -> NodeRef<'_> {
        NodeRef {
            tree: self,
            id: NodeId::ROOT,
        }
    }

    /// The node with id `id`, if it belongs to this tree.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<NodeRef<'_>> {
        (id.index() < self.nodes.len()).then_some(NodeRef { tree: self, id })
    }

    /// Number of nodes, root included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// The node at `path`, or `None` if there is none. The empty path is the root.
    ///
    /// # Errors
    ///
    /// Returns [`PathError`] if `path` is malformed.
    pub fn select(&self, path: &str) -> Result<Option<NodeRef<'_>>, PathError> {
        self.root().select(path)
    }

    /// The node at an already-parsed path.
    #[must_use]
    pub fn select_path(&self, path: &Path) -> Option<NodeRef<'_>> {
        self.root().select_path(path)
    }

    /// The value `node` holds for `locale`.
    ///
    /// `Ok(None)` means the node has no value for that locale.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownLocale`] if `locale` was never added to this
    /// tree and [`StoreError::UnknownNode`] if `node` is not in the arena.
    pub fn value_for(&self, node: NodeId, locale: &Locale) -> Result<Option<&str>, StoreError> {
        let node = self
            .nodes
            .get(node.index())
            .ok_or(StoreError::UnknownNode { id: node.0 })?;
        let locale_id = self.locale_id(locale)?;
        Ok(node
            .values
            .get(&locale_id)
            .and_then(|&value_id| self.values.get(value_id))
            .map(String::as_str))
    }

    /// [`select`](Self::select) followed by [`value_for`](Self::value_for).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Path`] for a malformed path and
    /// [`StoreError::UnknownLocale`] for a locale this tree has never seen.
    pub fn value(&self, path: &str, locale: &Locale) -> Result<Option<&str>, StoreError> {
        match self.select(path)? {
            Some(node) => self.value_for(node.id, locale),
            None => self.locale_id(locale).map(|_| None),
        }
    }

    /// Locales with data in this tree, in the order they were first added.
    #[must_use]
    pub fn locales(&self) -> &[Locale] {
        self.locales.keys()
    }

    /// The table of distinct values.
    #[must_use]
    pub fn value_table(&self) -> &Interner<String> {
        &self.values
    }

    /// The table of distinct locales.
    #[must_use]
    pub fn locale_table(&self) -> &Interner<Locale> {
        &self.locales
    }

    fn locale_id(&self, locale: &Locale) -> Result<u32, StoreError> {
        self.locales.id(locale).ok_or_else(|| StoreError::UnknownLocale {
            code: locale.code(),
        })
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Serialization
    // ═══════════════════════════════════════════════════════════════════════

    /// Encode the tree with `postcard`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Encode`] if serialization fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>, StoreError> {
        postcard::to_stdvec(&self.stored()).map_err(StoreError::Encode)
    }

    /// Decode a tree written by [`to_bytes`](Self::to_bytes).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Decode`] for bytes that are not a tree and
    /// [`StoreError::Corrupt`] for a tree whose structure is impossible.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StoreError> {
        let stored: StoredTree = postcard::from_bytes(bytes).map_err(StoreError::Decode)?;
        Self::try_from(stored)
    }

    fn stored(&self) -> StoredTreeRef<'_> {
        StoredTreeRef {
            nodes: &self.nodes,
            values: self.values.keys(),
            locales: self.locales.keys(),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Equality
    // ═══════════════════════════════════════════════════════════════════════

    fn same_node(&self, a: NodeId, other: &Self, b: NodeId) -> bool {
        let (a_node, b_node) = (&self.nodes[a.index()], &other.nodes[b.index()]);

        if a_node.keyed.len() != b_node.keyed.len()
            || a_node.indexed.len() != b_node.indexed.len()
            || a_node.values.len() != b_node.values.len()
        {
            return false;
        }

        let values_match = a_node.values.iter().all(|(&locale_id, &value_id)| {
            let theirs = self
                .locales
                .get(locale_id)
                .and_then(|locale| other.locales.id(locale))
                .and_then(|id| b_node.values.get(&id))
                .and_then(|&id| other.values.get(id));
            theirs.is_some() && theirs == self.values.get(value_id)
        });

        values_match
            && a_node.keyed.iter().all(|(key, &child)| {
                b_node
                    .keyed
                    .get(key)
                    .is_some_and(|&theirs| self.same_node(child, other, theirs))
            })
            && a_node
                .indexed
                .iter()
                .zip(&b_node.indexed)
                .all(|(&mine, &theirs)| self.same_node(mine, other, theirs))
    }
}

/// Equal interning tables (as sets) and equal node structure.
///
/// Node values are compared as `(locale, value)` pairs after translating ids
/// through each tree's own tables, so the order values were first seen in
/// does not matter.
impl PartialEq for PathTree {
    fn eq(&self, other: &Self) -> bool {
        self.values.len() == other.values.len()
            && self.locales.len() == other.locales.len()
            && self.values.keys().iter().all(|v| other.values.contains(v.as_str()))
            && self.locales.keys().iter().all(|l| other.locales.contains(l))
            && self.same_node(NodeId::ROOT, other, NodeId::ROOT)
    }
}

impl Eq for PathTree {}

// ═══════════════════════════════════════════════════════════════════════════════
// Stored form
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Serialize)]
struct StoredTreeRef<'a> {
    nodes: &'a [Node],
    values: &'a [String],
    locales: &'a [Locale],
}

#[derive(Deserialize)]
struct StoredTree {
    nodes: Vec<Node>,
    values: Vec<String>,
    locales: Vec<Locale>,
}

impl TryFrom<StoredTree> for PathTree {
    type Error = StoreError;

    /// Relink parents top-down and check the arena is a tree.
    fn try_from(stored: StoredTree) -> Result<Self, Self::Error> {
        let StoredTree {
            mut nodes,
            values,
            locales,
        } = stored;

        if nodes.is_empty() {
            return Err(corrupt("no root node"));
        }
        let values = Interner::from_keys("value", values)?;
        let locales = Interner::from_keys("locale", locales)?;

        let mut reached = vec![false; nodes.len()];
        reached[0] = true;
        let mut stack = vec![NodeId::ROOT];

        while let Some(id) = stack.pop() {
            let node = &nodes[id.index()];
            for (&locale_id, &value_id) in &node.values {
                if locales.get(locale_id).is_none() || values.get(value_id).is_none() {
                    return Err(corrupt(format!(
                        "node {id} maps locale {locale_id} to value {value_id}, outside the tables"
                    )));
                }
            }

            let children: Vec<NodeId> = node.children().collect();
            for child in children {
                let slot = reached
                    .get_mut(child.index())
                    .ok_or_else(|| corrupt(format!("node {id} has out-of-range child {child}")))?;
                if *slot {
                    return Err(corrupt(format!("node {child} is reachable twice")));
                }
                *slot = true;
                nodes[child.index()].parent = Some(id);
                stack.push(child);
            }
        }

        if let Some(orphan) = reached.iter().position(|r| !r) {
            return Err(corrupt(format!("node #{orphan} is unreachable from the root")));
        }

        Ok(Self {
            nodes,
            values,
            locales,
        })
    }
}

fn corrupt(reason: impl Into<String>) -> StoreError {
    StoreError::Corrupt {
        reason: reason.into(),
    }
}

impl Serialize for PathTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.stored().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PathTree {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let stored = StoredTree::deserialize(deserializer)?;
        Self::try_from(stored).map_err(serde::de::Error::custom)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Node handles
// ═══════════════════════════════════════════════════════════════════════════════

/// A borrowed handle to one node of a [`PathTree`].
#[derive(Clone, Copy)]
pub struct NodeRef<'t> {
    tree: &'t PathTree,
    id: NodeId,
}

impl<'t> NodeRef<'t> {
    /// This node's id in its tree's arena.
    #[must_use]
    pub fn id(self) -> NodeId {
        self.id
    }

    fn node(self) -> &'t Node {
        &self.tree.nodes[self.id.index()]
    }

    fn at(self, id: NodeId) -> Self {
        Self {
            tree: self.tree,
            id,
        }
    }

    /// The containing node; `None` for the root.
    #[must_use]
    pub fn parent(self) -> Option<Self> {
        self.node().parent.map(|id| self.at(id))
    }

    /// Returns `true` for the root.
    #[must_use]
    pub fn is_root(self) -> bool {
        self.id == NodeId::ROOT
    }

    /// Ancestors, nearest first, ending at the root.
    pub fn ancestors(self) -> impl Iterator<Item = NodeRef<'t>> {
        std::iter::successors(self.parent(), |n| n.parent())
    }

    /// This node, then its ancestors.
    pub fn ancestors_and_self(self) -> impl Iterator<Item = NodeRef<'t>> {
        std::iter::successors(Some(self), |n| n.parent())
    }

    /// The key this node sits under, if its parent holds it as an object member.
    #[must_use]
    pub fn key(self) -> Option<&'t str> {
        let parent = self.parent()?.node();
        parent
            .keyed
            .iter()
            .find(|(_, &id)| id == self.id)
            .map(|(key, _)| key.as_str())
    }

    /// The position of this node, if its parent holds it as an array element.
    #[must_use]
    pub fn index(self) -> Option<usize> {
        let parent = self.parent()?.node();
        parent.indexed.iter().position(|&id| id == self.id)
    }

    /// The path from the root to this node.
    #[must_use]
    pub fn path(self) -> Path {
        let mut segments: Vec<PathSegment> = self
            .ancestors_and_self()
            .filter(|n| !n.is_root())
            .map(|n| match n.index() {
                Some(index) => PathSegment::Index(index),
                None => PathSegment::Key(n.key().unwrap_or_default().to_owned()),
            })
            .collect();
        segments.reverse();
        segments.into_iter().collect()
    }

    /// The object member `key`.
    #[must_use]
    pub fn child(self, key: &str) -> Option<Self> {
        self.node().keyed.get(key).map(|&id| self.at(id))
    }

    /// The array element at `index`.
    #[must_use]
    pub fn element(self, index: usize) -> Option<Self> {
        self.node().indexed.get(index).map(|&id| self.at(id))
    }

    /// Object members, ordered by key.
    pub fn children(self) -> impl Iterator<Item = (&'t str, NodeRef<'t>)> {
        self.node()
            .keyed
            .iter()
            .map(move |(key, &id)| (key.as_str(), self.at(id)))
    }

    /// Array elements, in position order.
    pub fn elements(self) -> impl Iterator<Item = NodeRef<'t>> {
        self.node().indexed.iter().map(move |&id| self.at(id))
    }

    /// Returns `true` if the node has neither members nor elements.
    #[must_use]
    pub fn is_leaf(self) -> bool {
        let node = self.node();
        node.keyed.is_empty() && node.indexed.is_empty()
    }

    /// The node at `path` relative to this one.
    ///
    /// # Errors
    ///
    /// Returns [`PathError`] if `path` is malformed.
    pub fn select(self, path: &str) -> Result<Option<Self>, PathError> {
        let path = Path::parse(path)?;
        Ok(self.select_path(&path))
    }

    /// The node at an already-parsed relative path.
    #[must_use]
    pub fn select_path(self, path: &Path) -> Option<Self> {
        path.iter().try_fold(self, |node, segment| match segment {
            PathSegment::Key(key) => node.child(key),
            PathSegment::Index(index) => node.element(*index),
        })
    }

    /// The value this node holds for `locale`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownLocale`] if the tree has never seen `locale`.
    pub fn value(self, locale: &Locale) -> Result<Option<&'t str>, StoreError> {
        self.tree.value_for(self.id, locale)
    }

    /// Locales that have a value at this node.
    pub fn locales(self) -> impl Iterator<Item = &'t Locale> {
        let tree = self.tree;
        self.node()
            .values
            .keys()
            .filter_map(move |&id| tree.locales.get(id))
    }

    /// `(locale, value)` pairs held at this node.
    pub fn values(self) -> impl Iterator<Item = (&'t Locale, &'t str)> {
        let tree = self.tree;
        self.node().values.iter().filter_map(move |(&l, &v)| {
            Some((tree.locales.get(l)?, tree.values.get(v)?.as_str()))
        })
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for NodeRef<'_> {}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id)
            .field("path", &self.path().to_string())
            .finish()
    }
}
