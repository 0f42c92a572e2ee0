//! Append-only interning tables.
//!
//! A table hands out `u32` ids in first-seen order and never forgets a key.
//! Ids are positions in the key list, so the list alone is enough to rebuild
//! the table after deserialization.
//!
//! Tables assume a single writer: the next id is the current length, which is
//! only sound while nothing else mutates the table.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use crate::StoreError;

/// A deduplicating table of keys with dense `u32` ids.
///
/// ```
/// use loca::Interner;
///
/// let mut values = Interner::new("value");
/// let a = values.intern("January").unwrap();
/// let b = values.intern("February").unwrap();
/// assert_eq!(values.intern("January").unwrap(), a);
/// assert_eq!(values.len(), 2);
/// assert_eq!(values.get(b).map(String::as_str), Some("February"));
/// ```
#[derive(Clone)]
pub struct Interner<K> {
    table: &'static str,
    keys: Vec<K>,
    ids: HashMap<K, u32>,
}

impl<K: Hash + Eq + Clone> Interner<K> {
    /// An empty table. `table` names it in errors.
    #[must_use]
    pub fn new(table: &'static str) -> Self {
        Self {
            table,
            keys: Vec::new(),
            ids: HashMap::new(),
        }
    }

    /// Rebuild a table from its keys in id order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Corrupt`] if a key repeats and
    /// [`StoreError::CapacityExceeded`] if there are more keys than ids.
    pub(crate) fn from_keys(table: &'static str, keys: Vec<K>) -> Result<Self, StoreError> {
        let mut ids = HashMap::with_capacity(keys.len());
        for (position, key) in keys.iter().enumerate() {
            let id = u32::try_from(position).map_err(|_| StoreError::CapacityExceeded { table })?;
            if ids.insert(key.clone(), id).is_some() {
                return Err(StoreError::Corrupt {
                    reason: format!("duplicate entry {position} in the {table} table"),
                });
            }
        }
        Ok(Self { table, keys, ids })
    }

    /// Id of `key`, inserting it if it is new.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::CapacityExceeded`] once `u32` ids run out.
    pub fn intern<Q>(&mut self, key: &Q) -> Result<u32, StoreError>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
    {
        if let Some(&id) = self.ids.get(key) {
            return Ok(id);
        }
        let id = u32::try_from(self.keys.len()).map_err(|_| StoreError::CapacityExceeded {
            table: self.table,
        })?;
        let owned = key.to_owned();
        self.keys.push(owned.clone());
        self.ids.insert(owned, id);
        Ok(id)
    }

    /// Id of `key` without inserting.
    #[must_use]
    pub fn id<Q>(&self, key: &Q) -> Option<u32>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.ids.get(key).copied()
    }

    /// The key with id `id`.
    #[must_use]
    pub fn get(&self, id: u32) -> Option<&K> {
        self.keys.get(id as usize)
    }

    /// Returns `true` if `key` has an id.
    #[must_use]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.ids.contains_key(key)
    }
}

impl<K> Interner<K> {
    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns `true` if nothing was interned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Keys in id order.
    #[must_use]
    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    /// `(id, key)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &K)> {
        // from_keys and intern never let the length pass u32::MAX.
        (0u32..).zip(self.keys.iter())
    }

    /// Which table this is, for error messages.
    #[must_use]
    pub fn table(&self) -> &'static str {
        self.table
    }
}

/// Equal when every key has the same id in both tables.
impl<K: PartialEq> PartialEq for Interner<K> {
    fn eq(&self, other: &Self) -> bool {
        self.keys == other.keys
    }
}

impl<K: Eq> Eq for Interner<K> {}

impl<K: fmt::Debug> fmt::Debug for Interner<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interner")
            .field("table", &self.table)
            .field("keys", &self.keys)
            .finish()
    }
}
