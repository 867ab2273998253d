//! Process-wide statement caches.
//!
//! Every table owns one [`TableCache`] with three maps (insert, update, upsert) from a
//! column-set signature to the generated statement. Readers share a read lock; a miss
//! builds the statement without any lock held and publishes it after it executed
//! successfully. Guards never live across an `.await`.

use crate::trace::CACHE_TARGET;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Generated INSERT / upsert statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertStatement {
    pub sql: String,
    /// Columns bound as `$1..$n`, in order.
    pub value_columns: Vec<&'static str>,
    /// Columns read back from `RETURNING`, in order.
    pub returning_columns: Vec<&'static str>,
}

/// Generated `UPDATE ... WHERE pk` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateStatement {
    pub sql: String,
    /// SET columns followed by primary key columns, in bind order.
    pub value_columns: Vec<&'static str>,
}

/// A read-mostly map from cache key to statement.
#[derive(Debug)]
pub struct StatementCache<T> {
    name: &'static str,
    inner: RwLock<HashMap<String, Arc<T>>>,
}

impl<T> StatementCache<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            inner: RwLock::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &str) -> Option<Arc<T>> {
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let hit = map.get(key).cloned();
        tracing::trace!(
            target: CACHE_TARGET,
            cache = self.name,
            key,
            hit = hit.is_some(),
        );
        hit
    }

    /// Store `stmt` under `key` unless another caller got there first.
    pub fn insert(&self, key: String, stmt: Arc<T>) -> Arc<T> {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        map.entry(key).or_insert(stmt).clone()
    }

    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

/// The three statement caches of one table.
#[derive(Debug)]
pub struct TableCache {
    pub insert: StatementCache<InsertStatement>,
    pub update: StatementCache<UpdateStatement>,
    pub upsert: StatementCache<InsertStatement>,
}

impl TableCache {
    pub fn new() -> Self {
        Self {
            insert: StatementCache::new("insert"),
            update: StatementCache::new("update"),
            upsert: StatementCache::new("upsert"),
        }
    }

    pub fn clear(&self) {
        self.insert.clear();
        self.update.clear();
        self.upsert.clear();
    }
}

impl Default for TableCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a cache key from column lists, e.g. `name,ordnum.id`.
pub fn cache_key<S: AsRef<str>>(groups: &[&[S]]) -> String {
    let mut key = String::new();
    for (i, group) in groups.iter().enumerate() {
        if i > 0 {
            key.push('.');
        }
        for (j, col) in group.iter().enumerate() {
            if j > 0 {
                key.push(',');
            }
            key.push_str(col.as_ref());
        }
    }
    key
}
