// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Query cache with snapshot/apply/rollback primitives.
//!
//! Keys carry a `scope` (the logical collection, e.g. "meals") and a
//! `params` discriminator (e.g. user + time range). Optimistic
//! mutations apply to every cached entry of a scope, so the change is
//! visible no matter which query a view is reading. A snapshot taken
//! before the mutation restores the exact prior state on failure,
//! including entries created after the snapshot was taken.

use dashmap::DashMap;

/// Identity of one cached query result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub scope: String,
    pub params: String,
}

impl QueryKey {
    pub fn new(scope: impl Into<String>, params: impl Into<String>) -> QueryKey {
        QueryKey {
            scope: scope.into(),
            params: params.into(),
        }
    }
}

#[derive(Debug, Clone)]
struct Entry<T> {
    value: T,
    /// Stale entries are kept (views can still render them) but a
    /// read-through fetch replaces them.
    fresh: bool,
}

/// State of one scope at a point in time, for rollback.
pub struct CacheSnapshot<T> {
    scope: String,
    entries: Vec<(QueryKey, Entry<T>)>,
}

/// Concurrent cache of query results, one value type per cache.
pub struct QueryCache<T> {
    entries: DashMap<QueryKey, Entry<T>>,
}

impl<T: Clone> QueryCache<T> {
    pub fn new() -> QueryCache<T> {
        QueryCache {
            entries: DashMap::new(),
        }
    }

    /// Store a fresh result.
    pub fn put(&self, key: QueryKey, value: T) {
        self.entries.insert(key, Entry { value, fresh: true });
    }

    /// The cached value, only if it has not been invalidated.
    pub fn get_fresh(&self, key: &QueryKey) -> Option<T> {
        self.entries
            .get(key)
            .filter(|entry| entry.fresh)
            .map(|entry| entry.value.clone())
    }

    /// The cached value regardless of freshness.
    pub fn peek(&self, key: &QueryKey) -> Option<T> {
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    /// Mutate every cached entry of a scope in place.
    pub fn apply<F>(&self, scope: &str, mut f: F)
    where
        F: FnMut(&QueryKey, &mut T),
    {
        for mut entry in self.entries.iter_mut() {
            if entry.key().scope == scope {
                let key = entry.key().clone();
                f(&key, &mut entry.value_mut().value);
            }
        }
    }

    /// Capture a scope's current state.
    pub fn snapshot(&self, scope: &str) -> CacheSnapshot<T> {
        let entries = self
            .entries
            .iter()
            .filter(|entry| entry.key().scope == scope)
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        CacheSnapshot {
            scope: scope.to_string(),
            entries,
        }
    }

    /// Restore a scope to a snapshot, dropping any entries created
    /// after it was taken.
    pub fn rollback(&self, snapshot: CacheSnapshot<T>) {
        self.entries.retain(|key, _| key.scope != snapshot.scope);
        for (key, entry) in snapshot.entries {
            self.entries.insert(key, entry);
        }
    }

    /// Mark every entry of a scope stale. Values are kept so views can
    /// keep rendering them until the next fetch.
    pub fn invalidate(&self, scope: &str) {
        for mut entry in self.entries.iter_mut() {
            if entry.key().scope == scope {
                entry.value_mut().fresh = false;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: Clone> Default for QueryCache<T> {
    fn default() -> QueryCache<T> {
        QueryCache::new()
    }
}
