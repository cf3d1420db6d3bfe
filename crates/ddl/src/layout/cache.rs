// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Concurrent LRU cache of computed struct layouts.
//!
//! Keyed by `(struct name, representation)`. Lookups take the write lock
//! since a hit refreshes LRU order. The owning `DataDefinition` invalidates
//! entries when a struct or one of its dependencies changes, and clears the
//! cache on configuration changes.

use super::{Representation, StructLayout};
use lru::LruCache;
use parking_lot::RwLock;
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct LayoutKey {
    name: String,
    representation: Representation,
}

impl LayoutKey {
    fn new(name: &str, representation: Representation) -> Self {
        Self {
            name: name.to_string(),
            representation,
        }
    }
}

/// Cache hit/miss statistics.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// LRU cache of `Arc<StructLayout>`.
pub struct LayoutCache {
    inner: RwLock<LruCache<LayoutKey, Arc<StructLayout>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl LayoutCache {
    /// Create a cache holding at most `capacity` layouts (minimum 1).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: RwLock::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn get(&self, name: &str, representation: Representation) -> Option<Arc<StructLayout>> {
        let key = LayoutKey::new(name, representation);
        let found = self.inner.write().get(&key).map(Arc::clone);
        if found.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        found
    }

    pub fn insert(&self, name: &str, representation: Representation, layout: Arc<StructLayout>) {
        self.inner
            .write()
            .put(LayoutKey::new(name, representation), layout);
    }

    /// Drop both representations of every named struct.
    pub fn invalidate<'a, I>(&self, names: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut cache = self.inner.write();
        for name in names {
            for representation in [Representation::Serialized, Representation::Deserialized] {
                if cache.pop(&LayoutKey::new(name, representation)).is_some() {
                    log::trace!(
                        "[LayoutCache::invalidate] dropped {} ({})",
                        name,
                        representation
                    );
                }
            }
        }
    }

    pub fn clear(&self) {
        self.inner.write().clear();
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, name: &str, representation: Representation) -> bool {
        self.inner
            .read()
            .contains(&LayoutKey::new(name, representation))
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}

impl fmt::Debug for LayoutCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutCache")
            .field("entries", &self.len())
            .field("capacity", &self.inner.read().cap())
            .finish()
    }
}
