//! Parse result cache
//!
//! Parsing is deterministic per backend and statement text, so the command
//! tree (or the diagnostics) of a statement can be reused across calls with
//! different argument lists.

use crate::backend::Backend;
use cmdbridge_core::ParseResult;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Bounded concurrent cache of parse results with LRU eviction.
pub struct ParseCache {
    entries: DashMap<(Backend, String), CacheEntry>,
    max_size: usize,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

struct CacheEntry {
    result: Arc<ParseResult>,
    last_access: Instant,
}

impl ParseCache {
    /// A `max_size` of 0 disables caching: every lookup misses and nothing
    /// is stored.
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: DashMap::with_capacity(max_size),
            max_size,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    pub fn with_default_size() -> Self {
        Self::new(1000)
    }

    pub fn get(&self, backend: Backend, text: &str) -> Option<Arc<ParseResult>> {
        if let Some(mut entry) = self.entries.get_mut(&(backend, text.to_string())) {
            entry.last_access = Instant::now();
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(%backend, "parse cache hit");
            return Some(entry.result.clone());
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    pub fn insert(&self, backend: Backend, text: &str, result: Arc<ParseResult>) {
        if self.max_size == 0 {
            return;
        }

        let key = (backend, text.to_string());
        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_size {
            self.evict_lru();
        }

        self.entries.insert(
            key,
            CacheEntry {
                result,
                last_access: Instant::now(),
            },
        );
    }

    /// Cached result, or the result of `parse_fn` which is then cached.
    pub fn get_or_parse<F>(&self, backend: Backend, text: &str, parse_fn: F) -> Arc<ParseResult>
    where
        F: FnOnce(&str) -> ParseResult,
    {
        if let Some(result) = self.get(backend, text) {
            return result;
        }

        let result = Arc::new(parse_fn(text));
        self.insert(backend, text, result.clone());
        result
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    fn evict_lru(&self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|entry| entry.last_access)
            .map(|entry| entry.key().clone());

        if let Some(key) = oldest {
            self.entries.remove(&key);
            self.evictions.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            max_size: self.max_size,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}

impl Default for ParseCache {
    fn default() -> Self {
        Self::with_default_size()
    }
}

/// Cache statistics
#[derive(Debug, Clone, serde::Serialize)]
pub struct CacheStats {
    /// Current number of cached entries
    pub entries: usize,
    /// Maximum cache size
    pub max_size: usize,
    pub hits: u64,
    pub misses: u64,
    /// Number of entries evicted
    pub evictions: u64,
}

impl CacheStats {
    /// Hit rate as a percentage
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}
