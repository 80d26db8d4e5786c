//! Rerank result cache
//!
//! Owned by the caller and handed to the two-stage matcher by reference, so
//! its lifetime, capacity and sharing are explicit. Keys are the query plus
//! the ordered stage-1 candidate ids; a different candidate set (for example
//! after an index rebuild) never hits a stale entry.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use lru::LruCache;

use crate::error::{MatchError, Result};

use super::two_stage::RerankedMatch;

/// Default number of cached result sets
pub const DEFAULT_CACHE_CAPACITY: usize = 10_000;

/// Query plus the ordered stage-1 candidate ids
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    query: String,
    candidate_ids: Vec<String>,
}

/// Cache key for a query against an ordered candidate set
pub fn cache_key<'a>(query: &str, candidate_ids: impl IntoIterator<Item = &'a str>) -> CacheKey {
    CacheKey {
        query: query.to_string(),
        candidate_ids: candidate_ids.into_iter().map(str::to_string).collect(),
    }
}

/// Thread-safe LRU cache of reranked result sets
pub struct RerankCache {
    entries: Mutex<LruCache<CacheKey, Vec<RerankedMatch>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl Default for RerankCache {
    fn default() -> Self {
        Self::new(NonZeroUsize::new(DEFAULT_CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN))
    }
}

impl RerankCache {
    /// Cache holding at most `capacity` result sets
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Cache with `capacity` result sets; zero is rounded up to one
    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN))
    }

    /// Look up a result set, marking it most recently used
    pub fn get(&self, key: &CacheKey) -> Result<Option<Vec<RerankedMatch>>> {
        let mut entries = self.entries.lock().map_err(|_| MatchError::CacheLock)?;
        let found = entries.get(key).cloned();

        if found.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        Ok(found)
    }

    /// Store a result set, evicting the least recently used one when full
    pub fn put(&self, key: CacheKey, results: Vec<RerankedMatch>) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|_| MatchError::CacheLock)?;
        entries.put(key, results);
        Ok(())
    }

    /// Number of cached result sets
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    /// True when nothing is cached
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of cached result sets
    pub fn capacity(&self) -> usize {
        self.entries
            .lock()
            .map(|e| e.cap().get())
            .unwrap_or(0)
    }

    /// Drop every entry; counters are kept
    pub fn clear(&self) -> Result<()> {
        self.entries.lock().map_err(|_| MatchError::CacheLock)?.clear();
        Ok(())
    }

    /// Lookups that found an entry
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Lookups that found nothing
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// hits / (hits + misses), 0.0 before the first lookup
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits();
        let total = hits + self.misses();
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }
}
