//! Parsed-document cache for the file-system repository
//!
//! Templates and assignments are cached separately, keyed by id. Each kind has
//! its own lock, and its entry count is written while that lock is held.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// How long parsed documents are kept, and how many of each kind
#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfig {
    pub enabled: bool,
    pub ttl: Duration,
    /// Per document kind; `None` is unbounded. The earliest loaded entry is evicted first.
    pub capacity: Option<usize>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl: Duration::from_secs(300),
            capacity: Some(1000),
        }
    }
}

impl CacheConfig {
    /// Every load reads the file
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_capacity(mut self, capacity: Option<usize>) -> Self {
        self.capacity = capacity;
        self
    }
}

/// Lookup counters of a caching repository
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Cached templates plus cached assignments
    pub entries: usize,
}

impl CacheStats {
    /// Share of lookups answered from the cache, 0.0 before the first lookup
    pub fn hit_rate(&self) -> f64 {
        match self.hits + self.misses {
            0 => 0.0,
            lookups => self.hits as f64 / lookups as f64,
        }
    }
}

struct Entry<T> {
    document: T,
    loaded_at: Instant,
}

impl<T> Entry<T> {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.loaded_at.elapsed() <= ttl
    }
}

/// Documents of one kind keyed by id
pub(crate) struct DocumentCache<T> {
    entries: RwLock<HashMap<String, Entry<T>>>,
    count: AtomicUsize,
}

impl<T: Clone> DocumentCache<T> {
    pub(crate) fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            count: AtomicUsize::new(0),
        }
    }

    /// Copy of the document under `key` if it was loaded within `ttl`
    pub(crate) async fn get(&self, key: &str, ttl: Duration) -> Option<T> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.is_fresh(ttl))
            .map(|entry| entry.document.clone())
    }

    /// Store a freshly parsed document, dropping stale entries and evicting the
    /// earliest loaded ones once `capacity` is reached
    pub(crate) async fn insert(&self, key: &str, document: T, config: &CacheConfig) {
        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| entry.is_fresh(config.ttl));

        let capacity = config.capacity.unwrap_or(usize::MAX);
        if capacity > 0 {
            while entries.len() >= capacity && !entries.contains_key(key) {
                let Some(earliest) = entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.loaded_at)
                    .map(|(id, _)| id.clone())
                else {
                    break;
                };
                entries.remove(&earliest);
            }
            entries.insert(
                key.to_string(),
                Entry {
                    document,
                    loaded_at: Instant::now(),
                },
            );
        }

        self.count.store(entries.len(), Ordering::Relaxed);
    }

    pub(crate) async fn remove(&self, key: &str) -> bool {
        let mut entries = self.entries.write().await;
        let removed = entries.remove(key).is_some();
        self.count.store(entries.len(), Ordering::Relaxed);
        removed
    }

    pub(crate) async fn clear(&self) {
        let mut entries = self.entries.write().await;
        entries.clear();
        self.count.store(0, Ordering::Relaxed);
    }

    /// Entry count as of the last write
    pub(crate) fn entry_count(&self) -> usize {
        self.count.load(Ordering::Relaxed)
    }
}
