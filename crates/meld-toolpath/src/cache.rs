//! LRU cache for loaded toolpaths.
//!
//! Interactive views reload the same dataset over and over (every colour or
//! LOD change re-enters the mesh pipeline). The cache keeps parsed tables
//! keyed by [`Fingerprint`] so repeated loads skip parsing.
//!
//! Eviction is strict least-recently-used by access: a `get` hit refreshes an
//! entry just like an insert does. The cache holds no lock; callers sharing
//! it across threads wrap it in a `Mutex`.
//!
//! # Example
//! ```
//! use meld_toolpath::{Toolpath, ToolpathCache};
//!
//! let mut cache = ToolpathCache::new(2);
//! let json = r#"{"columns":{"XPos":[0.0,1.0]}}"#;
//! let first = cache.get_or_parse_json(json).unwrap();
//! let second = cache.get_or_parse_json(json).unwrap();
//! assert!(std::sync::Arc::ptr_eq(&first, &second));
//! assert_eq!(cache.stats().hits, 1);
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use log::trace;

use crate::error::Result;
use crate::{Fingerprint, Toolpath};

/// Default number of cached toolpaths.
pub const DEFAULT_CAPACITY: usize = 5;

/// Cache statistics for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    /// Number of cached tables.
    pub entries: usize,
    /// Lookups that found an entry.
    pub hits: usize,
    /// Lookups that did not.
    pub misses: usize,
    /// Entries dropped to stay within capacity.
    pub evictions: usize,
}

impl CacheStats {
    /// Hit rate between 0.0 and 1.0; 0.0 before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Fixed-capacity LRU cache of toolpath tables.
#[derive(Debug)]
pub struct ToolpathCache {
    capacity: usize,
    entries: HashMap<Fingerprint, Arc<Toolpath>>,
    /// Access order, oldest at the front.
    order: VecDeque<Fingerprint>,
    hits: usize,
    misses: usize,
    evictions: usize,
}

impl Default for ToolpathCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl ToolpathCache {
    /// Create a cache holding at most `capacity` tables (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: HashMap::with_capacity(capacity + 1),
            order: VecDeque::with_capacity(capacity + 1),
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of cached tables.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check for an entry without touching recency or statistics.
    pub fn contains(&self, key: &Fingerprint) -> bool {
        self.entries.contains_key(key)
    }

    /// Look up a table, marking it most recently used.
    pub fn get(&mut self, key: &Fingerprint) -> Option<Arc<Toolpath>> {
        match self.entries.get(key) {
            Some(table) => {
                let table = Arc::clone(table);
                self.hits += 1;
                self.touch(*key);
                Some(table)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Insert a table, evicting the least recently used entry if full.
    pub fn insert(&mut self, key: Fingerprint, table: Arc<Toolpath>) {
        if self.entries.insert(key, table).is_some() {
            self.touch(key);
            return;
        }
        self.order.push_back(key);
        while self.entries.len() > self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
            self.evictions += 1;
            trace!("evicted toolpath {oldest}");
        }
    }

    /// Return the cached table for `json`, parsing and caching it on a miss.
    ///
    /// Keyed by the fingerprint of the JSON text itself.
    pub fn get_or_parse_json(&mut self, json: &str) -> Result<Arc<Toolpath>> {
        let key = Fingerprint::of_str(json);
        if let Some(table) = self.get(&key) {
            return Ok(table);
        }
        let table = Arc::new(Toolpath::from_json(json)?);
        self.insert(key, Arc::clone(&table));
        Ok(table)
    }

    /// Drop all entries and reset statistics.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
        self.hits = 0;
        self.misses = 0;
        self.evictions = 0;
    }

    /// Current statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
        }
    }

    fn touch(&mut self, key: Fingerprint) {
        if let Some(pos) = self.order.iter().position(|k| *k == key) {
            self.order.remove(pos);
        }
        self.order.push_back(key);
    }
}
