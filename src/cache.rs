//! Bounded FIFO caches
//!
//! Memoization for extraction and identifier results. Eviction is
//! oldest-inserted-first, irrespective of access recency: entries for
//! files a caller keeps re-reading still age out, which keeps the memory
//! bound exact under any access pattern.
//!
//! # Thread Safety
//!
//! A single `parking_lot::Mutex` guards each cache. Callers run one
//! document per outer worker, so the caches see concurrent read/insert
//! but are never a throughput bottleneck.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;
use std::path::Path;
use std::time::SystemTime;

use parking_lot::Mutex;

/// Cheap proxy key identifying "the same file" without hashing content
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileFingerprint {
    /// File size in bytes
    pub size: u64,
    /// Last modification time
    pub modified: SystemTime,
}

impl FileFingerprint {
    /// Compute the fingerprint for a file, if its metadata is readable.
    ///
    /// Returns `None` when the source is not file-backed or metadata is
    /// unavailable; callers then skip caching rather than fail.
    pub fn for_path(path: &Path) -> Option<Self> {
        let meta = std::fs::metadata(path).ok()?;
        let modified = meta.modified().ok()?;
        Some(Self {
            size: meta.len(),
            modified,
        })
    }
}

struct FifoInner<K, V> {
    map: HashMap<K, V>,
    order: VecDeque<K>,
}

/// Bounded cache with FIFO eviction
pub struct FifoCache<K, V> {
    inner: Mutex<FifoInner<K, V>>,
    capacity: usize,
}

impl<K, V> FifoCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create a cache holding at most `capacity` entries
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "cache capacity must be > 0");
        Self {
            inner: Mutex::new(FifoInner {
                map: HashMap::new(),
                order: VecDeque::new(),
            }),
            capacity,
        }
    }

    /// Look up a value by key
    pub fn get(&self, key: &K) -> Option<V> {
        let inner = self.inner.lock();
        inner.map.get(key).cloned()
    }

    /// Insert a value, evicting the oldest-inserted entry at capacity.
    ///
    /// Re-inserting an existing key updates the value without changing
    /// its insertion position.
    pub fn insert(&self, key: K, value: V) {
        let mut inner = self.inner.lock();
        if inner.map.insert(key.clone(), value).is_some() {
            return;
        }
        inner.order.push_back(key);
        if inner.order.len() > self.capacity {
            if let Some(oldest) = inner.order.pop_front() {
                inner.map.remove(&oldest);
            }
        }
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.inner.lock().map.len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of entries
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let cache: FifoCache<String, u32> = FifoCache::new(4);
        cache.insert("a".into(), 1);
        assert_eq!(cache.get(&"a".to_string()), Some(1));
        assert_eq!(cache.get(&"b".to_string()), None);
    }

    #[test]
    fn test_fifo_eviction_drops_first_inserted() {
        let cache: FifoCache<u32, u32> = FifoCache::new(3);
        for i in 0..4 {
            cache.insert(i, i * 10);
        }
        assert_eq!(cache.len(), 3);
        // First-inserted key is gone, regardless of recency
        assert_eq!(cache.get(&0), None);
        assert_eq!(cache.get(&1), Some(10));
        assert_eq!(cache.get(&3), Some(30));
    }

    #[test]
    fn test_eviction_ignores_access_recency() {
        let cache: FifoCache<u32, u32> = FifoCache::new(2);
        cache.insert(1, 1);
        cache.insert(2, 2);
        // Touch the oldest entry; FIFO must still evict it
        let _ = cache.get(&1);
        cache.insert(3, 3);
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.get(&2), Some(2));
    }

    #[test]
    fn test_reinsert_updates_without_duplicating() {
        let cache: FifoCache<u32, u32> = FifoCache::new(2);
        cache.insert(1, 1);
        cache.insert(1, 100);
        cache.insert(2, 2);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&1), Some(100));
    }

    #[test]
    fn test_capacity_never_exceeded() {
        let cache: FifoCache<u32, u32> = FifoCache::new(5);
        for i in 0..50 {
            cache.insert(i, i);
        }
        assert_eq!(cache.len(), 5);
    }

    #[test]
    fn test_fingerprint_for_missing_path() {
        assert!(FileFingerprint::for_path(Path::new("/no/such/file.pdf")).is_none());
    }

    #[test]
    fn test_fingerprint_for_real_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), b"hello").unwrap();
        let fp = FileFingerprint::for_path(file.path()).unwrap();
        assert_eq!(fp.size, 5);
    }
}
