use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Cache entry with its insertion time.
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_fresh(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.inserted_at) < ttl
    }
}

/// A TTL cache with a soft size bound.
///
/// Expired entries are only swept once the map grows past `max_entries`; this
/// is not an LRU, so a map full of fresh entries may exceed the bound until
/// they age out. Reads never return an expired entry.
#[derive(Debug)]
pub struct TtlCache<K, V> {
    entries: Mutex<HashMap<K, CacheEntry<V>>>,
    ttl: Duration,
    max_entries: usize,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            max_entries,
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    pub fn insert(&self, key: K, value: V) {
        self.insert_at(key, value, Instant::now());
    }

    pub(crate) fn get_at(&self, key: &K, now: Instant) -> Option<V> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(key)
            .filter(|entry| entry.is_fresh(now, self.ttl))
            .map(|entry| entry.value.clone())
    }

    pub(crate) fn insert_at(&self, key: K, value: V, now: Instant) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(
            key,
            CacheEntry {
                value,
                inserted_at: now,
            },
        );

        if entries.len() > self.max_entries {
            let ttl = self.ttl;
            entries.retain(|_, entry| entry.is_fresh(now, ttl));
        }
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_before_and_after_ttl() {
        let cache = TtlCache::new(Duration::from_secs(300), 10);
        let t0 = Instant::now();
        cache.insert_at("rice", 1, t0);

        assert_eq!(
            cache.get_at(&"rice", t0 + Duration::from_secs(299)),
            Some(1)
        );
        assert_eq!(cache.get_at(&"rice", t0 + Duration::from_secs(300)), None);
        assert_eq!(cache.get_at(&"beans", t0), None);
    }

    #[test]
    fn test_expired_entries_evicted_past_threshold() {
        let cache = TtlCache::new(Duration::from_secs(60), 2);
        let t0 = Instant::now();
        cache.insert_at("a", 1, t0);
        cache.insert_at("b", 2, t0);
        assert_eq!(cache.len(), 2);

        // third insert crosses the threshold once a and b are stale
        cache.insert_at("c", 3, t0 + Duration::from_secs(61));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get_at(&"c", t0 + Duration::from_secs(61)), Some(3));
    }

    #[test]
    fn test_fresh_entries_not_evicted() {
        let cache = TtlCache::new(Duration::from_secs(60), 2);
        let t0 = Instant::now();
        for (i, key) in ["a", "b", "c", "d"].into_iter().enumerate() {
            cache.insert_at(key, i, t0);
        }
        assert_eq!(cache.len(), 4);
    }

    #[test]
    fn test_concurrent_inserts() {
        let cache = std::sync::Arc::new(TtlCache::new(Duration::from_secs(60), 1000));
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = cache.clone();
                std::thread::spawn(move || {
                    for i in 0..50 {
                        cache.insert(t * 100 + i, i);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(cache.len(), 400);
    }
}
