/// Epoch-stamped map from a state-vector key to a cached native object
///
/// Every entry carries the epoch of its most recent use. Entries are never
/// evicted on insertion; the owner sweeps them with `evict_expired` once per
/// submitted command buffer and decides whether to destroy or recycle them.

use rustc_hash::FxHashMap;
use std::hash::Hash;

/// Cached value and the epoch it was last used in
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    pub last_used: u64,
}

/// Returns true once an object last used at `last_used` can no longer be
/// referenced by in-flight GPU work
///
/// # Arguments
///
/// * `last_used` - Epoch tag of the object
/// * `epoch` - Current epoch
/// * `max_age` - Eviction window, in epochs
#[inline]
pub fn is_expired(last_used: u64, epoch: u64, max_age: u64) -> bool {
    last_used.saturating_add(max_age) < epoch
}

/// Map of cached objects keyed by value type `K`
#[derive(Debug)]
pub struct ResourcePool<K, V> {
    entries: FxHashMap<K, CacheEntry<V>>,
}

impl<K: Copy + Eq + Hash, V> Default for ResourcePool<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Copy + Eq + Hash, V> ResourcePool<K, V> {
    pub fn new() -> Self {
        Self {
            entries: FxHashMap::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &K) -> Option<&CacheEntry<V>> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut CacheEntry<V>> {
        self.entries.get_mut(key)
    }

    /// Refresh the timestamp of `key` and return its value
    pub fn touch(&mut self, key: &K, epoch: u64) -> Option<&mut V> {
        self.entries.get_mut(key).map(|entry| {
            entry.last_used = epoch;
            &mut entry.value
        })
    }

    /// Insert a freshly created object, stamped with `epoch`
    pub fn insert(&mut self, key: K, value: V, epoch: u64) {
        let previous = self.entries.insert(key, CacheEntry { value, last_used: epoch });
        debug_assert!(previous.is_none(), "cache entry inserted twice");
    }

    /// True if at least one entry is past the eviction window
    pub fn has_expired(&self, epoch: u64, max_age: u64) -> bool {
        self.entries
            .values()
            .any(|entry| is_expired(entry.last_used, epoch, max_age))
    }

    /// Remove and return every entry past the eviction window
    pub fn evict_expired(&mut self, epoch: u64, max_age: u64) -> Vec<(K, CacheEntry<V>)> {
        let expired: Vec<K> = self
            .entries
            .iter()
            .filter(|(_, entry)| is_expired(entry.last_used, epoch, max_age))
            .map(|(key, _)| *key)
            .collect();

        expired
            .into_iter()
            .filter_map(|key| self.entries.remove(&key).map(|entry| (key, entry)))
            .collect()
    }

    /// Most recent timestamp of all entries
    pub fn max_last_used(&self) -> Option<u64> {
        self.entries.values().map(|entry| entry.last_used).max()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &CacheEntry<V>)> {
        self.entries.iter()
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut CacheEntry<V>> {
        self.entries.values_mut()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Remove every entry
    pub fn drain(&mut self) -> impl Iterator<Item = (K, CacheEntry<V>)> + '_ {
        self.entries.drain()
    }
}

#[cfg(test)]
#[path = "resource_pool_tests.rs"]
mod tests;
