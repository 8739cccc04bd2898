//! Memoizes pipeline results for identical inputs.

use crate::config::Config;
use crate::model::Snapshot;
use rustc_hash::{FxHashMap, FxHasher};
use serde::Serialize;
use std::collections::VecDeque;
use std::hash::Hasher;

/// Canonical JSON of a snapshot and config, with its digest. Field order is
/// fixed by the derived serializers, so equal inputs give equal keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKey {
    hash: u64,
    canonical: Vec<u8>,
}

impl CacheKey {
    pub fn hash(&self) -> u64 {
        self.hash
    }
}

pub fn snapshot_key(snapshot: &Snapshot, config: &Config) -> CacheKey {
    let mut canonical = Vec::new();
    write_json(&mut canonical, snapshot);
    canonical.push(0xff);
    write_json(&mut canonical, config);
    let mut hasher = FxHasher::default();
    hasher.write(&canonical);
    CacheKey {
        hash: hasher.finish(),
        canonical,
    }
}

fn write_json<T: Serialize>(out: &mut Vec<u8>, value: &T) {
    // Serializing plain data structs into a Vec cannot fail.
    let _ = serde_json::to_writer(&mut *out, value);
}

/// Bounded map with oldest-first eviction. Lookups compare the full
/// canonical key, so a digest collision is a miss, never a wrong hit.
#[derive(Debug, Clone)]
pub struct LayoutCache<V> {
    capacity: usize,
    entries: FxHashMap<u64, (Vec<u8>, V)>,
    order: VecDeque<u64>,
}

impl<V: Clone> LayoutCache<V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: FxHashMap::default(),
            order: VecDeque::new(),
        }
    }

    pub fn get(&self, key: &CacheKey) -> Option<V> {
        self.entries
            .get(&key.hash)
            .filter(|(canonical, _)| *canonical == key.canonical)
            .map(|(_, value)| value.clone())
    }

    /// Stores `value`, replacing any entry with the same digest.
    pub fn insert(&mut self, key: CacheKey, value: V) {
        let CacheKey { hash, canonical } = key;
        if self.entries.insert(hash, (canonical, value)).is_some() {
            return;
        }
        self.order.push_back(hash);
        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RawDevice;

    fn key(hash: u64, canonical: &str) -> CacheKey {
        CacheKey {
            hash,
            canonical: canonical.as_bytes().to_vec(),
        }
    }

    #[test]
    fn evicts_oldest_first() {
        let mut cache = LayoutCache::new(2);
        cache.insert(key(1, "a"), "a");
        cache.insert(key(2, "b"), "b");
        cache.insert(key(3, "c"), "c");
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&key(1, "a")), None);
        assert_eq!(cache.get(&key(3, "c")), Some("c"));
    }

    #[test]
    fn digest_collision_is_a_miss() {
        let mut cache = LayoutCache::new(4);
        cache.insert(key(7, "first snapshot"), "first");
        assert_eq!(cache.get(&key(7, "second snapshot")), None);
        assert_eq!(cache.get(&key(7, "first snapshot")), Some("first"));

        cache.insert(key(7, "second snapshot"), "second");
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&key(7, "first snapshot")), None);
        assert_eq!(cache.get(&key(7, "second snapshot")), Some("second"));
    }

    #[test]
    fn key_tracks_inputs() {
        let config = Config::default();
        let mut snapshot = Snapshot::default();
        let empty = snapshot_key(&snapshot, &config);
        assert_eq!(empty, snapshot_key(&Snapshot::default(), &config));

        snapshot.devices.push(RawDevice {
            id: Some(1),
            site_id: Some(1),
            ..RawDevice::default()
        });
        assert_ne!(empty.hash(), snapshot_key(&snapshot, &config).hash());

        let mut other = Config::default();
        other.layout.device_gap_x += 1.0;
        assert_ne!(empty, snapshot_key(&Snapshot::default(), &other));
    }
}
