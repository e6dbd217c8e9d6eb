//! Bounded, key-addressed store of full-resolution preview sources.
//!
//! Keys have the form `{prefix}_{owner}_{node}`. Only writes refresh
//! recency; reads leave the eviction order untouched.

use crate::config::PreviewConfig;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tonegrade_core::limits::UNKNOWN_OWNER;
use tonegrade_core::{ImageBuffer, Result, TonegradeError};
use tracing::debug;

/// Shared handle passed to the apply and preview paths.
pub type SharedPreviewCache = Arc<PreviewCache>;

struct CacheEntry {
    image: Arc<ImageBuffer>,
    /// Owner and node the entry was written for. Keys alone cannot tell
    /// owner `W1` node `5_x` from owner `W1_5` node `x`.
    owner: String,
    node: String,
    /// Position in `order`.
    stamp: u64,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    /// Write order, oldest first.
    order: BTreeMap<u64, String>,
    next_stamp: u64,
}

impl CacheState {
    fn remove(&mut self, key: &str) -> Option<CacheEntry> {
        let entry = self.entries.remove(key)?;
        self.order.remove(&entry.stamp);
        Some(entry)
    }

    fn remove_where(&mut self, doomed: impl Fn(&CacheEntry) -> bool) -> usize {
        let keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| doomed(*entry))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &keys {
            self.remove(key);
        }
        keys.len()
    }
}

fn owner_or_unknown(owner_id: Option<&str>) -> &str {
    owner_id.filter(|o| !o.is_empty()).unwrap_or(UNKNOWN_OWNER)
}

/// LRU-bounded preview source cache.
///
/// `put` and `prune` hold the write lock for their whole
/// prune → insert → evict sequence, so `get` never sees a half-applied write.
pub struct PreviewCache {
    state: RwLock<CacheState>,
    max_items: usize,
    prefix: String,
}

impl PreviewCache {
    /// Create a cache using the configured capacity and key prefix.
    pub fn new(config: &PreviewConfig) -> Self {
        Self {
            state: RwLock::new(CacheState::default()),
            max_items: config.max_items.max(1),
            prefix: config.key_prefix.clone(),
        }
    }

    /// Create a cache with default settings and the given capacity.
    pub fn with_capacity(max_items: usize) -> Self {
        Self::new(&PreviewConfig {
            max_items,
            ..PreviewConfig::default()
        })
    }

    /// Wrap into a shareable handle.
    pub fn shared(self) -> SharedPreviewCache {
        Arc::new(self)
    }

    /// Derive the cache key for an owner/node pair.
    ///
    /// A missing or empty owner is replaced by a fixed placeholder.
    pub fn key_for(&self, owner_id: Option<&str>, node_id: &str) -> String {
        format!("{}_{}_{}", self.prefix, owner_or_unknown(owner_id), node_id)
    }

    /// Store a detached copy of `image` for the owner/node pair.
    ///
    /// Existing entries for the pair are removed first, as is an entry of
    /// another pair whose key spells the same string. The new entry becomes
    /// most recently used and the least recently written entry is evicted if
    /// the cache is over capacity. Returns the key for later lookups.
    pub fn put(&self, owner_id: Option<&str>, node_id: &str, image: &ImageBuffer) -> String {
        let owner = owner_or_unknown(owner_id);
        let key = self.key_for(owner_id, node_id);
        let image = Arc::new(image.clone());

        let mut state = self.state.write();
        let pruned = state.remove_where(|e| e.owner == owner && e.node == node_id);
        if let Some(shadowed) = state.remove(&key) {
            debug!(
                key = %key,
                owner = %shadowed.owner,
                node = %shadowed.node,
                "Replaced entry with colliding key"
            );
        }

        let stamp = state.next_stamp;
        state.next_stamp += 1;
        state.order.insert(stamp, key.clone());
        state.entries.insert(
            key.clone(),
            CacheEntry {
                image,
                owner: owner.to_string(),
                node: node_id.to_string(),
                stamp,
            },
        );

        while state.entries.len() > self.max_items {
            let Some((_, oldest)) = state.order.pop_first() else {
                break;
            };
            state.entries.remove(&oldest);
            debug!(key = %oldest, "Evicted preview source");
        }

        debug!(key = %key, pruned, entries = state.entries.len(), "Cached preview source");
        key
    }

    /// Look up a cached image. Does not refresh recency.
    pub fn get(&self, key: &str) -> Result<Arc<ImageBuffer>> {
        self.state
            .read()
            .entries
            .get(key)
            .map(|entry| Arc::clone(&entry.image))
            .ok_or_else(|| TonegradeError::NotFound(key.to_string()))
    }

    /// Remove every entry for the owner/node pair. Returns how many were removed.
    pub fn prune(&self, owner_id: Option<&str>, node_id: &str) -> usize {
        let owner = owner_or_unknown(owner_id);
        let removed = self
            .state
            .write()
            .remove_where(|e| e.owner == owner && e.node == node_id);
        if removed > 0 {
            debug!(owner, node = node_id, removed, "Pruned preview sources");
        }
        removed
    }

    /// Remove every entry belonging to an owner, e.g. when a session closes.
    pub fn prune_owner(&self, owner_id: &str) -> usize {
        let owner = owner_or_unknown(Some(owner_id));
        let removed = self.state.write().remove_where(|e| e.owner == owner);
        if removed > 0 {
            debug!(owner, removed, "Pruned owner preview sources");
        }
        removed
    }

    /// Check if a key is cached.
    pub fn contains(&self, key: &str) -> bool {
        self.state.read().entries.contains_key(key)
    }

    /// Number of cached images.
    pub fn len(&self) -> usize {
        self.state.read().entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.state.read().entries.is_empty()
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.max_items
    }

    /// Keys from least to most recently written.
    pub fn keys(&self) -> Vec<String> {
        self.state.read().order.values().cloned().collect()
    }

    /// Pixel memory held by cached images.
    pub fn memory_usage(&self) -> usize {
        self.state
            .read()
            .entries
            .values()
            .map(|e| e.image.memory_size())
            .sum()
    }

    /// Clear the entire cache.
    pub fn clear(&self) {
        let mut state = self.state.write();
        state.entries.clear();
        state.order.clear();
    }
}
