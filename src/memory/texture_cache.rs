//! Byte-budgeted texture cache with least-recently-used eviction.
//!
//! Keys are scoped per model (`<model_id>_<texture_name>`) so a whole model's
//! entries can be invalidated in one call when its session is unloaded.

use std::collections::HashMap;
use std::sync::Arc;

use log::debug;
use serde::Serialize;

use crate::time::Timestamp;

/// Separator between the owning model id and the texture name in cache keys
const SCOPE_SEPARATOR: char = '_';

/// Build the cache key for a texture owned by a model
#[inline]
pub fn scoped_key(model_id: &str, texture_name: &str) -> String {
    format!("{}{}{}", model_id, SCOPE_SEPARATOR, texture_name)
}

/// One cached texture
#[derive(Debug, Clone)]
pub struct TextureCacheEntry {
    /// Payload size in bytes
    pub bytes: usize,
    /// Last access
    pub last_used_at: Timestamp,
    /// Decoded texel data
    pub payload: Arc<[u8]>,
}

/// Cache statistics for dashboards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TextureCacheStats {
    /// Number of cached entries
    pub entry_count: usize,
    /// Sum of entry sizes in bytes
    pub total_bytes: usize,
    /// Configured byte budget
    pub capacity_bytes: usize,
}

/// Byte-budgeted key/payload cache.
///
/// After any mutating call the aggregate of all entries other than a single
/// oversized one stays within the configured capacity; eviction removes
/// entries in ascending `last_used_at` order.
#[derive(Debug)]
pub struct TextureCache {
    entries: HashMap<String, TextureCacheEntry>,
    capacity_bytes: usize,
    total_bytes: usize,
}

impl TextureCache {
    /// Create a cache with the given byte budget
    pub fn new(capacity_bytes: usize) -> Self {
        Self {
            entries: HashMap::new(),
            capacity_bytes,
            total_bytes: 0,
        }
    }

    /// Insert a payload, evicting least-recently-used entries until it fits.
    ///
    /// An entry larger than the whole budget is still admitted after the rest
    /// of the cache has been emptied; the budget is advisory for a single
    /// oversized payload and hard for the aggregate of everything else.
    pub fn put(
        &mut self,
        key: impl Into<String>,
        payload: Arc<[u8]>,
        bytes: usize,
        now: Timestamp,
    ) {
        let key = key.into();

        if let Some(previous) = self.entries.remove(&key) {
            self.total_bytes -= previous.bytes;
        }

        while self.total_bytes + bytes > self.capacity_bytes && !self.entries.is_empty() {
            self.evict_oldest();
        }

        self.total_bytes += bytes;
        self.entries.insert(
            key,
            TextureCacheEntry {
                bytes,
                last_used_at: now,
                payload,
            },
        );
    }

    /// Look up a payload, refreshing its recency on hit. Never populates on
    /// miss; filling the cache is the caller's responsibility.
    pub fn get(&mut self, key: &str, now: Timestamp) -> Option<Arc<[u8]>> {
        let entry = self.entries.get_mut(key)?;
        if now > entry.last_used_at {
            entry.last_used_at = now;
        }
        Some(Arc::clone(&entry.payload))
    }

    /// Whether a key is cached, without refreshing recency
    #[inline]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Remove every entry owned by a model. The linear scan is fine here:
    /// entry count is bounded by pool capacity times textures per model.
    pub fn clear_scope(&mut self, model_id: &str) -> usize {
        let prefix = format!("{}{}", model_id, SCOPE_SEPARATOR);
        let doomed: Vec<String> = self
            .entries
            .keys()
            .filter(|key| key.starts_with(&prefix))
            .cloned()
            .collect();

        for key in &doomed {
            if let Some(entry) = self.entries.remove(key) {
                self.total_bytes -= entry.bytes;
            }
        }

        if !doomed.is_empty() {
            debug!(
                "texture cache: cleared {} entries for model {}",
                doomed.len(),
                model_id
            );
        }
        doomed.len()
    }

    /// Cache statistics
    #[inline]
    pub fn stats(&self) -> TextureCacheStats {
        TextureCacheStats {
            entry_count: self.entries.len(),
            total_bytes: self.total_bytes,
            capacity_bytes: self.capacity_bytes,
        }
    }

    fn evict_oldest(&mut self) {
        // Key as a tiebreaker keeps eviction deterministic for equal stamps.
        let victim = self
            .entries
            .iter()
            .min_by_key(|(key, entry)| (entry.last_used_at, key.as_str()))
            .map(|(key, _)| key.clone());

        if let Some(key) = victim {
            if let Some(entry) = self.entries.remove(&key) {
                self.total_bytes -= entry.bytes;
                debug!("texture cache: evicted {} ({} bytes)", key, entry.bytes);
            }
        }
    }
}
