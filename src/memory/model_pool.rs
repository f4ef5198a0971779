//! Bounded registry of resident model sessions.
//!
//! Capacity pressure evicts the least-recently-used session that is not
//! pinned to the surface; the idle sweep reclaims stale sessions even when
//! the pool is under capacity. Unloading a session always drops its texture
//! cache scope with it.

use std::collections::HashMap;
use std::time::Duration;

use log::{debug, info};
use serde::Serialize;

use crate::memory::texture_cache::TextureCache;
use crate::model::session::ModelSession;
use crate::time::Timestamp;

/// Pool statistics for dashboards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModelPoolStats {
    /// Number of resident sessions
    pub loaded_count: usize,
    /// Sum of resident geometry + rig bytes
    pub total_memory_bytes: usize,
    /// Sum of resident texture bytes
    pub total_texture_bytes: usize,
}

/// Bounded collection of loaded model sessions
#[derive(Debug)]
pub struct ModelPool {
    sessions: HashMap<String, ModelSession>,
    capacity: usize,
    active_id: Option<String>,
}

impl ModelPool {
    /// Create a pool with the given session capacity
    pub fn new(capacity: usize) -> Self {
        Self {
            sessions: HashMap::new(),
            capacity: capacity.max(1),
            active_id: None,
        }
    }

    /// Admit a session, evicting the least-recently-used non-active resident
    /// if the pool is full. Returns the ids unloaded to make room.
    ///
    /// When every resident is pinned (capacity 1 during a hot swap) the
    /// outgoing active session is unloaded synchronously before admission.
    /// Re-registering a resident id replaces it in place without eviction.
    pub fn register(&mut self, session: ModelSession, textures: &mut TextureCache) -> Vec<String> {
        let mut evicted = Vec::new();

        if self.sessions.contains_key(&session.id) {
            debug!("model pool: replacing resident session {}", session.id);
            self.sessions.insert(session.id.clone(), session);
            return evicted;
        }

        while self.sessions.len() >= self.capacity {
            let victim = self.lru_victim();
            match victim {
                Some(id) => {
                    info!("model pool: evicting {} for {}", id, session.id);
                    self.unload(&id, textures);
                    evicted.push(id);
                }
                None => {
                    // All residents pinned: only possible with capacity 1
                    // during a hot swap. The outgoing active goes first.
                    let Some(active) = self.active_id.clone() else {
                        break;
                    };
                    info!("model pool: hot swap unloading active {}", active);
                    self.unload(&active, textures);
                    evicted.push(active);
                }
            }
        }

        debug!("model pool: registered {}", session.id);
        self.sessions.insert(session.id.clone(), session);
        evicted
    }

    /// Refresh a session's recency; returns `false` for unknown ids
    pub fn touch(&mut self, id: &str, now: Timestamp) -> bool {
        match self.sessions.get_mut(id) {
            Some(session) => {
                session.touch(now);
                true
            }
            None => false,
        }
    }

    /// Unload a session, clearing its texture cache scope. Idempotent;
    /// returns `false` if the id was not resident.
    pub fn unload(&mut self, id: &str, textures: &mut TextureCache) -> bool {
        match self.sessions.remove(id) {
            Some(mut session) => {
                session.loaded = false;
                textures.clear_scope(id);
                if self.active_id.as_deref() == Some(id) {
                    self.active_id = None;
                }
                info!("model pool: unloaded {}", id);
                true
            }
            None => false,
        }
    }

    /// Unload every resident, non-active session idle for longer than
    /// `idle_after`. Returns the unloaded ids. Runs independent of capacity
    /// pressure.
    pub fn sweep_idle(
        &mut self,
        now: Timestamp,
        idle_after: Duration,
        textures: &mut TextureCache,
    ) -> Vec<String> {
        let threshold = Timestamp::from(idle_after);
        let stale: Vec<String> = self
            .sessions
            .values()
            .filter(|session| {
                self.active_id.as_deref() != Some(session.id.as_str())
                    && now.since(session.last_used_at) > threshold
            })
            .map(|session| session.id.clone())
            .collect();

        for id in &stale {
            info!("model pool: idle sweep reclaiming {}", id);
            self.unload(id, textures);
        }
        stale
    }

    /// Pin a session to the surface; `None` unpins. The pinned session is
    /// skipped by LRU eviction and the idle sweep.
    pub fn set_active(&mut self, id: Option<String>) {
        self.active_id = id;
    }

    /// Currently pinned session id
    #[inline]
    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    /// Get a resident session
    #[inline]
    pub fn get(&self, id: &str) -> Option<&ModelSession> {
        self.sessions.get(id)
    }

    /// Get a resident session mutably
    #[inline]
    pub fn get_mut(&mut self, id: &str) -> Option<&mut ModelSession> {
        self.sessions.get_mut(id)
    }

    /// Whether an id is resident
    #[inline]
    pub fn contains(&self, id: &str) -> bool {
        self.sessions.contains_key(id)
    }

    /// Resident session ids
    pub fn session_ids(&self) -> Vec<&str> {
        self.sessions.keys().map(|s| s.as_str()).collect()
    }

    /// Pool statistics
    pub fn stats(&self) -> ModelPoolStats {
        ModelPoolStats {
            loaded_count: self.sessions.len(),
            total_memory_bytes: self.sessions.values().map(|s| s.memory_bytes).sum(),
            total_texture_bytes: self.sessions.values().map(|s| s.texture_bytes).sum(),
        }
    }

    /// Least-recently-used resident that is not pinned active
    fn lru_victim(&self) -> Option<String> {
        self.sessions
            .values()
            .filter(|session| self.active_id.as_deref() != Some(session.id.as_str()))
            .min_by_key(|session| (session.last_used_at, session.id.clone()))
            .map(|session| session.id.clone())
    }
}
