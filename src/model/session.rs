//! Resident model sessions

use crate::model::bundle::ModelBundle;
use crate::time::Timestamp;

/// One loaded character model resident in the pool.
///
/// A session exists in the pool iff `loaded` is true, and `last_used_at` is
/// monotonically non-decreasing while resident.
#[derive(Debug, Clone)]
pub struct ModelSession {
    /// Stable model identity
    pub id: String,
    /// Decoded bundle backing this session
    pub bundle: ModelBundle,
    /// Resident geometry + rig bytes
    pub memory_bytes: usize,
    /// Decoded texture bytes attributed to this session
    pub texture_bytes: usize,
    /// Last interaction, animation start or explicit touch
    pub last_used_at: Timestamp,
    /// Whether the session is resident
    pub loaded: bool,
}

impl ModelSession {
    /// Create a resident session from a decoded bundle
    pub fn new(id: impl Into<String>, bundle: ModelBundle, now: Timestamp) -> Self {
        let memory_bytes = bundle.memory_bytes;
        let texture_bytes = bundle.texture_bytes();
        Self {
            id: id.into(),
            bundle,
            memory_bytes,
            texture_bytes,
            last_used_at: now,
            loaded: true,
        }
    }

    /// Refresh `last_used_at`; stale stamps never move it backwards
    #[inline]
    pub fn touch(&mut self, now: Timestamp) {
        if now > self.last_used_at {
            self.last_used_at = now;
        }
    }
}
