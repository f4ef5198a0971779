//! Playback state for the active animation

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::animation::request::AnimationRequest;
use crate::time::Timestamp;

/// Playback status of the active animation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaybackStatus {
    /// Nothing is playing
    Idle,
    /// A clip is playing
    Playing,
    /// Playback is frozen
    Paused,
    /// Playback was stopped explicitly
    Stopped,
}

impl PlaybackStatus {
    /// Get the name of this status
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Playing => "playing",
            Self::Paused => "paused",
            Self::Stopped => "stopped",
        }
    }

    /// Check if a clip is actively playing
    #[inline]
    pub fn is_playing(&self) -> bool {
        matches!(self, Self::Playing)
    }

    /// Check if playback can be paused
    #[inline]
    pub fn can_pause(&self) -> bool {
        matches!(self, Self::Playing)
    }

    /// Check if playback can be resumed
    #[inline]
    pub fn can_resume(&self) -> bool {
        matches!(self, Self::Paused)
    }
}

/// The one active playback a session can have
#[derive(Debug, Clone)]
pub struct ActivePlayback {
    /// Playback handle identity
    pub id: Uuid,
    /// The request that started this playback
    pub request: AnimationRequest,
    /// Current status
    pub status: PlaybackStatus,
    /// When this playback (or its latest iteration/resume) began
    pub started_at: Timestamp,
    /// Completed iterations of the clip
    pub played_count: u32,
    /// Resolved clip duration from the model's catalog
    pub clip_duration: Timestamp,
    /// Elapsed playback accumulated before the last resume
    accumulated: Timestamp,
}

impl ActivePlayback {
    /// Start a new playback at `now`
    pub fn new(request: AnimationRequest, clip_duration: Timestamp, now: Timestamp) -> Self {
        Self {
            id: Uuid::new_v4(),
            request,
            status: PlaybackStatus::Playing,
            started_at: now,
            played_count: 0,
            clip_duration,
            accumulated: Timestamp::zero(),
        }
    }

    /// Wall time spent playing the current iteration
    pub fn elapsed(&self, now: Timestamp) -> Timestamp {
        match self.status {
            PlaybackStatus::Playing => self.accumulated + now.since(self.started_at),
            _ => self.accumulated,
        }
    }

    /// Progress through the current iteration in [0, 1], derived from
    /// elapsed time times the playback rate against the clip duration
    pub fn progress(&self, now: Timestamp) -> f64 {
        let duration_ms = self.clip_duration.as_millis();
        if duration_ms == 0 {
            return 1.0;
        }
        let scaled = self.elapsed(now).as_millis() as f64 * self.request.playback_rate;
        (scaled / duration_ms as f64).clamp(0.0, 1.0)
    }

    /// Whether the current iteration has run to its end
    #[inline]
    pub fn iteration_finished(&self, now: Timestamp) -> bool {
        self.progress(now) >= 1.0
    }

    /// Freeze playback, banking the elapsed time
    pub fn pause(&mut self, now: Timestamp) {
        if self.status.can_pause() {
            self.accumulated = self.elapsed(now);
            self.status = PlaybackStatus::Paused;
        }
    }

    /// Resume playback from where it was frozen
    pub fn resume(&mut self, now: Timestamp) {
        if self.status.can_resume() {
            self.started_at = now;
            self.status = PlaybackStatus::Playing;
        }
    }

    /// Begin the next iteration of the clip
    pub fn restart_iteration(&mut self, now: Timestamp) {
        self.started_at = now;
        self.accumulated = Timestamp::zero();
        self.status = PlaybackStatus::Playing;
    }
}

/// Read-only snapshot of the active playback for dashboards
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackSnapshot {
    pub id: Uuid,
    pub request: AnimationRequest,
    pub status: PlaybackStatus,
    pub started_at: Timestamp,
    pub played_count: u32,
    pub progress: f64,
}
