//! Animation request types and priorities

use serde::{Deserialize, Serialize};

use crate::time::Timestamp;

/// Semantic category of an animation request.
///
/// The category is display metadata; scheduling depends only on the numeric
/// [`Priority`] a request carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationType {
    Idle,
    Tap,
    Drag,
    Greeting,
    Farewell,
    Thinking,
    Speaking,
    Happy,
    Surprised,
    Confused,
    Sleeping,
    Custom,
}

impl AnimationType {
    /// Display label for this category
    #[inline]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Tap => "tap",
            Self::Drag => "drag",
            Self::Greeting => "greeting",
            Self::Farewell => "farewell",
            Self::Thinking => "thinking",
            Self::Speaking => "speaking",
            Self::Happy => "happy",
            Self::Surprised => "surprised",
            Self::Confused => "confused",
            Self::Sleeping => "sleeping",
            Self::Custom => "custom",
        }
    }

    /// Priority a request of this category carries unless overridden
    #[inline]
    pub fn default_priority(&self) -> Priority {
        match self {
            Self::Idle | Self::Sleeping => Priority::IDLE,
            Self::Tap | Self::Drag => Priority::NORMAL,
            Self::Greeting
            | Self::Farewell
            | Self::Thinking
            | Self::Speaking
            | Self::Happy
            | Self::Surprised
            | Self::Confused
            | Self::Custom => Priority::HIGH,
        }
    }
}

/// Numeric animation priority, 1 (idle) through 4 (urgent).
///
/// A new request replaces the active playback only when its priority is at
/// least as high; ties go to the newcomer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Priority(u8);

impl Priority {
    pub const IDLE: Priority = Priority(1);
    pub const NORMAL: Priority = Priority(2);
    pub const HIGH: Priority = Priority(3);
    pub const URGENT: Priority = Priority(4);

    /// Create a priority, clamped into the 1..=4 range
    #[inline]
    pub fn new(level: u8) -> Self {
        Self(level.clamp(1, 4))
    }

    /// Numeric level
    #[inline]
    pub fn level(&self) -> u8 {
        self.0
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::NORMAL
    }
}

/// A request to play one animation clip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationRequest {
    /// Semantic category
    pub kind: AnimationType,
    /// Catalog group
    pub group: String,
    /// Clip index within the group
    pub index: usize,
    /// Scheduling priority
    pub priority: Priority,
    /// Loop indefinitely
    pub looped: bool,
    /// Number of times to play when not looping
    pub repeat_count: u32,
    /// Fade-in span handed to the renderer
    pub fade_in: Timestamp,
    /// Fade-out span applied when this playback is replaced
    pub fade_out: Timestamp,
    /// Playback rate multiplier
    pub playback_rate: f64,
}

impl AnimationRequest {
    /// Create a request with the category's default priority and no fades
    pub fn new(kind: AnimationType, group: impl Into<String>, index: usize) -> Self {
        Self {
            kind,
            group: group.into(),
            index,
            priority: kind.default_priority(),
            looped: false,
            repeat_count: 1,
            fade_in: Timestamp::zero(),
            fade_out: Timestamp::zero(),
            playback_rate: 1.0,
        }
    }

    /// Override the priority
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Loop indefinitely
    pub fn with_loop(mut self) -> Self {
        self.looped = true;
        self
    }

    /// Play the clip `count` times before completing
    pub fn with_repeat_count(mut self, count: u32) -> Self {
        self.repeat_count = count.max(1);
        self
    }

    /// Set fade-in and fade-out spans
    pub fn with_fades(mut self, fade_in: impl Into<Timestamp>, fade_out: impl Into<Timestamp>) -> Self {
        self.fade_in = fade_in.into();
        self.fade_out = fade_out.into();
        self
    }

    /// Set the playback rate; non-positive rates fall back to 1.0
    pub fn with_playback_rate(mut self, rate: f64) -> Self {
        self.playback_rate = if rate > 0.0 { rate } else { 1.0 };
        self
    }
}
