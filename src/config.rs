//! Viewer runtime configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ViewerError;

/// Returns the default model pool capacity.
fn default_max_loaded_models() -> usize {
    3
}

/// Returns the default texture cache budget (100 MiB).
fn default_texture_cache_bytes() -> usize {
    100 * 1024 * 1024
}

/// Returns the default idle-unload threshold in seconds.
fn default_idle_unload_seconds() -> u64 {
    300
}

/// Returns the default idle sweep interval in milliseconds.
fn default_idle_sweep_interval_ms() -> u64 {
    60_000
}

fn default_enable_auto_idle_animation() -> bool {
    true
}

/// Returns the default auto-idle animation interval in milliseconds.
fn default_idle_animation_interval_ms() -> u64 {
    10_000
}

/// Returns the default surface health check interval in milliseconds.
fn default_recovery_check_interval_ms() -> u64 {
    30_000
}

/// Configurable settings for the viewer runtime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Maximum number of resident model sessions
    #[serde(default = "default_max_loaded_models")]
    pub max_loaded_models: usize,
    /// Texture cache byte budget
    #[serde(default = "default_texture_cache_bytes")]
    pub texture_cache_bytes: usize,
    /// Seconds of inactivity before a non-active session is reclaimed
    #[serde(default = "default_idle_unload_seconds")]
    pub idle_unload_seconds: u64,
    /// Interval between idle sweep runs, in milliseconds
    #[serde(default = "default_idle_sweep_interval_ms")]
    pub idle_sweep_interval_ms: u64,
    /// Whether the scheduler self-triggers idle animations
    #[serde(default = "default_enable_auto_idle_animation")]
    pub enable_auto_idle_animation: bool,
    /// Interval between self-triggered idle animations, in milliseconds
    #[serde(default = "default_idle_animation_interval_ms")]
    pub idle_animation_interval_ms: u64,
    /// Interval between surface health checks, in milliseconds
    #[serde(default = "default_recovery_check_interval_ms")]
    pub recovery_check_interval_ms: u64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            max_loaded_models: default_max_loaded_models(),
            texture_cache_bytes: default_texture_cache_bytes(),
            idle_unload_seconds: default_idle_unload_seconds(),
            idle_sweep_interval_ms: default_idle_sweep_interval_ms(),
            enable_auto_idle_animation: default_enable_auto_idle_animation(),
            idle_animation_interval_ms: default_idle_animation_interval_ms(),
            recovery_check_interval_ms: default_recovery_check_interval_ms(),
        }
    }
}

impl ViewerConfig {
    /// Parse a configuration from a JSON string; unspecified fields take
    /// their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ViewerError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ViewerError> {
        if self.max_loaded_models == 0 {
            return Err(ViewerError::InvalidViewerConfig {
                reason: "max_loaded_models must be at least 1".to_string(),
            });
        }
        if self.texture_cache_bytes == 0 {
            return Err(ViewerError::InvalidViewerConfig {
                reason: "texture_cache_bytes must be non-zero".to_string(),
            });
        }
        Ok(())
    }

    /// Idle-unload threshold as a duration
    #[inline]
    pub fn idle_unload_after(&self) -> Duration {
        Duration::from_secs(self.idle_unload_seconds)
    }

    /// Idle sweep interval as a duration
    #[inline]
    pub fn idle_sweep_interval(&self) -> Duration {
        Duration::from_millis(self.idle_sweep_interval_ms)
    }

    /// Auto-idle animation interval as a duration
    #[inline]
    pub fn idle_animation_interval(&self) -> Duration {
        Duration::from_millis(self.idle_animation_interval_ms)
    }

    /// Surface health check interval as a duration
    #[inline]
    pub fn recovery_check_interval(&self) -> Duration {
        Duration::from_millis(self.recovery_check_interval_ms)
    }
}
