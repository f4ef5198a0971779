use serde::{Deserialize, Serialize};

/// Load state of a viewer surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoadState {
    /// No model has been requested yet
    Idle,
    /// First load for this binding is in flight
    Loading,
    /// A model is bound to the surface
    Loaded,
    /// A different model is replacing the bound one (hot swap)
    Switching,
    /// The last load failed; errors are not sticky
    Error,
}

impl LoadState {
    /// Get the name of this load state
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Loaded => "loaded",
            Self::Switching => "switching",
            Self::Error => "error",
        }
    }

    /// Check if a load is in flight
    #[inline]
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Loading | Self::Switching)
    }

    /// Check if a model is bound and ready
    #[inline]
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_state_names() {
        assert_eq!(LoadState::Idle.name(), "idle");
        assert_eq!(LoadState::Loading.name(), "loading");
        assert_eq!(LoadState::Loaded.name(), "loaded");
        assert_eq!(LoadState::Switching.name(), "switching");
        assert_eq!(LoadState::Error.name(), "error");
    }

    #[test]
    fn test_load_state_predicates() {
        assert!(LoadState::Loading.is_busy());
        assert!(LoadState::Switching.is_busy());
        assert!(!LoadState::Loaded.is_busy());
        assert!(LoadState::Loaded.is_loaded());
        assert!(!LoadState::Error.is_loaded());
    }
}
