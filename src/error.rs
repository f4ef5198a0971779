//! Error types for the viewer runtime

use serde::{Deserialize, Serialize};

/// Comprehensive error type for viewer runtime operations
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ViewerError {
    /// Model bundle fetch or decode failed
    #[error("Load failed for model {model_id}: {reason}")]
    LoadFailure { model_id: String, reason: String },

    /// Requested animation is not in the model's catalog
    #[error("Animation not found: {group}[{index}]")]
    AnimationNotFound { group: String, index: usize },

    /// Requested expression index is out of range
    #[error("Expression not found: index {index} (catalog size {catalog_size})")]
    ExpressionNotFound { index: usize, catalog_size: usize },

    /// Model session not resident
    #[error("Model not found: {id}")]
    ModelNotFound { id: String },

    /// Model configuration failed validation
    #[error("Invalid model config: {reason}")]
    InvalidModelConfig { reason: String },

    /// Viewer configuration failed validation
    #[error("Invalid viewer config: {reason}")]
    InvalidViewerConfig { reason: String },

    /// Render surface failed its health check
    #[error("Surface corrupted: {reason}")]
    SurfaceCorrupted { reason: String },

    /// Serialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// IO error
    #[error("IO error: {reason}")]
    IoError { reason: String },

    /// Generic viewer error
    #[error("Viewer error: {message}")]
    Generic { message: String },
}

impl ViewerError {
    /// Create a new generic error
    pub fn new(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// Create a load failure for a model
    pub fn load_failure(model_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::LoadFailure {
            model_id: model_id.into(),
            reason: reason.into(),
        }
    }

    /// Check if this is a recoverable error.
    ///
    /// Load failures are recoverable by retrying `load_model`; catalog lookup
    /// errors never affect the previously active playback.
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::LoadFailure { .. }
                | Self::AnimationNotFound { .. }
                | Self::ExpressionNotFound { .. }
                | Self::SurfaceCorrupted { .. }
                | Self::IoError { .. }
        )
    }

    /// Get error category for logging/metrics
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::LoadFailure { .. } => "load",
            Self::AnimationNotFound { .. } | Self::ExpressionNotFound { .. } => "catalog",
            Self::ModelNotFound { .. } => "pool",
            Self::InvalidModelConfig { .. } | Self::InvalidViewerConfig { .. } => "config",
            Self::SurfaceCorrupted { .. } => "surface",
            Self::SerializationError { .. } => "serialization",
            Self::IoError { .. } => "io",
            Self::Generic { .. } => "generic",
        }
    }
}

impl From<std::io::Error> for ViewerError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError {
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for ViewerError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let error = ViewerError::new("test error");
        assert!(matches!(error, ViewerError::Generic { .. }));
    }

    #[test]
    fn test_error_recoverability() {
        let recoverable = ViewerError::load_failure("haru", "connection reset");
        assert!(recoverable.is_recoverable());

        let non_recoverable = ViewerError::InvalidModelConfig {
            reason: "empty id".to_string(),
        };
        assert!(!non_recoverable.is_recoverable());
    }

    #[test]
    fn test_error_categories() {
        let catalog_error = ViewerError::AnimationNotFound {
            group: "tap".to_string(),
            index: 3,
        };
        assert_eq!(catalog_error.category(), "catalog");

        let load_error = ViewerError::load_failure("haru", "404");
        assert_eq!(load_error.category(), "load");
    }

    #[test]
    fn test_serialization() {
        let error = ViewerError::new("test");
        let serialized = serde_json::to_string(&error).unwrap();
        let deserialized: ViewerError = serde_json::from_str(&serialized).unwrap();
        assert_eq!(error, deserialized);
    }
}
