//! Per-model load configuration

use serde::{Deserialize, Serialize};

use crate::error::ViewerError;

/// Configuration describing one loadable model bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Stable model identity; also scopes texture cache keys
    pub id: String,
    /// Location of the model bundle, resolvable by the fetch collaborator
    pub model_path: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Per-model override for auto-idle animation; `None` inherits the
    /// viewer-wide setting
    #[serde(default)]
    pub auto_idle: Option<bool>,
}

impl ModelConfig {
    /// Create a config with the given identity and bundle path
    pub fn new(id: impl Into<String>, model_path: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            model_path: model_path.into(),
            auto_idle: None,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ViewerError> {
        if self.id.is_empty() {
            return Err(ViewerError::InvalidModelConfig {
                reason: "model id must be non-empty".to_string(),
            });
        }
        if self.model_path.is_empty() {
            return Err(ViewerError::InvalidModelConfig {
                reason: format!("model {} has an empty model_path", self.id),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation() {
        assert!(ModelConfig::new("haru", "models/haru.bundle")
            .validate()
            .is_ok());
        assert!(ModelConfig::new("", "models/haru.bundle").validate().is_err());
        assert!(ModelConfig::new("haru", "").validate().is_err());
    }
}
