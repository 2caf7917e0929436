//! Engine configuration
//!
//! Loaded from JSON; every field has a default, so `{}` is a valid file.

use std::fs;
use std::path::Path;

use serde::Deserialize;

/// Placeholder replaced by the delete control's label
const LABEL_PLACEHOLDER: &str = "{label}";

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Confirmation prompt shown before a delete; `{label}` is substituted
    pub confirm_template: String,
    /// Label used when a delete control has no `aria-label`
    pub default_delete_label: String,
    /// Value written to the completion flag
    pub inited_value: String,
    /// Tags accepted as delete controls
    pub delete_control_tags: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            confirm_template: "The following action will be performed:\n- {label}".to_string(),
            default_delete_label: "Delete element".to_string(),
            inited_value: "true".to_string(),
            delete_control_tags: vec!["button".to_string()],
        }
    }
}

impl Config {
    /// Parse configuration from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load configuration from a JSON file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_json_str(&text)?;
        tracing::debug!(target: "stamper", "loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Confirmation prompt for a delete control with the given label
    pub fn confirm_message(&self, label: &str) -> String {
        self.confirm_template.replace(LABEL_PLACEHOLDER, label)
    }

    /// Whether elements with this tag may act as delete controls
    pub fn is_delete_control(&self, tag: &str) -> bool {
        self.delete_control_tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

/// Configuration loading error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
}
