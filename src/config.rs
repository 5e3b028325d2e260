use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::geometry::ShapeKind;

/// Address stored when reverse geocoding yields nothing.
pub const DEFAULT_ADDRESS_PLACEHOLDER: &str = "address unavailable";

/// Editor-wide settings: the shape kinds on offer and commit defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    #[serde(default = "default_placeholder")]
    pub address_placeholder: String,
    #[serde(default = "default_kinds")]
    pub kinds: Vec<ShapeKind>,
}

fn default_placeholder() -> String {
    DEFAULT_ADDRESS_PLACEHOLDER.to_string()
}

fn default_kinds() -> Vec<ShapeKind> {
    vec![ShapeKind::project_area(), ShapeKind::road(), ShapeKind::zone()]
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            address_placeholder: default_placeholder(),
            kinds: default_kinds(),
        }
    }
}

impl EditorConfig {
    /// Parses and validates a JSON config. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and
    /// [`ConfigError::Invalid`] for empty or duplicate kind names.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every kind has a unique, non-empty name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for kind in &self.kinds {
            if kind.name.trim().is_empty() {
                return Err(ConfigError::Invalid("shape kind with empty name".into()));
            }
            if !seen.insert(kind.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate shape kind: {}",
                    kind.name
                )));
            }
        }
        Ok(())
    }

    /// Looks up a kind by name.
    #[must_use]
    pub fn kind(&self, name: &str) -> Option<&ShapeKind> {
        self.kinds.iter().find(|k| k.name == name)
    }
}
