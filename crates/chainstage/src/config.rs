//! Stage options
//!
//! The host hands options over as a loosely typed object. Unknown keys are
//! ignored and missing keys take their defaults.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid loader options: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid loader options: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Options recognized by the stage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoaderOptions {
    /// Compute and return a merged source map
    pub source_map: bool,
}

impl LoaderOptions {
    /// Build options from the host's option object; `null` means defaults
    pub fn from_value(value: serde_json::Value) -> Result<Self, ConfigError> {
        if value.is_null() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_toml_str(document: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(document)?)
    }
}
