//! Frame Configuration

use fos_input::InputConfig;
use serde::{Deserialize, Serialize};

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Frame configuration options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Resolve pointer targets through the picking buffer.
    /// When off, every pointer event hits nothing.
    pub picking: bool,

    /// Input behaviour
    pub input: InputConfig,

    /// Render list collection
    pub collect: CollectConfig,
}

/// Collection options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectConfig {
    /// Rebuild every frame, even when the scene epoch is unchanged
    pub force_rebuild: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            picking: true,
            input: InputConfig::default(),
            collect: CollectConfig::default(),
        }
    }
}

impl Config {
    /// Parse from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
