//! Session files.
//!
//! A session is a JSON document; every field is optional and falls back to
//! the built-in defaults. A `parameters` list replaces the built-in
//! parameter table.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{clock::ClockTrackerConfig, engine::EngineSettings, params::ParameterTable};

/// Errors loading or writing a session file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid session: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub engine: EngineSettings,
    pub clock: ClockTrackerConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<ParameterTable>,
}

impl SessionConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_json(&text)?;
        log::info!("loaded session {}", path.display());
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The session's parameter table, or the built-in one.
    pub fn parameter_table(&self) -> ParameterTable {
        self.parameters.clone().unwrap_or_default()
    }
}
