//! Global Configuration (~/.ember/config.toml)
//!
//! Handles user-level defaults stored in `~/.ember/config.toml`.

use crate::project::{ColorSetting, DiagnosticFormat, DiagnosticsConfig};
use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Global user configuration from ~/.ember/config.toml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct GlobalConfig {
    /// Default diagnostic output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<DiagnosticsConfig>,
}

impl GlobalConfig {
    /// Load global configuration from a file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
            file: path.to_path_buf(),
            error: e,
        })
    }

    /// Get the global config file path (~/.ember/config.toml)
    pub fn global_config_path() -> ConfigResult<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
        Ok(home.join(".ember").join("config.toml"))
    }

    /// Get the default color setting
    pub fn default_color(&self) -> Option<ColorSetting> {
        self.diagnostics.as_ref().and_then(|d| d.color)
    }

    /// Get the default diagnostic format
    pub fn default_format(&self) -> Option<DiagnosticFormat> {
        self.diagnostics.as_ref().and_then(|d| d.format)
    }

    /// Merge another global config into this one
    /// Other config takes precedence for non-None values
    pub fn merge(&mut self, other: &GlobalConfig) {
        if other.diagnostics.is_some() {
            self.diagnostics = other.diagnostics.clone();
        }
    }
}
