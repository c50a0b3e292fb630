//! Ember Configuration System
//!
//! Provides configuration management for embedding the Ember interpreter:
//! - Project configuration (ember.toml)
//! - Global user configuration (~/.ember/config.toml)
//! - Configuration precedence and merging
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded and merged in the following order (later overrides earlier):
//! 1. Global config (~/.ember/config.toml)
//! 2. Project config (./ember.toml)
//! 3. Environment variables (EMBER_*)
//!
//! # Example
//!
//! ```no_run
//! use ember_config::ConfigLoader;
//! use std::path::Path;
//!
//! let mut loader = ConfigLoader::new();
//! let config = loader.load_from_directory(Path::new(".")).unwrap();
//! assert!(config.max_parse_depth() > 0);
//! ```

pub mod global;
pub mod loader;
pub mod project;

use std::path::PathBuf;
use thiserror::Error;

/// Default maximum expression nesting accepted by the parser
pub const DEFAULT_MAX_PARSE_DEPTH: usize = 256;

/// Default maximum depth of nested function calls
pub const DEFAULT_MAX_CALL_DEPTH: usize = 128;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax in {file}: {error}")]
    TomlParseError {
        file: PathBuf,
        error: toml::de::Error,
    },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Home directory not found")]
    HomeNotFound,
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

// Re-export main types
pub use global::GlobalConfig;
pub use loader::{Config, ConfigLoader};
pub use project::{ColorSetting, DiagnosticFormat, ProjectConfig};
