//! Project Configuration (ember.toml)
//!
//! Handles project-level configuration stored in `ember.toml` at the project root.

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Project configuration from ember.toml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Parser limits
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parser: Option<ParserConfig>,

    /// Interpreter limits
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interpreter: Option<InterpreterConfig>,

    /// Diagnostic output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<DiagnosticsConfig>,
}

/// Parser configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ParserConfig {
    /// Maximum expression nesting depth (default: 256)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,
}

/// Interpreter configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct InterpreterConfig {
    /// Maximum depth of nested function calls (default: 128)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_call_depth: Option<usize>,
}

/// Diagnostic output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct DiagnosticsConfig {
    /// Terminal colors ("auto", "always", "never")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorSetting>,

    /// Output format ("human", "json")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<DiagnosticFormat>,
}

/// Color preference for rendered diagnostics
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColorSetting {
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorSetting {
    /// Parse a color setting from an environment-style string
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "auto" => Some(ColorSetting::Auto),
            "always" | "true" | "1" | "yes" => Some(ColorSetting::Always),
            "never" | "false" | "0" | "no" => Some(ColorSetting::Never),
            _ => None,
        }
    }
}

impl fmt::Display for ColorSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorSetting::Auto => write!(f, "auto"),
            ColorSetting::Always => write!(f, "always"),
            ColorSetting::Never => write!(f, "never"),
        }
    }
}

/// Rendering format for diagnostics
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticFormat {
    #[default]
    Human,
    Json,
}

impl ProjectConfig {
    /// Load project configuration from a file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
            file: path.to_path_buf(),
            error: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the project configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(depth) = self.max_depth() {
            validate_limit("parser.max_depth", depth)?;
        }
        if let Some(depth) = self.max_call_depth() {
            validate_limit("interpreter.max_call_depth", depth)?;
        }
        Ok(())
    }

    /// Get the configured parser nesting limit, if present
    pub fn max_depth(&self) -> Option<usize> {
        self.parser.as_ref().and_then(|p| p.max_depth)
    }

    /// Get the configured call depth limit, if present
    pub fn max_call_depth(&self) -> Option<usize> {
        self.interpreter.as_ref().and_then(|i| i.max_call_depth)
    }

    /// Get the configured color setting, if present
    pub fn color(&self) -> Option<ColorSetting> {
        self.diagnostics.as_ref().and_then(|d| d.color)
    }

    /// Get the configured diagnostic format, if present
    pub fn format(&self) -> Option<DiagnosticFormat> {
        self.diagnostics.as_ref().and_then(|d| d.format)
    }

    /// Merge another project config into this one
    /// Other config takes precedence for non-None values
    pub fn merge(&mut self, other: &ProjectConfig) {
        if other.parser.is_some() {
            self.parser = other.parser.clone();
        }
        if other.interpreter.is_some() {
            self.interpreter = other.interpreter.clone();
        }
        if other.diagnostics.is_some() {
            self.diagnostics = other.diagnostics.clone();
        }
    }
}

/// Limits must leave room for at least one level of nesting
pub(crate) fn validate_limit(field: &str, value: usize) -> ConfigResult<()> {
    if value == 0 {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            reason: "limit must be greater than zero".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_empty_project_config() {
        let config: ProjectConfig = toml::from_str("").unwrap();
        assert_eq!(config, ProjectConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_project_config() {
        let toml = r#"
[parser]
max_depth = 64

[interpreter]
max_call_depth = 32

[diagnostics]
color = "never"
format = "json"
"#;

        let config: ProjectConfig = toml::from_str(toml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_depth(), Some(64));
        assert_eq!(config.max_call_depth(), Some(32));
        assert_eq!(config.color(), Some(ColorSetting::Never));
        assert_eq!(config.format(), Some(DiagnosticFormat::Json));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let toml = r#"
[parser]
max_nesting = 10
"#;
        assert!(toml::from_str::<ProjectConfig>(toml).is_err());
    }

    #[test]
    fn test_unknown_color_rejected() {
        let toml = r#"
[diagnostics]
color = "sometimes"
"#;
        assert!(toml::from_str::<ProjectConfig>(toml).is_err());
    }

    #[test]
    fn test_zero_limit_invalid() {
        let config = ProjectConfig {
            interpreter: Some(InterpreterConfig {
                max_call_depth: Some(0),
            }),
            ..Default::default()
        };

        match config.validate() {
            Err(ConfigError::InvalidValue { field, .. }) => {
                assert_eq!(field, "interpreter.max_call_depth")
            }
            other => panic!("Expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn test_color_setting_parse() {
        assert_eq!(ColorSetting::parse("ALWAYS"), Some(ColorSetting::Always));
        assert_eq!(ColorSetting::parse("0"), Some(ColorSetting::Never));
        assert_eq!(ColorSetting::parse("auto"), Some(ColorSetting::Auto));
        assert_eq!(ColorSetting::parse("rainbow"), None);
    }

    #[test]
    fn test_merge_configs() {
        let mut base = ProjectConfig {
            parser: Some(ParserConfig { max_depth: Some(10) }),
            ..Default::default()
        };
        let override_config = ProjectConfig {
            interpreter: Some(InterpreterConfig {
                max_call_depth: Some(5),
            }),
            ..Default::default()
        };

        base.merge(&override_config);
        assert_eq!(base.max_depth(), Some(10));
        assert_eq!(base.max_call_depth(), Some(5));
    }
}
