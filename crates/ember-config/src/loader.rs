//! Configuration Loader
//!
//! Handles loading and merging configuration from multiple sources with proper precedence.

use crate::global::GlobalConfig;
use crate::project::{
    validate_limit, ColorSetting, DiagnosticFormat, DiagnosticsConfig, InterpreterConfig,
    ParserConfig, ProjectConfig,
};
use crate::{ConfigError, ConfigResult, DEFAULT_MAX_CALL_DEPTH, DEFAULT_MAX_PARSE_DEPTH};
use std::env;
use std::path::{Path, PathBuf};

/// Name of the project configuration file
pub const PROJECT_CONFIG_FILE: &str = "ember.toml";

/// Configuration loader
///
/// Loads configuration from multiple sources and merges them with proper precedence:
/// 1. Global config (~/.ember/config.toml) - lowest priority
/// 2. Project config (./ember.toml) - overrides global
/// 3. Environment variables (EMBER_*) - overrides project
pub struct ConfigLoader {
    /// Cached global config path
    global_config_path: Option<PathBuf>,
}

/// Merged configuration result
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Project configuration
    pub project: ProjectConfig,

    /// Global configuration
    pub global: GlobalConfig,

    /// Project root directory (where ember.toml was found)
    pub project_root: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self {
            global_config_path: None,
        }
    }

    /// Use an explicit global config file instead of ~/.ember/config.toml
    pub fn with_global_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.global_config_path = Some(path.into());
        self
    }

    /// Load configuration starting from the given directory
    ///
    /// Walks up the directory tree to find ember.toml, then loads and merges
    /// global config if it exists.
    pub fn load_from_directory(&mut self, start_dir: &Path) -> ConfigResult<Config> {
        let (project_root, project_config) = self.find_project_config(start_dir)?;

        // Global config is optional; an unreadable home directory is not fatal
        let global_config = self.load_global_config().unwrap_or_default();

        let project_config = self.apply_env_overrides(project_config)?;

        Ok(Config {
            project: project_config,
            global: global_config,
            project_root,
        })
    }

    /// Load configuration from a specific project config file
    pub fn load_from_file(&mut self, config_path: &Path) -> ConfigResult<Config> {
        let project_config = ProjectConfig::load_from_file(config_path)?;
        let global_config = self.load_global_config().unwrap_or_default();
        let project_config = self.apply_env_overrides(project_config)?;

        let project_root = config_path.parent().map(|p| p.to_path_buf());

        Ok(Config {
            project: project_config,
            global: global_config,
            project_root,
        })
    }

    /// Find project configuration by walking up directory tree
    ///
    /// Returns (project_root, project_config); no ember.toml yields defaults
    fn find_project_config(
        &self,
        start_dir: &Path,
    ) -> ConfigResult<(Option<PathBuf>, ProjectConfig)> {
        let mut current = start_dir.to_path_buf();

        loop {
            let config_path = current.join(PROJECT_CONFIG_FILE);

            if config_path.exists() {
                let project_config = ProjectConfig::load_from_file(&config_path)?;
                return Ok((Some(current), project_config));
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => return Ok((None, ProjectConfig::default())),
            }
        }
    }

    /// Load global configuration from ~/.ember/config.toml
    fn load_global_config(&mut self) -> ConfigResult<GlobalConfig> {
        let path = match &self.global_config_path {
            Some(path) => path.clone(),
            None => {
                let path = GlobalConfig::global_config_path()?;
                self.global_config_path = Some(path.clone());
                path
            }
        };

        if !path.exists() {
            return Ok(GlobalConfig::default());
        }

        GlobalConfig::load_from_file(&path)
    }

    /// Apply environment variable overrides to project config
    ///
    /// Recognized: EMBER_MAX_DEPTH, EMBER_MAX_CALL_DEPTH, EMBER_COLOR
    fn apply_env_overrides(&self, mut config: ProjectConfig) -> ConfigResult<ProjectConfig> {
        if let Ok(depth) = env::var("EMBER_MAX_DEPTH") {
            let depth = parse_limit("EMBER_MAX_DEPTH", &depth)?;
            config
                .parser
                .get_or_insert_with(ParserConfig::default)
                .max_depth = Some(depth);
        }

        if let Ok(depth) = env::var("EMBER_MAX_CALL_DEPTH") {
            let depth = parse_limit("EMBER_MAX_CALL_DEPTH", &depth)?;
            config
                .interpreter
                .get_or_insert_with(InterpreterConfig::default)
                .max_call_depth = Some(depth);
        }

        if let Ok(color) = env::var("EMBER_COLOR") {
            let color = ColorSetting::parse(&color).ok_or_else(|| ConfigError::InvalidValue {
                field: "EMBER_COLOR".to_string(),
                reason: format!("must be 'auto', 'always', or 'never', got '{}'", color),
            })?;
            config
                .diagnostics
                .get_or_insert_with(DiagnosticsConfig::default)
                .color = Some(color);
        }

        Ok(config)
    }

    /// Get the global configuration directory (~/.ember)
    pub fn global_config_dir() -> ConfigResult<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
        Ok(home.join(".ember"))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_limit(field: &str, value: &str) -> ConfigResult<usize> {
    let limit = value
        .trim()
        .parse::<usize>()
        .map_err(|_| ConfigError::InvalidValue {
            field: field.to_string(),
            reason: format!("expected a positive integer, got '{}'", value),
        })?;
    validate_limit(field, limit)?;
    Ok(limit)
}

impl Config {
    /// Effective parser nesting limit (project > default)
    pub fn max_parse_depth(&self) -> usize {
        self.project.max_depth().unwrap_or(DEFAULT_MAX_PARSE_DEPTH)
    }

    /// Effective call depth limit (project > default)
    pub fn max_call_depth(&self) -> usize {
        self.project
            .max_call_depth()
            .unwrap_or(DEFAULT_MAX_CALL_DEPTH)
    }

    /// Effective color setting (project > global > default)
    pub fn color(&self) -> ColorSetting {
        self.project
            .color()
            .or_else(|| self.global.default_color())
            .unwrap_or_default()
    }

    /// Effective diagnostic format (project > global > default)
    pub fn format(&self) -> DiagnosticFormat {
        self.project
            .format()
            .or_else(|| self.global.default_format())
            .unwrap_or_default()
    }

    /// Get the project root directory
    pub fn project_root(&self) -> Option<&Path> {
        self.project_root.as_deref()
    }

    /// Check if this is a project (has ember.toml)
    pub fn is_project(&self) -> bool {
        self.project_root.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    fn create_config_file(dir: &Path, content: &str) -> PathBuf {
        let config_path = dir.join(PROJECT_CONFIG_FILE);
        fs::write(&config_path, content).unwrap();
        config_path
    }

    fn isolated_loader(temp_dir: &TempDir) -> ConfigLoader {
        ConfigLoader::new().with_global_config_path(temp_dir.path().join("no-global.toml"))
    }

    #[test]
    #[serial]
    fn test_load_project_config() {
        let temp_dir = TempDir::new().unwrap();
        create_config_file(
            temp_dir.path(),
            r#"
[parser]
max_depth = 40
"#,
        );

        let mut loader = isolated_loader(&temp_dir);
        let config = loader.load_from_directory(temp_dir.path()).unwrap();

        assert_eq!(config.max_parse_depth(), 40);
        assert_eq!(config.max_call_depth(), DEFAULT_MAX_CALL_DEPTH);
        assert!(config.is_project());
    }

    #[test]
    #[serial]
    fn test_find_config_in_parent() {
        let temp_dir = TempDir::new().unwrap();
        create_config_file(
            temp_dir.path(),
            r#"
[interpreter]
max_call_depth = 12
"#,
        );

        let sub_dir = temp_dir.path().join("subdir");
        fs::create_dir(&sub_dir).unwrap();

        let mut loader = isolated_loader(&temp_dir);
        let config = loader.load_from_directory(&sub_dir).unwrap();

        assert_eq!(config.max_call_depth(), 12);
        assert_eq!(config.project_root(), Some(temp_dir.path()));
    }

    #[test]
    #[serial]
    fn test_no_project_config() {
        let temp_dir = TempDir::new().unwrap();

        let mut loader = isolated_loader(&temp_dir);
        let config = loader.load_from_directory(temp_dir.path()).unwrap();

        assert!(!config.is_project());
        assert_eq!(config.max_parse_depth(), DEFAULT_MAX_PARSE_DEPTH);
        assert_eq!(config.color(), ColorSetting::Auto);
        assert_eq!(config.format(), DiagnosticFormat::Human);
    }

    #[test]
    #[serial]
    fn test_global_config_fills_gaps() {
        let temp_dir = TempDir::new().unwrap();
        let global_path = temp_dir.path().join("global.toml");
        fs::write(
            &global_path,
            r#"
[diagnostics]
color = "never"
format = "json"
"#,
        )
        .unwrap();
        create_config_file(
            temp_dir.path(),
            r#"
[diagnostics]
color = "always"
"#,
        );

        let mut loader = ConfigLoader::new().with_global_config_path(&global_path);
        let config = loader.load_from_directory(temp_dir.path()).unwrap();

        assert_eq!(config.color(), ColorSetting::Always);
        assert_eq!(config.format(), DiagnosticFormat::Json);
    }

    #[test]
    #[serial]
    fn test_env_override_limits() {
        let temp_dir = TempDir::new().unwrap();
        create_config_file(
            temp_dir.path(),
            r#"
[parser]
max_depth = 40
"#,
        );

        env::set_var("EMBER_MAX_DEPTH", "16");
        env::set_var("EMBER_MAX_CALL_DEPTH", "8");

        let mut loader = isolated_loader(&temp_dir);
        let result = loader.load_from_directory(temp_dir.path());

        env::remove_var("EMBER_MAX_DEPTH");
        env::remove_var("EMBER_MAX_CALL_DEPTH");

        let config = result.unwrap();
        assert_eq!(config.max_parse_depth(), 16);
        assert_eq!(config.max_call_depth(), 8);
    }

    #[test]
    #[serial]
    fn test_env_override_rejects_garbage() {
        let temp_dir = TempDir::new().unwrap();

        env::set_var("EMBER_MAX_CALL_DEPTH", "lots");
        let mut loader = isolated_loader(&temp_dir);
        let result = loader.load_from_directory(temp_dir.path());
        env::remove_var("EMBER_MAX_CALL_DEPTH");

        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    #[serial]
    fn test_env_override_color() {
        let temp_dir = TempDir::new().unwrap();

        env::set_var("EMBER_COLOR", "never");
        let mut loader = isolated_loader(&temp_dir);
        let result = loader.load_from_directory(temp_dir.path());
        env::remove_var("EMBER_COLOR");

        assert_eq!(result.unwrap().color(), ColorSetting::Never);
    }

    #[test]
    #[serial]
    fn test_load_from_specific_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_config_file(
            temp_dir.path(),
            r#"
[interpreter]
max_call_depth = 3
"#,
        );

        let mut loader = isolated_loader(&temp_dir);
        let config = loader.load_from_file(&config_path).unwrap();

        assert_eq!(config.max_call_depth(), 3);
        assert_eq!(config.project_root(), Some(temp_dir.path()));
    }

    #[test]
    #[serial]
    fn test_invalid_toml_reports_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_config_file(temp_dir.path(), "[parser\nmax_depth = 1");

        let mut loader = isolated_loader(&temp_dir);
        match loader.load_from_file(&config_path) {
            Err(ConfigError::TomlParseError { file, .. }) => assert_eq!(file, config_path),
            other => panic!("Expected TomlParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let mut loader = ConfigLoader::new();
        let result = loader.load_from_file(Path::new("/definitely/not/here/ember.toml"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }
}
