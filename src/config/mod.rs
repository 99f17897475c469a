//! Configuration management for compline
//!
//! Configuration is built once at process entry and handed down as an explicit
//! record, so evaluation never consults ambient global state.
//!
//! Configuration precedence (highest to lowest):
//! 1. Environment variables
//! 2. Configuration file (TOML format)
//! 3. Default values

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

/// Enables the append-only diagnostic log.
pub const ENV_LOG: &str = "COMPLINE_LOG";
/// Disables color when set.
pub const ENV_NOCOLOR: &str = "COMPLINE_NOCOLOR";
/// Common convention honored alongside [`ENV_NOCOLOR`].
pub const ENV_NO_COLOR: &str = "NO_COLOR";
/// Enables experimental features.
pub const ENV_EXPERIMENTAL: &str = "COMPLINE_EXPERIMENTAL";
/// Overrides the cache root directory.
pub const ENV_CACHE_DIR: &str = "COMPLINE_CACHE_DIR";
/// Overrides the configuration file path.
pub const ENV_CONFIG: &str = "COMPLINE_CONFIG";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Root directory shared by the cache and the session log
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// Name of the host binary, used in snippets, cache and log paths
    #[serde(skip, default = "default_binary")]
    pub binary: String,

    /// Enable colored candidates
    #[serde(default = "default_color")]
    pub color: bool,

    /// Experimental features
    #[serde(default)]
    pub experimental: ExperimentalConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Experimental feature switches
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentalConfig {
    /// Enable experimental features
    #[serde(default)]
    pub enabled: bool,

    /// Executable looked up on PATH that post-processes replies
    #[serde(default = "default_post_processor")]
    pub post_processor: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Write a per-session diagnostic log
    #[serde(default)]
    pub enabled: bool,

    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// Path to log file (defaults to `<cache_dir>/<binary>.log`)
    #[serde(default)]
    pub file_path: Option<PathBuf>,
}

/// Log level options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

// Default value functions
fn default_cache_dir() -> PathBuf {
    std::env::temp_dir().join("compline")
}

fn default_binary() -> String {
    std::env::current_exe()
        .ok()
        .and_then(|path| path.file_stem().map(|s| s.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "compline".to_string())
}

fn default_color() -> bool {
    true
}

fn default_post_processor() -> String {
    "compline-post".to_string()
}

fn default_log_level() -> LogLevel {
    LogLevel::Debug
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            binary: default_binary(),
            color: default_color(),
            experimental: ExperimentalConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ExperimentalConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            post_processor: default_post_processor(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            level: default_log_level(),
            file_path: None,
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the configuration for a host binary from all sources
    ///
    /// # Arguments
    /// * `binary` - Name of the host binary
    ///
    /// # Returns
    /// * `Result<Config>` - Merged configuration or error
    pub fn load(binary: &str) -> Result<Self> {
        let env: HashMap<String, String> = std::env::vars().collect();
        let path = env.get(ENV_CONFIG).map(PathBuf::from);

        let mut config = Self::load_from_file(path.as_deref())?;
        config.binary = binary.to_string();
        config.apply_env(&env);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file, falling back to defaults when it does not exist
    ///
    /// # Arguments
    /// * `path` - Explicit path, or `None` for [`Config::default_path`]
    pub fn load_from_file(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_path(),
        };

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::Unreadable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(content).map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;
        Ok(config)
    }

    /// Get the default configuration file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("compline")
            .join("config.toml")
    }

    /// Apply environment overrides
    ///
    /// # Arguments
    /// * `env` - Environment snapshot
    pub fn apply_env(&mut self, env: &HashMap<String, String>) {
        if let Some(value) = env.get(ENV_LOG) {
            self.logging.enabled = is_truthy(value);
        }
        if env.get(ENV_NO_COLOR).is_some_and(|v| !v.is_empty())
            || env.get(ENV_NOCOLOR).is_some_and(|v| is_truthy(v))
        {
            self.color = false;
        }
        if let Some(value) = env.get(ENV_EXPERIMENTAL) {
            self.experimental.enabled = is_truthy(value);
        }
        if let Some(dir) = env.get(ENV_CACHE_DIR).filter(|d| !d.is_empty()) {
            self.cache_dir = PathBuf::from(dir);
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.cache_dir.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "cache_dir".to_string(),
                value: String::new(),
            }
            .into());
        }
        if self.experimental.post_processor.contains(std::path::MAIN_SEPARATOR) {
            return Err(ConfigError::InvalidValue {
                field: "experimental.post_processor".to_string(),
                value: self.experimental.post_processor.clone(),
            }
            .into());
        }
        Ok(())
    }

    /// Path of the session log
    pub fn log_file(&self) -> PathBuf {
        self.logging
            .file_path
            .clone()
            .unwrap_or_else(|| self.cache_dir.join(format!("{}.log", self.binary)))
    }
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.color);
        assert!(!config.experimental.enabled);
        assert!(!config.logging.enabled);
        assert!(config.cache_dir.ends_with("compline"));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_env(&env(&[
            (ENV_LOG, "1"),
            (ENV_NO_COLOR, "1"),
            (ENV_EXPERIMENTAL, "true"),
            (ENV_CACHE_DIR, "/tmp/elsewhere"),
        ]));

        assert!(config.logging.enabled);
        assert!(!config.color);
        assert!(config.experimental.enabled);
        assert_eq!(config.cache_dir, PathBuf::from("/tmp/elsewhere"));
    }

    #[test]
    fn test_empty_no_color_is_ignored() {
        let mut config = Config::default();
        config.apply_env(&env(&[(ENV_NO_COLOR, "")]));
        assert!(config.color);

        config.apply_env(&env(&[(ENV_NOCOLOR, "0")]));
        assert!(config.color);
    }

    #[test]
    fn test_from_toml() {
        let config = Config::from_toml(
            r#"
color = false

[logging]
enabled = true
level = "trace"

[experimental]
post_processor = "tabdance"
"#,
        )
        .unwrap();

        assert!(!config.color);
        assert!(config.logging.enabled);
        assert_eq!(config.logging.level, LogLevel::Trace);
        assert_eq!(config.experimental.post_processor, "tabdance");
    }

    #[test]
    fn test_invalid_toml() {
        assert!(Config::from_toml("color = [").is_err());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from_file(Some(&dir.path().join("missing.toml"))).unwrap();
        assert!(config.color);
    }

    #[test]
    fn test_log_file_location() {
        let mut config = Config::default();
        config.binary = "example".to_string();
        config.cache_dir = PathBuf::from("/tmp/compline");
        assert_eq!(config.log_file(), PathBuf::from("/tmp/compline/example.log"));
    }

    #[test]
    fn test_validate_post_processor() {
        let mut config = Config::default();
        config.experimental.post_processor = format!("bin{}tool", std::path::MAIN_SEPARATOR);
        assert!(config.validate().is_err());
    }
}
