//! Configuration management
//!
//! Configuration is layered (lowest to highest precedence):
//! 1. Default values
//! 2. Configuration file (TOML format)
//! 3. Command-line arguments
//!
//! A missing configuration file is not an error; the defaults are used.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, Result};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Connection configuration
    #[serde(default)]
    pub connection: ConnectionConfig,

    /// Schema sampling configuration
    #[serde(default)]
    pub sampling: SamplingConfig,

    /// Suggestion engine configuration
    #[serde(default)]
    pub suggestions: SuggestionConfig,

    /// Fuzzy matcher configuration
    #[serde(default)]
    pub fuzzy: FuzzyConfig,

    /// Display configuration
    #[serde(default)]
    pub display: DisplayConfig,

    /// History configuration
    #[serde(default)]
    pub history: HistoryConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Connection-related configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Default MongoDB connection URI
    #[serde(default = "default_uri")]
    pub default_uri: String,

    /// Database used when neither the URI nor the CLI names one
    #[serde(default = "default_database")]
    pub default_database: String,

    /// Connection timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Application name reported to the server
    #[serde(default = "default_app_name")]
    pub app_name: String,
}

/// Schema sampling configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Number of documents drawn with `$sample`
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,

    /// Freshness window of a cached schema, in seconds
    #[serde(default = "default_schema_ttl")]
    pub schema_ttl: u64,
}

/// Suggestion engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionConfig {
    /// Maximum number of ranked suggestions per category
    #[serde(default = "default_limit")]
    pub limit: usize,

    /// Field searches up to this many characters use prefix matching,
    /// longer ones use the trigram index
    #[serde(default = "default_prefix_match_max_len")]
    pub prefix_match_max_len: usize,

    /// Fraction of the best achievable trigram score a field must reach
    #[serde(default = "default_ngram_cutoff")]
    pub ngram_cutoff: f64,
}

/// Fuzzy matcher configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuzzyConfig {
    /// Maximum number of matches returned
    #[serde(default = "default_fuzzy_max_results")]
    pub max_results: usize,

    /// Minimum match quality in `[0, 1]`
    #[serde(default = "default_fuzzy_min_quality")]
    pub min_quality: f64,
}

/// Display and output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Output format (table, json, json-pretty, plain)
    #[serde(default = "default_format")]
    pub format: OutputFormat,

    /// Enable colored output
    #[serde(default = "default_color_output")]
    pub color_output: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// ASCII table with one row per suggestion
    Table,

    /// Compact JSON format (single-line)
    Json,

    /// Pretty-printed JSON format (multi-line)
    JsonPretty,

    /// One suggestion per line, no decoration
    Plain,
}

/// Command history configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Maximum number of history entries
    #[serde(default = "default_max_history_size")]
    pub max_size: usize,

    /// Path to history file
    #[serde(default = "default_history_file")]
    pub file_path: PathBuf,

    /// Enable history persistence
    #[serde(default = "default_persist_history")]
    pub persist: bool,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// Enable timestamps in logs
    #[serde(default = "default_log_timestamps")]
    pub timestamps: bool,
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
fn default_uri() -> String {
    "mongodb://localhost:27017".to_string()
}

fn default_database() -> String {
    "test".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_app_name() -> String {
    "mongo-autocomplete".to_string()
}

fn default_sample_size() -> usize {
    200
}

fn default_schema_ttl() -> u64 {
    3600
}

fn default_limit() -> usize {
    5
}

fn default_prefix_match_max_len() -> usize {
    3
}

fn default_ngram_cutoff() -> f64 {
    0.5
}

fn default_fuzzy_max_results() -> usize {
    7
}

fn default_fuzzy_min_quality() -> f64 {
    0.8
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}

fn default_color_output() -> bool {
    true
}

fn default_max_history_size() -> usize {
    1000
}

fn default_history_file() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".mongo_autocomplete_history")
}

fn default_persist_history() -> bool {
    true
}

fn default_log_level() -> LogLevel {
    LogLevel::Warn
}

fn default_log_timestamps() -> bool {
    true
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            default_uri: default_uri(),
            default_database: default_database(),
            timeout: default_timeout(),
            app_name: default_app_name(),
        }
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            sample_size: default_sample_size(),
            schema_ttl: default_schema_ttl(),
        }
    }
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            prefix_match_max_len: default_prefix_match_max_len(),
            ngram_cutoff: default_ngram_cutoff(),
        }
    }
}

impl Default for FuzzyConfig {
    fn default() -> Self {
        Self {
            max_results: default_fuzzy_max_results(),
            min_quality: default_fuzzy_min_quality(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            color_output: default_color_output(),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_size: default_max_history_size(),
            file_path: default_history_file(),
            persist: default_persist_history(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            timestamps: default_log_timestamps(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a file, falling back to defaults
    ///
    /// When `path` is `None` the default location is used. A file that does
    /// not exist yields the default configuration.
    ///
    /// # Arguments
    /// * `path` - Optional path to the configuration file (TOML format)
    ///
    /// # Returns
    /// * `Result<Config>` - Loaded configuration or error
    pub fn load_from_file(path: Option<&Path>) -> Result<Self> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(Self::default_path);

        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileAccess {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let config = Self::from_toml_str(&content)?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Get the default configuration file path
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".mongo-autocomplete")
            .join("config.toml")
    }

    /// Serialize configuration to TOML text
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Save configuration to a file, creating parent directories
    ///
    /// # Arguments
    /// * `path` - Path where to save the configuration
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let access_error = |e: std::io::Error| ConfigError::FileAccess {
            path: path.display().to_string(),
            message: e.to_string(),
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(access_error)?;
        }
        std::fs::write(path, self.to_toml_string()?).map_err(access_error)?;
        Ok(())
    }

    /// Validate the configuration
    ///
    /// # Returns
    /// * `Result<()>` - Ok if valid, error describing the first bad field otherwise
    pub fn validate(&self) -> Result<()> {
        fn invalid(field: &str, value: impl ToString) -> Result<()> {
            Err(ConfigError::InvalidValue {
                field: field.to_string(),
                value: value.to_string(),
            }
            .into())
        }

        if self.connection.default_uri.trim().is_empty() {
            return invalid("connection.default_uri", &self.connection.default_uri);
        }
        if self.sampling.sample_size == 0 {
            return invalid("sampling.sample_size", self.sampling.sample_size);
        }
        if self.sampling.schema_ttl == 0 {
            return invalid("sampling.schema_ttl", self.sampling.schema_ttl);
        }
        if self.suggestions.limit == 0 {
            return invalid("suggestions.limit", self.suggestions.limit);
        }
        if !(0.0..=1.0).contains(&self.suggestions.ngram_cutoff) {
            return invalid("suggestions.ngram_cutoff", self.suggestions.ngram_cutoff);
        }
        if !(0.0..=1.0).contains(&self.fuzzy.min_quality) {
            return invalid("fuzzy.min_quality", self.fuzzy.min_quality);
        }
        Ok(())
    }

    /// Get connection timeout as Duration
    pub fn connection_timeout(&self) -> Duration {
        Duration::from_secs(self.connection.timeout)
    }

    /// Get the schema freshness window
    pub fn schema_ttl(&self) -> chrono::Duration {
        i64::try_from(self.sampling.schema_ttl)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .unwrap_or(chrono::Duration::MAX)
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

impl OutputFormat {
    /// Check if format is JSON-based
    pub fn is_json(&self) -> bool {
        matches!(self, OutputFormat::Json | OutputFormat::JsonPretty)
    }

    /// Parse a user-supplied format name, accepting a few aliases
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "table" => Some(OutputFormat::Table),
            "json" | "compact-json" => Some(OutputFormat::Json),
            "json-pretty" | "pretty" => Some(OutputFormat::JsonPretty),
            "plain" | "text" => Some(OutputFormat::Plain),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.connection.default_uri, "mongodb://localhost:27017");
        assert_eq!(config.sampling.schema_ttl, 3600);
        assert_eq!(config.suggestions.limit, 5);
        assert_eq!(config.fuzzy.max_results, 7);
        assert_eq!(config.display.format, OutputFormat::Table);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = Config::from_toml_str(
            r#"
            [sampling]
            sample_size = 500

            [display]
            format = "json-pretty"
            "#,
        )
        .unwrap();

        assert_eq!(config.sampling.sample_size, 500);
        assert_eq!(config.sampling.schema_ttl, 3600);
        assert_eq!(config.display.format, OutputFormat::JsonPretty);
        assert_eq!(config.suggestions, SuggestionConfig::default());
    }

    #[test]
    fn test_invalid_toml() {
        let err = Config::from_toml_str("[sampling\nsample_size = ").unwrap_err();
        assert!(err.to_string().contains("Invalid config format"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.sampling.sample_size = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.suggestions.ngram_cutoff = 1.5;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.fuzzy.min_quality = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip_preserves_values() {
        let mut config = Config::default();
        config.sampling.sample_size = 42;
        config.display.format = OutputFormat::Plain;

        let text = config.to_toml_string().unwrap();
        let parsed = Config::from_toml_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let path = std::env::temp_dir().join("mongo-autocomplete-missing-config.toml");
        let _ = std::fs::remove_file(&path);
        let config = Config::load_from_file(Some(&path)).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = std::env::temp_dir().join(format!("mongo-autocomplete-cfg-{}", std::process::id()));
        let path = dir.join("config.toml");
        let mut config = Config::default();
        config.suggestions.limit = 8;

        config.save(&path).unwrap();
        let loaded = Config::load_from_file(Some(&path)).unwrap();
        assert_eq!(loaded.suggestions.limit, 8);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!(OutputFormat::parse("JSON"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::parse("pretty"), Some(OutputFormat::JsonPretty));
        assert_eq!(OutputFormat::parse("bogus"), None);
        assert!(OutputFormat::Json.is_json());
        assert!(!OutputFormat::Table.is_json());
    }

    #[test]
    fn test_durations() {
        let config = Config::default();
        assert_eq!(config.connection_timeout(), Duration::from_secs(30));
        assert_eq!(config.schema_ttl(), chrono::Duration::hours(1));
    }
}
