//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Clinic backend configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Wall-clock offset from UTC applied when composing appointment
    /// instants. 0 means the client operates in the backend's own time zone
    /// with no shifting.
    #[serde(default)]
    pub utc_offset_hours: i64,
}

fn default_base_url() -> String {
    "https://backend-psicologia.fly.dev".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
            utc_offset_hours: 0,
        }
    }
}

/// Session persistence configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_session_file")]
    pub file: PathBuf,
}

fn default_session_file() -> PathBuf {
    dirs::data_local_dir()
        .map(|p| p.join("consultorio").join("session.json"))
        .unwrap_or_else(|| PathBuf::from("./consultorio_session.json"))
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            file: default_session_file(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("consultorio").join("config.toml")),
            Some(PathBuf::from("./consultorio.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        // Backend overrides
        if let Ok(base_url) = std::env::var("CONSULTORIO_BASE_URL") {
            self.backend.base_url = base_url;
        }
        if let Ok(offset) = std::env::var("CONSULTORIO_UTC_OFFSET_HOURS") {
            if let Ok(o) = offset.parse() {
                self.backend.utc_offset_hours = o;
            }
        }

        // Session overrides
        if let Ok(file) = std::env::var("CONSULTORIO_SESSION_FILE") {
            self.session.file = PathBuf::from(file);
        }

        // Logging overrides
        if let Ok(level) = std::env::var("CONSULTORIO_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("CONSULTORIO_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            session: SessionConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Consultorio Configuration
#
# Environment variables override these settings:
# - CONSULTORIO_BASE_URL
# - CONSULTORIO_UTC_OFFSET_HOURS
# - CONSULTORIO_SESSION_FILE
# - CONSULTORIO_LOG_LEVEL
# - CONSULTORIO_LOG_FORMAT

[backend]
# Root URL of the clinic's REST backend
base_url = "https://backend-psicologia.fly.dev"

# Request timeout in seconds
request_timeout_secs = 30

# Wall-clock offset from UTC used when composing appointment instants.
# 0 sends times in the backend's own time zone, with no shifting.
utc_offset_hours = 0

[session]
# Where the persisted session (logged-in flag, role, token) lives
# file = "~/.local/share/consultorio/session.json"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.backend.base_url, "https://backend-psicologia.fly.dev");
        assert_eq!(config.backend.request_timeout_secs, 30);
        assert_eq!(config.backend.utc_offset_hours, 0);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [backend]
            base_url = "http://localhost:3000"
            utc_offset_hours = -6
            "#,
        )
        .unwrap();

        assert_eq!(config.backend.base_url, "http://localhost:3000");
        assert_eq!(config.backend.utc_offset_hours, -6);
        assert_eq!(config.backend.request_timeout_secs, 30);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_generated_default_config_parses() {
        let content = generate_default_config();
        let config: Config = toml::from_str(&content).unwrap();
        assert_eq!(config.backend.base_url, default_base_url());
    }
}
