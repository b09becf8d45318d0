//! Core runtime configuration.
//!
//! # Responsibility
//! - Describe where the contact store lives and how core logging starts.
//! - Load settings from a TOML file or string.
//!
//! # Invariants
//! - `db_path` must not be empty.
//! - Missing `log_level` falls back to [`default_log_level`].

use crate::logging::{default_log_level, init_logging};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Settings consumed by connection bootstrap and logging init.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreConfig {
    /// SQLite database file.
    pub db_path: PathBuf,
    #[serde(default = "default_level_string")]
    pub log_level: String,
    /// Absolute directory for rolling log files. Logging stays off when unset.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(toml::de::Error),
    EmptyDbPath,
    Logging(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config: {err}"),
            Self::EmptyDbPath => write!(f, "db_path cannot be empty"),
            Self::Logging(message) => write!(f, "logging init failed: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::EmptyDbPath | Self::Logging(_) => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value)
    }
}

impl CoreConfig {
    /// Config pointing at `db_path` with default logging settings.
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            log_level: default_level_string(),
            log_dir: None,
        }
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        if config.db_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyDbPath);
        }
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Starts file logging when `log_dir` is configured.
    ///
    /// Returns `Ok(false)` when no log directory is set.
    pub fn init_logging(&self) -> Result<bool, ConfigError> {
        let Some(log_dir) = &self.log_dir else {
            return Ok(false);
        };
        init_logging(&self.log_level, &log_dir.to_string_lossy()).map_err(ConfigError::Logging)?;
        Ok(true)
    }
}

fn default_level_string() -> String {
    default_log_level().to_string()
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig};
    use crate::logging::default_log_level;
    use std::path::PathBuf;

    #[test]
    fn parses_minimal_config_with_defaults() {
        let config = CoreConfig::from_toml_str(r#"db_path = "/tmp/contacts.db""#)
            .expect("minimal config should parse");
        assert_eq!(config.db_path, PathBuf::from("/tmp/contacts.db"));
        assert_eq!(config.log_level, default_log_level());
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn parses_explicit_logging_settings() {
        let config = CoreConfig::from_toml_str(
            r#"
            db_path = "contacts.db"
            log_level = "warn"
            log_dir = "/var/log/contacts"
            "#,
        )
        .expect("full config should parse");
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/contacts")));
    }

    #[test]
    fn rejects_empty_db_path() {
        let err = CoreConfig::from_toml_str(r#"db_path = """#).expect_err("empty path must fail");
        assert!(matches!(err, ConfigError::EmptyDbPath));
    }

    #[test]
    fn rejects_missing_db_path() {
        let err = CoreConfig::from_toml_str("log_level = \"info\"").expect_err("missing path");
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn init_logging_is_noop_without_log_dir() {
        let config = CoreConfig::new("contacts.db");
        assert!(!config.init_logging().expect("no-op init should succeed"));
    }
}
