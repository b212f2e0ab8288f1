//! Tracker configuration loading.
//!
//! # Responsibility
//! - Describe where the database lives and how logging is set up.
//! - Load settings from an optional TOML file, falling back to defaults.
//!
//! # Invariants
//! - A loaded config always carries a supported, normalized log level.
//! - `log_dir`, when set, is absolute.
//!
//! Example file:
//!
//! ```toml
//! database_path = "/home/me/.local/share/taskboard/tasks.sqlite3"
//! log_level = "info"
//! log_dir = "/home/me/.local/state/taskboard"
//! ```

use crate::logging::{default_log_level, normalize_level, normalize_log_dir, LoggingError};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Database file used when nothing else is configured.
pub const DEFAULT_DATABASE_FILE: &str = "taskboard.sqlite3";

/// Resolved tracker settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrackerConfig {
    /// SQLite database file.
    pub database_path: PathBuf,
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Directory for rolling log files. Logging stays off when `None`.
    pub log_dir: Option<PathBuf>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_FILE),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

/// Errors from configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file could not be read.
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Config file is not valid TOML for `TrackerConfig`.
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    /// A logging setting is unusable.
    Logging(LoggingError),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse config `{}`: {source}", path.display())
            }
            Self::Logging(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Logging(err) => Some(err),
        }
    }
}

impl From<LoggingError> for ConfigError {
    fn from(value: LoggingError) -> Self {
        Self::Logging(value)
    }
}

impl TrackerConfig {
    /// Loads config from `path`, or returns validated defaults when `None`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Self::default().validated();
        };

        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text).map_err(|err| match err {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Parses and validates config from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        config.validated()
    }

    /// Normalizes the log level and checks the log directory.
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        self.log_level = normalize_level(&self.log_level)?.to_string();
        if let Some(log_dir) = &self.log_dir {
            self.log_dir = Some(normalize_log_dir(log_dir)?);
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, TrackerConfig, DEFAULT_DATABASE_FILE};
    use std::io::Write;
    use std::path::PathBuf;

    #[test]
    fn defaults_apply_when_no_file() {
        let config = TrackerConfig::load(None).unwrap();
        assert_eq!(config.database_path, PathBuf::from(DEFAULT_DATABASE_FILE));
        assert_eq!(config.log_dir, None);
        assert!(["debug", "info"].contains(&config.log_level.as_str()));
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let config = TrackerConfig::from_toml_str("log_level = \"WARNING\"").unwrap();
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.database_path, PathBuf::from(DEFAULT_DATABASE_FILE));
    }

    #[test]
    fn rejects_unknown_keys_and_bad_levels() {
        assert!(matches!(
            TrackerConfig::from_toml_str("database = \"x\""),
            Err(ConfigError::Parse { .. })
        ));
        assert!(matches!(
            TrackerConfig::from_toml_str("log_level = \"loud\""),
            Err(ConfigError::Logging(_))
        ));
        assert!(matches!(
            TrackerConfig::from_toml_str("log_dir = \"relative/logs\""),
            Err(ConfigError::Logging(_))
        ));
    }

    #[test]
    fn load_reads_file_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "database_path = \"/var/lib/taskboard/tasks.db\"").unwrap();
        writeln!(file, "log_dir = \"/var/log/taskboard\"").unwrap();

        let config = TrackerConfig::load(Some(file.path())).unwrap();
        assert_eq!(
            config.database_path,
            PathBuf::from("/var/lib/taskboard/tasks.db")
        );
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/taskboard")));
    }

    #[test]
    fn load_reports_missing_file_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        let err = TrackerConfig::load(Some(&missing)).unwrap_err();
        assert!(matches!(err, ConfigError::Read { path, .. } if path == missing));
    }
}
