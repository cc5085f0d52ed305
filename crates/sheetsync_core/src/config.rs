//! Runtime configuration for hosts embedding the sync engine.
//!
//! # Invariants
//! - `notice_capacity` is at least 1 (broadcast channels reject 0).
//! - `log_dir`, when set, is absolute.

use crate::logging::default_log_level;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Buffered failure notices per subscriber before the oldest are dropped.
pub const DEFAULT_NOTICE_CAPACITY: usize = 32;

/// Host configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub log_level: String,
    /// Log directory; logging stays off when unset.
    pub log_dir: Option<PathBuf>,
    /// Snapshot database file; an in-memory database is used when unset.
    pub db_path: Option<PathBuf>,
    pub notice_capacity: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level().to_string(),
            log_dir: None,
            db_path: None,
            notice_capacity: DEFAULT_NOTICE_CAPACITY,
        }
    }
}

impl CoreConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.notice_capacity == 0 {
            return Err(ConfigError::ZeroNoticeCapacity);
        }
        if let Some(dir) = &self.log_dir {
            if !dir.is_absolute() {
                return Err(ConfigError::RelativeLogDir(dir.clone()));
            }
        }
        Ok(())
    }
}

/// Invalid configuration values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    ZeroNoticeCapacity,
    RelativeLogDir(PathBuf),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroNoticeCapacity => write!(f, "notice_capacity must be greater than zero"),
            Self::RelativeLogDir(dir) => {
                write!(f, "log_dir must be an absolute path, got `{}`", dir.display())
            }
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig};
    use std::path::PathBuf;

    #[test]
    fn default_config_is_valid() {
        assert!(CoreConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_capacity_and_relative_log_dir_are_rejected() {
        let config = CoreConfig {
            notice_capacity: 0,
            ..CoreConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroNoticeCapacity));

        let config = CoreConfig {
            log_dir: Some(PathBuf::from("logs")),
            ..CoreConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::RelativeLogDir(_))
        ));
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: CoreConfig = serde_json::from_str(r#"{"notice_capacity": 4}"#).unwrap();
        assert_eq!(config.notice_capacity, 4);
        assert_eq!(config.db_path, None);
    }
}
