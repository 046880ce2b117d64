//! TOML-based application configuration.
//!
//! Stored at `<data dir>/config.toml`. A missing file yields defaults;
//! defaults are not written back implicitly.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

const CONFIG_FILE: &str = "config.toml";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Default number of history entries per `log` page.
    #[serde(default = "default_log_page_size")]
    pub log_page_size: usize,
    /// Override for the data directory holding state and database files.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

fn default_log_page_size() -> usize {
    10
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_page_size: default_log_page_size(),
            data_dir: None,
        }
    }
}

impl Config {
    pub fn path(dir: &Path) -> PathBuf {
        dir.join(CONFIG_FILE)
    }

    /// Load from `dir`, or return defaults when no config file exists.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = Self::path(dir);
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let cfg = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path,
                    message: e.to_string(),
                })?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(ConfigError::LoadFailed {
                path,
                message: e.to_string(),
            }
            .into()),
        }
    }

    /// Persist to `dir`.
    ///
    /// # Errors
    /// Returns an error if the config cannot be serialized or written.
    pub fn save(&self, dir: &Path) -> Result<()> {
        let path = Self::path(dir);
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load(dir.path()).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.log_page_size, 10);
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config {
            log_page_size: 25,
            data_dir: Some(PathBuf::from("/tmp/flower-test")),
        };
        cfg.save(dir.path()).unwrap();
        assert_eq!(Config::load(dir.path()).unwrap(), cfg);
    }

    #[test]
    fn unparsable_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(Config::path(dir.path()), "log_page_size = \"ten\"").unwrap();
        assert!(Config::load(dir.path()).is_err());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(Config::path(dir.path()), "log_page_size = 5\n").unwrap();
        let cfg = Config::load(dir.path()).unwrap();
        assert_eq!(cfg.log_page_size, 5);
        assert_eq!(cfg.data_dir, None);
    }
}
