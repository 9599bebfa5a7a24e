//! Configuration handling for prog
//!
//! Configuration is optional and lives next to the default database in
//! `~/.prog/config.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Item;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// User configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Database location (defaults to `~/.prog/prog.db`)
    pub db_path: Option<PathBuf>,

    /// Project used when `--project` is not given
    pub default_project: Option<String>,

    /// Priority for new items when `--priority` is not given
    pub default_priority: i64,

    /// Completed items shown by `prog status`
    pub recent_done_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: None,
            default_project: None,
            default_priority: Item::DEFAULT_PRIORITY,
            recent_done_limit: 5,
        }
    }
}

impl Config {
    /// Returns the config directory, `~/.prog`
    pub fn config_dir() -> Option<PathBuf> {
        BaseDirs::new().map(|dirs| dirs.home_dir().join(".prog"))
    }

    /// Loads configuration from the default location
    pub fn load() -> Result<Self> {
        match Self::config_dir() {
            Some(dir) => Self::load_from(&dir.join("config.toml")),
            None => Ok(Self::default()),
        }
    }

    /// Loads configuration from `path`; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config() {
        let config = Config::default();

        assert_eq!(config.db_path, None);
        assert_eq!(config.default_project, None);
        assert_eq!(config.default_priority, 2);
        assert_eq!(config.recent_done_limit, 5);
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
default_project = "api"
recent_done_limit = 10
"#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.default_project.as_deref(), Some("api"));
        assert_eq!(config.recent_done_limit, 10);
        assert_eq!(config.default_priority, 2);
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();

        assert_eq!(config, Config::default());
    }

    #[test]
    fn load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "db_path = \"/tmp/other.db\"\ndefault_priority = 1\n").unwrap();

        let config = Config::load_from(&path).unwrap();

        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/other.db")));
        assert_eq!(config.default_priority, 1);
    }

    #[test]
    fn malformed_file_names_the_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "default_priority = \"high\"").unwrap();

        let err = Config::load_from(&path).unwrap_err();

        assert!(format!("{:#}", err).contains("config.toml"));
    }
}
