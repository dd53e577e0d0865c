//! Runtime configuration for the cat API core.
//!
//! Loaded from `<config_dir>/catapi/config.toml` when present, then
//! overridden by `CATAPI_*` environment variables. Every field has a default,
//! so an absent file is not an error.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "https://api.thecatapi.com/v1";
pub const DEFAULT_IMAGE_LIMIT: u32 = 8;
pub const DEFAULT_IMAGE_CACHE_CAPACITY: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    /// Sent as `x-api-key` on every catalog request.
    pub api_key: String,
    pub image_limit: u32,
    pub image_cache_capacity: usize,
    pub favorites_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            image_limit: DEFAULT_IMAGE_LIMIT,
            image_cache_capacity: DEFAULT_IMAGE_CACHE_CAPACITY,
            favorites_dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("catapi")
}

impl Config {
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("catapi")
            .join("config.toml")
    }

    /// Load from the default path, apply environment overrides, and validate.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from(&Self::config_path())?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse `path` as TOML. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Override fields from `CATAPI_BASE_URL`, `CATAPI_API_KEY`, and
    /// `CATAPI_FAVORITES_DIR` as reported by `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("CATAPI_BASE_URL") {
            self.base_url = url;
        }
        if let Some(key) = lookup("CATAPI_API_KEY") {
            self.api_key = key;
        }
        if let Some(dir) = lookup("CATAPI_FAVORITES_DIR") {
            self.favorites_dir = PathBuf::from(dir);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Validation("base_url must not be empty".to_string()));
        }
        if self.image_limit == 0 {
            return Err(ConfigError::Validation(
                "image_limit must be greater than 0".to_string(),
            ));
        }
        if self.image_cache_capacity == 0 {
            return Err(ConfigError::Validation(
                "image_cache_capacity must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.image_limit, 8);
        assert_eq!(config.image_cache_capacity, 100);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "api_key = \"k\"\nimage_limit = 4\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.api_key, "k");
        assert_eq!(config.image_limit, 4);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn malformed_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "image_limit = \"many\"").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        match err {
            ConfigError::Parse { path: p, .. } => assert_eq!(p, path),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn env_overrides_file_values() {
        let vars: HashMap<&str, &str> = [
            ("CATAPI_API_KEY", "from-env"),
            ("CATAPI_FAVORITES_DIR", "/tmp/cats"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_env(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.api_key, "from-env");
        assert_eq!(config.favorites_dir, PathBuf::from("/tmp/cats"));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn validate_rejects_zero_capacity() {
        let config = Config {
            image_cache_capacity: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_rejects_blank_base_url() {
        let config = Config {
            base_url: "  ".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
