//! Configuration handling
//!
//! Manages the `cmdbridge.toml` configuration file.
//!
//! ## Environment Variables
//!
//! The following environment variables override config file settings:
//!
//! - `CMDBRIDGE_BACKEND` - Default backend
//! - `CMDBRIDGE_CACHE_SIZE` - Parse cache capacity (0 disables the cache)
//! - `CMDBRIDGE_STRICT_ARGS` - Reject surplus arguments (`true`/`false`)
//! - `CMDBRIDGE_LOG` - Log filter directive
//!
//! These can be set in a `.env` file next to the config file.

use crate::backend::Backend;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration file name
pub const CONFIG_FILE_NAME: &str = "cmdbridge.toml";

/// Environment variable names
pub const ENV_BACKEND: &str = "CMDBRIDGE_BACKEND";
pub const ENV_CACHE_SIZE: &str = "CMDBRIDGE_CACHE_SIZE";
pub const ENV_STRICT_ARGS: &str = "CMDBRIDGE_STRICT_ARGS";
pub const ENV_LOG: &str = "CMDBRIDGE_LOG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Backend used when none is given on the command line
    #[serde(default = "default_backend")]
    pub backend: Backend,
    /// Maximum number of cached parse results
    #[serde(default = "default_cache_size")]
    pub cache_size: usize,
    /// Fail when more arguments are supplied than placeholders consume
    #[serde(default)]
    pub strict_args: bool,
    /// `tracing` filter directive
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    #[serde(default)]
    pub elastic: ElasticConfig,
    #[serde(default)]
    pub mongo: MongoConfig,
}

fn default_backend() -> Backend {
    Backend::Elastic
}

fn default_cache_size() -> usize {
    1000
}

fn default_log_filter() -> String {
    "cmdbridge=info".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElasticConfig {
    /// Append `refresh=true` to document writes
    #[serde(default)]
    pub index_refresh: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MongoConfig {
    /// Database addressed until a `use` statement selects another
    #[serde(default)]
    pub database: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            cache_size: default_cache_size(),
            strict_args: false,
            log_filter: default_log_filter(),
            elastic: ElasticConfig::default(),
            mongo: MongoConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a directory
    ///
    /// This also loads any `.env` file in the directory and applies
    /// environment variable overrides.
    pub fn load(dir: &Path) -> anyhow::Result<Self> {
        Self::load_env_file(dir);

        let config_path = dir.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            anyhow::bail!("Configuration file not found: {}", config_path.display());
        }

        let content = std::fs::read_to_string(&config_path)?;
        let mut config: Config = toml::from_str(&content)?;
        config.apply_env_overrides()?;

        Ok(config)
    }

    /// Like [`Config::load`], but falls back to defaults (still honouring
    /// the environment) when the directory has no config file.
    pub fn load_or_default(dir: &Path) -> anyhow::Result<Self> {
        if dir.join(CONFIG_FILE_NAME).exists() {
            return Self::load(dir);
        }

        Self::load_env_file(dir);
        let mut config = Config::default();
        config.apply_env_overrides()?;
        Ok(config)
    }

    fn load_env_file(dir: &Path) {
        let env_path = dir.join(".env");
        if env_path.exists() {
            let _ = dotenvy::from_path(&env_path);
        }
    }

    /// Apply environment variable overrides to the configuration
    fn apply_env_overrides(&mut self) -> anyhow::Result<()> {
        if let Ok(backend) = std::env::var(ENV_BACKEND) {
            if !backend.is_empty() {
                self.backend = backend.parse()?;
            }
        }

        if let Ok(size) = std::env::var(ENV_CACHE_SIZE) {
            if let Ok(size) = size.trim().parse::<usize>() {
                self.cache_size = size;
            }
        }

        if let Ok(strict) = std::env::var(ENV_STRICT_ARGS) {
            match strict.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => self.strict_args = true,
                "0" | "false" | "no" => self.strict_args = false,
                _ => {}
            }
        }

        if let Ok(filter) = std::env::var(ENV_LOG) {
            if !filter.is_empty() {
                self.log_filter = filter;
            }
        }

        Ok(())
    }

    /// Save configuration to a directory
    pub fn save(&self, dir: &Path) -> anyhow::Result<()> {
        let config_path = dir.join(CONFIG_FILE_NAME);
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }
}
