//! TOML configuration parsing and validation.
//!
//! ```toml
//! [db]
//! path = "./data/strings.sqlite"
//!
//! [server]
//! bind = "127.0.0.1:8000"
//!
//! [api]
//! value_lookup = true
//! max_value_length = 100000
//! ```
//!
//! `[server]` and `[api]` are optional and fall back to the defaults above.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use string_analyzer_core::records::RecordOptions;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8000".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    /// Resolve `/strings/{identifier}` as a raw value when no hash matches.
    #[serde(default = "default_value_lookup")]
    pub value_lookup: bool,
    /// Longest accepted value in characters; `0` disables the limit.
    #[serde(default = "default_max_value_length")]
    pub max_value_length: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            value_lookup: default_value_lookup(),
            max_value_length: default_max_value_length(),
        }
    }
}

fn default_value_lookup() -> bool {
    true
}
fn default_max_value_length() -> usize {
    100_000
}

impl ApiConfig {
    pub fn record_options(&self) -> RecordOptions {
        RecordOptions {
            value_lookup: self.value_lookup,
            max_value_length: self.max_value_length,
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.server.bind.trim().is_empty() {
        anyhow::bail!("server.bind must not be empty");
    }

    if config.db.path.as_os_str().is_empty() {
        anyhow::bail!("db.path must not be empty");
    }

    Ok(config)
}
