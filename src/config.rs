//! Tool configuration.
//!
//! Read from `seatsmart.toml` (or the `--config` path); every key is
//! optional. The name-generation API key is only ever read from the
//! environment.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "seatsmart.toml";

const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding one TOML file per plan
    pub store_dir: PathBuf,

    /// Tables created for a fresh plan
    pub table_count: usize,

    /// Seats per table for a fresh plan
    pub table_capacity: u32,

    pub min_tables: usize,
    pub max_tables: usize,
    pub min_capacity: u32,
    pub max_capacity: u32,

    /// Base of the link guests open to find their seat
    pub public_url: String,

    /// Suggested themes for generated table names
    pub themes: Vec<String>,

    pub names: NamesConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_dir: PathBuf::from(".seatsmart"),
            table_count: 8,
            table_capacity: 10,
            min_tables: 1,
            max_tables: 50,
            min_capacity: 1,
            max_capacity: 12,
            public_url: "http://localhost:3000".to_string(),
            themes: [
                "Flowers",
                "Movies",
                "Cities",
                "Gemstones",
                "Constellations",
                "Colors",
                "Virtues",
            ]
            .map(String::from)
            .to_vec(),
            names: NamesConfig::default(),
        }
    }
}

/// Settings for the table-name generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamesConfig {
    pub model: String,
    pub endpoint: String,
    pub timeout_secs: u64,
    pub temperature: f32,
}

impl Default for NamesConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            timeout_secs: 30,
            temperature: 0.9,
        }
    }
}

impl Config {
    /// Parse a config from TOML content.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load from `path` if given, else from [`DEFAULT_CONFIG_FILE`] if it
    /// exists, else defaults. The result is validated.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) => Some(p.to_path_buf()),
            None => Some(PathBuf::from(DEFAULT_CONFIG_FILE)).filter(|p| p.exists()),
        };

        let config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::Read {
                    path: path.display().to_string(),
                    source: e,
                })?;
                tracing::debug!(path = %path.display(), "loaded config");
                Self::from_toml(&content)?
            }
            None => Self::default(),
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject inverted bounds and defaults that fall outside them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_tables == 0 || self.min_tables > self.max_tables {
            return Err(ConfigError::Invalid(format!(
                "table bounds {}..={} are empty or start at zero",
                self.min_tables, self.max_tables
            )));
        }
        if self.min_capacity == 0 || self.min_capacity > self.max_capacity {
            return Err(ConfigError::Invalid(format!(
                "capacity bounds {}..={} are empty or start at zero",
                self.min_capacity, self.max_capacity
            )));
        }
        self.check_layout(self.table_count, self.table_capacity)
            .map_err(|e| ConfigError::Invalid(format!("default layout: {e}")))
    }

    /// Check a table count and capacity against the configured bounds.
    pub fn check_layout(&self, count: usize, capacity: u32) -> Result<(), ConfigError> {
        if !(self.min_tables..=self.max_tables).contains(&count) {
            return Err(ConfigError::Layout(format!(
                "table count {count} is outside {}..={}",
                self.min_tables, self.max_tables
            )));
        }
        if !(self.min_capacity..=self.max_capacity).contains(&capacity) {
            return Err(ConfigError::Layout(format!(
                "capacity {capacity} is outside {}..={}",
                self.min_capacity, self.max_capacity
            )));
        }
        Ok(())
    }

    /// Link that opens the guest lookup for `plan_id`.
    pub fn share_url(&self, plan_id: &str) -> String {
        format!("{}?plan={plan_id}", self.public_url.trim_end_matches('/'))
    }
}

/// The name-generation API key from the environment, if set.
pub fn api_key_from_env() -> Option<String> {
    API_KEY_VARS
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}

/// Errors from loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}'")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("{0}")]
    Layout(String),
}
