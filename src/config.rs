use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::extract::ExtractOptions;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub matching: MatchingConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Sqlite,
    Memory,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MatchingConfig {
    #[serde(default = "default_fuzzy_threshold")]
    pub fuzzy_threshold: f64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            fuzzy_threshold: default_fuzzy_threshold(),
        }
    }
}

fn default_fuzzy_threshold() -> f64 {
    0.5
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExtractionConfig {
    #[serde(default = "default_min_price_cents")]
    pub min_price_cents: i64,
    #[serde(default = "default_max_price_cents")]
    pub max_price_cents: i64,
    #[serde(default = "default_min_name_chars")]
    pub min_name_chars: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_price_cents: default_min_price_cents(),
            max_price_cents: default_max_price_cents(),
            min_name_chars: default_min_name_chars(),
        }
    }
}

fn default_min_price_cents() -> i64 {
    1
}
fn default_max_price_cents() -> i64 {
    999_999
}
fn default_min_name_chars() -> usize {
    3
}

impl ExtractionConfig {
    pub fn options(&self) -> ExtractOptions {
        ExtractOptions {
            min_price_cents: self.min_price_cents,
            max_price_cents: self.max_price_cents,
            min_name_chars: self.min_name_chars,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_request_timeout_secs() -> u64 {
    30
}
fn default_max_upload_bytes() -> usize {
    20 * 1024 * 1024
}

impl Config {
    /// A config with every default and the given database path.
    pub fn for_db(path: impl Into<PathBuf>) -> Self {
        Self {
            db: DbConfig { path: path.into() },
            store: StoreConfig::default(),
            matching: MatchingConfig::default(),
            extraction: ExtractionConfig::default(),
            server: ServerConfig {
                bind: "127.0.0.1:8000".to_string(),
                request_timeout_secs: default_request_timeout_secs(),
                max_upload_bytes: default_max_upload_bytes(),
            },
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    let threshold = config.matching.fuzzy_threshold;
    if !(threshold > 0.0 && threshold <= 1.0) {
        anyhow::bail!("matching.fuzzy_threshold must be in (0.0, 1.0]");
    }

    let ex = &config.extraction;
    if ex.min_price_cents < 0 {
        anyhow::bail!("extraction.min_price_cents must be >= 0");
    }
    if ex.min_price_cents > ex.max_price_cents {
        anyhow::bail!(
            "extraction.min_price_cents ({}) must be <= extraction.max_price_cents ({})",
            ex.min_price_cents,
            ex.max_price_cents
        );
    }
    if ex.min_name_chars == 0 {
        anyhow::bail!("extraction.min_name_chars must be >= 1");
    }

    if config.server.request_timeout_secs == 0 {
        anyhow::bail!("server.request_timeout_secs must be > 0");
    }
    if config.server.max_upload_bytes == 0 {
        anyhow::bail!("server.max_upload_bytes must be > 0");
    }

    Ok(())
}
