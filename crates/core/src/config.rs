use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{QuoteError, Result};

pub const DEFAULT_CONFIG: &str = "freightq.toml";
pub const DEFAULT_DATASET: &str = "datacost.csv";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

pub const ENV_DATASET: &str = "FREIGHTQ_DATASET";
pub const ENV_BIND_ADDR: &str = "BIND_ADDR";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct QuoteConfig {
    pub dataset: PathBuf,
    pub bind_addr: String,
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            dataset: PathBuf::from(DEFAULT_DATASET),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

impl QuoteConfig {
    /// Reads `path` if it exists, then applies environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = Self::from_file(path)?;
        config.apply_env();
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| QuoteError::InvalidConfig(e.to_string()))
    }

    fn apply_env(&mut self) {
        if let Ok(dataset) = env::var(ENV_DATASET) {
            if !dataset.trim().is_empty() {
                self.dataset = PathBuf::from(dataset);
            }
        }
        if let Ok(addr) = env::var(ENV_BIND_ADDR) {
            if !addr.trim().is_empty() {
                self.bind_addr = addr;
            }
        }
    }
}
