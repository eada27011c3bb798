//! Configuration file support for the demo.
//!
//! All settings are optional; a missing file or section falls back to
//! defaults.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Simulated data-access layer settings.
    pub repository: RepositoryConfig,
}

/// Settings for the simulated repository layer.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    /// Simulated save latency in milliseconds.
    pub latency_ms: u64,
    /// Item id the repository rejects.
    pub fail_item: String,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            latency_ms: 100,
            fail_item: "poison".to_string(),
        }
    }
}

impl DemoConfig {
    /// Load configuration from a file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: DemoConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }
}
