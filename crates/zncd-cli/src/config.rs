//! On-disk configuration for the command line tool

use serde::{Deserialize, Serialize};
use std::path::Path;
use zncd_core::CompressConfig;

/// Settings that may come from a `.toml` or `.json` file; flags override them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Level and retention for `compress`
    pub compression: CompressConfig,
    /// Bytes read from disk per `feed` / written per `pull`
    pub chunk_size: usize,
    /// Most inputs accepted by `ncd`; the rest are dropped with a warning
    pub max_inputs: usize,
    /// Decimal places printed for each distance
    pub precision: usize,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            compression: CompressConfig::default(),
            chunk_size: 65_536,
            max_inputs: 666,
            precision: 5,
        }
    }
}

impl CliConfig {
    /// Load from `path`, choosing the parser by file extension.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();

        match ext.to_lowercase().as_str() {
            "toml" => {
                let config: CliConfig = toml::from_str(&contents)?;
                Ok(config)
            }
            "json" => {
                let config: CliConfig = serde_json::from_str(&contents)?;
                Ok(config)
            }
            _ => anyhow::bail!("Unsupported config file extension: {}", ext),
        }
    }
}
