//! Build configuration.
//!
//! Configuration is read from a JSON file (`config.json` by default).
//! Every field carries a serde default so a missing file, or a file that
//! only overrides a couple of fields, still yields a usable
//! configuration. Corpus and output paths can additionally be overridden
//! from the CLI.

use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub corpus: CorpusConfig,
    pub output: OutputConfig,
    pub ingestion: IngestionConfig,
}

/// Locations of the raw corpus inputs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    /// Root of the per-work metadata tree (`publisher/edition/work.json`).
    pub works_dir: String,
    /// Citation edge list (`source,target` CSV with a header row).
    pub citation_csv: String,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            works_dir: "data/aps-dataset-metadata".to_string(),
            citation_csv: "data/aps-dataset-citations.csv".to_string(),
        }
    }
}

/// Where built graphs and diagnostics artifacts land.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: "output".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IngestionConfig {
    /// Optional ceiling on authors per work; works above it are ignored.
    /// `None` means no limit.
    pub authors_limit: Option<usize>,
    /// Dump `authors.json` and `works.json` after ingestion.
    pub dump_registries: bool,
    /// Flush accumulated edges to the bucket file every N works
    /// (0 = accumulate the whole bucket and flush once).
    pub flush_every: usize,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            authors_limit: None,
            dump_registries: false,
            flush_every: 0,
        }
    }
}

/// Loads configuration from `path`, falling back to defaults when the file
/// does not exist. A file that exists but does not parse is an error.
pub fn load_config(path: &str) -> Result<Config, Box<dyn std::error::Error>> {
    if !Path::new(path).exists() {
        return Ok(Config::default());
    }
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(Into::into)
}
