//! YAML configuration for the near-duplicate pipeline.
//!
//! One file configures every stage. Missing sections take their defaults,
//! so the smallest valid file is just the version line.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! version: "1.0"
//!
//! shingle:
//!   shingle_size: 3
//!   seed: 71
//!
//! minhash:
//!   signature_size: 256
//!   seed: 71
//!   use_parallel: true
//!
//! ingest:
//!   batch_size: 1024
//!   use_parallel: true
//!   progress_every: 1000
//!
//! cluster:
//!   similarity_threshold: 0.8
//!   signature_batch: 1024
//!
//! store:
//!   backend:
//!     kind: redb
//!     path: "/var/tmp/neardup.redb"
//!   capacity: 10000000
//!
//! output:
//!   path: "dupes.csv"
//!
//! log_level: "info"
//! json_logs: false
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use canonical::ShingleConfig;
use index::{LshParams, StoreConfig};
use ingest::IngestConfig;
use matcher::ClusterConfig;
use perceptual::MinHashConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Where the report goes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OutputConfig {
    /// CSV report path. The CLI `--output` flag takes precedence.
    pub path: Option<PathBuf>,
}

/// Top-level configuration of a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct NearDupConfig {
    /// Configuration format version
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default)]
    pub shingle: ShingleConfig,

    #[serde(default)]
    pub minhash: MinHashConfig,

    #[serde(default)]
    pub ingest: IngestConfig,

    #[serde(default)]
    pub cluster: ClusterConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub output: OutputConfig,

    /// `tracing` filter directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub json_logs: bool,
}

impl NearDupConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: NearDupConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the version and every stage section.
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.shingle.validate().map_err(validation)?;
        self.minhash.validate().map_err(validation)?;
        self.ingest.validate().map_err(validation)?;
        self.cluster.validate().map_err(validation)?;
        LshParams::solve(self.minhash.signature_size, self.cluster.similarity_threshold)
            .map_err(validation)?;

        if let Some(0) = self.store.capacity {
            return Err(ConfigLoadError::Validation(
                "store capacity must be >= 1 when set".into(),
            ));
        }
        Ok(())
    }
}

impl Default for NearDupConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            shingle: ShingleConfig::default(),
            minhash: MinHashConfig::default(),
            ingest: IngestConfig::default(),
            cluster: ClusterConfig::default(),
            store: StoreConfig::default(),
            output: OutputConfig::default(),
            log_level: default_log_level(),
            json_logs: false,
        }
    }
}

fn validation<E: std::fmt::Display>(err: E) -> ConfigLoadError {
    ConfigLoadError::Validation(err.to_string())
}

fn default_version() -> String {
    "1.0".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}
