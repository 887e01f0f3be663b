//! SeriesQueue configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::queue::QueueConfig;

/// Default number of entries per slot
pub const DEFAULT_SLOT_SIZE: usize = 4;

/// Main configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Queue manager settings
    pub queue: QueueConfig,

    /// Entries requested per slot when a command does not say otherwise
    #[serde(rename = "slot-size")]
    pub slot_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            queue: QueueConfig::default(),
            slot_size: DEFAULT_SLOT_SIZE,
        }
    }
}

impl Config {
    /// Resolve configuration: explicit path, then project file, then user file, then defaults
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // An explicit path is authoritative, so its errors propagate
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        for candidate in Self::candidates() {
            if !candidate.exists() {
                continue;
            }
            match Self::load_from_file(&candidate) {
                Ok(config) => return Ok(config),
                Err(e) => tracing::warn!(path = %candidate.display(), error = %e, "Skipping unreadable seriesqueue config"),
            }
        }

        tracing::info!("No seriesqueue config found, using built-in queue defaults");
        Ok(Self::default())
    }

    /// Implicit config locations, highest precedence first
    fn candidates() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(".seriesqueue.yml")];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("seriesqueue").join("seriesqueue.yml"));
        }
        paths
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read seriesqueue config")?;

        let config: Self = serde_yaml::from_str(&content).context("Invalid seriesqueue config")?;

        tracing::info!(
            strategy = %config.queue.strategy,
            slot_size = config.slot_size,
            "Loaded seriesqueue config from {}",
            path.as_ref().display()
        );
        Ok(config)
    }
}
