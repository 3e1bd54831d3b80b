use crate::global;
use crate::session::CaptureSettings;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub capture: CaptureConfig,
    pub api: ApiConfig,
    pub simulation: SimulationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Recording chunk cadence in milliseconds.
    pub chunk_interval_ms: u64,
    /// Backoff before restarting a recognizer run that ended on its own.
    pub restart_backoff_ms: u64,
    /// Bounded wait for device permission prompts. Expiry is treated as a
    /// declined permission.
    pub prompt_timeout_secs: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            chunk_interval_ms: 1000,
            restart_backoff_ms: 100,
            prompt_timeout_secs: 30,
        }
    }
}

impl CaptureConfig {
    pub fn settings(&self) -> CaptureSettings {
        CaptureSettings {
            chunk_interval: Duration::from_millis(self.chunk_interval_ms),
            restart_backoff: Duration::from_millis(self.restart_backoff_ms),
            prompt_timeout: Duration::from_secs(self.prompt_timeout_secs),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self { port: 4810 }
    }
}

/// Parameters for the simulated capture backends used when no real device
/// gateway or speech backend is wired in.
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Bytes produced per track per chunk interval.
    pub chunk_bytes: usize,
    /// Simulated permission-prompt delay in milliseconds.
    pub prompt_delay_ms: u64,
    /// Pause between simulated recognizer segments in milliseconds.
    pub recognizer_cadence_ms: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            chunk_bytes: 4096,
            prompt_delay_ms: 250,
            recognizer_cadence_ms: 1500,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        if !config_path.exists() {
            info!(
                "Config file not found, creating default at {:?}",
                config_path
            );
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let content =
            std::fs::read_to_string(&config_path).context("Failed to read config file")?;

        let config: Self = toml::from_str(&content).context("Failed to parse config file")?;

        info!("Loaded config from {:?}", config_path);
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(&config_path, content).context("Failed to write config file")?;

        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        global::config_file()
    }
}
