//! Configuration module
//!
//! Handles loading and managing configuration.

mod env;

pub use env::{print_env_help, ConfigError, EnvBuilder, EnvConfig, EnvGuard};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration file locations (in order of precedence)
const CONFIG_LOCATIONS: &[&str] = &[
    "./mutation-bot.yaml",
    "./mutation-bot.yml",
    "./.mutation-bot.yaml",
    "~/.config/mutation-bot/config.yaml",
];

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Maximum specs running at the same time
    pub concurrency: usize,

    /// Path to the spec registry
    pub registry_path: String,

    /// Default output format
    pub format: String,

    /// Simulated engine settings
    pub engine: EngineConfig,

    /// Commit comment notifier settings
    pub notifier: NotifierConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            concurrency: 6,
            registry_path: "specs.yaml".to_string(),
            format: "table".to_string(),
            engine: EngineConfig::default(),
            notifier: NotifierConfig::default(),
        }
    }
}

impl AppConfig {
    /// Find configuration file in standard locations
    pub fn find() -> Option<PathBuf> {
        CONFIG_LOCATIONS
            .iter()
            .map(|location| expand_path(location))
            .find(|path| path.exists())
    }

    /// Load from an explicit path, a discovered file, or defaults
    pub fn load_or_default(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => match Self::find() {
                Some(found) => Self::load(found),
                None => Ok(Self::default()),
            },
        }
    }

    /// Load configuration from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read config file {}", path.as_ref().display())
        })?;

        let config: Self = if is_yaml(path.as_ref()) {
            serde_yaml::from_str(&content).context("Failed to parse YAML config")?
        } else {
            serde_json::from_str(&content).context("Failed to parse JSON config")?
        };

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = if is_yaml(path.as_ref()) {
            serde_yaml::to_string(self).context("Failed to serialize config")?
        } else {
            serde_json::to_string_pretty(self).context("Failed to serialize config")?
        };

        std::fs::write(path, content).context("Failed to write config file")?;
        Ok(())
    }

    /// Apply environment overrides
    pub fn merge_env(mut self, env: &EnvConfig) -> Self {
        if let Some(concurrency) = env.concurrency {
            self.concurrency = concurrency;
        }
        if let Some(format) = &env.format {
            self.format = format.clone();
        }
        if let Some(registry) = &env.registry {
            self.registry_path = registry.clone();
        }
        self
    }
}

/// Simulated engine configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Accounts derived per spec
    pub accounts_per_spec: usize,

    /// Lowest starting balance of a derived account
    pub min_balance: u64,

    /// Highest starting balance of a derived account
    pub max_balance: u64,

    /// Artificial latency per mutation in milliseconds
    pub latency_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            accounts_per_spec: 3,
            min_balance: 1_000,
            max_balance: 100_000,
            latency_ms: 0,
        }
    }
}

/// Commit comment notifier configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifierConfig {
    /// API base URL
    pub api_url: String,

    /// Repository receiving the commit comment (`owner/name`)
    pub repository: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            repository: "LedgerHQ/ledger-live-common".to_string(),
            timeout_secs: 30,
        }
    }
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .map(|e| e == "yaml" || e == "yml")
        .unwrap_or(false)
}

/// Expand ~ in path
fn expand_path(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(path)),
        None => PathBuf::from(path),
    }
}
