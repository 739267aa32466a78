//! Environment variable configuration
//!
//! Reads the seed credential, the notifier pair, and prefixed overrides.

#![allow(dead_code)]

use std::env;
use thiserror::Error;

/// Environment variable prefix
const ENV_PREFIX: &str = "MUTATION_BOT";

const SEED_VAR: &str = "SEED";
const COMMIT_VAR: &str = "GITHUB_SHA";
const TOKEN_VAR: &str = "GITHUB_TOKEN";

/// Configuration errors raised before any spec runs
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("SEED is not set: a seed is required to derive accounts")]
    MissingSeed,
}

/// Environment configuration from environment variables
#[derive(Clone, Debug, Default)]
pub struct EnvConfig {
    /// Seed credential from SEED
    pub seed: Option<String>,
    /// Commit identifier from GITHUB_SHA
    pub commit: Option<String>,
    /// API token from GITHUB_TOKEN
    pub token: Option<String>,
    /// Config file from MUTATION_BOT_CONFIG
    pub config_file: Option<String>,
    /// Registry file from MUTATION_BOT_REGISTRY
    pub registry: Option<String>,
    /// Concurrency from MUTATION_BOT_CONCURRENCY
    pub concurrency: Option<usize>,
    /// Output format from MUTATION_BOT_FORMAT
    pub format: Option<String>,
    /// Log level from MUTATION_BOT_LOG
    pub log_level: Option<String>,
}

impl EnvConfig {
    /// Load configuration from environment variables
    pub fn load() -> Self {
        Self {
            seed: non_empty(SEED_VAR),
            commit: non_empty(COMMIT_VAR),
            token: non_empty(TOKEN_VAR),
            config_file: get_env("CONFIG"),
            registry: get_env("REGISTRY"),
            concurrency: get_env_parse("CONCURRENCY"),
            format: get_env("FORMAT"),
            log_level: get_env("LOG"),
        }
    }

    /// Seed credential, required before running any spec
    pub fn require_seed(&self) -> Result<&str, ConfigError> {
        self.seed.as_deref().ok_or(ConfigError::MissingSeed)
    }

    /// Commit and token, only when both are present
    pub fn notifier_credentials(&self) -> Option<(&str, &str)> {
        match (&self.commit, &self.token) {
            (Some(commit), Some(token)) => Some((commit, token)),
            _ => None,
        }
    }

    /// Print current environment configuration
    pub fn print_summary(&self) {
        let mask = |v: &Option<String>| v.as_ref().map(|_| "<set>");
        println!("Environment Configuration:");
        println!("  {SEED_VAR}:                     {:?}", mask(&self.seed));
        println!("  {COMMIT_VAR}:               {:?}", self.commit);
        println!("  {TOKEN_VAR}:             {:?}", mask(&self.token));
        println!("  {ENV_PREFIX}_CONFIG:      {:?}", self.config_file);
        println!("  {ENV_PREFIX}_REGISTRY:    {:?}", self.registry);
        println!("  {ENV_PREFIX}_CONCURRENCY: {:?}", self.concurrency);
        println!("  {ENV_PREFIX}_FORMAT:      {:?}", self.format);
        println!("  {ENV_PREFIX}_LOG:         {:?}", self.log_level);
    }
}

/// Get environment variable with prefix
fn get_env(name: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}_{name}")).ok()
}

/// Get environment variable and parse to type
fn get_env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    get_env(name).and_then(|v| v.parse().ok())
}

fn non_empty(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

/// Builder for setting environment variables (useful for testing)
pub struct EnvBuilder {
    vars: Vec<(String, Option<String>)>,
}

impl EnvBuilder {
    /// Create a new environment builder
    pub fn new() -> Self {
        Self { vars: Vec::new() }
    }

    /// Set seed
    pub fn seed(mut self, seed: impl Into<String>) -> Self {
        self.vars.push((SEED_VAR.to_string(), Some(seed.into())));
        self
    }

    /// Set commit identifier
    pub fn commit(mut self, sha: impl Into<String>) -> Self {
        self.vars.push((COMMIT_VAR.to_string(), Some(sha.into())));
        self
    }

    /// Set API token
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.vars.push((TOKEN_VAR.to_string(), Some(token.into())));
        self
    }

    /// Set concurrency
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.vars.push((
            format!("{ENV_PREFIX}_CONCURRENCY"),
            Some(concurrency.to_string()),
        ));
        self
    }

    /// Unset a variable
    pub fn unset(mut self, name: impl Into<String>) -> Self {
        self.vars.push((name.into(), None));
        self
    }

    /// Apply environment variables
    pub fn apply(self) {
        for (key, value) in self.vars {
            match value {
                Some(v) => env::set_var(key, v),
                None => env::remove_var(key),
            }
        }
    }

    /// Apply and return guard that restores on drop
    pub fn apply_scoped(self) -> EnvGuard {
        let previous: Vec<_> = self
            .vars
            .iter()
            .map(|(k, _)| (k.clone(), env::var(k).ok()))
            .collect();

        self.apply();

        EnvGuard { previous }
    }
}

impl Default for EnvBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Guard that restores environment variables on drop
pub struct EnvGuard {
    previous: Vec<(String, Option<String>)>,
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in self.previous.iter().rev() {
            match value {
                Some(v) => env::set_var(key, v),
                None => env::remove_var(key),
            }
        }
    }
}

/// Print all recognised environment variables
pub fn print_env_help() {
    println!("Environment Variables:");
    println!();
    println!("  {SEED_VAR}                      Seed credential (required for `run`)");
    println!("  {COMMIT_VAR}                Commit to comment on (with {TOKEN_VAR})");
    println!("  {TOKEN_VAR}              Token for the commit comment");
    println!("  {ENV_PREFIX}_CONFIG       Path to configuration file");
    println!("  {ENV_PREFIX}_REGISTRY     Path to the spec registry");
    println!("  {ENV_PREFIX}_CONCURRENCY  Maximum specs in flight");
    println!("  {ENV_PREFIX}_FORMAT       Output format (table, json, markdown, summary)");
    println!("  {ENV_PREFIX}_LOG          Log level (trace, debug, info, warn, error)");
}
