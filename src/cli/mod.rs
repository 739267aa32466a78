//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use clap::{Parser, Subcommand};

/// Batch mutation-test orchestrator
#[derive(Parser, Debug)]
#[command(name = "mutation-bot")]
#[command(version)]
#[command(about = "Run currency mutation specs in parallel and report a single verdict")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the selected specs
    Run(RunArgs),

    /// List the specs a run would select
    List(ListArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

/// Arguments for run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Only run specs for this currency (id, name, or ticker)
    #[arg(short, long)]
    pub currency: Option<String>,

    /// Only run mutations whose name matches this regular expression
    #[arg(short, long)]
    pub mutation: Option<String>,

    /// Maximum specs running at the same time
    #[arg(short = 'j', long)]
    pub concurrency: Option<usize>,

    /// Spec registry file (YAML or JSON)
    #[arg(short, long)]
    pub registry: Option<String>,

    /// Configuration file
    #[arg(long)]
    pub config: Option<String>,

    /// Output format (table, json, json-pretty, markdown, summary)
    #[arg(short, long)]
    pub format: Option<String>,

    /// Save the report to file
    #[arg(short, long)]
    pub output: Option<String>,
}

/// Arguments for list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Only list specs for this currency
    #[arg(short, long)]
    pub currency: Option<String>,

    /// Only list mutations whose name matches this regular expression
    #[arg(short, long)]
    pub mutation: Option<String>,

    /// Spec registry file (YAML or JSON)
    #[arg(short, long)]
    pub registry: Option<String>,

    /// Configuration file
    #[arg(long)]
    pub config: Option<String>,

    /// Show mutation names
    #[arg(short, long)]
    pub detailed: bool,
}

/// Arguments for config management
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write a configuration file with default values
    Init {
        /// Output file path
        #[arg(short, long, default_value = "mutation-bot.yaml")]
        output: String,

        /// Overwrite existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Show the effective configuration
    Show {
        /// Show environment variables instead
        #[arg(short, long)]
        env: bool,

        /// Output format (yaml, json)
        #[arg(short, long, default_value = "yaml")]
        format: String,

        /// Configuration file
        #[arg(long)]
        config: Option<String>,
    },

    /// Describe recognised environment variables
    Env,
}
