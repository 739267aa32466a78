//! Mutation Bot - batch mutation-test orchestrator
//!
//! Runs currency specs, each owning a list of state-changing mutations,
//! with bounded parallelism. A spec that fails fatally is isolated from the
//! rest of the batch; every outcome is aggregated into one verdict.
//!
//! ## Usage
//!
//! ```bash
//! # Run every spec in the registry
//! SEED="..." mutation-bot run
//!
//! # Only bitcoin specs, only send mutations
//! SEED="..." mutation-bot run --currency btc --mutation '^send'
//!
//! # Post the report on a commit
//! SEED="..." GITHUB_SHA=abc123 GITHUB_TOKEN=... mutation-bot run
//!
//! # Preview the selection
//! mutation-bot list --currency ethereum --detailed
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

mod cli;
mod config;
mod engine;
mod executor;
mod models;
mod notify;
mod orchestrator;
mod output;
mod registry;
mod report;
mod utils;

use cli::Args;
use config::{AppConfig, EnvConfig};
use engine::SimulatedEngine;
use models::CurrencyCatalog;
use notify::Notifier;
use orchestrator::Orchestrator;
use output::{OutputFormat, ResultFormatter};
use registry::{select, SpecFilter, SpecRegistry};
use utils::logger::{init_logger, LogLevel};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let env = EnvConfig::load();

    let level = args.log_level.as_deref().or(env.log_level.as_deref());
    init_logger(LogLevel::resolve(level, args.verbose));

    match args.command {
        cli::Command::Run(run_args) => {
            run_batch(run_args, &env).await?;
        }
        cli::Command::List(list_args) => {
            list_specs(list_args, &env)?;
        }
        cli::Command::Config(config_args) => {
            manage_config(config_args, &env)?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&str>, env: &EnvConfig) -> Result<AppConfig> {
    let path = path.or(env.config_file.as_deref());
    Ok(AppConfig::load_or_default(path)?.merge_env(env))
}

async fn run_batch(args: cli::RunArgs, env: &EnvConfig) -> Result<()> {
    let seed = env.require_seed()?;

    let mut config = load_config(args.config.as_deref(), env)?;
    if let Some(concurrency) = args.concurrency {
        config.concurrency = concurrency;
    }

    let registry_path = args.registry.as_deref().unwrap_or(&config.registry_path);
    let registry = SpecRegistry::load(registry_path)?;
    let filter = SpecFilter::new(args.currency, args.mutation.as_deref())?;

    let format_name = args.format.as_deref().unwrap_or(&config.format);
    let format = OutputFormat::from_str(format_name)
        .ok_or_else(|| anyhow::anyhow!("Unknown output format: {format_name}"))?;

    let notifier = Notifier::from_env(env, &config.notifier)?;
    if let Some(notifier) = &notifier {
        info!("Report will be posted to {}", notifier.endpoint());
    }

    let engine = SimulatedEngine::new(seed, config.engine.clone());
    let orchestrator = Orchestrator::new(
        registry,
        Arc::new(CurrencyCatalog::builtin()),
        Arc::new(engine),
    )
    .with_concurrency(config.concurrency)
    .with_notifier(notifier);

    let outcome = orchestrator.execute(&filter).await?;

    let formatter = ResultFormatter::new(format);
    println!("{}", formatter.format_batch(&outcome.batch, &outcome.verdict));

    if let Some(path) = &args.output {
        output::write_report_to_file(path, &outcome.batch, &outcome.verdict, format)
            .with_context(|| format!("Failed to write report to {path}"))?;
        info!("Report saved to {}", path);
    }

    outcome.verdict.into_result()?;
    Ok(())
}

fn list_specs(args: cli::ListArgs, env: &EnvConfig) -> Result<()> {
    let config = load_config(args.config.as_deref(), env)?;
    let registry_path = args.registry.as_deref().unwrap_or(&config.registry_path);
    let registry = SpecRegistry::load(registry_path)?;
    let filter = SpecFilter::new(args.currency, args.mutation.as_deref())?;

    let catalog = CurrencyCatalog::builtin();
    let specs = select(&registry, &filter, &catalog);

    println!("\nSelected Specs ({} of {})\n", specs.len(), registry.len());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    for (i, spec) in specs.iter().enumerate() {
        let currency = catalog
            .get(&spec.currency)
            .map(|c| c.to_string())
            .unwrap_or_else(|| spec.currency.to_string());

        println!(
            "  {:2}. {:28} {:24} {} mutation(s)",
            i + 1,
            spec.name,
            currency,
            spec.mutations.len()
        );

        if args.detailed {
            for mutation in &spec.mutations {
                println!("        - {} (max run {})", mutation.name, mutation.max_run);
            }
        }
    }

    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    Ok(())
}

fn manage_config(args: cli::ConfigArgs, env: &EnvConfig) -> Result<()> {
    match args.action {
        cli::ConfigAction::Init { output, force } => {
            let path = Path::new(&output);
            if path.exists() && !force {
                anyhow::bail!(
                    "Configuration file already exists: {output}. Use --force to overwrite."
                );
            }

            AppConfig::default().save(path)?;
            println!("✓ Configuration file created: {output}");
        }

        cli::ConfigAction::Show {
            env: show_env,
            format,
            config,
        } => {
            if show_env {
                env.print_summary();
            } else {
                let config = load_config(config.as_deref(), env)?;
                let output = if format == "json" {
                    serde_json::to_string_pretty(&config)?
                } else {
                    serde_yaml::to_string(&config)?
                };
                println!("{output}");
            }
        }

        cli::ConfigAction::Env => {
            config::print_env_help();
        }
    }

    Ok(())
}
