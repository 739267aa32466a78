//! Batch runner
//!
//! Runs a list of specs through the engine with bounded concurrency and
//! per-spec fault isolation.

#![allow(dead_code)]

use std::sync::Arc;
use tracing::info;

use super::batch::{BatchExecutor, ExecutorError};
use super::isolation::isolate;
use crate::engine::MutationEngine;
use crate::models::{FatalEntry, MutationReport, Spec, SpecRun};
use crate::utils::timer::Timer;

/// Runner for a batch of specs
pub struct BotRunner {
    executor: BatchExecutor,
    engine: Arc<dyn MutationEngine>,
}

impl BotRunner {
    pub fn new(concurrency: usize, engine: Arc<dyn MutationEngine>) -> Self {
        Self {
            executor: BatchExecutor::new(concurrency),
            engine,
        }
    }

    /// Run every spec to completion
    pub async fn run(&self, specs: Vec<Spec>) -> Result<BatchRun, ExecutorError> {
        info!(
            "Running {} spec(s) (max {} concurrent)",
            specs.len(),
            self.executor.concurrency()
        );

        let timer = Timer::start("batch");
        let runs = self
            .executor
            .run(specs, |index, spec| {
                let engine = self.engine.clone();
                let spec = Arc::new(spec);
                isolate(index, spec.clone(), move |log| async move {
                    engine.run(spec, &log).await
                })
            })
            .await?;

        let batch = BatchRun {
            runs,
            duration_ms: timer.stop(),
        };

        info!(
            "Batch completed in {}ms: {} spec(s), {} fatal(s)",
            batch.duration_ms,
            batch.runs.len(),
            batch.fatals().len()
        );

        Ok(batch)
    }
}

/// Result of a whole batch, one run per input spec in input order
#[derive(Clone, Debug)]
pub struct BatchRun {
    pub runs: Vec<SpecRun>,
    pub duration_ms: u64,
}

impl BatchRun {
    /// Report lists by input position
    pub fn execution_result(&self) -> Vec<&[MutationReport]> {
        self.runs.iter().map(|run| run.reports()).collect()
    }

    pub fn fatals(&self) -> Vec<FatalEntry> {
        self.runs.iter().filter_map(|run| run.fatal()).collect()
    }

    pub fn specs(&self) -> Vec<Arc<Spec>> {
        self.runs.iter().map(|run| run.spec.clone()).collect()
    }
}
