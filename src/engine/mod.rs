//! Mutation execution engine
//!
//! The engine runs every mutation of one spec and reports per-mutation
//! outcomes. A returned error means the whole spec could not complete.

#![allow(dead_code)]

mod simulated;

pub use simulated::{EngineError, SimulatedEngine};

use anyhow::Result;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tracing::debug;

use crate::models::{MutationReport, Spec};

/// Engine that executes the mutations of a spec
#[async_trait]
pub trait MutationEngine: Send + Sync {
    async fn run(&self, spec: Arc<Spec>, log: &SpecLog) -> Result<Vec<MutationReport>>;
}

/// Append-only log buffer owned by a single spec execution
#[derive(Clone, Debug)]
pub struct SpecLog {
    spec: String,
    lines: Arc<Mutex<Vec<String>>>,
}

impl SpecLog {
    pub fn new(spec: impl Into<String>) -> Self {
        Self {
            spec: spec.into(),
            lines: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Record a line for the report and mirror it to tracing
    pub fn log(&self, line: impl Into<String>) {
        let line = line.into();
        debug!("[{}] {}", self.spec, line);
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(line);
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_log_keeps_order() {
        let log = SpecLog::new("Bitcoin");
        assert!(log.is_empty());

        log.log("first");
        let clone = log.clone();
        clone.log("second");

        assert_eq!(log.lines(), vec!["first", "second"]);
        assert_eq!(log.len(), 2);
    }
}
