//! Report aggregation
//!
//! Flattens every spec run into one outcome list and decides whether the
//! batch failed.

#![allow(dead_code)]

use serde::Serialize;
use std::fmt;

use crate::models::{FatalEntry, MutationReport, SpecRun};

/// Aggregated outcome of a batch
#[derive(Clone, Debug, Serialize)]
pub struct Verdict {
    pub failed: bool,
    pub total_specs: usize,
    pub total_mutations: usize,
    pub error_cases: Vec<MutationReport>,
    pub fatals: Vec<FatalEntry>,
    /// Specs that ran without a fatal but produced no report
    pub zero_result_specs: Vec<String>,
}

/// Aggregate spec runs into a verdict
///
/// Only counts and membership are derived, so the result does not depend
/// on the order in which specs finished.
pub fn aggregate(runs: &[SpecRun]) -> Verdict {
    let flat: Vec<&MutationReport> = runs.iter().flat_map(|run| run.reports()).collect();

    let error_cases: Vec<MutationReport> = flat
        .iter()
        .filter(|report| report.is_error())
        .map(|report| (*report).clone())
        .collect();

    let fatals: Vec<FatalEntry> = runs.iter().filter_map(|run| run.fatal()).collect();

    let zero_result_specs = runs
        .iter()
        .filter(|run| run.is_zero_result())
        .map(|run| run.spec.name.clone())
        .collect();

    Verdict {
        failed: !fatals.is_empty() || !error_cases.is_empty(),
        total_specs: runs.len(),
        total_mutations: flat.len(),
        error_cases,
        fatals,
        zero_result_specs,
    }
}

impl Verdict {
    pub fn error_count(&self) -> usize {
        self.error_cases.len()
    }

    pub fn fatal_count(&self) -> usize {
        self.fatals.len()
    }

    pub fn passed_mutations(&self) -> usize {
        self.total_mutations - self.error_cases.len()
    }

    /// Combined failure describing every fatal and mutation error
    pub fn failure(&self) -> Option<BatchFailure> {
        if !self.failed {
            return None;
        }
        Some(BatchFailure {
            fatals: self.fatals.iter().map(|f| f.to_string()).collect(),
            errors: self
                .error_cases
                .iter()
                .map(|r| format!("{} got {}", r.path(), r.error.as_deref().unwrap_or("")))
                .collect(),
        })
    }

    pub fn into_result(self) -> Result<(), BatchFailure> {
        match self.failure() {
            Some(failure) => Err(failure),
            None => Ok(()),
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | Specs: {} | Mutations: {} | Errors: {} | Fatals: {} | Without mutations: {}",
            if self.failed { "FAILED" } else { "PASSED" },
            self.total_specs,
            self.total_mutations,
            self.error_count(),
            self.fatal_count(),
            self.zero_result_specs.len()
        )
    }
}

/// Aggregate error raised once the batch has completed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    pub fatals: Vec<String>,
    pub errors: Vec<String>,
}

impl fmt::Display for BatchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} fatal spec(s), {} mutation error(s)",
            self.fatals.len(),
            self.errors.len()
        )?;
        for line in self.fatals.iter().chain(&self.errors) {
            write!(f, "\n{line}")?;
        }
        Ok(())
    }
}

impl std::error::Error for BatchFailure {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountRef, Mutation, Spec, SpecOutcome};
    use std::sync::Arc;

    fn run(index: usize, name: &str, outcome: SpecOutcome) -> SpecRun {
        SpecRun {
            index,
            spec: Arc::new(Spec::new(name, "bitcoin")),
            outcome,
            logs: Vec::new(),
            duration_ms: 0,
        }
    }

    fn report(spec: &str, mutation: &str, error: Option<&str>) -> MutationReport {
        let report = MutationReport::new(Arc::new(Spec::new(spec, "bitcoin")))
            .with_account(AccountRef::new("a", "Acc 1", 10))
            .with_mutation(Mutation::new(mutation));
        match error {
            Some(e) => report.with_error(e),
            None => report,
        }
    }

    #[test]
    fn test_all_empty_passes_with_zero_result_warning() {
        let runs = vec![
            run(0, "A", SpecOutcome::Completed(vec![])),
            run(1, "B", SpecOutcome::Completed(vec![])),
            run(2, "C", SpecOutcome::Completed(vec![])),
        ];
        let verdict = aggregate(&runs);

        assert!(!verdict.failed);
        assert_eq!(verdict.total_mutations, 0);
        assert_eq!(verdict.zero_result_specs, vec!["A", "B", "C"]);
        assert!(verdict.into_result().is_ok());
    }

    #[test]
    fn test_fatal_fails_batch() {
        let runs = vec![
            run(0, "X", SpecOutcome::Fatal("boom".to_string())),
            run(1, "Y", SpecOutcome::Completed(vec![report("Y", "send", None)])),
        ];
        let verdict = aggregate(&runs);

        assert!(verdict.failed);
        assert_eq!(verdict.fatal_count(), 1);
        assert!(verdict.zero_result_specs.is_empty());
        assert_eq!(verdict.passed_mutations(), 1);

        let failure = verdict.into_result().unwrap_err();
        assert!(failure.to_string().contains("X got boom"));
    }

    #[test]
    fn test_mutation_error_fails_batch() {
        let runs = vec![run(
            0,
            "Y",
            SpecOutcome::Completed(vec![
                report("Y", "send", None),
                report("Y", "sendMax", Some("balance mismatch")),
            ]),
        )];
        let verdict = aggregate(&runs);

        assert!(verdict.failed);
        assert_eq!(verdict.total_mutations, 2);
        assert_eq!(verdict.error_count(), 1);

        let failure = verdict.failure().unwrap();
        assert_eq!(failure.errors, vec!["Y/Acc 1/sendMax got balance mismatch"]);
        assert!(failure.fatals.is_empty());
    }

    #[test]
    fn test_clean_batch_passes() {
        let runs = vec![run(
            0,
            "Y",
            SpecOutcome::Completed(vec![report("Y", "send", None)]),
        )];
        let verdict = aggregate(&runs);
        assert!(!verdict.failed);
        assert!(verdict.failure().is_none());
        assert!(verdict.to_string().starts_with("PASSED"));
    }

    #[test]
    fn test_failure_lists_everything() {
        let failure = BatchFailure {
            fatals: vec!["X got boom".to_string()],
            errors: vec!["Y/Acc/send got nope".to_string()],
        };
        assert_eq!(
            failure.to_string(),
            "1 fatal spec(s), 1 mutation error(s)\nX got boom\nY/Acc/send got nope"
        );
    }
}
