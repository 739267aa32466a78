//! Outcome models for spec execution
//!
//! Defines mutation reports, fatal entries, and the per-spec outcome.

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use super::{Mutation, Spec};

/// Reference to an account touched by a mutation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRef {
    pub id: String,
    pub name: String,
    pub balance: u64,
}

impl AccountRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>, balance: u64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            balance,
        }
    }
}

impl fmt::Display for AccountRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.balance)
    }
}

/// Outcome of running one mutation inside one spec
///
/// `error` is set when the mutation ran but its business assertion failed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MutationReport {
    pub spec: Arc<Spec>,
    pub account: Option<AccountRef>,
    pub mutation: Option<Mutation>,
    pub destination: Option<AccountRef>,
    pub error: Option<String>,
    pub operation_id: Option<String>,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
}

impl MutationReport {
    pub fn new(spec: Arc<Spec>) -> Self {
        Self {
            spec,
            account: None,
            mutation: None,
            destination: None,
            error: None,
            operation_id: None,
            started_at: Utc::now(),
            duration_ms: 0,
        }
    }

    pub fn with_account(mut self, account: AccountRef) -> Self {
        self.account = Some(account);
        self
    }

    pub fn with_mutation(mut self, mutation: Mutation) -> Self {
        self.mutation = Some(mutation);
        self
    }

    pub fn with_destination(mut self, destination: AccountRef) -> Self {
        self.destination = Some(destination);
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn with_operation(mut self, operation_id: impl Into<String>) -> Self {
        self.operation_id = Some(operation_id.into());
        self
    }

    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// `spec/account/mutation` path used in failure listings
    pub fn path(&self) -> String {
        format!(
            "{}/{}/{}",
            self.spec.name,
            self.account.as_ref().map(|a| a.name.as_str()).unwrap_or("?"),
            self.mutation.as_ref().map(|m| m.name.as_str()).unwrap_or("?"),
        )
    }
}

impl fmt::Display for MutationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = if self.is_error() { "✗" } else { "✓" };
        write!(f, "{} {} [{}ms]", symbol, self.path(), self.duration_ms)?;
        if let Some(err) = &self.error {
            write!(f, " - {err}")?;
        }
        Ok(())
    }
}

/// A spec whose execution could not complete at all
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FatalEntry {
    pub spec: Arc<Spec>,
    pub error: String,
}

impl fmt::Display for FatalEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} got {}", self.spec.name, self.error)
    }
}

/// Terminal state of one spec execution
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "lowercase")]
pub enum SpecOutcome {
    Completed(Vec<MutationReport>),
    Fatal(String),
}

impl SpecOutcome {
    /// Reports produced by the spec; empty for a fatal outcome
    pub fn reports(&self) -> &[MutationReport] {
        match self {
            SpecOutcome::Completed(reports) => reports,
            SpecOutcome::Fatal(_) => &[],
        }
    }

    pub fn fatal_error(&self) -> Option<&str> {
        match self {
            SpecOutcome::Completed(_) => None,
            SpecOutcome::Fatal(err) => Some(err),
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, SpecOutcome::Fatal(_))
    }
}

/// Everything recorded for the spec at one position of the batch
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SpecRun {
    pub index: usize,
    pub spec: Arc<Spec>,
    pub outcome: SpecOutcome,
    pub logs: Vec<String>,
    pub duration_ms: u64,
}

impl SpecRun {
    pub fn reports(&self) -> &[MutationReport] {
        self.outcome.reports()
    }

    pub fn fatal(&self) -> Option<FatalEntry> {
        self.outcome.fatal_error().map(|error| FatalEntry {
            spec: self.spec.clone(),
            error: error.to_string(),
        })
    }

    /// Ran without a fatal but produced no reports
    pub fn is_zero_result(&self) -> bool {
        !self.outcome.is_fatal() && self.reports().is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.reports().iter().filter(|r| r.is_error()).count()
    }
}

impl fmt::Display for SpecRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            SpecOutcome::Fatal(err) => {
                write!(f, "! {} FATAL [{}ms] - {}", self.spec.name, self.duration_ms, err)
            }
            SpecOutcome::Completed(reports) => write!(
                f,
                "{} {} {} mutation(s), {} error(s) [{}ms]",
                if self.error_count() > 0 { "✗" } else { "✓" },
                self.spec.name,
                reports.len(),
                self.error_count(),
                self.duration_ms
            ),
        }
    }
}
