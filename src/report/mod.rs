//! Batch verdict
//!
//! Aggregates spec runs into a single pass/fail verdict.

mod aggregate;

pub use aggregate::{aggregate, BatchFailure, Verdict};
