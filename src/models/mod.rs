//! Data models for mutation testing
//!
//! This module contains all data structures used throughout the application.

mod currency;
mod report;
mod spec;

pub use currency::{Currency, CurrencyCatalog, CurrencyId, CurrencyResolver};
pub use report::{AccountRef, FatalEntry, MutationReport, SpecOutcome, SpecRun};
pub use spec::{Mutation, Spec};
