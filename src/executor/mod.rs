//! Spec execution engine
//!
//! Provides bounded parallel execution with per-spec fault isolation.

mod batch;
mod isolation;
mod runner;

pub use batch::{BatchExecutor, ExecutorError};
pub use isolation::isolate;
pub use runner::{BatchRun, BotRunner};
