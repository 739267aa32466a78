//! Bounded-concurrency batch execution
//!
//! Runs a worker over an ordered list of items with a fixed ceiling on
//! in-flight workers. Results keep the input order.

#![allow(dead_code)]

use futures::future::join_all;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::debug;

/// Batch executor errors
///
/// Workers are expected to absorb their own failures; these only surface
/// when a worker task panicked or the limiter went away.
#[derive(Error, Debug)]
pub enum ExecutorError {
    #[error("Worker for item {index} did not complete: {message}")]
    WorkerFailed { index: usize, message: String },

    #[error("Concurrency limiter closed")]
    Closed,
}

/// Fixed-ceiling executor with FIFO admission
#[derive(Clone, Debug)]
pub struct BatchExecutor {
    concurrency: usize,
}

impl BatchExecutor {
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Run `worker` over `items`, at most `concurrency` at a time
    ///
    /// A permit is taken before each task is spawned, so items start in
    /// input order and the next one starts as soon as any running one ends.
    pub async fn run<T, R, F, Fut>(&self, items: Vec<T>, worker: F) -> Result<Vec<R>, ExecutorError>
    where
        F: Fn(usize, T) -> Fut,
        Fut: Future<Output = R> + Send + 'static,
        R: Send + 'static,
    {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut handles = Vec::with_capacity(items.len());

        for (index, item) in items.into_iter().enumerate() {
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|_| ExecutorError::Closed)?;

            debug!("Admitting item {}", index);
            let task = worker(index, item);

            handles.push(tokio::spawn(async move {
                let result = task.await;
                drop(permit);
                result
            }));
        }

        join_all(handles)
            .await
            .into_iter()
            .enumerate()
            .map(|(index, joined)| {
                joined.map_err(|e| ExecutorError::WorkerFailed {
                    index,
                    message: e.to_string(),
                })
            })
            .collect()
    }
}

impl Default for BatchExecutor {
    fn default() -> Self {
        Self::new(6)
    }
}
