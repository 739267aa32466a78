//! Per-spec fault isolation
//!
//! Maps an engine call onto a [`SpecOutcome`]: an error or a panic becomes
//! `Fatal` with an empty report list, so the batch never fails as a whole.

use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{error, info};

use crate::engine::SpecLog;
use crate::models::{MutationReport, Spec, SpecOutcome, SpecRun};
use crate::utils::timer::Timer;

/// Run one spec's engine call behind a fault boundary
pub async fn isolate<F, Fut>(index: usize, spec: Arc<Spec>, engine_call: F) -> SpecRun
where
    F: FnOnce(SpecLog) -> Fut,
    Fut: Future<Output = anyhow::Result<Vec<MutationReport>>>,
{
    let log = SpecLog::new(spec.name.clone());
    let timer = Timer::start(format!("spec {}", spec.name));

    info!("Starting {} ({} mutations)", spec, spec.mutations.len());

    let call_log = log.clone();
    let result = AssertUnwindSafe(async move { engine_call(call_log).await })
        .catch_unwind()
        .await;

    let outcome = match result {
        Ok(Ok(reports)) => SpecOutcome::Completed(reports),
        Ok(Err(err)) => fatal(&spec, &log, format!("{err:#}")),
        Err(panic) => fatal(&spec, &log, panic_message(panic.as_ref())),
    };

    let duration_ms = timer.stop();
    info!(
        "Finished {} in {}ms: {} report(s){}",
        spec.name,
        duration_ms,
        outcome.reports().len(),
        if outcome.is_fatal() { " [FATAL]" } else { "" }
    );

    SpecRun {
        index,
        spec,
        outcome,
        logs: log.lines(),
        duration_ms,
    }
}

fn fatal(spec: &Spec, log: &SpecLog, message: String) -> SpecOutcome {
    error!("Spec {} failed fatally: {}", spec.name, message);
    log.log(format!("FATAL: {message}"));
    SpecOutcome::Fatal(message)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}
