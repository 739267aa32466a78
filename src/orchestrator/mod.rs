//! Batch orchestration
//!
//! Selects specs, runs them, aggregates the verdict, and posts the report.
//! Notification happens after aggregation and never changes the verdict.

use std::sync::Arc;
use tracing::{info, warn};

use crate::engine::MutationEngine;
use crate::executor::{BatchRun, BotRunner, ExecutorError};
use crate::models::CurrencyResolver;
use crate::notify::Notifier;
use crate::output::{OutputFormat, ResultFormatter};
use crate::registry::{select, SpecFilter, SpecRegistry};
use crate::report::{aggregate, Verdict};

/// Everything produced by one batch
#[derive(Clone, Debug)]
pub struct BatchOutcome {
    pub batch: BatchRun,
    pub verdict: Verdict,
    pub markdown: String,
    pub notified: bool,
}

/// Wires the registry, engine, and optional notifier together
pub struct Orchestrator {
    registry: SpecRegistry,
    resolver: Arc<dyn CurrencyResolver>,
    engine: Arc<dyn MutationEngine>,
    notifier: Option<Notifier>,
    concurrency: usize,
}

impl Orchestrator {
    pub fn new(
        registry: SpecRegistry,
        resolver: Arc<dyn CurrencyResolver>,
        engine: Arc<dyn MutationEngine>,
    ) -> Self {
        Self {
            registry,
            resolver,
            engine,
            notifier: None,
            concurrency: 6,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_notifier(mut self, notifier: Option<Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Run the selected specs and build the verdict
    pub async fn execute(&self, filter: &SpecFilter) -> Result<BatchOutcome, ExecutorError> {
        let specs = select(&self.registry, filter, self.resolver.as_ref());
        if specs.is_empty() {
            warn!("No spec matched the given filters");
        }

        let runner = BotRunner::new(self.concurrency, self.engine.clone());
        let batch = runner.run(specs).await?;
        let verdict = aggregate(&batch.runs);

        info!("{}", verdict);
        for name in &verdict.zero_result_specs {
            warn!("Spec {} ran without any mutation", name);
        }

        let markdown = ResultFormatter::new(OutputFormat::Markdown)
            .no_color()
            .format_markdown(&batch, &verdict);

        let notified = match &self.notifier {
            Some(notifier) => notifier.publish_best_effort(&markdown).await,
            None => false,
        };

        Ok(BatchOutcome {
            batch,
            verdict,
            markdown,
            notified,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NotifierConfig;
    use crate::engine::SpecLog;
    use crate::models::{CurrencyCatalog, Mutation, MutationReport, Spec};
    use anyhow::Result;
    use async_trait::async_trait;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Engine that resolves empty or rejects for one spec name
    struct EmptyEngine {
        reject: Option<&'static str>,
    }

    #[async_trait]
    impl MutationEngine for EmptyEngine {
        async fn run(&self, spec: Arc<Spec>, log: &SpecLog) -> Result<Vec<MutationReport>> {
            log.log("started");
            if Some(spec.name.as_str()) == self.reject {
                anyhow::bail!("boom");
            }
            Ok(Vec::new())
        }
    }

    fn registry() -> SpecRegistry {
        SpecRegistry::new()
            .with_spec("bitcoin", "bitcoin", Spec::new("Bitcoin", "bitcoin"))
            .unwrap()
            .with_spec("ethereum", "ethereum", Spec::new("X", "ethereum"))
            .unwrap()
            .with_spec(
                "tezos",
                "tezos",
                Spec::new("Tezos", "tezos").with_mutation(Mutation::new("delegate")),
            )
            .unwrap()
    }

    fn orchestrator(reject: Option<&'static str>) -> Orchestrator {
        Orchestrator::new(
            registry(),
            Arc::new(CurrencyCatalog::builtin()),
            Arc::new(EmptyEngine { reject }),
        )
    }

    #[tokio::test]
    async fn test_all_empty_specs_pass_with_warning() {
        let outcome = orchestrator(None)
            .execute(&SpecFilter::default())
            .await
            .unwrap();

        assert!(!outcome.verdict.failed);
        assert_eq!(outcome.verdict.zero_result_specs, vec!["Bitcoin", "X", "Tezos"]);
        assert!(outcome.verdict.clone().into_result().is_ok());
        assert!(!outcome.notified);
    }

    #[tokio::test]
    async fn test_rejected_spec_is_reported() {
        let outcome = orchestrator(Some("X"))
            .execute(&SpecFilter::default())
            .await
            .unwrap();

        let fatals = outcome.batch.fatals();
        assert_eq!(fatals.len(), 1);
        assert_eq!(fatals[0].spec.name, "X");
        assert_eq!(fatals[0].error, "boom");
        assert!(outcome.batch.execution_result()[1].is_empty());
        assert_eq!(outcome.verdict.zero_result_specs, vec!["Bitcoin", "Tezos"]);

        let failure = outcome.verdict.into_result().unwrap_err();
        assert!(failure.to_string().contains("X got boom"));
    }

    #[tokio::test]
    async fn test_currency_filter_narrows_batch() {
        let filter = SpecFilter::new(Some("xtz".to_string()), None).unwrap();
        let outcome = orchestrator(Some("X")).execute(&filter).await.unwrap();

        assert_eq!(outcome.batch.runs.len(), 1);
        assert_eq!(outcome.batch.runs[0].spec.name, "Tezos");
        assert!(!outcome.verdict.failed);
    }

    #[tokio::test]
    async fn test_notifier_failure_does_not_change_verdict() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let config = NotifierConfig {
            api_url: server.uri(),
            ..NotifierConfig::default()
        };
        let notifier = Notifier::new(&config, "abc", "token").unwrap();

        let outcome = orchestrator(None)
            .with_concurrency(1)
            .with_notifier(Some(notifier))
            .execute(&SpecFilter::default())
            .await
            .unwrap();

        assert!(!outcome.notified);
        assert!(!outcome.verdict.failed);
    }

    #[tokio::test]
    async fn test_notifier_receives_markdown() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let config = NotifierConfig {
            api_url: server.uri(),
            ..NotifierConfig::default()
        };
        let notifier = Notifier::new(&config, "abc", "token").unwrap();

        let outcome = orchestrator(Some("X"))
            .with_notifier(Some(notifier))
            .execute(&SpecFilter::default())
            .await
            .unwrap();

        assert!(outcome.notified);
        assert!(outcome.markdown.contains("- **X** got `boom`"));
        assert!(outcome.verdict.failed);
    }
}
