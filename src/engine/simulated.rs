//! In-memory mutation engine
//!
//! Derives a deterministic set of funded accounts per spec from the seed
//! and applies each mutation against them as a transfer.

use anyhow::Result;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use super::{MutationEngine, SpecLog};
use crate::config::EngineConfig;
use crate::models::{AccountRef, MutationReport, Spec};
use crate::utils::timer::Timer;

/// Spec-level engine failures
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("no account available for {0}")]
    NoAccounts(String),

    #[error("not enough funds: no account holds at least {min}")]
    NotEnoughFunds { min: u64 },

    #[error("mutation {mutation} aborted the spec: {reason}")]
    Aborted { mutation: String, reason: String },
}

/// Engine running mutations against simulated accounts
pub struct SimulatedEngine {
    seed: String,
    config: EngineConfig,
}

impl SimulatedEngine {
    pub fn new(seed: impl Into<String>, config: EngineConfig) -> Self {
        Self {
            seed: seed.into(),
            config,
        }
    }

    /// Accounts are a pure function of the seed and the spec name
    fn accounts_for(&self, spec: &Spec) -> Vec<AccountRef> {
        let mut hasher = DefaultHasher::new();
        self.seed.hash(&mut hasher);
        spec.name.hash(&mut hasher);
        let mut rng = StdRng::seed_from_u64(hasher.finish());

        (0..self.config.accounts_per_spec)
            .map(|i| {
                AccountRef::new(
                    format!("{}:{}", spec.currency, i),
                    format!("{} {}", spec.name, i + 1),
                    rng.random_range(
                        self.config.min_balance..=self.config.max_balance.max(self.config.min_balance),
                    ),
                )
            })
            .collect()
    }
}

#[async_trait]
impl MutationEngine for SimulatedEngine {
    async fn run(&self, spec: Arc<Spec>, log: &SpecLog) -> Result<Vec<MutationReport>> {
        let mut accounts = self.accounts_for(&spec);
        log.log(format!("{} account(s) loaded", accounts.len()));

        if accounts.is_empty() {
            return Err(EngineError::NoAccounts(spec.name.clone()).into());
        }
        if !accounts.iter().any(|a| a.balance >= spec.min_viable_amount) {
            return Err(EngineError::NotEnoughFunds {
                min: spec.min_viable_amount,
            }
            .into());
        }

        let mut reports = Vec::new();
        let mut sequence = 0u64;

        for mutation in &spec.mutations {
            if let Some(reason) = mutation.param_str("fatal") {
                return Err(EngineError::Aborted {
                    mutation: mutation.name.clone(),
                    reason: reason.to_string(),
                }
                .into());
            }

            let min_balance = mutation.param_u64("min_balance").unwrap_or(1);
            let mut runs = 0;

            for i in 0..accounts.len() {
                if runs >= mutation.max_run {
                    break;
                }
                if accounts[i].balance < min_balance {
                    continue;
                }
                runs += 1;

                let timer = Timer::start(format!("{}/{}", spec.name, mutation.name));
                if self.config.latency_ms > 0 {
                    tokio::time::sleep(Duration::from_millis(self.config.latency_ms)).await;
                }

                let dest = (i + 1) % accounts.len();
                let amount = mutation
                    .param_u64("amount")
                    .unwrap_or(accounts[i].balance);

                let mut report = MutationReport::new(spec.clone())
                    .with_account(accounts[i].clone())
                    .with_mutation(mutation.clone())
                    .with_destination(accounts[dest].clone());

                if let Some(reason) = mutation.param_str("fail") {
                    log.log(format!("{} on {}: {}", mutation.name, accounts[i].name, reason));
                    report = report.with_error(reason);
                } else if amount > accounts[i].balance {
                    let reason = format!(
                        "insufficient balance: {} > {}",
                        amount, accounts[i].balance
                    );
                    log.log(format!("{} on {}: {}", mutation.name, accounts[i].name, reason));
                    report = report.with_error(reason);
                } else {
                    accounts[i].balance -= amount;
                    accounts[dest].balance += amount;
                    sequence += 1;

                    let operation = format!("{}-op-{}", accounts[i].id, sequence);
                    log.log(format!(
                        "{} {} -> {} amount {} ({})",
                        mutation.name, accounts[i].name, accounts[dest].name, amount, operation
                    ));
                    report = report.with_operation(operation);
                }

                reports.push(report.with_duration(timer.elapsed_ms()));
            }

            if runs == 0 {
                log.log(format!("no eligible account for {}", mutation.name));
            }
        }

        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Mutation;

    fn engine() -> SimulatedEngine {
        SimulatedEngine::new("test-seed", EngineConfig::default())
    }

    #[test]
    fn test_accounts_are_deterministic() {
        let spec = Spec::new("Bitcoin", "bitcoin");
        let a = engine().accounts_for(&spec);
        let b = engine().accounts_for(&spec);
        assert_eq!(a, b);
        assert_eq!(a.len(), EngineConfig::default().accounts_per_spec);
    }

    #[tokio::test]
    async fn test_send_moves_funds() {
        let spec = Arc::new(
            Spec::new("Bitcoin", "bitcoin").with_mutation(
                Mutation::new("send").with_params(serde_json::json!({"amount": 1})),
            ),
        );
        let log = SpecLog::new("Bitcoin");
        let reports = engine().run(spec.clone(), &log).await.unwrap();

        assert_eq!(reports.len(), 1);
        assert!(reports[0].error.is_none());
        assert!(reports[0].operation_id.is_some());
        assert!(Arc::ptr_eq(&reports[0].spec, &spec));
        assert!(!log.is_empty());
    }

    #[tokio::test]
    async fn test_max_run_limits_applications() {
        let spec = Arc::new(
            Spec::new("Bitcoin", "bitcoin").with_mutation(
                Mutation::new("send")
                    .with_max_run(2)
                    .with_params(serde_json::json!({"amount": 1})),
            ),
        );
        let reports = engine().run(spec, &SpecLog::new("Bitcoin")).await.unwrap();
        assert_eq!(reports.len(), 2);
    }

    #[tokio::test]
    async fn test_business_errors_do_not_stop_siblings() {
        let spec = Arc::new(
            Spec::new("Bitcoin", "bitcoin")
                .with_mutation(
                    Mutation::new("overdraw").with_params(serde_json::json!({"amount": u64::MAX})),
                )
                .with_mutation(
                    Mutation::new("flaky").with_params(serde_json::json!({"fail": "assertion"})),
                )
                .with_mutation(Mutation::new("sendMax")),
        );
        let reports = engine().run(spec, &SpecLog::new("Bitcoin")).await.unwrap();

        assert_eq!(reports.len(), 3);
        assert!(reports[0].error.as_deref().unwrap().contains("insufficient balance"));
        assert_eq!(reports[1].error.as_deref(), Some("assertion"));
        assert!(reports[2].error.is_none());
    }

    #[tokio::test]
    async fn test_min_viable_amount_is_fatal() {
        let spec = Arc::new(Spec::new("Bitcoin", "bitcoin").with_min_viable_amount(u64::MAX));
        let err = engine()
            .run(spec, &SpecLog::new("Bitcoin"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not enough funds"));
    }

    #[tokio::test]
    async fn test_fatal_param_aborts_spec() {
        let spec = Arc::new(
            Spec::new("Bitcoin", "bitcoin")
                .with_mutation(Mutation::new("send"))
                .with_mutation(
                    Mutation::new("explode").with_params(serde_json::json!({"fatal": "boom"})),
                ),
        );
        let err = engine()
            .run(spec, &SpecLog::new("Bitcoin"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("boom"));
    }

    #[tokio::test]
    async fn test_no_eligible_account_yields_no_report() {
        let spec = Arc::new(
            Spec::new("Bitcoin", "bitcoin").with_mutation(
                Mutation::new("whale").with_params(serde_json::json!({"min_balance": u64::MAX})),
            ),
        );
        let log = SpecLog::new("Bitcoin");
        let reports = engine().run(spec, &log).await.unwrap();
        assert!(reports.is_empty());
        assert!(log.lines().iter().any(|l| l.contains("no eligible account")));
    }

    #[tokio::test]
    async fn test_no_accounts_is_fatal() {
        let config = EngineConfig {
            accounts_per_spec: 0,
            ..EngineConfig::default()
        };
        let engine = SimulatedEngine::new("seed", config);
        let spec = Arc::new(Spec::new("Bitcoin", "bitcoin"));
        assert!(engine.run(spec, &SpecLog::new("Bitcoin")).await.is_err());
    }
}
