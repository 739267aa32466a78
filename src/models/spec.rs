//! Spec and mutation models
//!
//! A spec is a test scenario bound to one currency; it owns an ordered
//! list of mutations (state-changing test cases).

#![allow(dead_code)]

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::CurrencyId;

fn default_max_run() -> u32 {
    1
}

/// A single state-changing test case
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Mutation {
    pub name: String,

    /// How many times an engine may apply this mutation in one spec run
    #[serde(default = "default_max_run")]
    pub max_run: u32,

    /// Scenario-specific parameters, interpreted by the engine
    #[serde(default)]
    pub params: serde_json::Value,
}

impl Mutation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            max_run: default_max_run(),
            params: serde_json::Value::Null,
        }
    }

    pub fn with_max_run(mut self, max_run: u32) -> Self {
        self.max_run = max_run;
        self
    }

    pub fn with_params(mut self, params: serde_json::Value) -> Self {
        self.params = params;
        self
    }

    pub fn param_u64(&self, key: &str) -> Option<u64> {
        self.params.get(key).and_then(|v| v.as_u64())
    }

    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(|v| v.as_str())
    }
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A test scenario bound to one currency
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Spec {
    pub name: String,
    pub currency: CurrencyId,

    /// Smallest balance an account needs for the spec to be runnable
    #[serde(default)]
    pub min_viable_amount: u64,

    #[serde(default)]
    pub mutations: Vec<Mutation>,
}

impl Spec {
    pub fn new(name: impl Into<String>, currency: impl Into<CurrencyId>) -> Self {
        Self {
            name: name.into(),
            currency: currency.into(),
            min_viable_amount: 0,
            mutations: Vec::new(),
        }
    }

    pub fn with_mutation(mut self, mutation: Mutation) -> Self {
        self.mutations.push(mutation);
        self
    }

    pub fn with_min_viable_amount(mut self, amount: u64) -> Self {
        self.min_viable_amount = amount;
        self
    }

    /// Copy of this spec keeping only mutations whose name matches, in order
    pub fn with_mutations_matching(&self, pattern: &Regex) -> Spec {
        Spec {
            mutations: self
                .mutations
                .iter()
                .filter(|m| pattern.is_match(&m.name))
                .cloned()
                .collect(),
            ..self.clone()
        }
    }

    pub fn mutation_names(&self) -> Vec<&str> {
        self.mutations.iter().map(|m| m.name.as_str()).collect()
    }
}

impl fmt::Display for Spec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.name, self.currency)
    }
}
