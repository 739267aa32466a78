//! Spec selection
//!
//! Filters the registry by currency and mutation name.

use regex::Regex;
use tracing::{debug, warn};

use super::{RegistryError, SpecRegistry};
use crate::models::{CurrencyResolver, Spec};

/// Optional filters applied to the registry
#[derive(Clone, Debug, Default)]
pub struct SpecFilter {
    pub currency: Option<String>,
    pub mutation: Option<Regex>,
}

impl SpecFilter {
    /// Build a filter, compiling the mutation pattern
    pub fn new(currency: Option<String>, mutation: Option<&str>) -> Result<Self, RegistryError> {
        let mutation = mutation
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| RegistryError::InvalidPattern {
                    pattern: pattern.to_string(),
                    message: e.to_string(),
                })
            })
            .transpose()?;

        Ok(Self { currency, mutation })
    }

    pub fn is_empty(&self) -> bool {
        self.currency.is_none() && self.mutation.is_none()
    }
}

/// Select specs in registry order
///
/// An unresolvable currency keyword selects nothing. Specs left with no
/// matching mutation are kept with an empty mutation list.
pub fn select(
    registry: &SpecRegistry,
    filter: &SpecFilter,
    resolver: &dyn CurrencyResolver,
) -> Vec<Spec> {
    let currency = match &filter.currency {
        Some(keyword) => match resolver.resolve(keyword) {
            Some(id) => Some(id),
            None => {
                warn!("Unknown currency '{}', no spec selected", keyword);
                return Vec::new();
            }
        },
        None => None,
    };

    let selected: Vec<Spec> = registry
        .iter()
        .filter(|entry| currency.as_ref().map_or(true, |c| &entry.spec.currency == c))
        .map(|entry| match &filter.mutation {
            Some(pattern) => entry.spec.with_mutations_matching(pattern),
            None => entry.spec.clone(),
        })
        .collect();

    debug!(
        "Selected {}/{} specs (currency: {:?}, mutation: {:?})",
        selected.len(),
        registry.len(),
        filter.currency,
        filter.mutation.as_ref().map(|r| r.as_str())
    );

    selected
}
