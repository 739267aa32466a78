//! Spec registry
//!
//! Loads the `family -> key -> spec` registry into an ordered list and
//! selects the work list for a batch.

#![allow(dead_code)]

mod selector;

pub use selector::{select, SpecFilter};

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::models::Spec;

/// Registry errors
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Failed to read registry {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse registry {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Duplicate spec key {family}/{key}")]
    DuplicateKey { family: String, key: String },

    #[error("Invalid mutation pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },
}

/// One spec with its position in the registry
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub family: String,
    pub key: String,
    pub spec: Spec,
}

/// Ordered registry of all known specs
#[derive(Clone, Debug, Default)]
pub struct SpecRegistry {
    entries: Vec<RegistryEntry>,
}

#[derive(Debug, Deserialize, Serialize)]
struct RegistryFile {
    #[serde(default)]
    families: Vec<FamilySection>,
}

#[derive(Debug, Deserialize, Serialize)]
struct FamilySection {
    family: String,
    #[serde(default)]
    specs: Vec<KeyedSpec>,
}

#[derive(Debug, Deserialize, Serialize)]
struct KeyedSpec {
    key: String,
    #[serde(flatten)]
    spec: Spec,
}

impl SpecRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a registry from a YAML or JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let path = path.as_ref();
        let display = path.display().to_string();

        let content = std::fs::read_to_string(path).map_err(|source| RegistryError::Read {
            path: display.clone(),
            source,
        })?;

        let is_yaml = path
            .extension()
            .map(|e| e == "yaml" || e == "yml")
            .unwrap_or(false);

        let file: RegistryFile = if is_yaml {
            serde_yaml::from_str(&content).map_err(|e| RegistryError::Parse {
                path: display.clone(),
                message: e.to_string(),
            })?
        } else {
            serde_json::from_str(&content).map_err(|e| RegistryError::Parse {
                path: display.clone(),
                message: e.to_string(),
            })?
        };

        let mut registry = Self::new();
        for section in file.families {
            for keyed in section.specs {
                registry.insert(&section.family, keyed.key, keyed.spec)?;
            }
        }

        Ok(registry)
    }

    /// Append a spec; keys are unique within a family
    pub fn insert(
        &mut self,
        family: impl Into<String>,
        key: impl Into<String>,
        spec: Spec,
    ) -> Result<(), RegistryError> {
        let family = family.into();
        let key = key.into();

        if self
            .entries
            .iter()
            .any(|e| e.family == family && e.key == key)
        {
            return Err(RegistryError::DuplicateKey { family, key });
        }

        self.entries.push(RegistryEntry { family, key, spec });
        Ok(())
    }

    pub fn with_spec(
        mut self,
        family: impl Into<String>,
        key: impl Into<String>,
        spec: Spec,
    ) -> Result<Self, RegistryError> {
        self.insert(family, key, spec)?;
        Ok(self)
    }

    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegistryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn families(&self) -> Vec<&str> {
        let mut families: Vec<&str> = Vec::new();
        for entry in &self.entries {
            if !families.contains(&entry.family.as_str()) {
                families.push(&entry.family);
            }
        }
        families
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const REGISTRY_YAML: &str = r#"
families:
  - family: bitcoin
    specs:
      - key: bitcoin
        name: Bitcoin
        currency: bitcoin
        min_viable_amount: 1000
        mutations:
          - name: send
            params: { amount: 500 }
          - name: sendMax
      - key: litecoin
        name: Litecoin
        currency: litecoin
  - family: ethereum
    specs:
      - key: ethereum
        name: Ethereum
        currency: ethereum
        mutations:
          - name: send
"#;

    fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_yaml_preserves_order() {
        let file = write_temp(".yaml", REGISTRY_YAML);
        let registry = SpecRegistry::load(file.path()).unwrap();

        let keys: Vec<_> = registry.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["bitcoin", "litecoin", "ethereum"]);
        assert_eq!(registry.families(), vec!["bitcoin", "ethereum"]);

        let bitcoin = &registry.entries()[0].spec;
        assert_eq!(bitcoin.min_viable_amount, 1000);
        assert_eq!(bitcoin.mutation_names(), vec!["send", "sendMax"]);
        assert!(registry.entries()[1].spec.mutations.is_empty());
    }

    #[test]
    fn test_load_json() {
        let json = r#"{"families":[{"family":"tezos","specs":[
            {"key":"tezos","name":"Tezos","currency":"tezos","mutations":[{"name":"delegate"}]}
        ]}]}"#;
        let file = write_temp(".json", json);
        let registry = SpecRegistry::load(file.path()).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.entries()[0].spec.currency.as_str(), "tezos");
    }

    #[test]
    fn test_load_missing_file() {
        let err = SpecRegistry::load("/nonexistent/specs.yaml").unwrap_err();
        assert!(matches!(err, RegistryError::Read { .. }));
    }

    #[test]
    fn test_load_invalid_yaml() {
        let file = write_temp(".yaml", "families: [ {");
        let err = SpecRegistry::load(file.path()).unwrap_err();
        assert!(matches!(err, RegistryError::Parse { .. }));
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let registry = SpecRegistry::new()
            .with_spec("bitcoin", "bitcoin", Spec::new("Bitcoin", "bitcoin"))
            .unwrap();
        let err = registry
            .with_spec("bitcoin", "bitcoin", Spec::new("Bitcoin 2", "bitcoin"))
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateKey { .. }));
    }
}
