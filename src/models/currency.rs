//! Currency models
//!
//! Defines canonical currency identifiers and the keyword resolver used
//! to select specs by currency.

#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical currency identifier (lowercase, e.g. `bitcoin`)
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyId(String);

impl CurrencyId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CurrencyId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Resolves a user-supplied keyword to a canonical currency
pub trait CurrencyResolver: Send + Sync {
    fn resolve(&self, keyword: &str) -> Option<CurrencyId>;
}

/// Known currency with its lookup keywords
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Currency {
    pub id: CurrencyId,
    pub name: String,
    pub ticker: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl Currency {
    pub fn new(id: &str, name: &str, ticker: &str) -> Self {
        Self {
            id: CurrencyId::new(id),
            name: name.to_string(),
            ticker: ticker.to_string(),
            keywords: Vec::new(),
        }
    }

    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keywords.push(keyword.into());
        self
    }

    /// Check whether a keyword designates this currency
    pub fn matches(&self, keyword: &str) -> bool {
        let keyword = keyword.trim();
        self.id.as_str().eq_ignore_ascii_case(keyword)
            || self.name.eq_ignore_ascii_case(keyword)
            || self.ticker.eq_ignore_ascii_case(keyword)
            || self.keywords.iter().any(|k| k.eq_ignore_ascii_case(keyword))
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.ticker)
    }
}

/// Table of currencies known to the bot
#[derive(Clone, Debug, Default)]
pub struct CurrencyCatalog {
    currencies: Vec<Currency>,
}

impl CurrencyCatalog {
    pub fn new(currencies: Vec<Currency>) -> Self {
        Self { currencies }
    }

    /// Currencies supported out of the box
    pub fn builtin() -> Self {
        Self::new(vec![
            Currency::new("bitcoin", "Bitcoin", "BTC").with_keyword("xbt"),
            Currency::new("bitcoin_testnet", "Bitcoin Testnet", "tBTC"),
            Currency::new("ethereum", "Ethereum", "ETH").with_keyword("ether"),
            Currency::new("ethereum_classic", "Ethereum Classic", "ETC"),
            Currency::new("litecoin", "Litecoin", "LTC"),
            Currency::new("dogecoin", "Dogecoin", "DOGE"),
            Currency::new("bitcoin_cash", "Bitcoin Cash", "BCH"),
            Currency::new("tezos", "Tezos", "XTZ"),
            Currency::new("stellar", "Stellar", "XLM").with_keyword("lumens"),
            Currency::new("ripple", "XRP", "XRP").with_keyword("ripple"),
            Currency::new("polkadot", "Polkadot", "DOT"),
            Currency::new("cosmos", "Cosmos", "ATOM"),
            Currency::new("algorand", "Algorand", "ALGO"),
            Currency::new("tron", "Tron", "TRX"),
        ])
    }

    pub fn add(mut self, currency: Currency) -> Self {
        self.currencies.push(currency);
        self
    }

    pub fn get(&self, id: &CurrencyId) -> Option<&Currency> {
        self.currencies.iter().find(|c| &c.id == id)
    }

    pub fn all(&self) -> &[Currency] {
        &self.currencies
    }
}

impl CurrencyResolver for CurrencyCatalog {
    fn resolve(&self, keyword: &str) -> Option<CurrencyId> {
        self.currencies
            .iter()
            .find(|c| c.matches(keyword))
            .map(|c| c.id.clone())
    }
}
