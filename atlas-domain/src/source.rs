//! Raw shapes fetched from the external sources.
//!
//! These mirror the upstream payloads only as far as deserialization
//! needs; reconciliation turns them into `CountryRecord`s.

use serde::Deserialize;
use std::collections::HashMap;

/// One country entry as returned by the countries source.
///
/// Every field is optional: the adapter passes entries through as-is and
/// reconciliation decides what to skip or default.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCountry {
    pub name: Option<String>,
    pub capital: Option<String>,
    pub region: Option<String>,
    pub population: Option<u64>,
    /// Flag image URL (the upstream field is called `flag`).
    pub flag: Option<String>,
    #[serde(default)]
    pub currencies: Vec<RawCurrency>,
}

/// One currency listed for a country. Only the first entry is used.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCurrency {
    pub code: Option<String>,
}

// =============================================================================
// RateTable
// =============================================================================

/// Currency-code → USD rate mapping fetched from the exchange source.
///
/// Upstream country data and rate data disagree on casing conventions, so
/// resolution falls back across casings instead of trusting either side.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateTable {
    rates: HashMap<String, f64>,
}

impl RateTable {
    pub fn new(rates: HashMap<String, f64>) -> Self {
        Self { rates }
    }

    /// Resolve a rate for a currency code.
    ///
    /// Lookup order: the code as given, then uppercase, then lowercase.
    /// First hit wins; `None` if no casing matches.
    pub fn resolve(&self, code: &str) -> Option<f64> {
        self.rates
            .get(code)
            .or_else(|| self.rates.get(&code.to_uppercase()))
            .or_else(|| self.rates.get(&code.to_lowercase()))
            .copied()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }
}

impl FromIterator<(String, f64)> for RateTable {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self {
            rates: iter.into_iter().collect(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
