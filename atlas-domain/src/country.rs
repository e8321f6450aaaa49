//! Cached country entity and its identity value object.
//!
//! `CountryName` enforces the non-empty invariant at construction time.
//! Its lowercase form (`key()`) is the unique identity used for upsert and
//! delete matching across the store; it never appears in API responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Domain errors for value object validation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// Country name must be non-empty
    #[error("Invalid country name: {0}")]
    InvalidName(String),
}

// =============================================================================
// CountryName
// =============================================================================

/// Display name of a country.
///
/// # Invariants
/// - Must not be empty or whitespace-only
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CountryName(String);

impl CountryName {
    /// Create a new CountryName with validation
    ///
    /// # Errors
    /// Returns `DomainError::InvalidName` if the value is empty
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(DomainError::InvalidName(
                "name must be non-empty".to_string(),
            ));
        }
        Ok(Self(value))
    }

    /// Case-folded identity key used for upsert/delete matching.
    pub fn key(&self) -> String {
        self.0.to_lowercase()
    }

    /// Get the underlying display string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CountryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// CountryRecord
// =============================================================================

/// Cached country entity. One row per `CountryName::key()`.
///
/// # Invariants
/// - `estimated_gdp` is present iff `exchange_rate` is present
/// - `exchange_rate`, when present, is positive
/// - all records written in one refresh cycle share `last_refreshed_at`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryRecord {
    /// Display name; its lowercase form is the storage identity.
    pub name: CountryName,
    pub capital: Option<String>,
    pub region: Option<String>,
    /// Defaults to 0 when the source omits it.
    pub population: u64,
    /// First currency listed by the source, if any.
    pub currency_code: Option<String>,
    /// Resolved USD exchange rate; absent when unresolvable.
    pub exchange_rate: Option<f64>,
    /// Derived metric; absent whenever `exchange_rate` is absent.
    pub estimated_gdp: Option<f64>,
    pub flag_url: Option<String>,
    /// Cycle timestamp, identical for every record of one refresh.
    #[serde(with = "crate::time::second_precision")]
    pub last_refreshed_at: DateTime<Utc>,
}

impl CountryRecord {
    /// Storage identity key (lowercase name).
    pub fn name_key(&self) -> String {
        self.name.key()
    }
}

// =============================================================================
// Tests
// =============================================================================
