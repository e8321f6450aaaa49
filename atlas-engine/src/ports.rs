//! Reconciliation port definitions.
//!
//! Ports define the interfaces for the external collaborators: the two
//! remote data sources and the summary-image routine. Adapters implement
//! them for specific services (REST Countries, the exchange-rate API, the
//! PNG renderer), and stubs implement them for tests.

use async_trait::async_trait;
use atlas_domain::{RateTable, RawCountry};
use chrono::{DateTime, Utc};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// Source Ports
// =============================================================================

/// Which external source an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Countries,
    ExchangeRates,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Countries => write!(f, "REST Countries"),
            SourceKind::ExchangeRates => write!(f, "Exchange Rates"),
        }
    }
}

/// Errors a source adapter can report.
///
/// A timeout carries no more weight than any other transport failure:
/// either way the refresh aborts with the store untouched.
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    /// Non-success response status
    #[error("Unexpected response status: {0}")]
    Status(u16),

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Request timed out
    #[error("Request timed out")]
    Timeout,
}

/// Port for the country metadata source.
#[async_trait]
pub trait CountrySource: Send + Sync {
    /// Fetch the full raw country list.
    async fn fetch_countries(&self) -> Result<Vec<RawCountry>, SourceError>;
}

/// Port for the currency exchange-rate source.
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Fetch the USD rate table. An empty table is a valid outcome, not a
    /// failure.
    async fn fetch_rates(&self) -> Result<RateTable, SourceError>;
}

// =============================================================================
// Summary Renderer Port
// =============================================================================

/// Inputs for the post-refresh summary artifact.
#[derive(Debug, Clone)]
pub struct SummaryInput {
    pub total_countries: u64,
    /// `(name, estimated_gdp)` pairs, descending
    pub top_by_gdp: Vec<(String, f64)>,
    pub last_refreshed_at: DateTime<Utc>,
}

/// Failure to produce the summary artifact.
///
/// Never fatal: the engine logs it and the refresh still succeeds.
#[derive(Debug, Error)]
#[error("summary render failed: {0}")]
pub struct RenderError(String);

impl RenderError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Port for the summary-image collaborator.
pub trait SummaryRenderer: Send + Sync {
    /// Render the artifact and return its path.
    fn render(&self, summary: &SummaryInput) -> Result<PathBuf, RenderError>;
}
