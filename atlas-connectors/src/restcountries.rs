//! REST Countries client.
//!
//! Fetches the full country list restricted to the fields the cache
//! needs. Transport failures, timeouts, and non-2xx responses all
//! normalize into `SourceError`; the refresh treats them identically.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tokio::time::timeout;
use tracing::debug;

use atlas_domain::RawCountry;
use atlas_engine::{CountrySource, SourceError};

/// Default countries endpoint, restricted to the cached fields.
pub const RESTCOUNTRIES_URL: &str =
    "https://restcountries.com/v2/all?fields=name,capital,region,population,flag,currencies";

/// Request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// REST Countries API client.
pub struct RestCountriesClient {
    /// HTTP client
    client: Client,
    url: String,
    timeout: Duration,
}

impl RestCountriesClient {
    /// Create a client for the default endpoint.
    pub fn new() -> Self {
        Self::with_url(RESTCOUNTRIES_URL)
    }

    /// Create a client for a custom endpoint (configuration/testing).
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
        }
    }
}

impl Default for RestCountriesClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CountrySource for RestCountriesClient {
    async fn fetch_countries(&self) -> Result<Vec<RawCountry>, SourceError> {
        let response = timeout(self.timeout, self.client.get(&self.url).send())
            .await
            .map_err(|_| SourceError::Timeout)?
            .map_err(|e| SourceError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SourceError::ParseError(e.to_string()))?;
        let countries: Vec<RawCountry> =
            serde_json::from_str(&body).map_err(|e| SourceError::ParseError(e.to_string()))?;

        debug!(count = countries.len(), "fetched country list");
        Ok(countries)
    }
}

// =============================================================================
// Tests
// =============================================================================
