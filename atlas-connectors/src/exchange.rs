//! Exchange-rate client.
//!
//! The response schema is not fixed across providers: the rate mapping may
//! sit under `rates` or `conversion_rates` depending on who serves the
//! URL. Extraction tries the candidate fields in order and treats an empty
//! result as a normal "no rates" outcome, not a failure.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tokio::time::timeout;
use tracing::debug;

use atlas_domain::RateTable;
use atlas_engine::{RateSource, SourceError};

/// Default USD exchange-rate endpoint.
pub const EXCHANGE_URL: &str = "https://open.er-api.com/v6/latest/USD";

/// Candidate payload fields holding the rate mapping, tried in order.
const RATE_FIELDS: &[&str] = &["rates", "conversion_rates"];

/// Request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Exchange-rate API client.
pub struct ExchangeRateClient {
    /// HTTP client
    client: Client,
    url: String,
    timeout: Duration,
}

impl ExchangeRateClient {
    /// Create a client for the default endpoint.
    pub fn new() -> Self {
        Self::with_url(EXCHANGE_URL)
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

impl Default for ExchangeRateClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RateSource for ExchangeRateClient {
    async fn fetch_rates(&self) -> Result<RateTable, SourceError> {
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
        let payload: Value =
            serde_json::from_str(&body).map_err(|e| SourceError::ParseError(e.to_string()))?;

        let rates = extract_rates(&payload);
        debug!(count = rates.len(), "fetched exchange rates");
        Ok(rates)
    }
}

/// Pull the rate mapping out of a loosely-shaped payload.
///
/// The first candidate field with a non-empty object wins. Non-numeric
/// entries are dropped rather than failing the whole fetch.
fn extract_rates(payload: &Value) -> RateTable {
    for field in RATE_FIELDS {
        if let Some(rates) = payload.get(field).and_then(Value::as_object) {
            if !rates.is_empty() {
                return rates
                    .iter()
                    .filter_map(|(code, value)| value.as_f64().map(|rate| (code.clone(), rate)))
                    .collect();
            }
        }
    }
    RateTable::default()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extracts_primary_field() {
        let payload = json!({"result": "success", "rates": {"NGN": 460.0, "EUR": 0.92}});
        let rates = extract_rates(&payload);
        assert_eq!(rates.len(), 2);
        assert_eq!(rates.resolve("NGN"), Some(460.0));
    }

    #[test]
    fn test_falls_back_to_conversion_rates() {
        let payload = json!({"conversion_rates": {"NGN": 460.0}});
        assert_eq!(extract_rates(&payload).resolve("NGN"), Some(460.0));
    }

    #[test]
    fn test_empty_primary_field_falls_through() {
        let payload = json!({"rates": {}, "conversion_rates": {"NGN": 460.0}});
        assert_eq!(extract_rates(&payload).resolve("NGN"), Some(460.0));
    }

    #[test]
    fn test_no_rates_is_empty_not_error() {
        let payload = json!({"result": "success"});
        assert!(extract_rates(&payload).is_empty());
    }

    #[test]
    fn test_non_numeric_entries_are_dropped() {
        let payload = json!({"rates": {"NGN": 460.0, "XXX": "n/a"}});
        let rates = extract_rates(&payload);
        assert_eq!(rates.len(), 1);
        assert_eq!(rates.resolve("XXX"), None);
    }

    #[test]
    fn test_integer_rates_coerce_to_float() {
        let payload = json!({"rates": {"JPY": 155}});
        assert_eq!(extract_rates(&payload).resolve("JPY"), Some(155.0));
    }
}
