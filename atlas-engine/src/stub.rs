//! Stub implementations for testing.
//!
//! These simulate the two external sources and the summary renderer
//! without touching the network or the filesystem.

use std::path::PathBuf;
use std::sync::{Mutex, RwLock};

use async_trait::async_trait;
use atlas_domain::{RateTable, RawCountry};

use crate::ports::{
    CountrySource, RateSource, RenderError, SourceError, SummaryInput, SummaryRenderer,
};

// =============================================================================
// Stub Sources
// =============================================================================

/// Stub country source returning a configured list.
pub struct StubCountrySource {
    countries: RwLock<Vec<RawCountry>>,
    fail_next: RwLock<bool>,
}

impl StubCountrySource {
    pub fn new(countries: Vec<RawCountry>) -> Self {
        Self {
            countries: RwLock::new(countries),
            fail_next: RwLock::new(false),
        }
    }

    /// Replace the configured list (simulates a changed upstream dataset).
    pub fn set_countries(&self, countries: Vec<RawCountry>) {
        *self.countries.write().unwrap() = countries;
    }

    /// Configure the next fetch to fail with a transport error.
    pub fn set_fail_next(&self, fail: bool) {
        *self.fail_next.write().unwrap() = fail;
    }

    fn should_fail(&self) -> bool {
        let mut fail_next = self.fail_next.write().unwrap();
        let fail = *fail_next;
        *fail_next = false; // Reset after check
        fail
    }
}

#[async_trait]
impl CountrySource for StubCountrySource {
    async fn fetch_countries(&self) -> Result<Vec<RawCountry>, SourceError> {
        if self.should_fail() {
            return Err(SourceError::RequestFailed(
                "simulated source failure".to_string(),
            ));
        }
        Ok(self.countries.read().unwrap().clone())
    }
}

/// Stub rate source returning a configured table.
pub struct StubRateSource {
    rates: RwLock<RateTable>,
    fail_next: RwLock<bool>,
}

impl StubRateSource {
    pub fn new(rates: RateTable) -> Self {
        Self {
            rates: RwLock::new(rates),
            fail_next: RwLock::new(false),
        }
    }

    pub fn set_rates(&self, rates: RateTable) {
        *self.rates.write().unwrap() = rates;
    }

    /// Configure the next fetch to fail with a transport error.
    pub fn set_fail_next(&self, fail: bool) {
        *self.fail_next.write().unwrap() = fail;
    }

    fn should_fail(&self) -> bool {
        let mut fail_next = self.fail_next.write().unwrap();
        let fail = *fail_next;
        *fail_next = false;
        fail
    }
}

#[async_trait]
impl RateSource for StubRateSource {
    async fn fetch_rates(&self) -> Result<RateTable, SourceError> {
        if self.should_fail() {
            return Err(SourceError::RequestFailed(
                "simulated source failure".to_string(),
            ));
        }
        Ok(self.rates.read().unwrap().clone())
    }
}

// =============================================================================
// Recording Renderer
// =============================================================================

/// Renderer that remembers the last summary it was asked to draw.
pub struct RecordingRenderer {
    last: Mutex<Option<SummaryInput>>,
    fail: bool,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self {
            last: Mutex::new(None),
            fail: false,
        }
    }

    /// A renderer whose every render call fails.
    pub fn failing() -> Self {
        Self {
            last: Mutex::new(None),
            fail: true,
        }
    }

    /// The last summary rendered, if any.
    pub fn last(&self) -> Option<SummaryInput> {
        self.last.lock().unwrap().clone()
    }
}

impl Default for RecordingRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl SummaryRenderer for RecordingRenderer {
    fn render(&self, summary: &SummaryInput) -> Result<PathBuf, RenderError> {
        if self.fail {
            return Err(RenderError::new("simulated render failure"));
        }
        *self.last.lock().unwrap() = Some(summary.clone());
        Ok(PathBuf::from("stub-summary.png"))
    }
}
