//! The reconciliation workflow.
//!
//! `Engine::refresh` is the one write path of the service: fetch the two
//! external datasets, derive a record per named country, and apply the
//! whole cycle to the store as a single atomic batch.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{info, warn};

use atlas_domain::{estimate_gdp, time, CountryName, CountryRecord, RateTable, RawCountry};
use atlas_store::{CountryStore, RefreshBatch, META_LAST_REFRESHED_AT, META_TOTAL_COUNTRIES};

use crate::error::RefreshError;
use crate::ports::{CountrySource, RateSource, SourceKind, SummaryInput, SummaryRenderer};

/// How many records feed the summary artifact.
const SUMMARY_TOP_N: u32 = 5;

/// Outcome of a successful refresh cycle.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshOutcome {
    pub total_countries: u64,
    #[serde(with = "atlas_domain::time::second_precision")]
    pub last_refreshed_at: DateTime<Utc>,
}

// =============================================================================
// Engine
// =============================================================================

/// Reconciliation engine.
///
/// Holds the two source ports, the store, and the renderer. The store is
/// generic so the daemon picks a backend at construction time; sources and
/// the renderer are trait objects plugged in as adapters.
pub struct Engine<S: CountryStore> {
    countries: Arc<dyn CountrySource>,
    rates: Arc<dyn RateSource>,
    store: Arc<S>,
    renderer: Arc<dyn SummaryRenderer>,
}

impl<S: CountryStore> Engine<S> {
    pub fn new(
        countries: Arc<dyn CountrySource>,
        rates: Arc<dyn RateSource>,
        store: Arc<S>,
        renderer: Arc<dyn SummaryRenderer>,
    ) -> Self {
        Self {
            countries,
            rates,
            store,
            renderer,
        }
    }

    /// Run one refresh cycle.
    ///
    /// Either source failing aborts before any store mutation. All upserts
    /// plus the metadata overwrite are applied atomically; the summary
    /// artifact is rendered after commit and its failure does not affect
    /// the outcome.
    pub async fn refresh(&self) -> Result<RefreshOutcome, RefreshError> {
        self.refresh_with_rng(&mut StdRng::from_entropy()).await
    }

    /// Refresh with a caller-provided RNG, so tests can seed the GDP
    /// multiplier and assert bounds.
    pub async fn refresh_with_rng<R: Rng>(
        &self,
        rng: &mut R,
    ) -> Result<RefreshOutcome, RefreshError> {
        // Sequential fetches; either failure short-circuits untouched.
        let raw_countries = self
            .countries
            .fetch_countries()
            .await
            .map_err(|cause| RefreshError::source(SourceKind::Countries, cause))?;
        let rates = self
            .rates
            .fetch_rates()
            .await
            .map_err(|cause| RefreshError::source(SourceKind::ExchangeRates, cause))?;

        // One timestamp for the whole cycle.
        let refreshed_at = time::utc_now_seconds();

        let records: Vec<CountryRecord> = raw_countries
            .iter()
            .filter_map(|raw| derive_record(raw, &rates, refreshed_at, rng))
            .collect();
        let skipped = raw_countries.len() - records.len();

        let total = records.len() as u64;
        let batch = RefreshBatch {
            records,
            meta: vec![
                (
                    META_LAST_REFRESHED_AT.to_string(),
                    time::to_second_iso(&refreshed_at),
                ),
                (META_TOTAL_COUNTRIES.to_string(), total.to_string()),
            ],
        };

        let applied = self.store.apply_refresh(&batch).await?;
        info!(total = applied, skipped, "refresh cycle committed");

        // Post-commit, best effort: the artifact is a view, not part of
        // the refresh contract.
        self.render_summary(applied, refreshed_at).await;

        Ok(RefreshOutcome {
            total_countries: applied,
            last_refreshed_at: refreshed_at,
        })
    }

    async fn render_summary(&self, total: u64, refreshed_at: DateTime<Utc>) {
        let top = match self.store.top_n_by_gdp(SUMMARY_TOP_N).await {
            Ok(ranked) => ranked
                .into_iter()
                .map(|r| (r.name, r.estimated_gdp))
                .collect(),
            Err(e) => {
                warn!(error = %e, "skipping summary image: top-N read failed");
                return;
            },
        };

        let summary = SummaryInput {
            total_countries: total,
            top_by_gdp: top,
            last_refreshed_at: refreshed_at,
        };

        match self.renderer.render(&summary) {
            Ok(path) => info!(path = %path.display(), "summary image written"),
            Err(e) => warn!(error = %e, "summary image generation failed"),
        }
    }
}

// =============================================================================
// Record Derivation
// =============================================================================

/// Derive one cached record from a raw source entry.
///
/// Returns `None` for entries without a usable name (skipped, not an
/// error). Population defaults to 0; only the first listed currency is
/// considered; a non-positive resolved rate counts as unresolved, which
/// keeps the gdp-iff-rate invariant.
pub fn derive_record<R: Rng + ?Sized>(
    raw: &RawCountry,
    rates: &RateTable,
    refreshed_at: DateTime<Utc>,
    rng: &mut R,
) -> Option<CountryRecord> {
    let name = CountryName::new(raw.name.clone()?).ok()?;

    let population = raw.population.unwrap_or(0);
    let currency_code = raw.currencies.first().and_then(|c| c.code.clone());
    let exchange_rate = currency_code
        .as_deref()
        .and_then(|code| rates.resolve(code))
        .filter(|rate| *rate > 0.0);
    let estimated_gdp =
        exchange_rate.and_then(|rate| estimate_gdp(Some(population), Some(rate), rng));

    Some(CountryRecord {
        name,
        capital: raw.capital.clone(),
        region: raw.region.clone(),
        population,
        currency_code,
        exchange_rate,
        estimated_gdp,
        flag_url: raw.flag.clone(),
        last_refreshed_at: refreshed_at,
    })
}

// =============================================================================
// Tests
// =============================================================================
