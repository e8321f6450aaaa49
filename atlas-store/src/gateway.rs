//! Store gateway trait definitions (Ports)
//!
//! These define the storage interface the reconciliation engine and the
//! HTTP handlers talk to. Implementations can be PostgreSQL or in-memory.

use crate::error::StoreError;
use async_trait::async_trait;
use atlas_domain::CountryRecord;

/// Meta key for the last successful refresh timestamp.
pub const META_LAST_REFRESHED_AT: &str = "last_refreshed_at";
/// Meta key for the cached country count, stringified.
pub const META_TOTAL_COUNTRIES: &str = "total_countries";

// =============================================================================
// Query Types
// =============================================================================

/// Sort orders accepted by `list`.
///
/// GDP sorts place records without an estimate last and break ties by name
/// ascending, so orderings stay deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    GdpDesc,
    GdpAsc,
    NameAsc,
    NameDesc,
}

impl SortKey {
    /// Parse the query-string form; unknown values yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "gdp_desc" => Some(Self::GdpDesc),
            "gdp_asc" => Some(Self::GdpAsc),
            "name_asc" => Some(Self::NameAsc),
            "name_desc" => Some(Self::NameDesc),
            _ => None,
        }
    }
}

/// Filters and ordering for `list`.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    /// Exact-match region filter
    pub region: Option<String>,
    /// Exact-match currency-code filter
    pub currency: Option<String>,
    pub sort: Option<SortKey>,
}

/// One entry of the top-N GDP ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct GdpRanking {
    pub name: String,
    pub estimated_gdp: f64,
}

/// Everything one refresh cycle writes, applied atomically.
#[derive(Debug, Clone, Default)]
pub struct RefreshBatch {
    pub records: Vec<CountryRecord>,
    pub meta: Vec<(String, String)>,
}

// =============================================================================
// Store Trait
// =============================================================================

/// Combined store interface for country records and refresh metadata.
#[async_trait]
pub trait CountryStore: Send + Sync {
    /// Insert or fully replace a record keyed on its `name_key`.
    ///
    /// Replace means all fields; there is no partial-field merge.
    async fn upsert(&self, record: &CountryRecord) -> Result<(), StoreError>;

    /// Insert or replace a metadata entry.
    async fn set_meta(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Read a metadata entry.
    async fn get_meta(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Delete by identity key; returns the number of rows removed.
    async fn delete_by_key(&self, name_key: &str) -> Result<u64, StoreError>;

    /// Look up a single record by identity key.
    async fn get_by_key(&self, name_key: &str) -> Result<Option<CountryRecord>, StoreError>;

    /// List records with optional filters and ordering.
    async fn list(&self, query: &ListQuery) -> Result<Vec<CountryRecord>, StoreError>;

    /// Top `n` records by estimated GDP, descending. Records without an
    /// estimate are excluded.
    async fn top_n_by_gdp(&self, n: u32) -> Result<Vec<GdpRanking>, StoreError>;

    /// Apply one refresh cycle — every upsert plus the meta overwrite — as
    /// a single all-or-nothing unit. Readers never observe partial state,
    /// and a failure leaves the store exactly as it was.
    ///
    /// Returns the number of upserted records.
    async fn apply_refresh(&self, batch: &RefreshBatch) -> Result<u64, StoreError>;
}

// =============================================================================
// Tests
// =============================================================================
