//! Atlas Reconciliation Engine
//!
//! Orchestrates the one write path of the service: fetch both external
//! datasets, derive a cached record per country, and apply the whole cycle
//! to the store as a single atomic batch.
//!
//! # Architecture
//!
//! - **Ports**: `CountrySource`, `RateSource`, `SummaryRenderer` — the
//!   interfaces adapters implement (real clients in `atlas-connectors`,
//!   the PNG renderer in `atlas-render`)
//! - **Stubs**: in-crate fakes with failure injection for tests
//! - **Engine**: the refresh workflow itself

#![warn(clippy::all)]

// Modules
mod error;
mod ports;
mod reconcile;
mod stub;

// Re-exports
pub use error::RefreshError;
pub use ports::{
    CountrySource, RateSource, RenderError, SourceError, SourceKind, SummaryInput,
    SummaryRenderer,
};
pub use reconcile::{derive_record, Engine, RefreshOutcome};
pub use stub::{RecordingRenderer, StubCountrySource, StubRateSource};
