//! Atlas External Source Connectors
//!
//! Adapters for the two remote data sources. Normalizes transport
//! failures, timeouts, and loose payload shapes into the engine's
//! `SourceError` / `RateTable` types.

#![warn(clippy::all)]

// Public modules
pub mod exchange;
pub mod restcountries;

// Re-exports
pub use exchange::{ExchangeRateClient, EXCHANGE_URL};
pub use restcountries::{RestCountriesClient, RESTCOUNTRIES_URL};
