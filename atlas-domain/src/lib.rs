//! Atlas Domain Types
//!
//! Entities and pure logic shared across the workspace:
//!
//! - **`CountryRecord` / `CountryName`**: the cached entity and its
//!   case-folded identity key
//! - **`RawCountry` / `RateTable`**: raw shapes from the external sources
//! - **`estimate_gdp`**: the randomized derived metric
//!
//! No IO happens here; adapters and the store depend on this crate, never
//! the other way around.

#![warn(clippy::all)]

// Modules
mod country;
mod gdp;
mod source;
pub mod time;

// Re-exports
pub use country::{CountryName, CountryRecord, DomainError};
pub use gdp::estimate_gdp;
pub use source::{RawCountry, RawCurrency, RateTable};
