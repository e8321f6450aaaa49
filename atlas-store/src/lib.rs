//! Atlas Storage Layer
//!
//! Provides persistence for country records and refresh metadata.
//!
//! # Architecture
//!
//! - **`CountryStore` trait**: the gateway interface (port)
//! - **In-memory store**: default backend, also the test vehicle
//! - **PostgreSQL store**: production backend (feature `postgres`)
//!
//! Business logic never touches a backend directly; the refresh engine and
//! the HTTP handlers only see the trait, so the backend is a swappable
//! adapter.

#![warn(clippy::all)]

// Modules
mod error;
mod gateway;
mod memory;
#[cfg(feature = "postgres")]
mod postgres;

// Re-exports
pub use error::StoreError;
pub use gateway::{
    CountryStore, GdpRanking, ListQuery, RefreshBatch, SortKey, META_LAST_REFRESHED_AT,
    META_TOTAL_COUNTRIES,
};
pub use memory::MemoryStore;
#[cfg(feature = "postgres")]
pub use postgres::PgStore;
