//! Atlas Daemon Library
//!
//! Exposes the daemon building blocks so integration tests can assemble
//! the API router without binding a socket.

#![warn(clippy::all)]

pub mod api;
pub mod config;
pub mod daemon;
pub mod db;
pub mod error;

pub use config::{ApiConfig, Config, Environment, SourceConfig, SummaryConfig};
pub use daemon::Daemon;
pub use error::{DaemonError, DaemonResult};
