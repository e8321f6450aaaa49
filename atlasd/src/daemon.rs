//! Daemon: runtime orchestrator.
//!
//! Wires the configured store backend, the two source adapters, and the
//! summary renderer into the reconciliation engine, then serves the HTTP
//! API until shutdown.
//!
//! # Lifecycle
//!
//! 1. Load configuration
//! 2. Pick the store backend (memory, or PostgreSQL behind the feature)
//! 3. Assemble adapters + engine + API state
//! 4. Serve until SIGINT

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{error, info};

use atlas_connectors::{ExchangeRateClient, RestCountriesClient};
use atlas_engine::Engine;
use atlas_render::PngSummaryRenderer;
use atlas_store::{CountryStore, MemoryStore};

use crate::api::{create_router, ApiState};
use crate::config::Config;
use crate::error::DaemonResult;

// =============================================================================
// Daemon
// =============================================================================

/// The Atlas daemon.
pub struct Daemon<S: CountryStore + 'static> {
    config: Config,
    state: Arc<ApiState<S>>,
}

impl Daemon<MemoryStore> {
    /// Daemon over the in-memory backend (default when no DATABASE_URL).
    pub fn new_memory(config: Config) -> Self {
        Self::with_store(config, Arc::new(MemoryStore::new()))
    }
}

#[cfg(feature = "postgres")]
impl Daemon<atlas_store::PgStore> {
    /// Daemon over PostgreSQL.
    pub fn new_postgres(config: Config, pool: sqlx::PgPool) -> Self {
        Self::with_store(config, Arc::new(atlas_store::PgStore::new(pool)))
    }
}

impl<S: CountryStore + 'static> Daemon<S> {
    /// Wire the real adapters around an existing store.
    pub fn with_store(config: Config, store: Arc<S>) -> Self {
        let countries = Arc::new(RestCountriesClient::with_url(
            config.sources.countries_url.clone(),
        ));
        let rates = Arc::new(ExchangeRateClient::with_url(
            config.sources.exchange_url.clone(),
        ));
        let renderer = Arc::new(PngSummaryRenderer::new(config.summary.image_path.clone()));

        let engine = Engine::new(countries, rates, store.clone(), renderer);
        let state = Arc::new(ApiState {
            engine,
            store,
            image_path: config.summary.image_path.clone(),
        });

        Self { config, state }
    }

    /// Run the daemon.
    ///
    /// This method blocks until shutdown is requested (SIGINT).
    pub async fn run(self) -> DaemonResult<()> {
        let router = create_router(self.state.clone());

        let addr = format!("{}:{}", self.config.api.host, self.config.api.port);
        let listener = TcpListener::bind(&addr).await?;
        info!(addr = %listener.local_addr()?, "API server listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Shutdown complete");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to install ctrl-c handler");
    }
    info!("Shutdown requested");
}
