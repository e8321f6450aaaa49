//! Atlas Daemon
//!
//! Country metadata cache service: caches country data enriched with a
//! derived estimated-GDP figure, refreshed on demand from two external
//! sources.
//!
//! # Usage
//!
//! ```bash
//! # Start with the in-memory backend
//! cargo run -p atlasd
//!
//! # Start against PostgreSQL
//! DATABASE_URL=postgres://... cargo run -p atlasd --features postgres
//!
//! # Database lifecycle (feature `postgres`)
//! atlasd db migrate
//! atlasd db status
//! ```
//!
//! # Environment Variables
//!
//! - `ATLAS_ENV`: Environment (test, development, production)
//! - `ATLAS_API_HOST`: API host (default: 0.0.0.0)
//! - `ATLAS_API_PORT`: API port (default: 8080)
//! - `ATLAS_COUNTRIES_URL`: countries source endpoint
//! - `ATLAS_EXCHANGE_URL`: exchange-rate source endpoint
//! - `ATLAS_SUMMARY_PATH`: summary image path (default: cache/summary.png)
//! - `ATLAS_FONT_PATH`: TTF font used for the summary image
//! - `DATABASE_URL`: PostgreSQL URL (requires the `postgres` feature)

use atlasd::{Config, Daemon};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("atlasd=info".parse()?))
        .init();

    // Database subcommands short-circuit before the server starts
    let args: Vec<String> = std::env::args().collect();
    if args.get(1).map(String::as_str) == Some("db") {
        return atlasd::db::run_db_command(args).await;
    }

    // Load configuration
    let config = Config::from_env()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = %config.environment,
        api_host = %config.api.host,
        api_port = config.api.port,
        "Atlas daemon"
    );

    run(config).await
}

#[cfg(feature = "postgres")]
async fn run(config: Config) -> anyhow::Result<()> {
    if let Some(database_url) = config.database_url.clone() {
        let pool = sqlx::PgPool::connect(&database_url).await?;
        atlas_db::migrate(&pool).await?;
        Daemon::new_postgres(config, pool).run().await?;
    } else {
        Daemon::new_memory(config).run().await?;
    }
    Ok(())
}

#[cfg(not(feature = "postgres"))]
async fn run(config: Config) -> anyhow::Result<()> {
    if config.database_url.is_some() {
        tracing::warn!(
            "DATABASE_URL is set but atlasd was built without the `postgres` feature; \
             using the in-memory backend"
        );
    }
    Daemon::new_memory(config).run().await?;
    Ok(())
}
