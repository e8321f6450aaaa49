//! Database CLI subcommands for atlasd.
//!
//! Provides `db migrate` and `db status` commands against the PostgreSQL
//! backend (feature `postgres`).

use anyhow::{anyhow, Result};

/// Run database CLI subcommands.
///
/// Supported commands:
/// - `atlasd db migrate` - Run pending migrations
/// - `atlasd db status` - Check migration status
#[cfg(feature = "postgres")]
pub async fn run_db_command(args: Vec<String>) -> Result<()> {
    use std::env;

    if args.len() < 3 {
        return Err(anyhow!("Usage: atlasd db <migrate|status>"));
    }

    let database_url = env::var("DATABASE_URL")
        .map_err(|_| anyhow!("DATABASE_URL environment variable is required for db commands"))?;

    let pool = sqlx::PgPool::connect(&database_url).await?;

    match args[2].as_str() {
        "migrate" => atlas_db::migrate(&pool).await,
        "status" => atlas_db::status(&pool).await,
        other => Err(anyhow!("Unknown db command: {}. Use migrate or status", other)),
    }
}

/// Without the `postgres` feature there is no database to manage.
#[cfg(not(feature = "postgres"))]
pub async fn run_db_command(_args: Vec<String>) -> Result<()> {
    Err(anyhow!(
        "db commands require atlasd to be built with the `postgres` feature"
    ))
}
