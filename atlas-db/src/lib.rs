//! Database lifecycle management for Atlas.
//!
//! Provides migration running and status checking for the PostgreSQL
//! backend.

use sqlx::{PgPool, Row};
use tracing::{info, warn};

/// Result type for DB operations.
pub type Result<T> = std::result::Result<T, anyhow::Error>;

/// Run all pending migrations.
///
/// Uses sqlx migrations from the workspace `migrations` directory.
/// Idempotent: safe to run multiple times.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    info!("Running database migrations...");

    sqlx::migrate!("../migrations").run(pool).await?;

    info!("Migrations completed successfully");
    Ok(())
}

/// Check database connectivity and migration status.
///
/// Logs the latest applied migrations, or a hint when none have run yet.
pub async fn status(pool: &PgPool) -> Result<()> {
    // Check connectivity
    let result: i32 = sqlx::query_scalar("SELECT 1").fetch_one(pool).await?;

    if result != 1 {
        return Err(anyhow::anyhow!("Database connectivity check failed"));
    }

    info!("Database connectivity: OK");

    // Runtime query: sqlx::query! would require a database at compile time
    let rows = sqlx::query(
        r#"
        SELECT version, description, success
        FROM _sqlx_migrations
        ORDER BY version DESC
        LIMIT 10
        "#,
    )
    .fetch_all(pool)
    .await;

    match rows {
        Ok(migs) if !migs.is_empty() => {
            info!("Latest migrations:");
            for mig in migs {
                let version: i64 = mig.get("version");
                let description: String = mig.get("description");
                let success: bool = mig.get("success");

                let marker = if success { "ok" } else { "FAILED" };
                info!("  [{}] v{}: {}", marker, version, description);
            }
        },
        Ok(_) => {
            warn!("No migrations found in database (run `atlasd db migrate` first)");
        },
        Err(e) => {
            // Table might not exist yet
            if e.to_string().contains("_sqlx_migrations") {
                warn!("Migration table not found (run `atlasd db migrate` first)");
            } else {
                return Err(e.into());
            }
        },
    }

    Ok(())
}
