//! PostgreSQL store implementation.
//!
//! This module uses dynamic queries (sqlx::query) instead of compile-time
//! checked macros (sqlx::query!) to allow compilation without DATABASE_URL.
//!
//! `apply_refresh` wraps the whole cycle in one transaction; dropping the
//! transaction guard on an error path rolls everything back, so no partial
//! refresh is ever visible to readers.

use crate::error::StoreError;
use crate::gateway::{CountryStore, GdpRanking, ListQuery, RefreshBatch, SortKey};
use async_trait::async_trait;
use atlas_domain::{CountryName, CountryRecord};
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};

const COUNTRY_COLUMNS: &str = "name, capital, region, population, currency_code, \
     exchange_rate, estimated_gdp, flag_url, last_refreshed_at";

const UPSERT_SQL: &str = r#"
    INSERT INTO countries
        (name, name_key, capital, region, population, currency_code,
         exchange_rate, estimated_gdp, flag_url, last_refreshed_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
    ON CONFLICT (name_key) DO UPDATE SET
        name = EXCLUDED.name,
        capital = EXCLUDED.capital,
        region = EXCLUDED.region,
        population = EXCLUDED.population,
        currency_code = EXCLUDED.currency_code,
        exchange_rate = EXCLUDED.exchange_rate,
        estimated_gdp = EXCLUDED.estimated_gdp,
        flag_url = EXCLUDED.flag_url,
        last_refreshed_at = EXCLUDED.last_refreshed_at
"#;

const SET_META_SQL: &str = r#"
    INSERT INTO meta (key_name, value_text)
    VALUES ($1, $2)
    ON CONFLICT (key_name) DO UPDATE SET value_text = EXCLUDED.value_text
"#;

/// PostgreSQL-backed store.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a store over an existing connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying pool (for migrations/testing).
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Bind one record to the upsert statement.
fn bind_upsert(record: &CountryRecord) -> Query<'_, Postgres, PgArguments> {
    sqlx::query(UPSERT_SQL)
        .bind(record.name.as_str())
        .bind(record.name_key())
        .bind(record.capital.as_deref())
        .bind(record.region.as_deref())
        .bind(record.population as i64)
        .bind(record.currency_code.as_deref())
        .bind(record.exchange_rate)
        .bind(record.estimated_gdp)
        .bind(record.flag_url.as_deref())
        .bind(record.last_refreshed_at)
}

/// Bind one key/value pair to the meta upsert statement.
fn bind_set_meta<'a>(key: &'a str, value: &'a str) -> Query<'a, Postgres, PgArguments> {
    sqlx::query(SET_META_SQL).bind(key).bind(value)
}

/// Parse a `countries` row into the domain record.
fn parse_country_row(row: &PgRow) -> Result<CountryRecord, StoreError> {
    let name: String = row.try_get("name")?;
    let population: i64 = row.try_get("population")?;

    Ok(CountryRecord {
        name: CountryName::new(name)?,
        capital: row.try_get("capital")?,
        region: row.try_get("region")?,
        population: u64::try_from(population).unwrap_or(0),
        currency_code: row.try_get("currency_code")?,
        exchange_rate: row.try_get("exchange_rate")?,
        estimated_gdp: row.try_get("estimated_gdp")?,
        flag_url: row.try_get("flag_url")?,
        last_refreshed_at: row.try_get("last_refreshed_at")?,
    })
}

/// ORDER BY clause for a sort key. GDP sorts keep absent estimates last
/// and use the name as tiebreaker, matching the in-memory backend.
fn order_clause(sort: SortKey) -> &'static str {
    match sort {
        SortKey::GdpDesc => " ORDER BY estimated_gdp DESC NULLS LAST, name ASC",
        SortKey::GdpAsc => " ORDER BY estimated_gdp ASC NULLS LAST, name ASC",
        SortKey::NameAsc => " ORDER BY name ASC",
        SortKey::NameDesc => " ORDER BY name DESC",
    }
}

#[async_trait]
impl CountryStore for PgStore {
    async fn upsert(&self, record: &CountryRecord) -> Result<(), StoreError> {
        bind_upsert(record).execute(&self.pool).await?;
        Ok(())
    }

    async fn set_meta(&self, key: &str, value: &str) -> Result<(), StoreError> {
        bind_set_meta(key, value).execute(&self.pool).await?;
        Ok(())
    }

    async fn get_meta(&self, key: &str) -> Result<Option<String>, StoreError> {
        let row = sqlx::query("SELECT value_text FROM meta WHERE key_name = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(r) => Ok(r.try_get("value_text")?),
            None => Ok(None),
        }
    }

    async fn delete_by_key(&self, name_key: &str) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM countries WHERE name_key = $1")
            .bind(name_key)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn get_by_key(&self, name_key: &str) -> Result<Option<CountryRecord>, StoreError> {
        let sql = format!("SELECT {COUNTRY_COLUMNS} FROM countries WHERE name_key = $1");
        let row = sqlx::query(&sql)
            .bind(name_key)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(parse_country_row).transpose()
    }

    async fn list(&self, query: &ListQuery) -> Result<Vec<CountryRecord>, StoreError> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {COUNTRY_COLUMNS} FROM countries WHERE 1=1"));

        if let Some(region) = &query.region {
            qb.push(" AND region = ").push_bind(region.as_str());
        }
        if let Some(currency) = &query.currency {
            qb.push(" AND currency_code = ").push_bind(currency.as_str());
        }
        if let Some(sort) = query.sort {
            qb.push(order_clause(sort));
        }

        let rows = qb.build().fetch_all(&self.pool).await?;
        rows.iter().map(parse_country_row).collect()
    }

    async fn top_n_by_gdp(&self, n: u32) -> Result<Vec<GdpRanking>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT name, estimated_gdp
            FROM countries
            WHERE estimated_gdp IS NOT NULL
            ORDER BY estimated_gdp DESC, name ASC
            LIMIT $1
            "#,
        )
        .bind(i64::from(n))
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<GdpRanking, StoreError> {
                Ok(GdpRanking {
                    name: row.try_get("name")?,
                    estimated_gdp: row.try_get("estimated_gdp")?,
                })
            })
            .collect()
    }

    async fn apply_refresh(&self, batch: &RefreshBatch) -> Result<u64, StoreError> {
        let mut tx = self.pool.begin().await?;

        let mut applied = 0u64;
        for record in &batch.records {
            bind_upsert(record).execute(&mut *tx).await?;
            applied += 1;
        }
        for (key, value) in &batch.meta {
            bind_set_meta(key, value).execute(&mut *tx).await?;
        }

        tx.commit().await?;
        Ok(applied)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_clause_keeps_absent_gdp_last() {
        assert!(order_clause(SortKey::GdpDesc).contains("NULLS LAST"));
        assert!(order_clause(SortKey::GdpAsc).contains("NULLS LAST"));
    }

    #[test]
    fn test_upsert_sql_replaces_every_field() {
        for column in [
            "name",
            "capital",
            "region",
            "population",
            "currency_code",
            "exchange_rate",
            "estimated_gdp",
            "flag_url",
            "last_refreshed_at",
        ] {
            assert!(
                UPSERT_SQL.contains(&format!("{column} = EXCLUDED.{column}")),
                "column {column} is not replaced on conflict"
            );
        }
    }
}
