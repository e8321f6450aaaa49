//! In-memory store implementation
//!
//! Default backend when no database is configured, and the test vehicle.
//! Thread-safe using RwLock for concurrent access.

use crate::error::StoreError;
use crate::gateway::{CountryStore, GdpRanking, ListQuery, RefreshBatch, SortKey};
use async_trait::async_trait;
use atlas_domain::CountryRecord;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory store keyed by `name_key`.
pub struct MemoryStore {
    countries: RwLock<HashMap<String, CountryRecord>>,
    meta: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create a new empty in-memory store
    pub fn new() -> Self {
        Self {
            countries: RwLock::new(HashMap::new()),
            meta: RwLock::new(HashMap::new()),
        }
    }

    /// Number of cached country records
    pub fn country_count(&self) -> usize {
        self.countries.read().unwrap().len()
    }

    /// Clear all data (useful for test setup)
    pub fn clear(&self) {
        self.countries.write().unwrap().clear();
        self.meta.write().unwrap().clear();
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// GDP comparison with absent values ordered last regardless of direction.
fn gdp_ordering(a: &CountryRecord, b: &CountryRecord, descending: bool) -> Ordering {
    match (a.estimated_gdp, b.estimated_gdp) {
        (Some(x), Some(y)) => {
            let ord = x.partial_cmp(&y).unwrap_or(Ordering::Equal);
            if descending { ord.reverse() } else { ord }
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.name.cmp(&b.name))
}

#[async_trait]
impl CountryStore for MemoryStore {
    async fn upsert(&self, record: &CountryRecord) -> Result<(), StoreError> {
        let mut countries = self.countries.write().unwrap();
        countries.insert(record.name_key(), record.clone());
        Ok(())
    }

    async fn set_meta(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut meta = self.meta.write().unwrap();
        meta.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get_meta(&self, key: &str) -> Result<Option<String>, StoreError> {
        let meta = self.meta.read().unwrap();
        Ok(meta.get(key).cloned())
    }

    async fn delete_by_key(&self, name_key: &str) -> Result<u64, StoreError> {
        let mut countries = self.countries.write().unwrap();
        Ok(countries.remove(name_key).map_or(0, |_| 1))
    }

    async fn get_by_key(&self, name_key: &str) -> Result<Option<CountryRecord>, StoreError> {
        let countries = self.countries.read().unwrap();
        Ok(countries.get(name_key).cloned())
    }

    async fn list(&self, query: &ListQuery) -> Result<Vec<CountryRecord>, StoreError> {
        let countries = self.countries.read().unwrap();
        let mut rows: Vec<CountryRecord> = countries
            .values()
            .filter(|r| {
                query
                    .region
                    .as_ref()
                    .map_or(true, |region| r.region.as_deref() == Some(region.as_str()))
            })
            .filter(|r| {
                query
                    .currency
                    .as_ref()
                    .map_or(true, |code| r.currency_code.as_deref() == Some(code.as_str()))
            })
            .cloned()
            .collect();

        match query.sort {
            Some(SortKey::GdpDesc) => rows.sort_by(|a, b| gdp_ordering(a, b, true)),
            Some(SortKey::GdpAsc) => rows.sort_by(|a, b| gdp_ordering(a, b, false)),
            Some(SortKey::NameAsc) => rows.sort_by(|a, b| a.name.cmp(&b.name)),
            Some(SortKey::NameDesc) => rows.sort_by(|a, b| b.name.cmp(&a.name)),
            None => {},
        }

        Ok(rows)
    }

    async fn top_n_by_gdp(&self, n: u32) -> Result<Vec<GdpRanking>, StoreError> {
        let countries = self.countries.read().unwrap();
        let mut ranked: Vec<GdpRanking> = countries
            .values()
            .filter_map(|r| {
                r.estimated_gdp.map(|gdp| GdpRanking {
                    name: r.name.as_str().to_string(),
                    estimated_gdp: gdp,
                })
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.estimated_gdp
                .partial_cmp(&a.estimated_gdp)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.name.cmp(&b.name))
        });
        ranked.truncate(n as usize);
        Ok(ranked)
    }

    async fn apply_refresh(&self, batch: &RefreshBatch) -> Result<u64, StoreError> {
        // Nothing below can fail midway; holding both write locks across
        // the loop makes the whole cycle atomic for concurrent readers.
        let mut countries = self.countries.write().unwrap();
        let mut meta = self.meta.write().unwrap();

        let mut applied = 0u64;
        for record in &batch.records {
            countries.insert(record.name_key(), record.clone());
            applied += 1;
        }
        for (key, value) in &batch.meta {
            meta.insert(key.clone(), value.clone());
        }
        Ok(applied)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{META_LAST_REFRESHED_AT, META_TOTAL_COUNTRIES};
    use atlas_domain::CountryName;
    use chrono::{TimeZone, Utc};

    fn record(name: &str, gdp: Option<f64>) -> CountryRecord {
        CountryRecord {
            name: CountryName::new(name).unwrap(),
            capital: None,
            region: Some("Africa".to_string()),
            population: 1_000,
            currency_code: Some("NGN".to_string()),
            exchange_rate: gdp.map(|_| 460.0),
            estimated_gdp: gdp,
            flag_url: None,
            last_refreshed_at: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_upsert_and_get() {
        let store = MemoryStore::new();
        store.upsert(&record("Nigeria", Some(100.0))).await.unwrap();

        let found = store.get_by_key("nigeria").await.unwrap();
        assert_eq!(found.unwrap().name.as_str(), "Nigeria");
        assert!(store.get_by_key("Nigeria").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_replaces_all_fields() {
        let store = MemoryStore::new();
        store.upsert(&record("Nigeria", Some(100.0))).await.unwrap();

        let mut second = record("Nigeria", None);
        second.population = 2_000;
        store.upsert(&second).await.unwrap();

        assert_eq!(store.country_count(), 1);
        let found = store.get_by_key("nigeria").await.unwrap().unwrap();
        assert_eq!(found.population, 2_000);
        assert_eq!(found.estimated_gdp, None);
        assert_eq!(found.exchange_rate, None);
    }

    #[tokio::test]
    async fn test_delete_by_key() {
        let store = MemoryStore::new();
        assert_eq!(store.delete_by_key("atlantis").await.unwrap(), 0);

        store.upsert(&record("Nigeria", None)).await.unwrap();
        assert_eq!(store.delete_by_key("nigeria").await.unwrap(), 1);
        assert_eq!(store.delete_by_key("nigeria").await.unwrap(), 0);
        assert_eq!(store.country_count(), 0);
    }

    #[tokio::test]
    async fn test_list_filters() {
        let store = MemoryStore::new();
        let mut europe = record("France", Some(10.0));
        europe.region = Some("Europe".to_string());
        europe.currency_code = Some("EUR".to_string());
        store.upsert(&europe).await.unwrap();
        store.upsert(&record("Nigeria", Some(20.0))).await.unwrap();
        store.upsert(&record("Ghana", Some(5.0))).await.unwrap();

        let by_region = store
            .list(&ListQuery {
                region: Some("Europe".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_region.len(), 1);
        assert_eq!(by_region[0].name.as_str(), "France");

        let by_currency = store
            .list(&ListQuery {
                currency: Some("NGN".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_currency.len(), 2);

        let both = store
            .list(&ListQuery {
                region: Some("Africa".to_string()),
                currency: Some("EUR".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(both.is_empty());
    }

    #[tokio::test]
    async fn test_gdp_sort_puts_absent_last() {
        let store = MemoryStore::new();
        store.upsert(&record("Alpha", Some(100.0))).await.unwrap();
        store.upsert(&record("Bravo", Some(50.0))).await.unwrap();
        store.upsert(&record("Charlie", None)).await.unwrap();

        let desc = store
            .list(&ListQuery {
                sort: Some(SortKey::GdpDesc),
                ..Default::default()
            })
            .await
            .unwrap();
        let names: Vec<&str> = desc.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Bravo", "Charlie"]);

        let asc = store
            .list(&ListQuery {
                sort: Some(SortKey::GdpAsc),
                ..Default::default()
            })
            .await
            .unwrap();
        let names: Vec<&str> = asc.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Bravo", "Alpha", "Charlie"]);
    }

    #[tokio::test]
    async fn test_name_sort() {
        let store = MemoryStore::new();
        store.upsert(&record("Bravo", None)).await.unwrap();
        store.upsert(&record("Alpha", None)).await.unwrap();

        let asc = store
            .list(&ListQuery {
                sort: Some(SortKey::NameAsc),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(asc[0].name.as_str(), "Alpha");

        let desc = store
            .list(&ListQuery {
                sort: Some(SortKey::NameDesc),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(desc[0].name.as_str(), "Bravo");
    }

    #[tokio::test]
    async fn test_top_n_excludes_absent_gdp() {
        let store = MemoryStore::new();
        store.upsert(&record("Alpha", Some(100.0))).await.unwrap();
        store.upsert(&record("Bravo", Some(500.0))).await.unwrap();
        store.upsert(&record("Charlie", None)).await.unwrap();

        let top = store.top_n_by_gdp(5).await.unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].name, "Bravo");
        assert_eq!(top[1].name, "Alpha");

        let top1 = store.top_n_by_gdp(1).await.unwrap();
        assert_eq!(top1.len(), 1);
        assert_eq!(top1[0].name, "Bravo");
    }

    #[tokio::test]
    async fn test_apply_refresh_writes_records_and_meta() {
        let store = MemoryStore::new();
        let batch = RefreshBatch {
            records: vec![record("Nigeria", Some(10.0)), record("Ghana", None)],
            meta: vec![
                (
                    META_LAST_REFRESHED_AT.to_string(),
                    "2024-05-01T00:00:00+00:00".to_string(),
                ),
                (META_TOTAL_COUNTRIES.to_string(), "2".to_string()),
            ],
        };

        let applied = store.apply_refresh(&batch).await.unwrap();
        assert_eq!(applied, 2);
        assert_eq!(store.country_count(), 2);
        assert_eq!(
            store.get_meta(META_TOTAL_COUNTRIES).await.unwrap(),
            Some("2".to_string())
        );
        assert_eq!(
            store.get_meta(META_LAST_REFRESHED_AT).await.unwrap(),
            Some("2024-05-01T00:00:00+00:00".to_string())
        );
    }

    #[tokio::test]
    async fn test_apply_refresh_overwrites_duplicate_names() {
        let store = MemoryStore::new();
        let mut first = record("Nigeria", Some(10.0));
        first.population = 1;
        let mut second = record("Nigeria", Some(20.0));
        second.population = 2;

        let applied = store
            .apply_refresh(&RefreshBatch {
                records: vec![first, second],
                meta: vec![],
            })
            .await
            .unwrap();

        // Both upserts count, but only one row remains and it carries the
        // later values.
        assert_eq!(applied, 2);
        assert_eq!(store.country_count(), 1);
        let found = store.get_by_key("nigeria").await.unwrap().unwrap();
        assert_eq!(found.population, 2);
    }
}
