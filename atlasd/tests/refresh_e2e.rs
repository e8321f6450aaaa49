//! End-to-end API tests over the in-memory backend with stub sources.
//!
//! Drives the axum router directly with oneshot requests; no sockets, no
//! network, no database.

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use atlas_domain::{RateTable, RawCountry, RawCurrency};
use atlas_engine::{Engine, RecordingRenderer, StubCountrySource, StubRateSource};
use atlas_store::MemoryStore;
use atlasd::api::{create_router, ApiState};

struct TestApp {
    router: Router,
    countries: Arc<StubCountrySource>,
    rates: Arc<StubRateSource>,
}

fn raw(name: &str, population: u64, currency: Option<&str>) -> RawCountry {
    RawCountry {
        name: Some(name.to_string()),
        region: Some("Africa".to_string()),
        population: Some(population),
        currencies: currency
            .map(|code| {
                vec![RawCurrency {
                    code: Some(code.to_string()),
                }]
            })
            .unwrap_or_default(),
        ..Default::default()
    }
}

fn rates(entries: &[(&str, f64)]) -> RateTable {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), *v))
        .collect()
}

fn test_app(entries: Vec<RawCountry>, table: RateTable) -> TestApp {
    let countries = Arc::new(StubCountrySource::new(entries));
    let rate_source = Arc::new(StubRateSource::new(table));
    let store = Arc::new(MemoryStore::new());
    let renderer = Arc::new(RecordingRenderer::new());

    let engine = Engine::new(
        countries.clone(),
        rate_source.clone(),
        store.clone(),
        renderer,
    );
    let state = Arc::new(ApiState {
        engine,
        store,
        image_path: PathBuf::from("does-not-exist/summary.png"),
    });

    TestApp {
        router: create_router(state),
        countries,
        rates: rate_source,
    }
}

async fn send(router: &Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn test_health() {
    let app = test_app(vec![], rates(&[]));

    let (status, body) = send(&app.router, "GET", "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_refresh_then_read_back() {
    let app = test_app(
        vec![
            raw("Nigeria", 206_139_589, Some("NGN")),
            raw("Ghana", 31_072_940, Some("GHS")),
        ],
        rates(&[("NGN", 460.0)]),
    );

    let (status, body) = send(&app.router, "POST", "/countries/refresh").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Refresh successful");
    assert_eq!(body["total_countries"], 2);
    let refreshed_at = body["last_refreshed_at"].as_str().unwrap().to_string();
    assert!(refreshed_at.ends_with("+00:00"));

    let (status, listed) = send(&app.router, "GET", "/countries").await;
    assert_eq!(status, StatusCode::OK);
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 2);
    for record in listed {
        assert_eq!(record["last_refreshed_at"].as_str().unwrap(), refreshed_at);
    }

    let (status, body) = send(&app.router, "GET", "/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_countries"], 2);
    assert_eq!(body["last_refreshed_at"].as_str().unwrap(), refreshed_at);
}

#[tokio::test]
async fn test_refresh_source_failure_is_503_and_store_untouched() {
    let app = test_app(
        vec![raw("Nigeria", 1_000, Some("NGN"))],
        rates(&[("NGN", 460.0)]),
    );
    app.rates.set_fail_next(true);

    let (status, body) = send(&app.router, "POST", "/countries/refresh").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "External data source unavailable");
    assert_eq!(body["details"], "Could not fetch data from Exchange Rates");

    let (_, listed) = send(&app.router, "GET", "/countries").await;
    assert!(listed.as_array().unwrap().is_empty());

    let (_, status_body) = send(&app.router, "GET", "/status").await;
    assert_eq!(status_body["total_countries"], 0);
    assert_eq!(status_body["last_refreshed_at"], Value::Null);
}

#[tokio::test]
async fn test_countries_failure_names_the_other_source() {
    let app = test_app(vec![], rates(&[]));
    app.countries.set_fail_next(true);

    let (status, body) = send(&app.router, "POST", "/countries/refresh").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["details"], "Could not fetch data from REST Countries");
}

#[tokio::test]
async fn test_list_sort_gdp_desc_places_missing_last() {
    // Alpha's worst-case GDP beats Bravo's best case, so the order is
    // deterministic despite the random multiplier; Charlie has no
    // resolvable rate and must sort last.
    let app = test_app(
        vec![
            raw("Bravo", 1, Some("NGN")),
            raw("Alpha", 1_000_000, Some("NGN")),
            raw("Charlie", 500, None),
        ],
        rates(&[("NGN", 460.0)]),
    );
    send(&app.router, "POST", "/countries/refresh").await;

    let (status, body) = send(&app.router, "GET", "/countries?sort=gdp_desc").await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Alpha", "Bravo", "Charlie"]);
    assert_eq!(body[2]["estimated_gdp"], Value::Null);
}

#[tokio::test]
async fn test_list_filters_by_region_and_currency() {
    let mut europe = raw("France", 67_000_000, Some("EUR"));
    europe.region = Some("Europe".to_string());
    let app = test_app(
        vec![europe, raw("Nigeria", 206_139_589, Some("NGN"))],
        rates(&[("NGN", 460.0), ("EUR", 0.92)]),
    );
    send(&app.router, "POST", "/countries/refresh").await;

    let (_, body) = send(&app.router, "GET", "/countries?region=Europe").await;
    let listed = body.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["name"], "France");

    let (_, body) = send(&app.router, "GET", "/countries?currency=NGN").await;
    let listed = body.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["name"], "Nigeria");

    // Unknown sort values are ignored rather than rejected
    let (status, body) = send(&app.router, "GET", "/countries?sort=bogus").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_get_country_is_case_insensitive() {
    let app = test_app(
        vec![raw("Nigeria", 206_139_589, Some("NGN"))],
        rates(&[("NGN", 460.0)]),
    );
    send(&app.router, "POST", "/countries/refresh").await;

    let (status, body) = send(&app.router, "GET", "/countries/NIGERIA").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Nigeria");
    assert_eq!(body["currency_code"], "NGN");

    let (status, body) = send(&app.router, "GET", "/countries/Atlantis").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Country not found");
}

#[tokio::test]
async fn test_delete_country() {
    let app = test_app(
        vec![raw("Nigeria", 206_139_589, Some("NGN"))],
        rates(&[("NGN", 460.0)]),
    );

    // Delete on an empty store is a 404
    let (status, _) = send(&app.router, "DELETE", "/countries/Atlantis").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    send(&app.router, "POST", "/countries/refresh").await;

    let (status, body) = send(&app.router, "DELETE", "/countries/nigeria").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Country deleted");

    // Exactly one record was removed; a repeat delete misses
    let (_, listed) = send(&app.router, "GET", "/countries").await;
    assert!(listed.as_array().unwrap().is_empty());
    let (status, _) = send(&app.router, "DELETE", "/countries/nigeria").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_image_is_404_until_generated() {
    let app = test_app(vec![], rates(&[]));

    let (status, body) = send(&app.router, "GET", "/countries/image").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Summary image not found");
}
