//! HTTP API for the Atlas daemon.
//!
//! Provides REST endpoints for:
//! - Refresh (pull both sources, reconcile, replace the cache)
//! - Cached country reads with filters and sorting
//! - Delete by case-insensitive name
//! - Refresh status metadata
//! - The generated summary image
//! - Health check

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use atlas_domain::{time, CountryRecord};
use atlas_engine::{Engine, RefreshError};
use atlas_store::{
    CountryStore, ListQuery, SortKey, StoreError, META_LAST_REFRESHED_AT, META_TOTAL_COUNTRIES,
};

// =============================================================================
// API State
// =============================================================================

/// Shared state for API handlers.
pub struct ApiState<S: CountryStore + 'static> {
    pub engine: Engine<S>,
    pub store: Arc<S>,
    /// Where the summary artifact lives, if it has been generated
    pub image_path: PathBuf,
}

// =============================================================================
// Request/Response Types
// =============================================================================

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Response after a successful refresh.
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub message: String,
    pub total_countries: u64,
    pub last_refreshed_at: String,
}

/// Status response, read from refresh metadata.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub total_countries: u64,
    pub last_refreshed_at: Option<String>,
}

/// Plain confirmation message.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Query parameters for the list endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub region: Option<String>,
    pub currency: Option<String>,
    pub sort: Option<String>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

// =============================================================================
// Router
// =============================================================================

/// Create the API router.
pub fn create_router<S>(state: Arc<ApiState<S>>) -> Router
where
    S: CountryStore + 'static,
{
    Router::new()
        .route("/health", get(health_handler))
        .route("/status", get(status_handler))
        .route("/countries/refresh", post(refresh_handler))
        .route("/countries/image", get(image_handler))
        .route("/countries", get(list_handler))
        .route("/countries/:name", get(get_country_handler))
        .route("/countries/:name", delete(delete_country_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint.
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Run one refresh cycle against both external sources.
async fn refresh_handler<S>(
    State(state): State<Arc<ApiState<S>>>,
) -> Result<Json<RefreshResponse>, ApiError>
where
    S: CountryStore + 'static,
{
    let outcome = state.engine.refresh().await.map_err(refresh_error_response)?;

    Ok(Json(RefreshResponse {
        message: "Refresh successful".to_string(),
        total_countries: outcome.total_countries,
        last_refreshed_at: time::to_second_iso(&outcome.last_refreshed_at),
    }))
}

/// List cached countries with optional filters and sorting.
async fn list_handler<S>(
    State(state): State<Arc<ApiState<S>>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<CountryRecord>>, ApiError>
where
    S: CountryStore + 'static,
{
    let query = ListQuery {
        region: params.region,
        currency: params.currency,
        // Unknown sort values are ignored, not rejected
        sort: params.sort.as_deref().and_then(SortKey::parse),
    };

    let rows = state.store.list(&query).await.map_err(store_error_response)?;
    Ok(Json(rows))
}

/// Look up a single country by case-insensitive name.
async fn get_country_handler<S>(
    State(state): State<Arc<ApiState<S>>>,
    Path(name): Path<String>,
) -> Result<Json<CountryRecord>, ApiError>
where
    S: CountryStore + 'static,
{
    let record = state
        .store
        .get_by_key(&name.to_lowercase())
        .await
        .map_err(store_error_response)?
        .ok_or_else(|| not_found("Country not found"))?;

    Ok(Json(record))
}

/// Delete a single country by case-insensitive name.
async fn delete_country_handler<S>(
    State(state): State<Arc<ApiState<S>>>,
    Path(name): Path<String>,
) -> Result<Json<MessageResponse>, ApiError>
where
    S: CountryStore + 'static,
{
    let affected = state
        .store
        .delete_by_key(&name.to_lowercase())
        .await
        .map_err(store_error_response)?;

    if affected == 0 {
        return Err(not_found("Country not found"));
    }

    Ok(Json(MessageResponse {
        message: "Country deleted".to_string(),
    }))
}

/// Refresh metadata.
async fn status_handler<S>(
    State(state): State<Arc<ApiState<S>>>,
) -> Result<Json<StatusResponse>, ApiError>
where
    S: CountryStore + 'static,
{
    let total_countries = state
        .store
        .get_meta(META_TOTAL_COUNTRIES)
        .await
        .map_err(store_error_response)?
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(0);

    let last_refreshed_at = state
        .store
        .get_meta(META_LAST_REFRESHED_AT)
        .await
        .map_err(store_error_response)?;

    Ok(Json(StatusResponse {
        total_countries,
        last_refreshed_at,
    }))
}

/// Serve the last generated summary image.
async fn image_handler<S>(
    State(state): State<Arc<ApiState<S>>>,
) -> Result<impl IntoResponse, ApiError>
where
    S: CountryStore + 'static,
{
    match tokio::fs::read(&state.image_path).await {
        Ok(bytes) => Ok(([(header::CONTENT_TYPE, "image/png")], bytes)),
        Err(_) => Err(not_found("Summary image not found")),
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn refresh_error_response(error: RefreshError) -> ApiError {
    match &error {
        RefreshError::SourceUnavailable { kind, .. } => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse {
                error: "External data source unavailable".to_string(),
                details: Some(format!("Could not fetch data from {}", kind)),
            }),
        ),
        RefreshError::Store(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Internal server error".to_string(),
                details: Some(e.to_string()),
            }),
        ),
    }
}

fn store_error_response(error: StoreError) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "Internal server error".to_string(),
            details: Some(error.to_string()),
        }),
    )
}

fn not_found(message: &str) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: message.to_string(),
            details: None,
        }),
    )
}
