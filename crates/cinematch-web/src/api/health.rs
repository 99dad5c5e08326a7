//! Health check endpoint

use axum::{extract::State, routing::get, Json, Router};
use cinematch_core::Model;
use serde::Serialize;

use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// Crate version from Cargo.toml
    pub version: &'static str,
    pub catalog_size: usize,
    pub models: Vec<Model>,
    pub cached_results: usize,
    pub uptime_seconds: u64,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let stats = state.service.stats();

    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        catalog_size: stats.catalog_size,
        models: stats.models,
        cached_results: stats.cached_results,
        uptime_seconds: state.started.elapsed().as_secs(),
    })
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
