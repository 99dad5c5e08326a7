//! HTTP surface for cinematch.
//!
//! A thin axum layer over [`RecommendationService`]: request validation,
//! status mapping, a landing page, and a health probe. All recommendation
//! logic lives in the engine.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod api;
pub mod error;

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use cinematch_engine::RecommendationService;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

pub use error::{ApiError, ApiResult};

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub service: Arc<RecommendationService>,
    pub started: Instant,
}

impl AppState {
    pub fn new(service: Arc<RecommendationService>) -> Self {
        Self {
            service,
            started: Instant::now(),
        }
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::ui_routes())
        .merge(api::recommend_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve `state` on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        log::info!("Listening on http://{}", addr);
    }

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await
}
