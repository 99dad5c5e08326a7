//! Recommendation endpoint
//!
//! `POST /recommend` takes `{"movie": "<title>"}` and answers with up to
//! five titles, each with an optional poster URL.

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use cinematch_engine::Recommendation;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult, MISSING_MOVIE, MOVIE_NOT_FOUND};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    #[serde(default)]
    pub movie: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecommendResponse {
    /// The title as the caller sent it.
    pub movie: String,
    pub recommendations: Vec<Recommendation>,
}

/// POST /recommend
pub async fn recommend(
    State(state): State<AppState>,
    payload: Result<Json<RecommendRequest>, JsonRejection>,
) -> ApiResult<Json<RecommendResponse>> {
    let Json(request) = payload.map_err(|rejection| {
        log::debug!("Rejected recommend body: {}", rejection);
        ApiError::BadRequest(rejection.body_text())
    })?;

    let movie = request
        .movie
        .filter(|movie| !movie.is_empty())
        .ok_or_else(|| ApiError::BadRequest(MISSING_MOVIE.to_string()))?;

    let recommendations = state.service.recommend(&movie).await?;
    if recommendations.is_empty() {
        log::info!("No recommendations for {:?}", movie);
        return Err(ApiError::NotFound(MOVIE_NOT_FOUND.to_string()));
    }

    Ok(Json(RecommendResponse {
        movie,
        recommendations,
    }))
}

pub fn recommend_routes() -> Router<AppState> {
    Router::new().route("/recommend", post(recommend))
}
