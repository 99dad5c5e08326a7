//! TMDb poster source.
//!
//! Searches The Movie Database by free-text title and takes the poster of
//! the first result. Transient failures (5xx, timeouts, 429) are retried
//! with exponential backoff; anything else is returned as-is.

use std::time::Duration;

use async_trait::async_trait;
use backon::Retryable;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::config::Config;
use crate::error::{EngineError, EngineResult};
use crate::poster::PosterSource;
use crate::resilience::{retry_policy, RateLimiter};

const SOURCE_NAME: &str = "TMDb";

// ---------------------------------------------------------------------------
// API response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<TmdbMovie>,
}

/// A single movie search hit.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovie {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    /// Image path relative to the image base, e.g. `/abc123.jpg`.
    #[serde(default)]
    pub poster_path: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// TMDb API client.
#[derive(Debug, Clone)]
pub struct TmdbClient {
    http: Client,
    api_key: String,
    api_base: String,
    image_base: String,
    rate_limiter: RateLimiter,
    max_attempts: usize,
}

impl TmdbClient {
    /// Create a client against `api_base` (e.g. `https://api.themoviedb.org/3`).
    pub fn new(
        api_key: String,
        api_base: impl Into<String>,
        image_base: impl Into<String>,
        requests_per_second: u32,
        max_attempts: usize,
    ) -> EngineResult<Self> {
        let http = Client::builder()
            .user_agent(concat!("cinematch/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http,
            api_key,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            image_base: image_base.into().trim_end_matches('/').to_string(),
            rate_limiter: RateLimiter::new(requests_per_second),
            max_attempts,
        })
    }

    /// Build a client from configuration, or `None` when no API key is set.
    pub fn from_config(config: &Config) -> EngineResult<Option<Self>> {
        config
            .tmdb_api_key
            .as_ref()
            .filter(|key| !key.is_empty())
            .map(|key| {
                Self::new(
                    key.clone(),
                    config.tmdb_api_base.as_str(),
                    config.tmdb_image_base.as_str(),
                    config.poster_requests_per_second,
                    config.retry_max_attempts,
                )
            })
            .transpose()
    }

    /// Search movies by free-text title. One attempt, no retry.
    pub async fn search_movie(&self, query: &str) -> EngineResult<Vec<TmdbMovie>> {
        self.rate_limiter.acquire().await;

        let response = self
            .http
            .get(format!("{}/search/movie", self.api_base))
            .query(&[("api_key", self.api_key.as_str()), ("query", query)])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(EngineError::RateLimited {
                source_name: SOURCE_NAME.to_string(),
            });
        }
        if status.is_client_error() {
            return Err(EngineError::Rejected {
                source_name: SOURCE_NAME.to_string(),
                status: status.as_u16(),
            });
        }

        let response = response.error_for_status().map_err(|e| EngineError::Http {
            source_name: SOURCE_NAME.to_string(),
            message: e.to_string(),
        })?;

        let result: SearchResponse = response.json().await.map_err(|e| EngineError::Parse {
            source_name: SOURCE_NAME.to_string(),
            message: e.to_string(),
        })?;

        Ok(result.results)
    }

    fn poster_url(&self, poster_path: &str) -> String {
        format!("{}{}", self.image_base, poster_path)
    }
}

#[async_trait]
impl PosterSource for TmdbClient {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    async fn fetch_poster(&self, title: &str) -> EngineResult<Option<String>> {
        let results = (|| self.search_movie(title))
            .retry(retry_policy(self.max_attempts))
            .when(EngineError::is_transient)
            .notify(|e: &EngineError, after: Duration| {
                log::warn!("TMDb lookup for {:?} failed ({}), retrying in {:?}", title, e, after);
            })
            .await?;

        Ok(results
            .first()
            .and_then(|movie| movie.poster_path.as_deref())
            .filter(|path| !path.is_empty())
            .map(|path| self.poster_url(path)))
    }
}
