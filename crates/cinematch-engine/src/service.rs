//! The recommendation service.
//!
//! Holds the immutable catalog and matrices, runs the ensemble for a
//! query, enriches the winners with posters, and memoizes the final list
//! per normalized title. One instance is shared by every request.

use std::sync::Arc;

use cinematch_core::{
    normalize_title, Catalog, DuplicatePolicy, Ensemble, EnsembleOptions, EnsembleOutcome, Model,
    SelfExclusion, SimilarityMatrixSet,
};
use serde::{Deserialize, Serialize};

use crate::bootstrap::ArtifactFetcher;
use crate::cache::SingleFlightCache;
use crate::config::Config;
use crate::error::{EngineError, EngineResult};
use crate::poster::{NoPosters, PosterResolver, PosterSource, TmdbClient};

/// One recommended title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Title-cased display title.
    pub title: String,
    pub poster_url: Option<String>,
}

/// Ranking knobs for the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceOptions {
    pub top_k: usize,
    pub self_exclusion: SelfExclusion,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            top_k: cinematch_core::vote::DEFAULT_TOP_K,
            self_exclusion: SelfExclusion::default(),
        }
    }
}

impl From<&Config> for ServiceOptions {
    fn from(config: &Config) -> Self {
        Self {
            top_k: config.top_k,
            self_exclusion: config.self_exclusion,
        }
    }
}

/// Point-in-time counters for health and status output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceStats {
    pub catalog_size: usize,
    pub models: Vec<Model>,
    pub cached_results: usize,
    pub cached_posters: usize,
    pub poster_source: &'static str,
}

/// Ensemble recommender with result and poster memoization.
#[derive(Debug)]
pub struct RecommendationService {
    catalog: Catalog,
    matrices: SimilarityMatrixSet,
    posters: PosterResolver,
    results: SingleFlightCache<Vec<Recommendation>>,
    options: ServiceOptions,
}

impl RecommendationService {
    /// Assemble a service from already-loaded parts.
    ///
    /// # Errors
    ///
    /// Fails when the matrices do not cover exactly the catalog's titles.
    pub fn new(
        catalog: Catalog,
        matrices: SimilarityMatrixSet,
        poster_source: Arc<dyn PosterSource>,
        options: ServiceOptions,
    ) -> EngineResult<Self> {
        matrices.ensure_matches(&catalog)?;

        Ok(Self {
            catalog,
            matrices,
            posters: PosterResolver::new(poster_source),
            results: SingleFlightCache::new(),
            options,
        })
    }

    /// Start the service from configuration.
    ///
    /// Downloads missing artifacts, loads the catalog and every model's
    /// matrix, checks they line up, and picks the poster source.
    pub async fn start(config: &Config) -> EngineResult<Self> {
        let fetcher = ArtifactFetcher::new(config.retry_max_attempts)?;
        let downloaded = fetcher.ensure_all(config).await?;
        if !downloaded.is_empty() {
            log::info!("Bootstrapped {} artifact(s)", downloaded.len());
        }

        let policy = if config.strict_catalog {
            DuplicatePolicy::Reject
        } else {
            DuplicatePolicy::KeepFirst
        };

        let catalog_path = config.catalog_path();
        let data_dir = config.data_dir.clone();
        let (catalog, matrices) = tokio::task::spawn_blocking(move || {
            let catalog = Catalog::load_csv(&catalog_path, policy)?;
            let matrices = SimilarityMatrixSet::load_dir(&data_dir)?;
            Ok::<_, cinematch_core::Error>((catalog, matrices))
        })
        .await
        .map_err(|e| EngineError::Io(std::io::Error::other(e)))??;

        let poster_source: Arc<dyn PosterSource> = match TmdbClient::from_config(config)? {
            Some(client) => Arc::new(client),
            None => {
                log::warn!("No TMDb API key configured; posters will be null");
                Arc::new(NoPosters)
            }
        };

        let service = Self::new(catalog, matrices, poster_source, ServiceOptions::from(config))?;
        log::info!(
            "Recommendation service ready: {} titles, models [{}]",
            service.catalog.len(),
            service
                .matrices
                .models()
                .into_iter()
                .map(Model::name)
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(service)
    }

    /// Recommend up to `top_k` titles similar to `title`.
    ///
    /// Unknown titles yield an empty list. Known titles are computed once
    /// per normalized title; concurrent identical queries share that one
    /// computation. Poster lookup failures propagate and leave nothing
    /// cached for the query.
    pub async fn recommend(&self, title: &str) -> EngineResult<Vec<Recommendation>> {
        if title.is_empty() {
            return Err(EngineError::InvalidInput("title must not be empty".to_string()));
        }

        let key = normalize_title(title);
        if let Some(hit) = self.results.get(&key) {
            log::debug!("Result cache hit for {:?}", key);
            return Ok(hit);
        }

        let index = match self.catalog.resolve(&key) {
            Ok(index) => index,
            Err(e) if e.is_not_found() => {
                log::debug!("Title not in catalog: {:?}", key);
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        self.results
            .get_or_try_insert_with(&key, || self.compute(index))
            .await
    }

    /// Run the ensemble for `title` without posters or caching.
    ///
    /// Returns `None` for unknown titles.
    pub fn explain(&self, title: &str) -> EngineResult<Option<EnsembleOutcome>> {
        match self.ensemble().run(title) {
            Ok(outcome) => Ok(Some(outcome)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn stats(&self) -> ServiceStats {
        ServiceStats {
            catalog_size: self.catalog.len(),
            models: self.matrices.models(),
            cached_results: self.results.len(),
            cached_posters: self.posters.cached(),
            poster_source: self.posters.source_name(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Log final statistics. Caches live only as long as the process.
    pub fn shutdown(&self) {
        let stats = self.stats();
        log::info!(
            "Shutting down: {} cached results, {} cached posters",
            stats.cached_results,
            stats.cached_posters
        );
    }

    async fn compute(&self, index: usize) -> EngineResult<Vec<Recommendation>> {
        let outcome = self.ensemble().run_index(index)?;
        log::debug!(
            "Ensemble for item {}: {} candidates, winners {:?}",
            index,
            outcome.tally.len(),
            outcome.winners
        );

        let mut recommendations = Vec::with_capacity(outcome.winners.len());
        for (title, _votes) in outcome.winners {
            let poster_url = self.posters.resolve(&title).await?;
            recommendations.push(Recommendation { title, poster_url });
        }
        Ok(recommendations)
    }

    fn ensemble(&self) -> Ensemble<'_> {
        Ensemble::new(
            &self.catalog,
            &self.matrices,
            EnsembleOptions {
                per_model_k: self.options.top_k,
                final_k: self.options.top_k,
                exclusion: self.options.self_exclusion,
            },
        )
    }
}
