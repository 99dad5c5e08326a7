//! Poster lookup.
//!
//! The service only needs "title in, optional image URL out". The lookup
//! itself is a [`PosterSource`]; [`PosterResolver`] memoizes any source by
//! exact title so each display title is looked up at most once per
//! process, even under concurrent requests.

pub mod tmdb;

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;

use crate::cache::SingleFlightCache;
use crate::error::EngineResult;

pub use tmdb::TmdbClient;

/// Something that can find a poster image for a title.
#[async_trait]
pub trait PosterSource: Debug + Send + Sync {
    /// Short name used in logs and error messages.
    fn name(&self) -> &'static str;

    /// Look up the poster for `title`. `Ok(None)` means the source
    /// answered but has no poster.
    async fn fetch_poster(&self, title: &str) -> EngineResult<Option<String>>;
}

/// Source used when no poster service is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPosters;

#[async_trait]
impl PosterSource for NoPosters {
    fn name(&self) -> &'static str {
        "none"
    }

    async fn fetch_poster(&self, _title: &str) -> EngineResult<Option<String>> {
        Ok(None)
    }
}

/// Memoizing front for a [`PosterSource`].
#[derive(Debug)]
pub struct PosterResolver {
    source: Arc<dyn PosterSource>,
    cache: SingleFlightCache<Option<String>>,
}

impl PosterResolver {
    pub fn new(source: Arc<dyn PosterSource>) -> Self {
        Self {
            source,
            cache: SingleFlightCache::new(),
        }
    }

    /// Poster URL for `title`, keyed case-sensitively as given.
    ///
    /// Failures are returned to the caller and not cached.
    pub async fn resolve(&self, title: &str) -> EngineResult<Option<String>> {
        if let Some(hit) = self.cache.get(title) {
            log::debug!("Poster cache hit for {:?}", title);
            return Ok(hit);
        }

        self.cache
            .get_or_try_insert_with(title, || async {
                log::debug!("Looking up poster for {:?} via {}", title, self.source.name());
                self.source.fetch_poster(title).await
            })
            .await
    }

    /// Number of titles with a memoized answer (including "no poster").
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default)]
    struct CountingSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PosterSource for CountingSource {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn fetch_poster(&self, title: &str) -> EngineResult<Option<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if title == "Broken" {
                return Err(EngineError::Http {
                    source_name: "counting".to_string(),
                    message: "503".to_string(),
                });
            }
            Ok(Some(format!("https://img.test/{}.jpg", title.replace(' ', "_"))))
        }
    }

    #[tokio::test]
    async fn test_resolver_memoizes_by_exact_title() {
        let source = Arc::new(CountingSource::default());
        let resolver = PosterResolver::new(source.clone());

        let first = resolver.resolve("Blade Runner").await.unwrap();
        let second = resolver.resolve("Blade Runner").await.unwrap();
        assert_eq!(first, Some("https://img.test/Blade_Runner.jpg".to_string()));
        assert_eq!(first, second);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        // Different casing is a different key.
        resolver.resolve("blade runner").await.unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
        assert_eq!(resolver.cached(), 2);
    }

    #[tokio::test]
    async fn test_resolver_does_not_cache_failures() {
        let source = Arc::new(CountingSource::default());
        let resolver = PosterResolver::new(source.clone());

        assert!(resolver.resolve("Broken").await.is_err());
        assert!(resolver.resolve("Broken").await.is_err());
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
        assert_eq!(resolver.cached(), 0);
    }

    #[tokio::test]
    async fn test_no_posters_source() {
        let resolver = PosterResolver::new(Arc::new(NoPosters));
        assert_eq!(resolver.resolve("Heat").await.unwrap(), None);
        assert_eq!(resolver.source_name(), "none");
        assert_eq!(resolver.cached(), 1);
    }
}
