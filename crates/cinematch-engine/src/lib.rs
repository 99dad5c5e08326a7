//! Recommendation service for cinematch.
//!
//! Wires the core ensemble to its runtime collaborators: layered
//! configuration, artifact bootstrap, the poster lookup client, and the
//! single-flight caches that memoize results for the process lifetime.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod bootstrap;
pub mod cache;
pub mod config;
pub mod error;
pub mod poster;
pub mod resilience;
pub mod service;

pub use cache::SingleFlightCache;
pub use config::Config;
pub use error::{EngineError, EngineResult};
pub use poster::{NoPosters, PosterResolver, PosterSource, TmdbClient};
pub use service::{Recommendation, RecommendationService, ServiceOptions, ServiceStats};
