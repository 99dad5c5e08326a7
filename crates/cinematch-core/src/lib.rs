//! Core recommendation model for cinematch.
//!
//! This crate defines the title catalog, the per-model similarity
//! matrices aligned to it, per-model top-K ranking, and the majority-vote
//! ensemble that combines the rankings into a single list.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod catalog;
pub mod error;
pub mod matrix;
pub mod rank;
pub mod vote;

pub use catalog::{display_title, normalize_title, Catalog, CatalogEntry, DuplicatePolicy};
pub use error::{Error, Result};
pub use matrix::{Model, SimilarityMatrix, SimilarityMatrixSet};
pub use rank::{top_k, Candidate, SelfExclusion};
pub use vote::{Ensemble, EnsembleOptions, EnsembleOutcome, ModelRanking, VoteTally};
