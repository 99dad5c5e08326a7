//! Service error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while serving recommendations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The request itself is unusable (e.g. an empty title).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An HTTP request to an external source failed.
    #[error("HTTP error from {source_name}: {message}")]
    Http {
        source_name: String,
        message: String,
    },

    /// The external source refused the request (bad key, bad query).
    #[error("request rejected by {source_name}: HTTP {status}")]
    Rejected { source_name: String, status: u16 },

    /// The external source returned a rate-limit response.
    #[error("rate limited by {source_name}")]
    RateLimited { source_name: String },

    /// A response from an external source could not be parsed.
    #[error("parse error from {source_name}: {message}")]
    Parse {
        source_name: String,
        message: String,
    },

    /// An error propagated from `reqwest`.
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    /// A matrix artifact is absent and no download URL is configured.
    #[error("missing artifact {}: no download URL configured", .path.display())]
    MissingArtifact { path: PathBuf },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error from catalog or matrix handling.
    #[error(transparent)]
    Core(#[from] cinematch_core::Error),
}

impl EngineError {
    /// Returns `true` when the error is transient and the operation may
    /// succeed if retried.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http { .. } | Self::RateLimited { .. } => true,
            Self::Request(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// Returns `true` when the failure came from a remote collaborator
    /// rather than from local data or code.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::Http { .. }
                | Self::Rejected { .. }
                | Self::RateLimited { .. }
                | Self::Parse { .. }
                | Self::Request(_)
        )
    }

    /// Name of the remote collaborator behind an upstream failure.
    pub fn source_name(&self) -> Option<&str> {
        match self {
            Self::Http { source_name, .. }
            | Self::Rejected { source_name, .. }
            | Self::RateLimited { source_name }
            | Self::Parse { source_name, .. } => Some(source_name),
            Self::Request(_) => Some("upstream"),
            _ => None,
        }
    }
}

/// Convenience alias for service results.
pub type EngineResult<T> = std::result::Result<T, EngineError>;
