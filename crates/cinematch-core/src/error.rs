use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("matrix decode error: {0}")]
    Bincode(#[from] bincode::Error),

    #[error("not found in catalog: {title}")]
    NotFound { title: String },

    #[error("duplicate catalog title {title:?} at rows {first} and {duplicate}")]
    DuplicateTitle {
        title: String,
        first: usize,
        duplicate: usize,
    },

    #[error("catalog source has no '{0}' column")]
    MissingColumn(&'static str),

    #[error("index {index} out of range for {len} items")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("invalid data: {0}")]
    InvalidData(String),
}

impl Error {
    /// Returns `true` when the error means the queried title is unknown.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
