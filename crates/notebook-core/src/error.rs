//! Error types for the history store, the research service and the query boundary.

use thiserror::Error;

/// Boxed error returned by answer producers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// History store failure.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The persistence layer could not complete the operation.
    #[error("history store unavailable: {0}")]
    Unavailable(String),

    /// Appends must carry a category.
    #[error("answer has an empty category")]
    EmptyCategory,

    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failure of a single research submission.
#[derive(Error, Debug)]
pub enum ResearchError {
    /// Empty or whitespace-only question; rejected before the producer runs.
    #[error("Question is required")]
    InvalidInput,

    /// The producer errored or returned an unusable shape. Nothing was stored.
    #[error("answer producer '{producer}' failed: {message}")]
    ProducerFailure { producer: String, message: String },

    /// The producer did not answer in time. Nothing was stored.
    #[error("answer producer '{producer}' timed out after {timeout_ms} ms")]
    ProducerTimeout { producer: String, timeout_ms: u128 },

    /// The answer was computed but could not be saved.
    #[error("answer computed but not saved: {0}")]
    StoreUnavailable(#[source] StoreError),
}

/// Boundary-facing error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidInput,
    ProducerFailure,
    StoreUnavailable,
}

impl ResearchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput => ErrorKind::InvalidInput,
            Self::ProducerFailure { .. } | Self::ProducerTimeout { .. } => ErrorKind::ProducerFailure,
            Self::StoreUnavailable(_) => ErrorKind::StoreUnavailable,
        }
    }
}
