//! notebook-core: research answer model, category-keyed history store (the notebooks),
//! research service and the caller-facing query interface.
//!
//! The gateway and the producer crate depend on this crate only through the re-exports below.

mod error;
mod history;
mod model;
mod query;
mod research;
mod shared;

// Configuration
pub use shared::{CoreConfig, DEFAULT_CORS_ORIGINS};

// Errors
pub use error::{BoxError, ErrorKind, ResearchError, StoreError};

// Records
pub use model::{ProducerOutput, ResearchAnswer};

// History store
pub use history::{HistoryEvent, HistoryLog, HistorySnapshot, HistoryStats, HistoryStore, SledHistoryLog};

// Research service
pub use research::{
    assign_category, AnswerProducer, ResearchService, DEFAULT_PRODUCER_TIMEOUT, FALLBACK_CATEGORY,
};

// Query interface
pub use query::{BoundaryError, QueryInterface, SubmissionState};
