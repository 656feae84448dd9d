//! Category-keyed research history (the notebooks).
//!
//! ## Layout
//!
//! | Piece            | Role                                                        |
//! |------------------|-------------------------------------------------------------|
//! | `HistoryStore`   | In-memory buckets, one per category, newest entry first     |
//! | `HistoryLog`     | Optional write-through persistence behind the buckets       |
//! | `SledHistoryLog` | Sled implementation: one tree per category                  |
//! | `HistoryEvent`   | Push feed of appends/clears for UIs that would otherwise poll |

mod sled_log;
mod store;

pub use sled_log::SledHistoryLog;
pub use store::{HistorySnapshot, HistoryStats, HistoryStore};

use crate::error::StoreError;
use crate::model::ResearchAnswer;
use serde::Serialize;
use std::sync::Arc;

/// Durable backing for the history store.
///
/// `record` is called while the category's bucket is locked, so records for one
/// category reach the log in the same order they reach memory.
pub trait HistoryLog: Send + Sync {
    /// Human-readable backend name for logs.
    fn name(&self) -> &str;

    /// Durably records one answer. An error means nothing was recorded.
    fn record(&self, answer: &ResearchAnswer) -> Result<(), StoreError>;

    /// Returns every recorded answer, oldest first within each category.
    fn load(&self) -> Result<Vec<ResearchAnswer>, StoreError>;

    /// Removes every recorded answer.
    fn clear(&self) -> Result<(), StoreError>;
}

/// Change notification published by the store after a mutation completes.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HistoryEvent {
    Appended { answer: Arc<ResearchAnswer> },
    Cleared { removed: usize },
}
