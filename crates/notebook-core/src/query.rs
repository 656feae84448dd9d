//! Query interface: the two caller-facing operations (submit a question, fetch history)
//! plus the notebook housekeeping the gateway exposes.

use crate::error::{ErrorKind, ResearchError, StoreError};
use crate::history::{HistorySnapshot, HistoryStats, HistoryStore};
use crate::model::ResearchAnswer;
use crate::research::ResearchService;
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Lifecycle of one submission. No automatic retries; a failed submission stays failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionState {
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

impl SubmissionState {
    /// `Idle -> Submitting`. Any other state is returned unchanged.
    pub fn begin(self) -> Self {
        match self {
            Self::Idle => Self::Submitting,
            other => other,
        }
    }

    /// `Submitting -> Succeeded | Failed`. Any other state is returned unchanged.
    pub fn finish(self, ok: bool) -> Self {
        match (self, ok) {
            (Self::Submitting, true) => Self::Succeeded,
            (Self::Submitting, false) => Self::Failed,
            (other, _) => other,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

/// Error as shown to a boundary caller: a kind, an HTTP-style status, and a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoundaryError {
    pub kind: ErrorKind,
    pub status: u16,
    pub message: String,
}

impl From<ResearchError> for BoundaryError {
    fn from(err: ResearchError) -> Self {
        let status = match &err {
            ResearchError::InvalidInput => 400,
            ResearchError::ProducerFailure { .. } => 502,
            ResearchError::ProducerTimeout { .. } => 504,
            ResearchError::StoreUnavailable(_) => 503,
        };
        Self {
            kind: err.kind(),
            status,
            message: err.to_string(),
        }
    }
}

impl From<StoreError> for BoundaryError {
    fn from(err: StoreError) -> Self {
        Self {
            kind: ErrorKind::StoreUnavailable,
            status: 503,
            message: err.to_string(),
        }
    }
}

impl std::fmt::Display for BoundaryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.status)
    }
}

impl std::error::Error for BoundaryError {}

/// Counts a submission as in flight until dropped, including when the caller abandons it.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Caller-facing facade over the research service and the history store.
pub struct QueryInterface {
    service: Arc<ResearchService>,
    store: Arc<HistoryStore>,
    in_flight: AtomicUsize,
}

impl QueryInterface {
    pub fn new(service: Arc<ResearchService>, store: Arc<HistoryStore>) -> Self {
        Self {
            service,
            store,
            in_flight: AtomicUsize::new(0),
        }
    }

    /// Submits a question and maps internal failures to boundary errors.
    pub async fn submit_question(&self, question: &str) -> Result<Arc<ResearchAnswer>, BoundaryError> {
        let state = SubmissionState::Idle.begin();
        let guard = InFlight::enter(&self.in_flight);
        tracing::debug!(target: "notebook::query", ?state, "Submission started");

        let result = self.service.submit(question).await;
        drop(guard);

        let state = state.finish(result.is_ok());
        match result {
            Ok(answer) => {
                tracing::debug!(target: "notebook::query", ?state, id = %answer.id, "Submission finished");
                Ok(answer)
            }
            Err(e) => {
                let err = BoundaryError::from(e);
                tracing::warn!(
                    target: "notebook::query",
                    ?state,
                    kind = ?err.kind,
                    status = err.status,
                    "Submission failed: {}",
                    err.message
                );
                Err(err)
            }
        }
    }

    /// Full history snapshot: category -> answers, newest first.
    pub fn fetch_history(&self) -> HistorySnapshot {
        self.store.read_all()
    }

    /// One notebook, newest first, or `None` if the category has no entries.
    pub fn fetch_notebook(&self, category: &str) -> Option<Vec<Arc<ResearchAnswer>>> {
        self.store.read_category(category)
    }

    pub fn history_stats(&self) -> HistoryStats {
        self.store.stats()
    }

    /// Drops every notebook. Returns the number of removed entries.
    pub fn clear_history(&self) -> Result<usize, BoundaryError> {
        self.store.clear().map_err(BoundaryError::from)
    }

    /// Submissions currently in `Submitting`.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn service(&self) -> &ResearchService {
        &self.service
    }

    pub fn store(&self) -> &Arc<HistoryStore> {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoxError;
    use crate::model::ProducerOutput;
    use crate::research::AnswerProducer;

    struct EchoProducer;

    #[async_trait::async_trait]
    impl AnswerProducer for EchoProducer {
        fn name(&self) -> &str {
            "echo"
        }

        async fn produce(&self, question: &str) -> Result<ProducerOutput, BoxError> {
            if question.contains("unanswerable") {
                return Err("no sources found".into());
            }
            Ok(ProducerOutput::new(format!("About {}", question)).with_category("science"))
        }
    }

    fn interface() -> QueryInterface {
        let store = Arc::new(HistoryStore::in_memory());
        let service = Arc::new(ResearchService::new(Arc::new(EchoProducer), Arc::clone(&store)));
        QueryInterface::new(service, store)
    }

    #[test]
    fn state_machine_transitions() {
        let s = SubmissionState::Idle.begin();
        assert_eq!(s, SubmissionState::Submitting);
        assert_eq!(s.finish(true), SubmissionState::Succeeded);
        assert_eq!(s.finish(false), SubmissionState::Failed);
        assert!(s.finish(false).is_terminal());
        // Terminal states do not restart on their own.
        assert_eq!(SubmissionState::Failed.begin(), SubmissionState::Failed);
        assert_eq!(SubmissionState::Idle.finish(true), SubmissionState::Idle);
    }

    #[tokio::test]
    async fn submit_then_fetch_sees_the_answer() {
        let qi = interface();
        let answer = qi.submit_question("Why is the sky blue?").await.unwrap();
        let history = qi.fetch_history();
        let bucket = history.get(&answer.category).unwrap();
        assert!(bucket.iter().any(|a| a.question == "Why is the sky blue?"));
        assert_eq!(qi.in_flight(), 0);
    }

    #[tokio::test]
    async fn errors_map_to_boundary_statuses() {
        let qi = interface();
        let invalid = qi.submit_question("").await.unwrap_err();
        assert_eq!(invalid.kind, ErrorKind::InvalidInput);
        assert_eq!(invalid.status, 400);

        let failed = qi.submit_question("unanswerable").await.unwrap_err();
        assert_eq!(failed.kind, ErrorKind::ProducerFailure);
        assert_eq!(failed.status, 502);
        assert!(failed.message.contains("no sources found"));

        assert!(qi.fetch_history().is_empty());
        assert_eq!(qi.in_flight(), 0);
    }

    #[test]
    fn store_errors_map_to_503() {
        let err = BoundaryError::from(StoreError::Unavailable("locked".into()));
        assert_eq!(err.status, 503);
        assert_eq!(err.kind, ErrorKind::StoreUnavailable);
    }

    #[tokio::test]
    async fn clear_history_empties_notebooks() {
        let qi = interface();
        qi.submit_question("one").await.unwrap();
        qi.submit_question("two").await.unwrap();
        assert_eq!(qi.history_stats().total_entries, 2);
        assert_eq!(qi.clear_history().unwrap(), 2);
        assert!(qi.fetch_notebook("science").is_none());
    }
}
