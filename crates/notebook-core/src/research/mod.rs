//! Research service: validates a question, runs the answer producer under a deadline,
//! and appends the finished answer to the history store.

mod category;

pub use category::{assign_category, FALLBACK_CATEGORY};

use crate::error::{BoxError, ResearchError, StoreError};
use crate::history::HistoryStore;
use crate::model::{ProducerOutput, ResearchAnswer};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default upper bound on one producer call.
pub const DEFAULT_PRODUCER_TIMEOUT: Duration = Duration::from_secs(5);

/// Anything that can turn a question into a structured research answer.
#[async_trait::async_trait]
pub trait AnswerProducer: Send + Sync {
    /// Producer name for logs and error messages.
    fn name(&self) -> &str;

    /// Produces an answer for `question`. May be slow; may fail.
    async fn produce(&self, question: &str) -> Result<ProducerOutput, BoxError>;
}

/// Orchestrates one submission: validate, produce, stamp, append.
pub struct ResearchService {
    producer: Arc<dyn AnswerProducer>,
    store: Arc<HistoryStore>,
    timeout: Duration,
}

impl ResearchService {
    pub fn new(producer: Arc<dyn AnswerProducer>, store: Arc<HistoryStore>) -> Self {
        Self {
            producer,
            store,
            timeout: DEFAULT_PRODUCER_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn producer_name(&self) -> &str {
        self.producer.name()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Appends through the store. A persistent store flushes to disk, so that append
    /// runs on the blocking pool instead of the async worker.
    async fn append(&self, answer: ResearchAnswer) -> Result<Arc<ResearchAnswer>, ResearchError> {
        if !self.store.is_persistent() {
            return self.store.append(answer).map_err(ResearchError::StoreUnavailable);
        }
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || store.append(answer))
            .await
            .map_err(|e| ResearchError::StoreUnavailable(StoreError::Unavailable(e.to_string())))?
            .map_err(ResearchError::StoreUnavailable)
    }

    /// Runs one research request.
    ///
    /// Exactly one append on success, none on failure. The returned answer is
    /// already visible to `HistoryStore::read_all` when this returns.
    pub async fn submit(&self, question: &str) -> Result<Arc<ResearchAnswer>, ResearchError> {
        if question.trim().is_empty() {
            tracing::warn!(target: "notebook::research", "Rejected empty question");
            return Err(ResearchError::InvalidInput);
        }

        let producer = self.producer.name().to_string();
        tracing::info!(
            target: "notebook::research",
            producer = %producer,
            question_len = question.len(),
            timeout_ms = self.timeout.as_millis() as u64,
            "Research started"
        );

        let started = Instant::now();
        // On timeout the producer future is dropped here, so it can never reach the append below.
        let output = match tokio::time::timeout(self.timeout, self.producer.produce(question)).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                tracing::error!(
                    target: "notebook::research",
                    producer = %producer,
                    error = %e,
                    "Answer producer failed"
                );
                return Err(ResearchError::ProducerFailure {
                    producer,
                    message: e.to_string(),
                });
            }
            Err(_) => {
                tracing::error!(
                    target: "notebook::research",
                    producer = %producer,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Answer producer timed out"
                );
                return Err(ResearchError::ProducerTimeout {
                    producer,
                    timeout_ms: self.timeout.as_millis(),
                });
            }
        };

        let category = assign_category(output.category.as_deref());
        let answer = ResearchAnswer::from_output(question, output, category);
        let stored = self.append(answer).await?;

        tracing::info!(
            target: "notebook::research",
            producer = %producer,
            category = %stored.category,
            findings = stored.findings.len(),
            sources = stored.sources.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Research completed"
        );
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::history::HistoryLog;

    /// Producer returning a fixed output, or an error when there is none.
    struct FixedProducer {
        output: Option<ProducerOutput>,
        delay: Option<Duration>,
    }

    #[async_trait::async_trait]
    impl AnswerProducer for FixedProducer {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn produce(&self, _question: &str) -> Result<ProducerOutput, BoxError> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.output.clone().ok_or_else(|| "search backend unreachable".into())
        }
    }

    struct BrokenLog;

    impl HistoryLog for BrokenLog {
        fn name(&self) -> &str {
            "broken"
        }
        fn record(&self, _answer: &ResearchAnswer) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("disk write failed".into()))
        }
        fn load(&self) -> Result<Vec<ResearchAnswer>, StoreError> {
            Ok(Vec::new())
        }
        fn clear(&self) -> Result<(), StoreError> {
            Ok(())
        }
    }

    fn science_output() -> ProducerOutput {
        ProducerOutput::new("Entangled particles share state.")
            .with_findings(["f1", "f2"])
            .with_sources(["s1"])
            .with_category("science")
    }

    fn service(output: Option<ProducerOutput>) -> (ResearchService, Arc<HistoryStore>) {
        let store = Arc::new(HistoryStore::in_memory());
        let producer = Arc::new(FixedProducer { output, delay: None });
        (ResearchService::new(producer, Arc::clone(&store)), store)
    }

    #[tokio::test]
    async fn submitted_answer_is_readable_under_its_category() {
        let (svc, store) = service(Some(science_output()));
        let answer = svc.submit("What is quantum entanglement?").await.unwrap();
        assert_eq!(answer.category, "science");
        assert_eq!(answer.findings, vec!["f1", "f2"]);

        let snapshot = store.read_all();
        let science = snapshot.get("science").unwrap();
        assert_eq!(science.len(), 1);
        assert_eq!(science[0].question, "What is quantum entanglement?");
        assert_eq!(science[0].id, answer.id);
    }

    #[tokio::test]
    async fn whitespace_question_is_invalid_and_changes_nothing() {
        let (svc, store) = service(Some(science_output()));
        let err = svc.submit("   ").await.unwrap_err();
        assert!(matches!(err, ResearchError::InvalidInput));
        assert!(store.read_all().is_empty());
    }

    #[tokio::test]
    async fn producer_failure_leaves_history_identical() {
        let (ok_svc, store) = service(Some(science_output()));
        ok_svc.submit("seed question").await.unwrap();
        let before = serde_json::to_string(&store.read_all()).unwrap();

        let failing = ResearchService::new(
            Arc::new(FixedProducer { output: None, delay: None }),
            Arc::clone(&store),
        );
        let err = failing.submit("unanswerable").await.unwrap_err();
        match err {
            ResearchError::ProducerFailure { producer, message } => {
                assert_eq!(producer, "fixed");
                assert!(message.contains("unreachable"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(serde_json::to_string(&store.read_all()).unwrap(), before);
    }

    #[tokio::test]
    async fn hung_producer_times_out_without_appending() {
        let store = Arc::new(HistoryStore::in_memory());
        let svc = ResearchService::new(
            Arc::new(FixedProducer {
                output: Some(science_output()),
                delay: Some(Duration::from_secs(30)),
            }),
            Arc::clone(&store),
        )
        .with_timeout(Duration::from_millis(20));

        let err = svc.submit("unanswerable").await.unwrap_err();
        assert!(matches!(err, ResearchError::ProducerTimeout { .. }));
        assert_eq!(err.kind(), crate::error::ErrorKind::ProducerFailure);
        assert!(store.read_all().is_empty());
    }

    #[tokio::test]
    async fn missing_category_falls_back() {
        let (svc, store) = service(Some(ProducerOutput::new("no label")));
        let answer = svc.submit("Anything?").await.unwrap();
        assert_eq!(answer.category, FALLBACK_CATEGORY);
        assert!(store.read_all().get(FALLBACK_CATEGORY).is_some());
    }

    #[tokio::test]
    async fn sequential_same_category_submissions_keep_order() {
        let (svc, store) = service(Some(science_output()));
        let first = svc.submit("first").await.unwrap();
        let second = svc.submit("second").await.unwrap();
        assert_ne!(first.id, second.id);

        let science = store.read_category("science").unwrap();
        assert_eq!(science.len(), 2);
        assert_eq!(science[0].question, "second");
        assert_eq!(science[1].question, "first");
    }

    #[tokio::test]
    async fn store_failure_is_distinct_from_producer_failure() {
        let store = Arc::new(HistoryStore::with_log(Arc::new(BrokenLog)).unwrap());
        let svc = ResearchService::new(
            Arc::new(FixedProducer {
                output: Some(science_output()),
                delay: None,
            }),
            Arc::clone(&store),
        );
        let err = svc.submit("What is quantum entanglement?").await.unwrap_err();
        assert!(matches!(err, ResearchError::StoreUnavailable(_)));
        assert!(store.read_all().is_empty());
    }

    #[tokio::test]
    async fn question_is_stored_untrimmed() {
        let (svc, _store) = service(Some(science_output()));
        let answer = svc.submit("  padded?  ").await.unwrap();
        assert_eq!(answer.question, "  padded?  ");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn persistent_submissions_reach_disk_in_order() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = Arc::new(HistoryStore::open_path(dir.path()).unwrap());
            let svc = ResearchService::new(
                Arc::new(FixedProducer {
                    output: Some(science_output()),
                    delay: None,
                }),
                Arc::clone(&store),
            );
            svc.submit("first").await.unwrap();
            let second = svc.submit("second").await.unwrap();
            assert_eq!(store.read_category("science").unwrap()[0].id, second.id);
        }

        let reopened = HistoryStore::open_path(dir.path()).unwrap();
        let questions: Vec<String> = reopened
            .read_category("science")
            .unwrap()
            .iter()
            .map(|a| a.question.clone())
            .collect();
        assert_eq!(questions, vec!["second", "first"]);
    }
}
