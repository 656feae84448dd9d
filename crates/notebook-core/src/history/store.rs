//! In-memory history buckets with optional write-through persistence.
//!
//! Buckets live in a `DashMap` keyed by category. An append holds its category's
//! entry guard across the log write and the in-memory push, so appends to one
//! category are serialized while other categories proceed.
//!
//! Appends share the store gate; reads and `clear` take it exclusively. A read
//! therefore waits for in-progress appends and sees the whole store as of one
//! instant, never a mix of shards visited before and after a later append.

use super::{HistoryEvent, HistoryLog, SledHistoryLog};
use crate::error::StoreError;
use crate::model::ResearchAnswer;
use dashmap::DashMap;
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::broadcast;

const EVENT_CAPACITY: usize = 256;

/// Point-in-time copy of every notebook: category -> answers, newest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct HistorySnapshot(BTreeMap<String, Vec<Arc<ResearchAnswer>>>);

impl HistorySnapshot {
    /// Answers in `category`, newest first.
    pub fn get(&self, category: &str) -> Option<&[Arc<ResearchAnswer>]> {
        self.0.get(category).map(Vec::as_slice)
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn total_entries(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> BTreeMap<String, Vec<Arc<ResearchAnswer>>> {
        self.0
    }
}

/// Entry counts per notebook.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HistoryStats {
    pub total_entries: usize,
    pub categories: BTreeMap<String, usize>,
}

/// Category-keyed, append-ordered store of research answers.
pub struct HistoryStore {
    buckets: DashMap<String, VecDeque<Arc<ResearchAnswer>>>,
    log: Option<Arc<dyn HistoryLog>>,
    events: broadcast::Sender<HistoryEvent>,
    /// Shared by appends; exclusive for snapshot reads and `clear`.
    gate: RwLock<()>,
}

impl HistoryStore {
    /// Process-lifetime store with no persistence.
    pub fn in_memory() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            buckets: DashMap::new(),
            log: None,
            events,
            gate: RwLock::new(()),
        }
    }

    /// Opens or creates a Sled-backed store at `path` and replays existing notebooks.
    pub fn open_path<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let log = SledHistoryLog::open_path(path)?;
        Self::with_log(Arc::new(log))
    }

    /// Store that writes through to `log`. Recorded answers are loaded first.
    pub fn with_log(log: Arc<dyn HistoryLog>) -> Result<Self, StoreError> {
        let mut store = Self::in_memory();
        let restored = store.replay(log.as_ref())?;
        tracing::info!(
            target: "notebook::history",
            backend = log.name(),
            restored,
            notebooks = store.buckets.len(),
            "History store opened ({} entries restored)",
            restored
        );
        store.log = Some(log);
        Ok(store)
    }

    /// Replaces the buckets with the log's contents. Returns the number of entries loaded.
    fn replay(&self, log: &dyn HistoryLog) -> Result<usize, StoreError> {
        let existing = log.load()?;
        let restored = existing.len();
        self.buckets.clear();
        for answer in existing {
            self.buckets
                .entry(answer.category.clone())
                .or_default()
                .push_front(Arc::new(answer));
        }
        Ok(restored)
    }

    /// Appends `answer` to its category bucket, creating the bucket if needed.
    ///
    /// With a persistence log configured the record is written there first; a
    /// log failure fails this append only and leaves every bucket untouched.
    pub fn append(&self, answer: ResearchAnswer) -> Result<Arc<ResearchAnswer>, StoreError> {
        if answer.category.trim().is_empty() {
            return Err(StoreError::EmptyCategory);
        }
        let _gate = self.gate.read().unwrap_or_else(PoisonError::into_inner);
        let answer = Arc::new(answer);
        let category = answer.category.clone();

        let mut bucket = self.buckets.entry(category.clone()).or_default();
        if let Some(log) = &self.log {
            if let Err(e) = log.record(&answer) {
                let fresh = bucket.is_empty();
                drop(bucket);
                if fresh {
                    self.buckets.remove_if(&category, |_, b| b.is_empty());
                }
                tracing::warn!(
                    target: "notebook::history",
                    category = %category,
                    backend = log.name(),
                    error = %e,
                    "Append failed; history left unchanged"
                );
                return Err(e);
            }
        }
        bucket.push_front(Arc::clone(&answer));
        let bucket_len = bucket.len();
        drop(bucket);

        tracing::info!(
            target: "notebook::history",
            category = %category,
            entries = bucket_len,
            id = %answer.id,
            "Notebook '{}' appended ({} entries)",
            category,
            bucket_len
        );
        let _ = self.events.send(HistoryEvent::Appended {
            answer: Arc::clone(&answer),
        });
        Ok(answer)
    }

    /// Consistent snapshot of every notebook. Empty when there is no history.
    pub fn read_all(&self) -> HistorySnapshot {
        let _gate = self.gate.write().unwrap_or_else(PoisonError::into_inner);
        let map = self
            .buckets
            .iter()
            .filter(|entry| !entry.value().is_empty())
            .map(|entry| (entry.key().clone(), entry.value().iter().cloned().collect()))
            .collect();
        HistorySnapshot(map)
    }

    /// Snapshot of a single notebook, newest first.
    pub fn read_category(&self, category: &str) -> Option<Vec<Arc<ResearchAnswer>>> {
        let _gate = self.gate.write().unwrap_or_else(PoisonError::into_inner);
        self.buckets
            .get(category)
            .filter(|bucket| !bucket.is_empty())
            .map(|bucket| bucket.iter().cloned().collect())
    }

    pub fn stats(&self) -> HistoryStats {
        let _gate = self.gate.write().unwrap_or_else(PoisonError::into_inner);
        let categories: BTreeMap<String, usize> = self
            .buckets
            .iter()
            .filter(|entry| !entry.value().is_empty())
            .map(|entry| (entry.key().clone(), entry.value().len()))
            .collect();
        HistoryStats {
            total_entries: categories.values().sum(),
            categories,
        }
    }

    /// Removes every notebook (memory and log). Returns how many entries were dropped.
    ///
    /// If the log fails partway, memory is reloaded from whatever the log still
    /// holds, so the notebooks shown match the ones a restart would restore.
    pub fn clear(&self) -> Result<usize, StoreError> {
        let _gate = self.gate.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(log) = &self.log {
            if let Err(e) = log.clear() {
                match self.replay(log.as_ref()) {
                    Ok(remaining) => tracing::warn!(
                        target: "notebook::history",
                        backend = log.name(),
                        remaining,
                        error = %e,
                        "Clear failed; notebooks resynced from log"
                    ),
                    Err(reload) => tracing::error!(
                        target: "notebook::history",
                        backend = log.name(),
                        error = %e,
                        reload_error = %reload,
                        "Clear failed and log reload failed; memory may diverge from log"
                    ),
                }
                return Err(e);
            }
        }
        let removed: usize = self.buckets.iter().map(|entry| entry.value().len()).sum();
        self.buckets.clear();
        tracing::info!(target: "notebook::history", removed, "History cleared");
        let _ = self.events.send(HistoryEvent::Cleared { removed });
        Ok(removed)
    }

    /// Subscribes to append/clear notifications. Slow receivers may lag and skip events.
    pub fn subscribe(&self) -> broadcast::Receiver<HistoryEvent> {
        self.events.subscribe()
    }

    /// True when appends are written through to a log.
    pub fn is_persistent(&self) -> bool {
        self.log.is_some()
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::in_memory()
    }
}
