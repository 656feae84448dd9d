//! Sled-backed history log with one tree per category (`notebook/<category>`).
//! Keys are big-endian ids from `Db::generate_id`, so key order is insertion order.

use super::HistoryLog;
use crate::error::StoreError;
use crate::model::ResearchAnswer;
use sled::Db;
use std::path::Path;

const TREE_PREFIX: &str = "notebook/";

/// Write-through history persistence on Sled.
pub struct SledHistoryLog {
    db: Db,
}

impl SledHistoryLog {
    /// Opens or creates the history DB at the given path.
    pub fn open_path<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    fn tree_name(category: &str) -> String {
        format!("{}{}", TREE_PREFIX, category)
    }

    /// Names of all notebook trees currently in the DB.
    fn notebook_trees(&self) -> Vec<String> {
        self.db
            .tree_names()
            .into_iter()
            .filter_map(|name| String::from_utf8(name.to_vec()).ok())
            .filter(|name| name.starts_with(TREE_PREFIX))
            .collect()
    }
}

impl HistoryLog for SledHistoryLog {
    fn name(&self) -> &str {
        "sled"
    }

    fn record(&self, answer: &ResearchAnswer) -> Result<(), StoreError> {
        let tree_name = Self::tree_name(&answer.category);
        let tree = self.db.open_tree(&tree_name)?;
        let bytes = answer.to_bytes()?;
        let id = self.db.generate_id()?;
        tree.insert(id.to_be_bytes(), bytes.as_slice())?;
        tree.flush()?;

        tracing::debug!(
            target: "notebook::history",
            tree = %tree_name,
            key = id,
            bytes = bytes.len(),
            "Recorded answer {} in '{}'",
            answer.id,
            tree_name
        );
        Ok(())
    }

    fn load(&self) -> Result<Vec<ResearchAnswer>, StoreError> {
        let mut out = Vec::new();
        for tree_name in self.notebook_trees() {
            let tree = self.db.open_tree(&tree_name)?;
            for item in tree.iter() {
                let (key, value) = item?;
                match ResearchAnswer::from_bytes(&value) {
                    Ok(answer) => out.push(answer),
                    Err(e) => tracing::warn!(
                        target: "notebook::history",
                        tree = %tree_name,
                        key = ?key,
                        error = %e,
                        "Skipping undecodable history record"
                    ),
                }
            }
        }
        Ok(out)
    }

    /// Drops notebook trees one at a time; sled has no multi-tree drop. On failure the
    /// trees already dropped stay dropped and are named in the warning.
    fn clear(&self) -> Result<(), StoreError> {
        let mut dropped: Vec<String> = Vec::new();
        for tree_name in self.notebook_trees() {
            if let Err(e) = self.db.drop_tree(tree_name.as_bytes()) {
                tracing::warn!(
                    target: "notebook::history",
                    failed = %tree_name,
                    dropped = ?dropped,
                    error = %e,
                    "History clear stopped partway"
                );
                return Err(e.into());
            }
            dropped.push(tree_name);
        }
        self.db.flush()?;
        tracing::debug!(target: "notebook::history", dropped = ?dropped, "Notebook trees dropped");
        Ok(())
    }
}
