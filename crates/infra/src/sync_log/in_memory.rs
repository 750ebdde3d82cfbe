use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use retailpos_core::SyncLogId;

use super::types::{AttemptOutcome, NewSyncLogEntry, SyncLogEntry, SyncStatus};
use super::SyncLogStore;
use crate::error::StoreError;

/// In-memory sync log for tests/dev. Rows are kept in insertion order.
#[derive(Debug, Default)]
pub struct InMemorySyncLogStore {
    rows: RwLock<Vec<SyncLogEntry>>,
}

impl InMemorySyncLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every row, oldest first.
    pub fn all(&self) -> Vec<SyncLogEntry> {
        self.rows.read().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl SyncLogStore for InMemorySyncLogStore {
    async fn create(&self, entry: NewSyncLogEntry) -> Result<SyncLogEntry, StoreError> {
        let row = entry.into_pending(SyncLogId::new(), Utc::now());
        let mut rows = self.rows.write().map_err(|_| StoreError::poisoned())?;
        rows.push(row.clone());
        Ok(row)
    }

    async fn finish(
        &self,
        id: SyncLogId,
        outcome: &AttemptOutcome,
    ) -> Result<SyncLogEntry, StoreError> {
        let mut rows = self.rows.write().map_err(|_| StoreError::poisoned())?;
        let row = rows
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("sync log entry {id}")))?;
        row.record(outcome, Utc::now());
        Ok(row.clone())
    }

    async fn get(&self, id: SyncLogId) -> Result<Option<SyncLogEntry>, StoreError> {
        let rows = self.rows.read().map_err(|_| StoreError::poisoned())?;
        Ok(rows.iter().find(|r| r.id == id).cloned())
    }

    async fn list_for_document(
        &self,
        doc_type: &str,
        doc_key: &str,
    ) -> Result<Vec<SyncLogEntry>, StoreError> {
        let rows = self.rows.read().map_err(|_| StoreError::poisoned())?;
        Ok(rows
            .iter()
            .rev()
            .filter(|r| r.doc_type == doc_type && r.doc_key() == doc_key)
            .cloned()
            .collect())
    }

    async fn list_recent(
        &self,
        status: Option<SyncStatus>,
        limit: usize,
    ) -> Result<Vec<SyncLogEntry>, StoreError> {
        let rows = self.rows.read().map_err(|_| StoreError::poisoned())?;
        Ok(rows
            .iter()
            .rev()
            .filter(|r| status.is_none_or(|s| r.status == s))
            .take(limit)
            .cloned()
            .collect())
    }
}
