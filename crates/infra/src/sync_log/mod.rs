//! Sync log: append-only audit trail of every push to the accounting engine.
//!
//! One row per attempt. A row is created `PENDING` before the request goes
//! out and finalised exactly once afterwards, whatever the outcome. Rows are
//! never retried automatically; a `FAILED` row stays as it is until a caller
//! re-drives the same document, which appends a new row.

use std::sync::Arc;

use async_trait::async_trait;

use retailpos_core::SyncLogId;

use crate::error::StoreError;

mod attempt;
mod in_memory;
mod postgres;
mod types;

pub use attempt::logged_attempt;
pub use in_memory::InMemorySyncLogStore;
pub use postgres::PostgresSyncLogStore;
pub use types::{AttemptOutcome, NewSyncLogEntry, SyncKind, SyncLogEntry, SyncStatus, SyncSubject};

#[async_trait]
pub trait SyncLogStore: Send + Sync {
    /// Insert a new `PENDING` row with `attempts = 0`.
    async fn create(&self, entry: NewSyncLogEntry) -> Result<SyncLogEntry, StoreError>;

    /// Record the outcome of the attempt: status, response or error text,
    /// `attempts + 1` and a fresh `updated_at`.
    async fn finish(&self, id: SyncLogId, outcome: &AttemptOutcome)
        -> Result<SyncLogEntry, StoreError>;

    async fn get(&self, id: SyncLogId) -> Result<Option<SyncLogEntry>, StoreError>;

    /// Full history of one document, newest first.
    async fn list_for_document(
        &self,
        doc_type: &str,
        doc_key: &str,
    ) -> Result<Vec<SyncLogEntry>, StoreError>;

    /// Most recent rows, optionally restricted to one status, newest first.
    async fn list_recent(
        &self,
        status: Option<SyncStatus>,
        limit: usize,
    ) -> Result<Vec<SyncLogEntry>, StoreError>;
}

#[async_trait]
impl<L> SyncLogStore for Arc<L>
where
    L: SyncLogStore + ?Sized,
{
    async fn create(&self, entry: NewSyncLogEntry) -> Result<SyncLogEntry, StoreError> {
        (**self).create(entry).await
    }

    async fn finish(
        &self,
        id: SyncLogId,
        outcome: &AttemptOutcome,
    ) -> Result<SyncLogEntry, StoreError> {
        (**self).finish(id, outcome).await
    }

    async fn get(&self, id: SyncLogId) -> Result<Option<SyncLogEntry>, StoreError> {
        (**self).get(id).await
    }

    async fn list_for_document(
        &self,
        doc_type: &str,
        doc_key: &str,
    ) -> Result<Vec<SyncLogEntry>, StoreError> {
        (**self).list_for_document(doc_type, doc_key).await
    }

    async fn list_recent(
        &self,
        status: Option<SyncStatus>,
        limit: usize,
    ) -> Result<Vec<SyncLogEntry>, StoreError> {
        (**self).list_recent(status, limit).await
    }
}
