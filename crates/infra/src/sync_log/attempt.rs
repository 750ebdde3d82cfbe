//! Guaranteed finalisation of a sync-log row around one remote attempt.

use std::fmt::Display;
use std::future::Future;

use tracing::{debug, error, info, warn};

use super::types::{AttemptOutcome, NewSyncLogEntry};
use super::SyncLogStore;
use crate::error::StoreError;

/// Create a `PENDING` row, await `send`, then finalise the row with the
/// outcome before handing the untouched result back to the caller.
///
/// `send` is not polled until the row exists, so a push is never made
/// without a log row. If the row cannot be created, `send` is dropped and
/// the storage error is returned. A failure to finalise is logged and does
/// not replace the remote outcome.
pub async fn logged_attempt<L, Fut, E>(
    log: &L,
    entry: NewSyncLogEntry,
    send: Fut,
) -> Result<String, E>
where
    L: SyncLogStore + ?Sized,
    Fut: Future<Output = Result<String, E>>,
    E: From<StoreError> + Display,
{
    let row = log.create(entry).await?;
    debug!(sync_log_id = %row.id, doc_type = %row.doc_type, doc_key = %row.doc_key(), "sync attempt pending");

    let result = send.await;

    let outcome = match &result {
        Ok(response) => AttemptOutcome::Success {
            response: response.clone(),
        },
        Err(e) => AttemptOutcome::Failure {
            error: e.to_string(),
        },
    };

    match log.finish(row.id, &outcome).await {
        Ok(done) => match &outcome {
            AttemptOutcome::Success { .. } => {
                info!(sync_log_id = %done.id, attempts = done.attempts, "sync attempt succeeded")
            }
            AttemptOutcome::Failure { error } => {
                warn!(sync_log_id = %done.id, attempts = done.attempts, error = %error, "sync attempt failed")
            }
        },
        Err(e) => error!(sync_log_id = %row.id, error = %e, "failed to finalise sync log entry"),
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync_log::{InMemorySyncLogStore, SyncStatus};

    #[derive(Debug, thiserror::Error)]
    enum TestError {
        #[error("remote down")]
        Remote,
        #[error(transparent)]
        Store(#[from] StoreError),
    }

    #[tokio::test]
    async fn success_is_recorded_once() {
        let log = InMemorySyncLogStore::new();
        let entry = NewSyncLogEntry::voucher("SALE", "S-1", "<X/>");
        let out: Result<String, TestError> =
            logged_attempt(&log, entry, async { Ok("<OK/>".to_string()) }).await;
        assert_eq!(out.unwrap(), "<OK/>");

        let rows = log.all();
        assert_eq!(rows.len(), 1);
        assert_eq!((rows[0].status, rows[0].attempts), (SyncStatus::Success, 1));
        assert_eq!(rows[0].response_text.as_deref(), Some("<OK/>"));
        assert_eq!(rows[0].request_xml, "<X/>");
    }

    #[tokio::test]
    async fn failure_is_recorded_and_propagated() {
        let log = InMemorySyncLogStore::new();
        let entry = NewSyncLogEntry::voucher("SALE", "S-1", "<X/>");
        let out = logged_attempt(&log, entry, async { Err::<String, _>(TestError::Remote) }).await;
        assert!(matches!(out, Err(TestError::Remote)));

        let rows = log.all();
        assert_eq!(rows.len(), 1);
        assert_eq!((rows[0].status, rows[0].attempts), (SyncStatus::Failed, 1));
        assert_eq!(rows[0].error_text.as_deref(), Some("remote down"));
    }
}
