//! Postgres-backed sync log (`accounting_sync_log`).
//!
//! Rows are only ever inserted and then finalised once; nothing is deleted.
//! History lookups use the `(doc_type, doc_key, created_at DESC)` index.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;

use retailpos_core::{LedgerAccountId, SyncLogId};

use super::types::{
    AttemptOutcome, NewSyncLogEntry, SyncKind, SyncLogEntry, SyncStatus, SyncSubject,
};
use super::SyncLogStore;
use crate::error::{map_sqlx_error, StoreError};

const SELECT_COLUMNS: &str = r#"
    SELECT
        id, kind, doc_type, doc_key, ledger_name, status, attempts,
        request_xml, response_text, error_text, created_at, updated_at
    FROM accounting_sync_log
"#;

#[derive(Debug, Clone)]
pub struct PostgresSyncLogStore {
    pool: PgPool,
}

impl PostgresSyncLogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SyncLogStore for PostgresSyncLogStore {
    #[instrument(skip(self, entry), fields(doc_type = %entry.doc_type), err)]
    async fn create(&self, entry: NewSyncLogEntry) -> Result<SyncLogEntry, StoreError> {
        let row = entry.into_pending(SyncLogId::new(), Utc::now());
        let ledger_name = match &row.subject {
            SyncSubject::Master { ledger_name, .. } => Some(ledger_name.as_str()),
            SyncSubject::Voucher { .. } => None,
        };

        sqlx::query(
            r#"
            INSERT INTO accounting_sync_log (
                id, kind, doc_type, doc_key, ledger_name, status, attempts,
                request_xml, response_text, error_text, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NULL, NULL, $9, $9)
            "#,
        )
        .bind(row.id.as_uuid())
        .bind(row.subject.kind().as_str())
        .bind(&row.doc_type)
        .bind(row.doc_key())
        .bind(ledger_name)
        .bind(row.status.as_str())
        .bind(row.attempts as i32)
        .bind(&row.request_xml)
        .bind(row.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_sync_log_entry", e))?;

        Ok(row)
    }

    #[instrument(skip(self, outcome), fields(sync_log_id = %id), err)]
    async fn finish(
        &self,
        id: SyncLogId,
        outcome: &AttemptOutcome,
    ) -> Result<SyncLogEntry, StoreError> {
        let (status, response, error) = match outcome {
            AttemptOutcome::Success { response } => (SyncStatus::Success, Some(response.as_str()), None),
            AttemptOutcome::Failure { error } => (SyncStatus::Failed, None, Some(error.as_str())),
        };

        let row = sqlx::query(
            r#"
            UPDATE accounting_sync_log
            SET status = $2,
                response_text = COALESCE($3, response_text),
                error_text = COALESCE($4, error_text),
                attempts = attempts + 1,
                updated_at = NOW()
            WHERE id = $1
            RETURNING
                id, kind, doc_type, doc_key, ledger_name, status, attempts,
                request_xml, response_text, error_text, created_at, updated_at
            "#,
        )
        .bind(id.as_uuid())
        .bind(status.as_str())
        .bind(response)
        .bind(error)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("finish_sync_log_entry", e))?
        .ok_or_else(|| StoreError::NotFound(format!("sync log entry {id}")))?;

        entry_from_row(&row)
    }

    async fn get(&self, id: SyncLogId) -> Result<Option<SyncLogEntry>, StoreError> {
        let sql = format!("{SELECT_COLUMNS} WHERE id = $1");
        sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_sync_log_entry", e))?
            .as_ref()
            .map(entry_from_row)
            .transpose()
    }

    #[instrument(skip(self), err)]
    async fn list_for_document(
        &self,
        doc_type: &str,
        doc_key: &str,
    ) -> Result<Vec<SyncLogEntry>, StoreError> {
        let sql = format!(
            "{SELECT_COLUMNS} WHERE doc_type = $1 AND doc_key = $2 ORDER BY created_at DESC, id DESC"
        );
        let rows = sqlx::query(&sql)
            .bind(doc_type)
            .bind(doc_key)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_sync_log_for_document", e))?;
        rows.iter().map(entry_from_row).collect()
    }

    async fn list_recent(
        &self,
        status: Option<SyncStatus>,
        limit: usize,
    ) -> Result<Vec<SyncLogEntry>, StoreError> {
        let sql = format!(
            "{SELECT_COLUMNS} WHERE ($1::TEXT IS NULL OR status = $1) \
             ORDER BY created_at DESC, id DESC LIMIT $2"
        );
        let rows = sqlx::query(&sql)
            .bind(status.map(|s| s.as_str()))
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_recent_sync_log", e))?;
        rows.iter().map(entry_from_row).collect()
    }
}

fn entry_from_row(row: &PgRow) -> Result<SyncLogEntry, StoreError> {
    let col = |e| map_sqlx_error("decode_sync_log_entry", e);

    let kind: String = row.try_get("kind").map_err(col)?;
    let doc_key: String = row.try_get("doc_key").map_err(col)?;
    let subject = match kind.as_str() {
        k if k == SyncKind::Voucher.as_str() => SyncSubject::Voucher { voucher_no: doc_key },
        k if k == SyncKind::Master.as_str() => SyncSubject::Master {
            ledger_id: LedgerAccountId::from_str(&doc_key)
                .map_err(|e| StoreError::Corrupt(e.to_string()))?,
            ledger_name: row
                .try_get::<Option<String>, _>("ledger_name")
                .map_err(col)?
                .unwrap_or_default(),
        },
        other => return Err(StoreError::Corrupt(format!("unknown sync log kind {other:?}"))),
    };

    let status: String = row.try_get("status").map_err(col)?;
    let status = SyncStatus::parse(&status)
        .ok_or_else(|| StoreError::Corrupt(format!("unknown sync status {status:?}")))?;
    let attempts: i32 = row.try_get("attempts").map_err(col)?;

    Ok(SyncLogEntry {
        id: SyncLogId::from_uuid(row.try_get::<uuid::Uuid, _>("id").map_err(col)?),
        subject,
        doc_type: row.try_get("doc_type").map_err(col)?,
        status,
        attempts: u32::try_from(attempts)
            .map_err(|_| StoreError::Corrupt(format!("negative attempt count {attempts}")))?,
        request_xml: row.try_get("request_xml").map_err(col)?,
        response_text: row.try_get("response_text").map_err(col)?,
        error_text: row.try_get("error_text").map_err(col)?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at").map_err(col)?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at").map_err(col)?,
    })
}
