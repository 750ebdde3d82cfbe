use serde::Deserialize;

use retailpos_infra::sync_log::{SyncLogEntry, SyncStatus};

use crate::app::errors;

pub const DEFAULT_SYNC_LOG_LIMIT: usize = 50;
pub const MAX_SYNC_LOG_LIMIT: usize = 500;

#[derive(Debug, Deserialize)]
pub struct SyncLogQuery {
    pub status: Option<String>,
    pub limit: Option<usize>,
}

impl SyncLogQuery {
    pub fn status(&self) -> Result<Option<SyncStatus>, axum::response::Response> {
        match self.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            None => Ok(None),
            Some(raw) => SyncStatus::parse(raw).map(Some).ok_or_else(|| {
                errors::json_error(
                    axum::http::StatusCode::BAD_REQUEST,
                    "invalid_status",
                    "status must be one of: PENDING, SUCCESS, FAILED",
                )
            }),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
            .unwrap_or(DEFAULT_SYNC_LOG_LIMIT)
            .clamp(1, MAX_SYNC_LOG_LIMIT)
    }
}

pub fn sync_entry_to_json(entry: SyncLogEntry) -> Result<serde_json::Value, axum::response::Response> {
    let doc_key = entry.doc_key();
    let mut value = serde_json::to_value(&entry).map_err(serialize_error)?;
    if let Some(map) = value.as_object_mut() {
        map.insert("doc_key".to_string(), serde_json::Value::String(doc_key));
    }
    Ok(value)
}

pub fn sync_entries_to_json(
    entries: Vec<SyncLogEntry>,
) -> Result<serde_json::Value, axum::response::Response> {
    let items = entries
        .into_iter()
        .map(sync_entry_to_json)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(serde_json::json!({ "items": items }))
}

fn serialize_error(err: serde_json::Error) -> axum::response::Response {
    tracing::error!(error = %err, "failed to serialise sync log entry");
    errors::json_error(
        axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        "serialize_error",
        err.to_string(),
    )
}
