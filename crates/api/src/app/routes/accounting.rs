//! Operator endpoints: settings, diagnostics and the sync log.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use retailpos_accounting::PostingSettings;
use retailpos_core::{LedgerAccountId, SyncLogId};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub async fn get_settings(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.settings().await {
        Ok(s) => (StatusCode::OK, Json(s)).into_response(),
        Err(e) => errors::posting_error_to_response(e),
    }
}

pub async fn put_settings(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<PostingSettings>,
) -> axum::response::Response {
    match services.save_settings(body).await {
        Ok(s) => (StatusCode::OK, Json(s)).into_response(),
        Err(e) => errors::posting_error_to_response(e),
    }
}

pub async fn list_companies(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.list_companies().await {
        Ok(items) => (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response(),
        Err(e) => errors::posting_error_to_response(e),
    }
}

pub async fn push_ledger(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: LedgerAccountId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid ledger id"),
    };

    match services.push_ledger(id).await {
        Ok(response) => (
            StatusCode::OK,
            Json(serde_json::json!({ "ledger_id": id.to_string(), "response": response })),
        )
            .into_response(),
        Err(e) => errors::posting_error_to_response(e),
    }
}

/// Forward a complete envelope as-is and return the remote body.
pub async fn send_raw(
    Extension(services): Extension<Arc<AppServices>>,
    body: String,
) -> axum::response::Response {
    if body.trim().is_empty() {
        return errors::json_error(StatusCode::BAD_REQUEST, "validation_error", "envelope is empty");
    }

    match services.send_raw_envelope(&body).await {
        Ok(response) => (StatusCode::OK, Json(serde_json::json!({ "response": response }))).into_response(),
        Err(e) => errors::posting_error_to_response(e),
    }
}

pub async fn list_sync_log(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::SyncLogQuery>,
) -> axum::response::Response {
    let status = match query.status() {
        Ok(s) => s,
        Err(resp) => return resp,
    };

    match services.recent_sync_entries(status, query.limit()).await {
        Ok(entries) => match dto::sync_entries_to_json(entries) {
            Ok(body) => (StatusCode::OK, Json(body)).into_response(),
            Err(resp) => resp,
        },
        Err(e) => errors::posting_error_to_response(e),
    }
}

pub async fn document_sync_log(
    Extension(services): Extension<Arc<AppServices>>,
    Path((doc_type, doc_id)): Path<(String, String)>,
) -> axum::response::Response {
    let doc_type = doc_type.to_ascii_uppercase();
    match services.sync_history(&doc_type, &doc_id).await {
        Ok(entries) => match dto::sync_entries_to_json(entries) {
            Ok(body) => (StatusCode::OK, Json(body)).into_response(),
            Err(resp) => resp,
        },
        Err(e) => errors::posting_error_to_response(e),
    }
}

pub async fn get_sync_entry(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: SyncLogId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid sync log id"),
    };

    match services.sync_entry(id).await {
        Ok(Some(entry)) => match dto::sync_entry_to_json(entry) {
            Ok(body) => (StatusCode::OK, Json(body)).into_response(),
            Err(resp) => resp,
        },
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "sync log entry not found"),
        Err(e) => errors::posting_error_to_response(e),
    }
}
