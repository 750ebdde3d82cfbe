use axum::{
    routing::{get, post},
    Router,
};

pub mod accounting;
pub mod system;

/// Router mounted under `/accounting`.
pub fn router() -> Router {
    Router::new()
        .route(
            "/settings",
            get(accounting::get_settings).put(accounting::put_settings),
        )
        .route("/companies", get(accounting::list_companies))
        .route("/ledgers/:id/push", post(accounting::push_ledger))
        .route("/raw", post(accounting::send_raw))
        .route("/sync-log", get(accounting::list_sync_log))
        .route("/sync-log/:doc_type/:doc_id", get(accounting::document_sync_log))
        .route("/sync-entries/:id", get(accounting::get_sync_entry))
}
