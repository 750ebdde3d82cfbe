use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use retailpos_infra::tally::TallyError;
use retailpos_infra::{PostingError, StoreError};

pub fn posting_error_to_response(err: PostingError) -> axum::response::Response {
    let message = err.to_string();
    match err {
        PostingError::Tally(TallyError::Configuration(_)) => {
            json_error(StatusCode::CONFLICT, "accounting_not_configured", message)
        }
        PostingError::Tally(TallyError::Transport { .. }) => {
            json_error(StatusCode::BAD_GATEWAY, "accounting_unreachable", message)
        }
        PostingError::Tally(TallyError::Protocol(_)) => {
            json_error(StatusCode::BAD_GATEWAY, "accounting_protocol_error", message)
        }
        PostingError::LedgerNotFound(_) => json_error(StatusCode::NOT_FOUND, "not_found", message),
        PostingError::Domain(_) => json_error(StatusCode::BAD_REQUEST, "validation_error", message),
        PostingError::Store(StoreError::NotFound(_)) => {
            json_error(StatusCode::NOT_FOUND, "not_found", message)
        }
        PostingError::Store(_) => {
            tracing::error!(error = %message, "store failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", message)
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
