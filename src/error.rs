use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// Failures of a single ledger operation.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("storage unavailable: {0}")]
    StorageUnavailable(sqlx::Error),

    #[error("storage write failed: {0}")]
    StorageWriteFailed(sqlx::Error),

    #[error("storage read failed: {0}")]
    StorageReadFailed(sqlx::Error),
}

impl LedgerError {
    pub fn kind(&self) -> &'static str {
        match self {
            LedgerError::StorageUnavailable(_) => "storage_unavailable",
            LedgerError::StorageWriteFailed(_) => "storage_write_failed",
            LedgerError::StorageReadFailed(_) => "storage_read_failed",
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("template error: {0}")]
    Template(#[from] askama::Error),

    #[error("limit must be a positive integer")]
    InvalidLimit,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

impl AppError {
    fn status_and_kind(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Ledger(e @ LedgerError::StorageUnavailable(_)) => {
                (StatusCode::SERVICE_UNAVAILABLE, e.kind())
            }
            AppError::Ledger(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.kind()),
            AppError::Template(_) => (StatusCode::INTERNAL_SERVER_ERROR, "template_error"),
            AppError::InvalidLimit => (StatusCode::BAD_REQUEST, "invalid_limit"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind) = self.status_and_kind();
        if status.is_server_error() {
            tracing::error!(kind, "{self}");
        }

        let body = ErrorBody {
            error: kind,
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
