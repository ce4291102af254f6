use axum::{
    Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use common::storage::StorageError;
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;

use crate::state::AppState;

/// Envelope returned by every endpoint on failure.
#[derive(Clone, Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Always `false`.
    #[schema(example = false)]
    pub success: bool,
    /// Machine-readable error code. One of: `VALIDATION_ERROR`, `NOT_FOUND`,
    /// `CONFLICT`, `IO_ERROR`, `REMOTE_STORE_ERROR`, `INTERNAL_ERROR`.
    #[schema(example = "VALIDATION_ERROR")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "Missing 'contentFile' field")]
    pub message: String,
    /// Per-field validation failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
    /// Failure detail, only present when `errors.expose_debug` is enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<String>,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    /// Several request fields failed validation at once.
    InvalidFields(Vec<String>),
    NotFound(String),
    Conflict(String),
    /// Local filesystem failure while staging or placing a file.
    Io(String),
    /// Failure reported by the remote data store.
    RemoteStore(String),
    Internal(String),
}

/// Attached to error responses so [`error_envelope`] can add the detail
/// without re-parsing the body.
#[derive(Clone, Debug)]
struct ErrorReport {
    body: ErrorBody,
    detail: String,
}

impl AppError {
    /// Map an insert/update failure, turning unique violations into `Conflict`.
    pub fn from_write(err: DbErr, conflict_message: &str) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                tracing::debug!("Unique constraint violated: {detail}");
                AppError::Conflict(conflict_message.to_string())
            }
            _ => AppError::from(err),
        }
    }

    fn parts(self) -> (StatusCode, ErrorBody, Option<String>) {
        let body = |code: &'static str, message: String| ErrorBody {
            success: false,
            code,
            message,
            errors: None,
            debug: None,
        };

        match self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                body("VALIDATION_ERROR", msg),
                None,
            ),
            AppError::InvalidFields(errors) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    errors: Some(errors),
                    ..body("VALIDATION_ERROR", "Validation failed".into())
                },
                None,
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, body("NOT_FOUND", msg), None),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, body("CONFLICT", msg), None),
            AppError::Io(detail) => {
                tracing::error!("Storage error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    body("IO_ERROR", "Failed to store file".into()),
                    Some(detail),
                )
            }
            AppError::RemoteStore(detail) => {
                tracing::error!("Remote store error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    body("REMOTE_STORE_ERROR", "Data store request failed".into()),
                    Some(detail),
                )
            }
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    body("INTERNAL_ERROR", "An unexpected error occurred".into()),
                    Some(detail),
                )
            }
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Validation(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::Io(msg)
            | AppError::RemoteStore(msg)
            | AppError::Internal(msg) => f.write_str(msg),
            AppError::InvalidFields(errors) => f.write_str(&errors.join("; ")),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body, detail) = self.parts();
        let mut response = (status, Json(body.clone())).into_response();
        if let Some(detail) = detail {
            response
                .extensions_mut()
                .insert(ErrorReport { body, detail });
        }
        response
    }
}

/// Adds the `debug` member to error envelopes when configured to.
///
/// This is the only place that decides whether failure details leave the
/// process.
pub async fn error_envelope(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    let Some(report) = response.extensions_mut().remove::<ErrorReport>() else {
        return response;
    };
    if !state.config.errors.expose_debug {
        return response;
    }

    let ErrorReport { mut body, detail } = report;
    body.debug = Some(detail);
    (response.status(), Json(body)).into_response()
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        match err {
            DbErr::RecordNotFound(msg) => AppError::NotFound(msg),
            other => AppError::RemoteStore(other.to_string()),
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(path) => AppError::NotFound(format!("File '{path}' not found")),
            StorageError::InvalidPath(_) => AppError::Validation(err.to_string()),
            StorageError::SizeLimitExceeded { limit, .. } => {
                AppError::Validation(format!("File exceeds maximum size of {limit} bytes"))
            }
            StorageError::Io(e) => AppError::Io(e.to_string()),
        }
    }
}
