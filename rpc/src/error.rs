//! RPC error types and their HTTP rendering.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use transcript_lifecycle::{ErrorKind, LifecycleError};
use transcript_store::StoreError;
use transcript_types::TranscriptError;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("{0}")]
    Lifecycle(#[from] LifecycleError),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("missing header: {0}")]
    MissingHeader(&'static str),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("store error: {0}")]
    Store(StoreError),

    #[error("server error: {0}")]
    Server(String),
}

impl From<StoreError> for RpcError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(key) => RpcError::NotFound(key),
            other => RpcError::Store(other),
        }
    }
}

impl From<TranscriptError> for RpcError {
    fn from(e: TranscriptError) -> Self {
        RpcError::InvalidRequest(e.to_string())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl RpcError {
    fn status_and_kind(&self) -> (StatusCode, &'static str) {
        match self {
            RpcError::Lifecycle(e) => {
                let kind = e.kind();
                let status = match kind {
                    ErrorKind::RequestNotFound | ErrorKind::StudentNotFound => StatusCode::NOT_FOUND,
                    ErrorKind::InvalidTransition | ErrorKind::DuplicatePendingRequest => StatusCode::CONFLICT,
                    ErrorKind::ReasonTooShort | ErrorKind::InvalidRecord => StatusCode::UNPROCESSABLE_ENTITY,
                    ErrorKind::RenderFailure | ErrorKind::StorageFailure => StatusCode::BAD_GATEWAY,
                    ErrorKind::Store => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, kind.as_str())
            }
            RpcError::InvalidRequest(_) => (StatusCode::UNPROCESSABLE_ENTITY, "invalid_request"),
            RpcError::MissingHeader(_) => (StatusCode::UNPROCESSABLE_ENTITY, "missing_header"),
            RpcError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            RpcError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "store"),
            RpcError::Server(_) => (StatusCode::INTERNAL_SERVER_ERROR, "server"),
        }
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let (status, kind) = self.status_and_kind();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorBody {
            error: kind,
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
