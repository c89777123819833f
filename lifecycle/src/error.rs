use serde::{Deserialize, Serialize};
use thiserror::Error;
use transcript_render::RenderError;
use transcript_store::StoreError;
use transcript_types::{
    params::MIN_REJECTION_REASON_CHARS, RequestId, RequestStatus, StudentRef, TranscriptError,
};

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("request not found: {0}")]
    RequestNotFound(RequestId),

    #[error("request is already {status}")]
    InvalidTransition { status: RequestStatus },

    #[error("rejection reason must be at least {} characters, got {len}", MIN_REJECTION_REASON_CHARS)]
    ReasonTooShort { len: usize },

    #[error("student {0} already has a pending request")]
    DuplicatePendingRequest(StudentRef),

    #[error("student not found: {0}")]
    StudentNotFound(StudentRef),

    #[error("invalid record: {0}")]
    InvalidRecord(TranscriptError),

    #[error("certificate rendering failed: {0}")]
    RenderFailure(#[from] RenderError),

    #[error("certificate storage failed: {0}")]
    StorageFailure(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl From<TranscriptError> for LifecycleError {
    fn from(e: TranscriptError) -> Self {
        match e {
            TranscriptError::ReasonTooShort { len, .. } => Self::ReasonTooShort { len },
            other => Self::InvalidRecord(other),
        }
    }
}

/// Serializable classification of a [`LifecycleError`], used in batch
/// reports and API error bodies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    RequestNotFound,
    InvalidTransition,
    ReasonTooShort,
    DuplicatePendingRequest,
    StudentNotFound,
    InvalidRecord,
    RenderFailure,
    StorageFailure,
    Store,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RequestNotFound => "request_not_found",
            Self::InvalidTransition => "invalid_transition",
            Self::ReasonTooShort => "reason_too_short",
            Self::DuplicatePendingRequest => "duplicate_pending_request",
            Self::StudentNotFound => "student_not_found",
            Self::InvalidRecord => "invalid_record",
            Self::RenderFailure => "render_failure",
            Self::StorageFailure => "storage_failure",
            Self::Store => "store",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl LifecycleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::RequestNotFound(_) => ErrorKind::RequestNotFound,
            Self::InvalidTransition { .. } => ErrorKind::InvalidTransition,
            Self::ReasonTooShort { .. } => ErrorKind::ReasonTooShort,
            Self::DuplicatePendingRequest(_) => ErrorKind::DuplicatePendingRequest,
            Self::StudentNotFound(_) => ErrorKind::StudentNotFound,
            Self::InvalidRecord(_) => ErrorKind::InvalidRecord,
            Self::RenderFailure(_) => ErrorKind::RenderFailure,
            Self::StorageFailure(_) => ErrorKind::StorageFailure,
            Self::Store(_) => ErrorKind::Store,
        }
    }
}
