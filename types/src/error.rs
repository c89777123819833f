//! Domain validation errors shared across crates.

use thiserror::Error;

/// Errors raised when constructing or validating domain values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranscriptError {
    #[error("invalid student reference: {0:?}")]
    InvalidStudentRef(String),

    #[error("actor reference must not be empty")]
    InvalidActorRef,

    #[error("invalid request id: {0:?}")]
    InvalidRequestId(String),

    #[error("semester {0} is outside 1..=8")]
    InvalidSemester(u8),

    #[error("grade point {0:?} is outside 0.00..=10.00")]
    InvalidGradePoint(String),

    #[error("mark {0} is outside 0..=100")]
    InvalidMark(u16),

    #[error("subject name must not be empty")]
    EmptySubjectName,

    #[error("rejection reason must be at least {min} characters after trimming, got {len}")]
    ReasonTooShort { len: usize, min: usize },

    #[error("student field {0} must not be empty")]
    EmptyStudentField(&'static str),

    #[error("{field} is longer than {max} characters")]
    FieldTooLong { field: &'static str, max: usize },

    #[error("request invariant violated: {0}")]
    InvariantViolation(String),
}
