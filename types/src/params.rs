//! Validation limits and fixed domain constants.

/// Minimum rejection reason length, counted in characters after trimming.
pub const MIN_REJECTION_REASON_CHARS: usize = 10;

/// Highest semester number a record can carry.
pub const MAX_SEMESTER: u8 = 8;

/// Number of (subject, mark) slots on an academic record.
pub const SUBJECT_SLOTS: usize = 5;

/// Highest mark a subject can carry.
pub const MAX_MARK: u16 = 100;

/// Longest subject name, in characters after trimming.
pub const MAX_SUBJECT_NAME_CHARS: usize = 80;

/// Longest student name, email or major, in characters after trimming.
pub const MAX_STUDENT_FIELD_CHARS: usize = 120;

/// Highest grade point, in hundredths (10.00).
pub const MAX_GRADE_HUNDREDTHS: u16 = 1000;

/// Content type of rendered certificate artifacts.
pub const CERTIFICATE_CONTENT_TYPE: &str = "application/pdf";

/// Validate a rejection reason and return its trimmed form.
pub fn validate_rejection_reason(reason: &str) -> Result<String, crate::TranscriptError> {
    let trimmed = reason.trim();
    let len = trimmed.chars().count();
    if len < MIN_REJECTION_REASON_CHARS {
        return Err(crate::TranscriptError::ReasonTooShort {
            len,
            min: MIN_REJECTION_REASON_CHARS,
        });
    }
    Ok(trimmed.to_string())
}
