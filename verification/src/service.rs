//! The verification service.

use std::sync::Arc;

use transcript_crypto::is_well_formed;
use transcript_store::{AcademicRecordStore, RequestStore, StoreError, StudentStore};
use transcript_types::{GradePoint, RequestStatus, Timestamp};

use crate::VerificationError;

/// Longest input, in bytes after trimming, that is looked up at all. Issued
/// codes are far shorter.
pub const MAX_CODE_INPUT_LEN: usize = 64;

/// Public answer for one code. Only `valid` is set when the code is not
/// genuine.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VerificationResult {
    pub valid: bool,
    pub student_name: Option<String>,
    pub usn: Option<String>,
    pub program: Option<String>,
    pub latest_cgpa: Option<GradePoint>,
    pub approval_date: Option<Timestamp>,
}

impl VerificationResult {
    pub fn invalid() -> Self {
        Self::default()
    }
}

pub struct VerificationService {
    requests: Arc<dyn RequestStore>,
    students: Arc<dyn StudentStore>,
    records: Arc<dyn AcademicRecordStore>,
}

impl VerificationService {
    pub fn new(
        requests: Arc<dyn RequestStore>,
        students: Arc<dyn StudentStore>,
        records: Arc<dyn AcademicRecordStore>,
    ) -> Self {
        Self {
            requests,
            students,
            records,
        }
    }

    /// Look up `code`. Side-effect free.
    pub fn verify(&self, code: &str) -> VerificationResult {
        let code = code.trim();
        match self.lookup(code) {
            Ok(result) => result,
            Err(VerificationError::NotFound) => {
                tracing::debug!(well_formed = is_well_formed(code), "verification code not recognised");
                VerificationResult::invalid()
            }
            Err(VerificationError::Store(e)) => {
                tracing::warn!(error = %e, "verification lookup failed");
                VerificationResult::invalid()
            }
        }
    }

    fn lookup(&self, code: &str) -> Result<VerificationResult, VerificationError> {
        if code.is_empty() || code.len() > MAX_CODE_INPUT_LEN {
            return Err(VerificationError::NotFound);
        }
        let request = self
            .requests
            .find_by_code(code)?
            .filter(|r| r.status == RequestStatus::Approved)
            .ok_or(VerificationError::NotFound)?;

        let student = self.students.get_student(&request.student).map_err(|e| match e {
            // An approved request whose student vanished cannot be vouched for.
            StoreError::NotFound(_) => VerificationError::NotFound,
            other => VerificationError::Store(other),
        })?;
        let latest_cgpa = self
            .records
            .latest_record(&request.student)?
            .map(|r| r.cgpa);

        Ok(VerificationResult {
            valid: true,
            student_name: Some(student.name),
            usn: Some(student.usn.to_string()),
            program: Some(student.major),
            latest_cgpa,
            approval_date: request.decided_at,
        })
    }
}
