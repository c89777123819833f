//! Certification request storage trait.

use crate::StoreError;
use transcript_types::{CertificationRequest, Decision, RequestId, StudentRef};

/// Storage for certification requests and their secondary indexes
/// (pending queue, per-student history, verification codes).
pub trait RequestStore: Send + Sync {
    /// Insert a new `Pending` request, assigning its insertion sequence.
    ///
    /// Fails with [`StoreError::Duplicate`] if the student already holds a
    /// pending request. The check and the insert are one atomic operation.
    fn insert_pending(
        &self,
        request: &CertificationRequest,
    ) -> Result<CertificationRequest, StoreError>;

    fn get_request(&self, id: &RequestId) -> Result<CertificationRequest, StoreError>;

    /// Atomically apply `decision` if and only if the request is `Pending`.
    ///
    /// Returns the updated request. Fails with [`StoreError::NotFound`] for an
    /// unknown id, [`StoreError::StatusConflict`] if the request already left
    /// `Pending`, and [`StoreError::Duplicate`] if an approval's verification
    /// code is already bound to another request. Nothing is written on failure.
    fn decide(
        &self,
        id: &RequestId,
        decision: &Decision,
    ) -> Result<CertificationRequest, StoreError>;

    /// Pending requests, oldest first (`requested_at`, then insertion sequence).
    fn pending_requests(&self, limit: usize) -> Result<Vec<CertificationRequest>, StoreError>;

    /// All requests of one student, newest first.
    fn requests_for_student(
        &self,
        student: &StudentRef,
    ) -> Result<Vec<CertificationRequest>, StoreError>;

    /// The request a verification code is bound to, if any.
    fn find_by_code(&self, code: &str) -> Result<Option<CertificationRequest>, StoreError>;

    fn request_count(&self) -> Result<u64, StoreError>;
}
