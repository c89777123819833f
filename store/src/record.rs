//! Academic record storage trait.

use crate::StoreError;
use transcript_types::{AcademicRecord, StudentRef};

/// Read/write access to per-semester records, keyed by `(student, semester)`.
pub trait AcademicRecordStore: Send + Sync {
    /// Insert or replace the record for `(record.student, record.semester)`.
    fn upsert_record(&self, record: &AcademicRecord) -> Result<(), StoreError>;

    /// All records of a student, ascending by semester.
    fn records_for_student(&self, student: &StudentRef)
        -> Result<Vec<AcademicRecord>, StoreError>;

    /// The highest-semester record, whose CGPA is the student's current CGPA.
    fn latest_record(&self, student: &StudentRef) -> Result<Option<AcademicRecord>, StoreError> {
        Ok(self.records_for_student(student)?.pop())
    }
}
