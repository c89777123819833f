//! Student profile storage trait.

use crate::StoreError;
use transcript_types::{Student, StudentRef};

pub trait StudentStore: Send + Sync {
    /// Insert or replace a student profile.
    fn put_student(&self, student: &Student) -> Result<(), StoreError>;

    fn get_student(&self, usn: &StudentRef) -> Result<Student, StoreError>;

    fn student_exists(&self, usn: &StudentRef) -> Result<bool, StoreError> {
        match self.get_student(usn) {
            Ok(_) => Ok(true),
            Err(StoreError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
