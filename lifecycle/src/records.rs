//! Student profiles, academic records and the student-facing views.

use std::sync::Arc;

use transcript_store::StoreError;
use transcript_types::{
    latest_record, AcademicRecord, ActorRef, AuditAction, CertificationRequest, Clock, EntityType,
    GradePoint, Student, StudentRef,
};

use crate::audit::{metadata, AuditRecorder};
use crate::{LifecycleError, StoreSet};

/// A student's profile, records in semester order, and current CGPA.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StudentSummary {
    pub student: Student,
    pub records: Vec<AcademicRecord>,
    /// CGPA of the highest semester on file.
    pub current_cgpa: Option<GradePoint>,
}

pub struct RecordsService {
    stores: StoreSet,
    audit: AuditRecorder,
    clock: Arc<dyn Clock>,
}

impl RecordsService {
    pub fn new(stores: StoreSet, clock: Arc<dyn Clock>) -> Self {
        let audit = AuditRecorder::new(stores.audit.clone(), clock.clone());
        Self { stores, audit, clock }
    }

    fn student(&self, usn: &StudentRef) -> Result<Student, LifecycleError> {
        self.stores.students.get_student(usn).map_err(|e| match e {
            StoreError::NotFound(_) => LifecycleError::StudentNotFound(usn.clone()),
            other => LifecycleError::Store(other),
        })
    }

    /// Insert or replace a student profile.
    pub fn upsert_student(&self, student: &Student, actor: &ActorRef) -> Result<(), LifecycleError> {
        self.stores.students.put_student(student)?;
        self.audit.record(
            AuditAction::StudentUpserted,
            EntityType::Student,
            student.usn.to_string(),
            actor,
            metadata([("student_usn", student.usn.as_str())]),
        );
        tracing::debug!(student = %student.usn, "upserted student");
        Ok(())
    }

    /// Insert or replace the record for `(student, semester)`.
    pub fn upsert_record(
        &self,
        record: AcademicRecord,
        actor: &ActorRef,
    ) -> Result<AcademicRecord, LifecycleError> {
        if !self.stores.students.student_exists(&record.student)? {
            return Err(LifecycleError::StudentNotFound(record.student.clone()));
        }
        let mut record = record;
        record.updated_at = self.clock.now();
        self.stores.records.upsert_record(&record)?;

        let semester = record.semester.to_string();
        let sgpa = record.sgpa.to_string();
        let cgpa = record.cgpa.to_string();
        self.audit.record(
            AuditAction::RecordUpserted,
            EntityType::AcademicRecord,
            format!("{}/{}", record.student, record.semester),
            actor,
            metadata([
                ("student_usn", record.student.as_str()),
                ("semester", semester.as_str()),
                ("sgpa", sgpa.as_str()),
                ("cgpa", cgpa.as_str()),
            ]),
        );
        tracing::debug!(student = %record.student, semester = %record.semester, "upserted academic record");
        Ok(record)
    }

    pub fn summary(&self, usn: &StudentRef) -> Result<StudentSummary, LifecycleError> {
        let student = self.student(usn)?;
        let records = self.stores.records.records_for_student(usn)?;
        let current_cgpa = latest_record(&records).map(|r| r.cgpa);
        Ok(StudentSummary {
            student,
            records,
            current_cgpa,
        })
    }

    /// A student's requests, newest first.
    pub fn history(&self, usn: &StudentRef) -> Result<Vec<CertificationRequest>, LifecycleError> {
        self.student(usn)?;
        Ok(self.stores.requests.requests_for_student(usn)?)
    }
}
