//! Bulk load of student profiles and academic records from a TOML file.
//!
//! ```toml
//! [[students]]
//! usn = "1GT20CS001"
//! name = "Asha Rao"
//! email = "asha@example.edu"
//! major = "Computer Science"
//!
//! [[students.records]]
//! semester = 1
//! sgpa = "8.40"
//! cgpa = "8.40"
//! subjects = [{ name = "Mathematics I", mark = 86 }]
//! ```

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use transcript_lifecycle::{LifecycleError, RecordsService};
use transcript_types::params::SUBJECT_SLOTS;
use transcript_types::{
    AcademicRecord, ActorRef, GradePoint, Semester, Student, StudentRef, SubjectMark, TranscriptError,
};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read import file: {0}")]
    Read(#[from] std::io::Error),
    #[error("invalid import file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("{usn}: {source}")]
    Invalid { usn: String, source: TranscriptError },
    #[error("{usn} semester {semester}: more than {} subjects", SUBJECT_SLOTS)]
    TooManySubjects { usn: String, semester: u8 },
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}

#[derive(Debug, Deserialize)]
struct ImportFile {
    #[serde(default)]
    students: Vec<StudentEntry>,
}

#[derive(Debug, Deserialize)]
struct StudentEntry {
    usn: String,
    name: String,
    email: String,
    major: String,
    #[serde(default)]
    records: Vec<RecordEntry>,
}

#[derive(Debug, Deserialize)]
struct RecordEntry {
    semester: u8,
    sgpa: String,
    cgpa: String,
    #[serde(default)]
    subjects: Vec<SubjectEntry>,
}

#[derive(Debug, Deserialize)]
struct SubjectEntry {
    name: String,
    mark: u16,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub students: usize,
    pub records: usize,
}

/// Parsed and validated contents of an import file.
struct Batch(Vec<(Student, Vec<AcademicRecord>)>);

fn parse(contents: &str) -> Result<Batch, ImportError> {
    let file: ImportFile = toml::from_str(contents)?;
    let mut out = Vec::with_capacity(file.students.len());
    for entry in file.students {
        let invalid = |source| ImportError::Invalid {
            usn: entry.usn.clone(),
            source,
        };
        let usn = StudentRef::parse(&entry.usn).map_err(invalid)?;
        let student = Student::new(usn.clone(), &entry.name, &entry.email, &entry.major).map_err(invalid)?;

        let mut records = Vec::with_capacity(entry.records.len());
        for r in &entry.records {
            if r.subjects.len() > SUBJECT_SLOTS {
                return Err(ImportError::TooManySubjects {
                    usn: entry.usn.clone(),
                    semester: r.semester,
                });
            }
            let semester = Semester::new(r.semester).map_err(invalid)?;
            let sgpa: GradePoint = r.sgpa.parse().map_err(invalid)?;
            let cgpa: GradePoint = r.cgpa.parse().map_err(invalid)?;
            let mut record = AcademicRecord::new(usn.clone(), semester, sgpa, cgpa);
            for s in &r.subjects {
                record.push_subject(SubjectMark::new(&s.name, s.mark).map_err(invalid)?);
            }
            records.push(record);
        }
        out.push((student, records));
    }
    Ok(Batch(out))
}

/// Validate the whole file first, then apply it. Nothing is written if any
/// entry is malformed.
pub fn import_str(
    contents: &str,
    records: &RecordsService,
    actor: &ActorRef,
) -> Result<ImportSummary, ImportError> {
    let Batch(entries) = parse(contents)?;
    let mut summary = ImportSummary::default();
    for (student, student_records) in entries {
        records.upsert_student(&student, actor)?;
        summary.students += 1;
        for record in student_records {
            records.upsert_record(record, actor)?;
            summary.records += 1;
        }
        tracing::info!(student = %student.usn, "imported student");
    }
    Ok(summary)
}

pub fn import_file(
    path: &Path,
    records: &RecordsService,
    actor: &ActorRef,
) -> Result<ImportSummary, ImportError> {
    let contents = std::fs::read_to_string(path)?;
    import_str(&contents, records, actor)
}
