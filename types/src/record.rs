//! Students and their per-semester academic records.

use crate::params::{
    MAX_GRADE_HUNDREDTHS, MAX_MARK, MAX_SEMESTER, MAX_STUDENT_FIELD_CHARS, MAX_SUBJECT_NAME_CHARS,
    SUBJECT_SLOTS,
};
use crate::{StudentRef, Timestamp, TranscriptError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Semester number, always within `1..=8`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Semester(u8);

impl Semester {
    pub fn new(n: u8) -> Result<Self, TranscriptError> {
        if n == 0 || n > MAX_SEMESTER {
            return Err(TranscriptError::InvalidSemester(n));
        }
        Ok(Self(n))
    }

    pub fn get(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for Semester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A grade point average on the 0.00–10.00 scale, held in hundredths.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GradePoint(u16);

impl GradePoint {
    pub const ZERO: Self = Self(0);

    pub fn from_hundredths(hundredths: u16) -> Result<Self, TranscriptError> {
        if hundredths > MAX_GRADE_HUNDREDTHS {
            return Err(TranscriptError::InvalidGradePoint(format!(
                "{}.{:02}",
                hundredths / 100,
                hundredths % 100
            )));
        }
        Ok(Self(hundredths))
    }

    /// Round a float to the nearest hundredth and validate the range.
    pub fn from_f64(value: f64) -> Result<Self, TranscriptError> {
        if !value.is_finite() || !(0.0..=10.0).contains(&value) {
            return Err(TranscriptError::InvalidGradePoint(value.to_string()));
        }
        Self::from_hundredths((value * 100.0).round() as u16)
    }

    pub fn hundredths(&self) -> u16 {
        self.0
    }

    pub fn as_f64(&self) -> f64 {
        f64::from(self.0) / 100.0
    }
}

impl fmt::Display for GradePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl FromStr for GradePoint {
    type Err = TranscriptError;

    /// Parse `"8"`, `"8.5"` or `"8.75"`. More than two decimals is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TranscriptError::InvalidGradePoint(s.to_string());
        let trimmed = s.trim();
        let (whole, frac) = match trimmed.split_once('.') {
            Some((w, f)) => (w, f),
            None => (trimmed, ""),
        };
        if whole.is_empty() || frac.len() > 2 {
            return Err(invalid());
        }
        if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let whole: u16 = whole.parse().map_err(|_| invalid())?;
        let frac: u16 = match frac.len() {
            0 => 0,
            1 => frac.parse::<u16>().map_err(|_| invalid())? * 10,
            _ => frac.parse().map_err(|_| invalid())?,
        };
        let hundredths = whole
            .checked_mul(100)
            .and_then(|w| w.checked_add(frac))
            .ok_or_else(invalid)?;
        Self::from_hundredths(hundredths)
    }
}

/// One (subject, mark) pair on a record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectMark {
    pub name: String,
    pub mark: u16,
}

impl SubjectMark {
    pub fn new(name: &str, mark: u16) -> Result<Self, TranscriptError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TranscriptError::EmptySubjectName);
        }
        if name.chars().count() > MAX_SUBJECT_NAME_CHARS {
            return Err(TranscriptError::FieldTooLong {
                field: "subject name",
                max: MAX_SUBJECT_NAME_CHARS,
            });
        }
        if mark > MAX_MARK {
            return Err(TranscriptError::InvalidMark(mark));
        }
        Ok(Self {
            name: name.to_string(),
            mark,
        })
    }
}

/// A student's results for one semester, keyed by `(student, semester)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcademicRecord {
    pub student: StudentRef,
    pub semester: Semester,
    pub sgpa: GradePoint,
    pub cgpa: GradePoint,
    pub subjects: [Option<SubjectMark>; SUBJECT_SLOTS],
    pub updated_at: Timestamp,
}

impl AcademicRecord {
    pub fn new(student: StudentRef, semester: Semester, sgpa: GradePoint, cgpa: GradePoint) -> Self {
        Self {
            student,
            semester,
            sgpa,
            cgpa,
            subjects: Default::default(),
            updated_at: Timestamp::EPOCH,
        }
    }

    /// Fill the next free subject slot. Returns `false` when all slots are used.
    pub fn push_subject(&mut self, subject: SubjectMark) -> bool {
        match self.subjects.iter_mut().find(|slot| slot.is_none()) {
            Some(slot) => {
                *slot = Some(subject);
                true
            }
            None => false,
        }
    }

    /// Populated subject pairs, in slot order.
    pub fn populated_subjects(&self) -> impl Iterator<Item = &SubjectMark> {
        self.subjects.iter().flatten()
    }
}

/// Pick the record with the highest semester; its CGPA is the "current CGPA".
pub fn latest_record(records: &[AcademicRecord]) -> Option<&AcademicRecord> {
    records.iter().max_by_key(|r| r.semester)
}

/// Student identity fields printed on certificates and verification results.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub usn: StudentRef,
    pub name: String,
    pub email: String,
    /// Program / major.
    pub major: String,
}

impl Student {
    pub fn new(usn: StudentRef, name: &str, email: &str, major: &str) -> Result<Self, TranscriptError> {
        let field = |value: &str, label: &'static str| {
            let v = value.trim();
            if v.is_empty() {
                Err(TranscriptError::EmptyStudentField(label))
            } else if v.chars().count() > MAX_STUDENT_FIELD_CHARS {
                Err(TranscriptError::FieldTooLong {
                    field: label,
                    max: MAX_STUDENT_FIELD_CHARS,
                })
            } else {
                Ok(v.to_string())
            }
        };
        Ok(Self {
            usn,
            name: field(name, "name")?,
            email: field(email, "email")?,
            major: field(major, "major")?,
        })
    }
}
