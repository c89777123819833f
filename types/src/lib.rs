//! Fundamental types for certified transcript issuance.
//!
//! This crate defines the domain types shared across every other crate in the
//! workspace: identifiers, timestamps, certification requests and their status
//! machine, academic records, audit entries, and validation limits.

pub mod audit;
pub mod code;
pub mod error;
pub mod ids;
pub mod params;
pub mod record;
pub mod request;
pub mod status;
pub mod time;

pub use audit::{AuditAction, AuditLogEntry, EntityType};
pub use code::{DocumentRef, VerificationCode};
pub use error::TranscriptError;
pub use ids::{ActorRef, AuditEntryId, RequestId, StudentRef};
pub use record::{latest_record, AcademicRecord, GradePoint, Semester, Student, SubjectMark};
pub use request::{CertificationRequest, Decision, DecisionOutcome};
pub use status::RequestStatus;
pub use time::{Clock, SystemClock, Timestamp};
