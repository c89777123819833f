//! Append-only audit log entries.

use crate::{ActorRef, AuditEntryId, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kind of entity an audit entry refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    CertificationRequest,
    AcademicRecord,
    Student,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CertificationRequest => "certification_request",
            Self::AcademicRecord => "academic_record",
            Self::Student => "student",
        }
    }
}

/// Descriptive labels for state-changing actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuditAction {
    Submitted,
    Approved,
    Rejected,
    BulkApproved,
    BulkRejected,
    StudentUpserted,
    RecordUpserted,
}

impl AuditAction {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Submitted => "Submitted certification request",
            Self::Approved => "Approved certification request",
            Self::Rejected => "Rejected certification request",
            Self::BulkApproved => "Bulk approved certification request",
            Self::BulkRejected => "Bulk rejected certification request",
            Self::StudentUpserted => "Upserted student profile",
            Self::RecordUpserted => "Upserted academic record",
        }
    }
}

/// One immutable audit record. Never edited or deleted once appended.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub id: AuditEntryId,
    pub action: AuditAction,
    pub entity_type: EntityType,
    pub entity_id: String,
    pub actor: ActorRef,
    pub created_at: Timestamp,
    pub metadata: BTreeMap<String, String>,
}
