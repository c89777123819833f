//! Certification request lifecycle.
//!
//! A request starts `Pending` and is decided exactly once, becoming
//! `Approved` or `Rejected`. Approval renders a certificate bound to a fresh
//! verification code and stores it before the status flips; every
//! transition is followed by one audit entry.
//!
//! - [`RequestStateMachine`]: submit, approve, reject, list, get
//! - [`BatchCoordinator`]: apply one decision to many requests, each isolated
//! - [`AuditRecorder`]: best-effort append to the audit trail
//! - [`RecordsService`]: student profiles, academic records, student views

pub mod audit;
pub mod batch;
pub mod error;
pub mod machine;
pub mod records;
pub mod stores;

pub use audit::AuditRecorder;
pub use batch::{BatchCoordinator, BatchOutcome, BatchReport, BatchVerb};
pub use error::{ErrorKind, LifecycleError};
pub use machine::{ApprovalResult, IssuanceSettings, PendingItem, RequestStateMachine};
pub use records::{RecordsService, StudentSummary};
pub use stores::StoreSet;
