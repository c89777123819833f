//! Audit log storage trait.

use crate::StoreError;
use transcript_types::AuditLogEntry;

/// Append-only audit storage. There is deliberately no update or delete.
pub trait AuditStore: Send + Sync {
    fn append(&self, entry: &AuditLogEntry) -> Result<(), StoreError>;

    /// Entries in reverse append order (newest first), skipping `offset`.
    fn latest(&self, offset: usize, limit: usize) -> Result<Vec<AuditLogEntry>, StoreError>;

    fn audit_count(&self) -> Result<u64, StoreError>;
}
