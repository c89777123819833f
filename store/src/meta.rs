//! Schema bookkeeping.

use crate::StoreError;

/// Tracks the on-disk schema version so older databases can be migrated.
pub trait MetaStore {
    /// Stored schema version; 0 for a fresh database.
    fn schema_version(&self) -> Result<u32, StoreError>;

    fn set_schema_version(&self, version: u32) -> Result<(), StoreError>;
}
