//! Audit recorder.
//!
//! Entries are appended after the change they describe is persisted. A
//! failed append is logged and swallowed: the transition it describes
//! stands.

use std::collections::BTreeMap;
use std::sync::Arc;

use transcript_store::{AuditStore, StoreError};
use transcript_types::{
    ActorRef, AuditAction, AuditEntryId, AuditLogEntry, Clock, EntityType,
};

#[derive(Clone)]
pub struct AuditRecorder {
    store: Arc<dyn AuditStore>,
    clock: Arc<dyn Clock>,
}

impl AuditRecorder {
    pub fn new(store: Arc<dyn AuditStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn record(
        &self,
        action: AuditAction,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        actor: &ActorRef,
        metadata: BTreeMap<String, String>,
    ) {
        let entry = AuditLogEntry {
            id: AuditEntryId::new_random(),
            action,
            entity_type,
            entity_id: entity_id.into(),
            actor: actor.clone(),
            created_at: self.clock.now(),
            metadata,
        };
        if let Err(e) = self.store.append(&entry) {
            tracing::warn!(
                action = entry.action.label(),
                entity = %entry.entity_id,
                error = %e,
                "failed to append audit entry"
            );
        }
    }

    /// Newest first.
    pub fn latest(&self, offset: usize, limit: usize) -> Result<Vec<AuditLogEntry>, StoreError> {
        self.store.latest(offset, limit)
    }

    pub fn count(&self) -> Result<u64, StoreError> {
        self.store.audit_count()
    }
}

/// Build audit metadata from `(key, value)` pairs.
pub(crate) fn metadata<const N: usize>(pairs: [(&str, &str); N]) -> BTreeMap<String, String> {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
