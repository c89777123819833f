//! The storage handles the lifecycle works against.

use std::sync::Arc;

use transcript_store::{AcademicRecordStore, AuditStore, ObjectStore, RequestStore, StudentStore};

#[derive(Clone)]
pub struct StoreSet {
    pub requests: Arc<dyn RequestStore>,
    pub students: Arc<dyn StudentStore>,
    pub records: Arc<dyn AcademicRecordStore>,
    pub audit: Arc<dyn AuditStore>,
    pub objects: Arc<dyn ObjectStore>,
}

impl StoreSet {
    /// Use one backend that implements every store trait.
    pub fn shared<S>(store: Arc<S>) -> Self
    where
        S: RequestStore + StudentStore + AcademicRecordStore + AuditStore + ObjectStore + 'static,
    {
        Self {
            requests: store.clone(),
            students: store.clone(),
            records: store.clone(),
            audit: store.clone(),
            objects: store,
        }
    }
}
