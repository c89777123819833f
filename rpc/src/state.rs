//! Shared handler state.

use std::sync::Arc;

use transcript_lifecycle::{BatchCoordinator, RecordsService, RequestStateMachine};
use transcript_store::ObjectStore;
use transcript_verification::VerificationService;

use crate::RpcMetrics;

#[derive(Clone)]
pub struct AppState {
    pub machine: Arc<RequestStateMachine>,
    pub batch: Arc<BatchCoordinator>,
    pub records: Arc<RecordsService>,
    pub verification: Arc<VerificationService>,
    pub objects: Arc<dyn ObjectStore>,
    pub metrics: Arc<RpcMetrics>,
    /// Audit page size when the caller gives no `count`.
    pub audit_page_default: usize,
}
