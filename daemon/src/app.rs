//! Assemble the service graph from a config and a set of stores.

use std::sync::Arc;

use transcript_crypto::{CodeSource, OsCodeSource};
use transcript_lifecycle::{BatchCoordinator, IssuanceSettings, RecordsService, RequestStateMachine, StoreSet};
use transcript_render::PdfCertificateRenderer;
use transcript_rpc::{AppState, RpcMetrics};
use transcript_store_lmdb::LmdbEnvironment;
use transcript_types::{Clock, SystemClock};
use transcript_verification::VerificationService;

use crate::config::DaemonConfig;

/// Every service the daemon and its subcommands use.
pub struct Services {
    pub machine: Arc<RequestStateMachine>,
    pub batch: Arc<BatchCoordinator>,
    pub records: Arc<RecordsService>,
    pub verification: Arc<VerificationService>,
    pub stores: StoreSet,
}

/// Open (or create) the LMDB environment and wrap its stores.
pub fn open_stores(config: &DaemonConfig) -> anyhow::Result<StoreSet> {
    let env = LmdbEnvironment::open(&config.data_dir, config.map_size_bytes())?;
    Ok(StoreSet {
        requests: Arc::new(env.request_store()),
        students: Arc::new(env.student_store()),
        records: Arc::new(env.record_store()),
        audit: Arc::new(env.audit_store()),
        objects: Arc::new(env.object_store()),
    })
}

impl Services {
    pub fn build(
        config: &DaemonConfig,
        stores: StoreSet,
        codes: Arc<dyn CodeSource>,
        clock: Arc<dyn Clock>,
    ) -> anyhow::Result<Self> {
        config.validate()?;
        let renderer = Arc::new(PdfCertificateRenderer::new(config.institution(), codes));
        let machine = Arc::new(RequestStateMachine::new(
            stores.clone(),
            renderer,
            clock.clone(),
            IssuanceSettings {
                public_base_url: config.public_base_url.clone(),
            },
        ));
        let batch = Arc::new(BatchCoordinator::new(machine.clone(), config.batch_parallelism)?);
        let records = Arc::new(RecordsService::new(stores.clone(), clock));
        let verification = Arc::new(VerificationService::new(
            stores.requests.clone(),
            stores.students.clone(),
            stores.records.clone(),
        ));
        Ok(Self {
            machine,
            batch,
            records,
            verification,
            stores,
        })
    }

    /// Production wiring: LMDB, OS randomness, wall clock.
    pub fn production(config: &DaemonConfig) -> anyhow::Result<Self> {
        let stores = open_stores(config)?;
        Self::build(config, stores, Arc::new(OsCodeSource), Arc::new(SystemClock))
    }

    pub fn app_state(&self, config: &DaemonConfig) -> anyhow::Result<AppState> {
        Ok(AppState {
            machine: self.machine.clone(),
            batch: self.batch.clone(),
            records: self.records.clone(),
            verification: self.verification.clone(),
            objects: self.stores.objects.clone(),
            metrics: Arc::new(RpcMetrics::new()?),
            audit_page_default: config.audit_page_default,
        })
    }
}
