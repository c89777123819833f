//! HTTP API for transcript issuance.
//!
//! Provides endpoints for:
//! - Public verification of issued codes
//! - Student request submission and history
//! - COE review: pending queue, approve, reject, batch decisions
//! - Student profile and academic record maintenance
//! - Audit trail, certificate download, Prometheus metrics
//!
//! Callers are identified by the `x-student-ref` / `x-actor-ref` headers set
//! by the fronting identity provider. The synchronous core runs on tokio's
//! blocking pool.

pub mod error;
pub mod handlers;
pub mod metrics;
pub mod pagination;
pub mod server;
pub mod state;

pub use error::RpcError;
pub use metrics::RpcMetrics;
pub use server::{router, RpcServer};
pub use state::AppState;
