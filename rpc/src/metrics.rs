//! Prometheus metrics for the HTTP surface.
//!
//! [`RpcMetrics`] owns a dedicated [`Registry`] that `GET /metrics` encodes
//! into the text exposition format.

use prometheus::{
    register_int_counter_vec_with_registry, register_int_counter_with_registry, Encoder,
    IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};

pub struct RpcMetrics {
    pub registry: Registry,

    /// Requests accepted into the review queue.
    pub requests_submitted: IntCounter,
    pub requests_approved: IntCounter,
    pub requests_rejected: IntCounter,
    /// Decisions that failed, whether single or batch items.
    pub decisions_failed: IntCounter,
    /// Verification lookups, labelled `outcome="valid"|"invalid"`.
    pub verification_lookups: IntCounterVec,
}

impl RpcMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let requests_submitted = register_int_counter_with_registry!(
            Opts::new(
                "transcript_requests_submitted_total",
                "Certification requests submitted"
            ),
            registry
        )?;
        let requests_approved = register_int_counter_with_registry!(
            Opts::new(
                "transcript_requests_approved_total",
                "Certification requests approved"
            ),
            registry
        )?;
        let requests_rejected = register_int_counter_with_registry!(
            Opts::new(
                "transcript_requests_rejected_total",
                "Certification requests rejected"
            ),
            registry
        )?;
        let decisions_failed = register_int_counter_with_registry!(
            Opts::new(
                "transcript_decisions_failed_total",
                "Approve or reject attempts that failed"
            ),
            registry
        )?;
        let verification_lookups = register_int_counter_vec_with_registry!(
            Opts::new(
                "transcript_verification_lookups_total",
                "Public verification lookups by outcome"
            ),
            &["outcome"],
            registry
        )?;

        Ok(Self {
            registry,
            requests_submitted,
            requests_approved,
            requests_rejected,
            decisions_failed,
            verification_lookups,
        })
    }

    pub fn record_lookup(&self, valid: bool) {
        let outcome = if valid { "valid" } else { "invalid" };
        self.verification_lookups.with_label_values(&[outcome]).inc();
    }

    /// Text exposition of every registered metric.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
