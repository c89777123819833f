//! Batch coordinator.
//!
//! Applies one decision to many requests. Items are independent: each one
//! goes through the same conditional update as a single decision, and a
//! failed item never affects the others. Items run on a dedicated rayon pool
//! so a large batch cannot monopolise the global pool.

use std::collections::HashSet;
use std::sync::Arc;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use transcript_types::params::validate_rejection_reason;
use transcript_types::{ActorRef, AuditAction, RequestId};

use crate::{ErrorKind, LifecycleError, RequestStateMachine};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BatchVerb {
    ApproveAll,
    RejectAll { reason: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchOutcome {
    pub request_id: RequestId,
    pub result: Result<(), ErrorKind>,
}

/// Per-item outcomes, in input order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub outcomes: Vec<BatchOutcome>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

pub struct BatchCoordinator {
    machine: Arc<RequestStateMachine>,
    pool: ThreadPool,
}

impl BatchCoordinator {
    pub fn new(machine: Arc<RequestStateMachine>, parallelism: usize) -> Result<Self, ThreadPoolBuildError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(parallelism.max(1))
            .thread_name(|i| format!("batch-{i}"))
            .build()?;
        Ok(Self { machine, pool })
    }

    pub fn run(&self, ids: &[RequestId], verb: &BatchVerb, actor: &ActorRef) -> BatchReport {
        let mut seen = HashSet::with_capacity(ids.len());
        let unique: Vec<RequestId> = ids.iter().copied().filter(|id| seen.insert(*id)).collect();

        // A shared reason is checked once; if it is unusable no request is touched.
        let reason = match verb {
            BatchVerb::ApproveAll => None,
            BatchVerb::RejectAll { reason } => match validate_rejection_reason(reason) {
                Ok(r) => Some(r),
                Err(e) => {
                    let kind = LifecycleError::from(e).kind();
                    return BatchReport {
                        outcomes: unique
                            .into_iter()
                            .map(|request_id| BatchOutcome {
                                request_id,
                                result: Err(kind),
                            })
                            .collect(),
                    };
                }
            },
        };

        let outcomes: Vec<BatchOutcome> = self.pool.install(|| {
            unique
                .par_iter()
                .map(|id| {
                    let result = match &reason {
                        None => self
                            .machine
                            .approve_as(id, actor, AuditAction::BulkApproved)
                            .map(|_| ()),
                        Some(reason) => {
                            self.machine
                                .reject_as(id, actor, reason.clone(), AuditAction::BulkRejected)
                        }
                    };
                    if let Err(e) = &result {
                        tracing::warn!(request = %id, error = %e, "batch item failed");
                    }
                    BatchOutcome {
                        request_id: *id,
                        result: result.map_err(|e| e.kind()),
                    }
                })
                .collect()
        });

        let report = BatchReport { outcomes };
        tracing::info!(
            actor = %actor,
            items = report.outcomes.len(),
            succeeded = report.succeeded(),
            failed = report.failed(),
            "batch decision finished"
        );
        report
    }
}
