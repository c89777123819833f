//! Request state machine.
//!
//! `Pending -> Approved | Rejected`, both terminal. The status check and the
//! status write happen inside [`RequestStore::decide`], so concurrent
//! decisions on one request produce exactly one winner; the loser sees
//! [`LifecycleError::InvalidTransition`].
//!
//! Approval order: render, store the artifact, flip the status, audit. A
//! render or storage failure aborts before the flip and leaves the request
//! `Pending`. Every attempt stores under a name that includes its own
//! verification code, so attempts never overwrite each other. An attempt
//! that loses the status flip deletes its artifact before returning.
//!
//! [`RequestStore::decide`]: transcript_store::RequestStore::decide

use std::sync::Arc;

use transcript_crypto::artifact_digest;
use transcript_render::{CertificateInput, CertificateRenderer};
use transcript_store::StoreError;
use transcript_types::params::validate_rejection_reason;
use transcript_types::{
    ActorRef, AuditAction, CertificationRequest, Clock, Decision, DecisionOutcome, DocumentRef,
    EntityType, RequestId, RequestStatus, StudentRef, Timestamp, VerificationCode,
};

use crate::audit::{metadata, AuditRecorder};
use crate::{LifecycleError, StoreSet};

/// Where issued certificates are published.
#[derive(Clone, Debug)]
pub struct IssuanceSettings {
    /// Public base URL, e.g. `https://transcripts.example.edu`.
    pub public_base_url: String,
}

impl IssuanceSettings {
    fn base(&self) -> &str {
        self.public_base_url.trim_end_matches('/')
    }

    /// Object-store key of one approval attempt's certificate.
    pub fn document_name(&self, student: &StudentRef, id: &RequestId, code: &VerificationCode) -> String {
        format!("{student}/certificate_{id}_{code}.pdf")
    }

    pub fn document_url(&self, name: &str) -> String {
        format!("{}/certificates/{name}", self.base())
    }
}

/// What a successful approval produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApprovalResult {
    pub request_id: RequestId,
    pub verification_code: VerificationCode,
    pub document_ref: DocumentRef,
    pub decided_at: Timestamp,
}

/// A pending request with the details a reviewer needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingItem {
    pub request: CertificationRequest,
    pub student_name: String,
    pub student_email: String,
}

pub struct RequestStateMachine {
    stores: StoreSet,
    renderer: Arc<dyn CertificateRenderer>,
    audit: AuditRecorder,
    clock: Arc<dyn Clock>,
    settings: IssuanceSettings,
}

/// Translate a failed conditional update.
fn decide_error(id: RequestId) -> impl Fn(StoreError) -> LifecycleError {
    move |e| match e {
        StoreError::StatusConflict { current } => LifecycleError::InvalidTransition { status: current },
        StoreError::NotFound(_) => LifecycleError::RequestNotFound(id),
        other => LifecycleError::Store(other),
    }
}

impl RequestStateMachine {
    pub fn new(
        stores: StoreSet,
        renderer: Arc<dyn CertificateRenderer>,
        clock: Arc<dyn Clock>,
        settings: IssuanceSettings,
    ) -> Self {
        let audit = AuditRecorder::new(stores.audit.clone(), clock.clone());
        Self {
            stores,
            renderer,
            audit,
            clock,
            settings,
        }
    }

    pub fn audit(&self) -> &AuditRecorder {
        &self.audit
    }

    pub fn settings(&self) -> &IssuanceSettings {
        &self.settings
    }

    /// Open a new `Pending` request for `student`.
    pub fn submit(&self, student: &StudentRef) -> Result<RequestId, LifecycleError> {
        if !self.stores.students.student_exists(student)? {
            return Err(LifecycleError::StudentNotFound(student.clone()));
        }
        let request =
            CertificationRequest::new_pending(RequestId::new_random(), student.clone(), self.clock.now());
        let stored = self
            .stores
            .requests
            .insert_pending(&request)
            .map_err(|e| match e {
                StoreError::Duplicate(_) => LifecycleError::DuplicatePendingRequest(student.clone()),
                other => LifecycleError::Store(other),
            })?;

        let actor = ActorRef::parse(student.as_str())?;
        self.audit.record(
            AuditAction::Submitted,
            EntityType::CertificationRequest,
            stored.id.to_string(),
            &actor,
            metadata([("student_usn", student.as_str())]),
        );
        tracing::info!(request = %stored.id, student = %student, "submitted certification request");
        Ok(stored.id)
    }

    pub fn get(&self, id: &RequestId) -> Result<CertificationRequest, LifecycleError> {
        self.stores.requests.get_request(id).map_err(|e| match e {
            StoreError::NotFound(_) => LifecycleError::RequestNotFound(*id),
            other => LifecycleError::Store(other),
        })
    }

    /// Pending requests, oldest first, with the student's name and email.
    pub fn list_pending(&self, limit: usize) -> Result<Vec<PendingItem>, LifecycleError> {
        let requests = self.stores.requests.pending_requests(limit)?;
        let mut items = Vec::with_capacity(requests.len());
        for request in requests {
            let (student_name, student_email) = match self.stores.students.get_student(&request.student) {
                Ok(s) => (s.name, s.email),
                Err(StoreError::NotFound(_)) => {
                    tracing::warn!(request = %request.id, student = %request.student, "pending request for unknown student");
                    (String::new(), String::new())
                }
                Err(e) => return Err(e.into()),
            };
            items.push(PendingItem {
                request,
                student_name,
                student_email,
            });
        }
        Ok(items)
    }

    pub fn approve(&self, id: &RequestId, actor: &ActorRef) -> Result<ApprovalResult, LifecycleError> {
        self.approve_as(id, actor, AuditAction::Approved)
    }

    pub fn reject(&self, id: &RequestId, actor: &ActorRef, reason: &str) -> Result<(), LifecycleError> {
        let reason = validate_rejection_reason(reason)?;
        self.reject_as(id, actor, reason, AuditAction::Rejected)
    }

    pub(crate) fn approve_as(
        &self,
        id: &RequestId,
        actor: &ActorRef,
        action: AuditAction,
    ) -> Result<ApprovalResult, LifecycleError> {
        let request = self.get(id)?;
        if request.status != RequestStatus::Pending {
            return Err(LifecycleError::InvalidTransition {
                status: request.status,
            });
        }
        let student = self
            .stores
            .students
            .get_student(&request.student)
            .map_err(|e| match e {
                StoreError::NotFound(_) => LifecycleError::StudentNotFound(request.student.clone()),
                other => LifecycleError::Store(other),
            })?;
        let records = self.stores.records.records_for_student(&request.student)?;

        let decided_at = self.clock.now();
        let input = CertificateInput {
            request_id: *id,
            student,
            records,
            issued_at: decided_at,
            verify_base_url: self.settings.public_base_url.clone(),
        };
        let rendered = self.renderer.render(&input)?;

        let name = self.settings.document_name(&request.student, id, &rendered.code);
        self.stores
            .objects
            .put_object(&name, &rendered.bytes, rendered.content_type)
            .map_err(|e| {
                tracing::warn!(request = %id, object = %name, error = %e, "certificate upload failed");
                LifecycleError::StorageFailure(e.to_string())
            })?;

        let document = DocumentRef {
            url: self.settings.document_url(&name),
            name,
            digest: artifact_digest(&rendered.bytes),
            content_type: rendered.content_type.to_string(),
            size: rendered.bytes.len() as u64,
        };
        let decision = Decision {
            decided_at,
            decided_by: actor.clone(),
            outcome: DecisionOutcome::Approve {
                code: rendered.code.clone(),
                document: document.clone(),
            },
        };
        if let Err(e) = self.stores.requests.decide(id, &decision) {
            if let Err(cleanup) = self.stores.objects.delete_object(&document.name) {
                tracing::warn!(request = %id, object = %document.name, error = %cleanup, "failed to remove unused certificate");
            }
            return Err(decide_error(*id)(e));
        }

        self.audit.record(
            action,
            EntityType::CertificationRequest,
            id.to_string(),
            actor,
            metadata([
                ("student_usn", request.student.as_str()),
                ("verification_code", rendered.code.as_str()),
            ]),
        );
        tracing::info!(
            request = %id,
            student = %request.student,
            actor = %actor,
            pages = rendered.pages,
            "approved certification request"
        );
        Ok(ApprovalResult {
            request_id: *id,
            verification_code: rendered.code,
            document_ref: document,
            decided_at,
        })
    }

    /// `reason` must already be validated.
    pub(crate) fn reject_as(
        &self,
        id: &RequestId,
        actor: &ActorRef,
        reason: String,
        action: AuditAction,
    ) -> Result<(), LifecycleError> {
        let decision = Decision {
            decided_at: self.clock.now(),
            decided_by: actor.clone(),
            outcome: DecisionOutcome::Reject {
                reason: reason.clone(),
            },
        };
        let request = self
            .stores
            .requests
            .decide(id, &decision)
            .map_err(decide_error(*id))?;

        self.audit.record(
            action,
            EntityType::CertificationRequest,
            id.to_string(),
            actor,
            metadata([("student_usn", request.student.as_str()), ("reason", reason.as_str())]),
        );
        tracing::info!(request = %id, student = %request.student, actor = %actor, "rejected certification request");
        Ok(())
    }
}
