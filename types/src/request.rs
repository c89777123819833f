//! Certification requests and the decisions applied to them.

use crate::{
    ActorRef, DocumentRef, RequestId, RequestStatus, StudentRef, Timestamp, TranscriptError,
    VerificationCode,
};
use serde::{Deserialize, Serialize};

/// A student's request for a certified transcript.
///
/// `verification_code` and `document_ref` are present iff the request is
/// `Approved`; `rejection_reason` is present iff it is `Rejected`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificationRequest {
    pub id: RequestId,
    pub student: StudentRef,
    pub status: RequestStatus,
    pub requested_at: Timestamp,
    /// Insertion sequence assigned by the store; breaks `requested_at` ties.
    pub sequence: u64,
    pub decided_at: Option<Timestamp>,
    pub decided_by: Option<ActorRef>,
    pub verification_code: Option<VerificationCode>,
    pub document_ref: Option<DocumentRef>,
    pub rejection_reason: Option<String>,
}

/// What the officer decided.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DecisionOutcome {
    Approve {
        code: VerificationCode,
        document: DocumentRef,
    },
    Reject {
        reason: String,
    },
}

/// A decision to apply to a pending request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decision {
    pub decided_at: Timestamp,
    pub decided_by: ActorRef,
    pub outcome: DecisionOutcome,
}

impl Decision {
    pub fn target_status(&self) -> RequestStatus {
        match self.outcome {
            DecisionOutcome::Approve { .. } => RequestStatus::Approved,
            DecisionOutcome::Reject { .. } => RequestStatus::Rejected,
        }
    }
}

impl CertificationRequest {
    pub fn new_pending(id: RequestId, student: StudentRef, requested_at: Timestamp) -> Self {
        Self {
            id,
            student,
            status: RequestStatus::Pending,
            requested_at,
            sequence: 0,
            decided_at: None,
            decided_by: None,
            verification_code: None,
            document_ref: None,
            rejection_reason: None,
        }
    }

    /// Apply a decision in place.
    ///
    /// Fails with the current status, leaving `self` untouched, when the
    /// request is not `Pending`.
    pub fn apply(&mut self, decision: &Decision) -> Result<(), RequestStatus> {
        let next = decision.target_status();
        if !self.status.can_transition_to(next) {
            return Err(self.status);
        }
        self.status = next;
        self.decided_at = Some(decision.decided_at);
        self.decided_by = Some(decision.decided_by.clone());
        match &decision.outcome {
            DecisionOutcome::Approve { code, document } => {
                self.verification_code = Some(code.clone());
                self.document_ref = Some(document.clone());
            }
            DecisionOutcome::Reject { reason } => {
                self.rejection_reason = Some(reason.clone());
            }
        }
        Ok(())
    }

    /// Check that the optional fields match the status exactly.
    pub fn check_invariants(&self) -> Result<(), TranscriptError> {
        let violation = |msg: &str| Err(TranscriptError::InvariantViolation(format!("{}: {msg}", self.id)));
        let decided = self.decided_at.is_some() && self.decided_by.is_some();
        let approved_fields = self.verification_code.is_some() && self.document_ref.is_some();
        let any_approved_field = self.verification_code.is_some() || self.document_ref.is_some();
        match self.status {
            RequestStatus::Pending => {
                if self.decided_at.is_some() || self.decided_by.is_some() {
                    return violation("pending request carries decision metadata");
                }
                if any_approved_field || self.rejection_reason.is_some() {
                    return violation("pending request carries outcome fields");
                }
            }
            RequestStatus::Approved => {
                if !decided || !approved_fields || self.rejection_reason.is_some() {
                    return violation("approved request fields do not match status");
                }
            }
            RequestStatus::Rejected => {
                if !decided || any_approved_field || self.rejection_reason.is_none() {
                    return violation("rejected request fields do not match status");
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending() -> CertificationRequest {
        CertificationRequest::new_pending(
            RequestId::new_random(),
            StudentRef::parse("1GT20CS001").unwrap(),
            Timestamp::new(100),
        )
    }

    fn approve() -> Decision {
        Decision {
            decided_at: Timestamp::new(200),
            decided_by: ActorRef::parse("coe").unwrap(),
            outcome: DecisionOutcome::Approve {
                code: VerificationCode::new("abc"),
                document: DocumentRef {
                    name: "n".into(),
                    url: "u".into(),
                    digest: "d".into(),
                    content_type: "application/pdf".into(),
                    size: 1,
                },
            },
        }
    }

    fn reject() -> Decision {
        Decision {
            decided_at: Timestamp::new(200),
            decided_by: ActorRef::parse("coe").unwrap(),
            outcome: DecisionOutcome::Reject {
                reason: "pending fees".into(),
            },
        }
    }

    #[test]
    fn approve_sets_outcome_fields() {
        let mut req = pending();
        req.apply(&approve()).unwrap();
        assert_eq!(req.status, RequestStatus::Approved);
        assert!(req.verification_code.is_some());
        assert!(req.document_ref.is_some());
        assert!(req.rejection_reason.is_none());
        req.check_invariants().unwrap();
    }

    #[test]
    fn reject_sets_reason_only() {
        let mut req = pending();
        req.apply(&reject()).unwrap();
        assert_eq!(req.status, RequestStatus::Rejected);
        assert_eq!(req.rejection_reason.as_deref(), Some("pending fees"));
        assert!(req.verification_code.is_none());
        req.check_invariants().unwrap();
    }

    #[test]
    fn terminal_requests_refuse_second_decision_unchanged() {
        let mut req = pending();
        req.apply(&reject()).unwrap();
        let before = req.clone();
        assert_eq!(req.apply(&approve()), Err(RequestStatus::Rejected));
        assert_eq!(req, before);
    }

    #[test]
    fn invariant_check_catches_mismatched_fields() {
        let mut req = pending();
        req.rejection_reason = Some("stray reason".into());
        assert!(req.check_invariants().is_err());
    }
}
