//! Certification request status machine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a certification request.
///
/// `Pending` is the only initial state. `Approved` and `Rejected` are terminal:
/// no transition ever leaves them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestStatus {
    /// Submitted by the student, awaiting a COE decision.
    Pending,
    /// Approved; a certificate was rendered and a verification code issued.
    Approved,
    /// Rejected with a reason; no document exists.
    Rejected,
}

impl RequestStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Whether `self -> next` is a legal transition.
    pub fn can_transition_to(&self, next: RequestStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Approved) | (Self::Pending, Self::Rejected)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [RequestStatus; 3] = [
        RequestStatus::Pending,
        RequestStatus::Approved,
        RequestStatus::Rejected,
    ];

    #[test]
    fn only_pending_has_outgoing_transitions() {
        for from in ALL {
            for to in ALL {
                let expected = from == RequestStatus::Pending && to != RequestStatus::Pending;
                assert_eq!(from.can_transition_to(to), expected, "{from} -> {to}");
            }
        }
    }

    #[test]
    fn terminal_states() {
        assert!(!RequestStatus::Pending.is_terminal());
        assert!(RequestStatus::Approved.is_terminal());
        assert!(RequestStatus::Rejected.is_terminal());
    }
}
