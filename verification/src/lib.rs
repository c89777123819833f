//! Public verification lookup.
//!
//! Anyone holding a verification code can ask whether it belongs to a
//! genuinely approved transcript. The answer is either the student's
//! identity and standing, or a bare `valid: false`. Empty, malformed,
//! unknown and not-yet-approved codes are indistinguishable from outside.

pub mod error;
pub mod service;

pub use error::VerificationError;
pub use service::{VerificationResult, VerificationService, MAX_CODE_INPUT_LEN};
