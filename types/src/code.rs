//! Verification code and document reference types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque verification token bound to one approved request.
///
/// Generation lives in `transcript-crypto`; this type only carries the value.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VerificationCode(String);

impl VerificationCode {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// Only a prefix is shown in debug output so codes do not leak into logs whole.
impl fmt::Debug for VerificationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix: String = self.0.chars().take(6).collect();
        write!(f, "VerificationCode({prefix}…)")
    }
}

impl fmt::Display for VerificationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reference to a stored certificate artifact.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    /// Object-store key, e.g. `1GT20CS001/certificate_<request id>_<code>.pdf`.
    pub name: String,
    /// Public URL the artifact can be downloaded from.
    pub url: String,
    /// Hex Blake2b-256 digest of the artifact bytes.
    pub digest: String,
    pub content_type: String,
    pub size: u64,
}
