use thiserror::Error;
use transcript_store::StoreError;

/// Why a lookup did not produce a valid result. Never shown to callers.
#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("no approved request for this code")]
    NotFound,

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
