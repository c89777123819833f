//! Cryptographic primitives for transcript issuance.
//!
//! - **Verification codes**: 128 bits from the OS CSPRNG, base32-encoded
//! - **Blake2b** digests of rendered certificate artifacts

pub mod code;
pub mod hash;

pub use code::{generate_verification_code, is_well_formed, CodeSource, OsCodeSource, CODE_LEN};
pub use hash::{artifact_digest, blake2b_256};
