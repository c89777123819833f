//! Blake2b hashing for certificate artifacts.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};

type Blake2b256 = Blake2b<U32>;

/// Compute a 256-bit Blake2b hash of arbitrary data.
pub fn blake2b_256(data: &[u8]) -> [u8; 32] {
    Blake2b256::digest(data).into()
}

/// Hex digest recorded alongside a stored artifact.
pub fn artifact_digest(bytes: &[u8]) -> String {
    hex::encode(blake2b_256(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_deterministic_hex() {
        let a = artifact_digest(b"%PDF-1.4 sample");
        let b = artifact_digest(b"%PDF-1.4 sample");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn digest_changes_with_content() {
        assert_ne!(artifact_digest(b"hello"), artifact_digest(b"hellp"));
    }
}
