//! Verification code generation.
//!
//! Code format: base32(16 random bytes) = 26 characters.
//! Base32 alphabet: `13456789abcdefghijkmnopqrstuwxyz` (avoids visually
//! ambiguous 0/O, 2/Z, l/I, v), so a code printed on paper can be retyped.
//!
//! Codes are drawn from the operating system CSPRNG and carry no structure:
//! they are never derived from request ids, student ids, or time.

use rand::rngs::OsRng;
use rand::RngCore;
use transcript_types::VerificationCode;

/// Base32 alphabet (32 chars, avoids visually ambiguous 0/O, 2/Z, l/I, v).
const BASE32_ALPHABET: &[u8; 32] = b"13456789abcdefghijkmnopqrstuwxyz";

/// Entropy per code, in bytes (128 bits).
pub const CODE_ENTROPY_BYTES: usize = 16;

/// Encoded code length (128 bits → ceil(128/5) = 26).
pub const CODE_LEN: usize = 26;

/// Encode a byte slice as base32 using the code alphabet.
fn encode_base32(bytes: &[u8]) -> String {
    let total_bits = bytes.len() * 8;
    let num_chars = total_bits.div_ceil(5);
    let mut result = String::with_capacity(num_chars);

    let mut buffer: u64 = 0;
    let mut bits_in_buffer = 0;

    for &byte in bytes {
        buffer = (buffer << 8) | byte as u64;
        bits_in_buffer += 8;
        while bits_in_buffer >= 5 {
            bits_in_buffer -= 5;
            let idx = ((buffer >> bits_in_buffer) & 0x1F) as usize;
            result.push(BASE32_ALPHABET[idx] as char);
        }
    }
    // Remaining bits (padded with zeros on the right).
    if bits_in_buffer > 0 {
        let idx = ((buffer << (5 - bits_in_buffer)) & 0x1F) as usize;
        result.push(BASE32_ALPHABET[idx] as char);
    }

    result
}

/// Generate a fresh verification code from the OS CSPRNG.
pub fn generate_verification_code() -> VerificationCode {
    let mut entropy = [0u8; CODE_ENTROPY_BYTES];
    OsRng.fill_bytes(&mut entropy);
    VerificationCode::new(encode_base32(&entropy))
}

/// Whether `code` has the shape of an issued code.
///
/// Only used for diagnostics. Lookups must answer the same way for malformed
/// and unknown codes.
pub fn is_well_formed(code: &str) -> bool {
    code.len() == CODE_LEN && code.bytes().all(|b| BASE32_ALPHABET.contains(&b))
}

/// Source of verification codes.
///
/// The renderer draws codes through this trait so tests can substitute a
/// deterministic sequence.
pub trait CodeSource: Send + Sync {
    fn next_code(&self) -> VerificationCode;
}

/// Production code source backed by the OS CSPRNG.
#[derive(Clone, Copy, Debug, Default)]
pub struct OsCodeSource;

impl CodeSource for OsCodeSource {
    fn next_code(&self) -> VerificationCode {
        generate_verification_code()
    }
}
