//! Nullable code source: predictable verification codes.

use std::sync::atomic::{AtomicU64, Ordering};
use transcript_crypto::CodeSource;
use transcript_types::VerificationCode;

/// Hands out codes from a fixed script, then falls back to a counter.
///
/// Codes keep the production shape (26 lowercase base32 characters) so
/// anything that checks well-formedness still accepts them.
pub struct NullCodeSource {
    scripted: Vec<VerificationCode>,
    issued: AtomicU64,
}

impl NullCodeSource {
    /// Counter-only source: `aaaa…0001`, `aaaa…0002`, …
    pub fn sequential() -> Self {
        Self::scripted(Vec::new())
    }

    /// Return `codes` in order, then continue with counter codes.
    pub fn scripted(codes: Vec<VerificationCode>) -> Self {
        Self {
            scripted: codes,
            issued: AtomicU64::new(0),
        }
    }

    /// Same code for every call. Useful for provoking collisions.
    pub fn constant(code: VerificationCode) -> Self {
        Self::scripted(vec![code; 1024])
    }

    /// How many codes have been handed out.
    pub fn issued(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }
}

fn counter_code(n: u64) -> VerificationCode {
    // Digits 0 and 2 are not in the code alphabet; map them onto letters.
    let digits: String = format!("{n:010}")
        .chars()
        .map(|c| match c {
            '0' => 'x',
            '2' => 'z',
            other => other,
        })
        .collect();
    VerificationCode::new(format!("aaaaaaaaaaaaaaaa{digits}"))
}

impl CodeSource for NullCodeSource {
    fn next_code(&self) -> VerificationCode {
        let n = self.issued.fetch_add(1, Ordering::SeqCst);
        match self.scripted.get(n as usize) {
            Some(code) => code.clone(),
            None => counter_code(n + 1),
        }
    }
}
