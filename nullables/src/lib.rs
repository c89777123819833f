//! Nullable infrastructure for deterministic testing.
//!
//! Everything the issuance core touches outside itself (clock, randomness,
//! storage) sits behind a trait. This crate provides test-friendly
//! implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically, including injected failures
//! - Never touch the filesystem
//!
//! Usage: swap real implementations for nullables in tests.

pub mod clock;
pub mod code;
pub mod store;

pub use clock::NullClock;
pub use code::NullCodeSource;
pub use store::NullStore;
