//! Shared utilities for transcript issuance.

pub mod logging;
pub mod time;

pub use logging::{init_tracing, LogFormat};
pub use time::{format_long_date, format_rfc3339, pdf_date};
