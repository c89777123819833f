//! Certificate renderer.
//!
//! Turns a student's identity and ordered academic records into a paginated
//! PDF transcript bound to a freshly issued verification code. The layout
//! engine produces positioned text; the PDF writer serializes it.

pub mod error;
pub mod input;
pub mod layout;
pub mod pdf;
pub mod renderer;

pub use error::RenderError;
pub use input::{CertificateInput, InstitutionProfile, PageSize, RenderedCertificate};
pub use renderer::{CertificateRenderer, PdfCertificateRenderer};
