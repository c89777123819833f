//! The certificate renderer.

use std::sync::Arc;

use transcript_crypto::CodeSource;
use transcript_types::params::CERTIFICATE_CONTENT_TYPE;
use transcript_utils::{format_long_date, pdf_date};

use crate::layout::{layout, Footer};
use crate::pdf::{write_document, DocumentInfo};
use crate::{CertificateInput, InstitutionProfile, RenderError, RenderedCertificate};

/// Produces a certificate document bound to a fresh verification code.
pub trait CertificateRenderer: Send + Sync {
    fn render(&self, input: &CertificateInput) -> Result<RenderedCertificate, RenderError>;
}

/// Renders transcripts as PDF documents.
pub struct PdfCertificateRenderer {
    profile: InstitutionProfile,
    codes: Arc<dyn CodeSource>,
}

impl PdfCertificateRenderer {
    pub fn new(profile: InstitutionProfile, codes: Arc<dyn CodeSource>) -> Self {
        Self { profile, codes }
    }

    pub fn profile(&self) -> &InstitutionProfile {
        &self.profile
    }
}

impl CertificateRenderer for PdfCertificateRenderer {
    fn render(&self, input: &CertificateInput) -> Result<RenderedCertificate, RenderError> {
        let code = self.codes.next_code();
        let footer = Footer {
            verify_url: input.verify_url(&code),
            code: code.as_str().to_string(),
            generated_on: format_long_date(input.issued_at),
        };
        let pages = layout(&self.profile, &input.student, &input.records, &footer)?;
        let info = DocumentInfo {
            title: format!("{} - {}", self.profile.subtitle, input.student.usn),
            producer: self.profile.name.clone(),
            creation_date: pdf_date(input.issued_at),
        };
        let bytes = write_document(&pages, self.profile.page, &info);

        tracing::debug!(
            request = %input.request_id,
            student = %input.student.usn,
            pages = pages.len(),
            size = bytes.len(),
            "rendered certificate"
        );
        Ok(RenderedCertificate {
            code,
            bytes,
            content_type: CERTIFICATE_CONTENT_TYPE,
            pages: pages.len(),
        })
    }
}
