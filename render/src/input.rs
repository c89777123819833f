//! Renderer inputs and outputs.

use transcript_types::{AcademicRecord, RequestId, Student, Timestamp, VerificationCode};

/// Page geometry in PDF points.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageSize {
    pub width: u16,
    pub height: u16,
}

impl PageSize {
    pub const A4: Self = Self {
        width: 595,
        height: 842,
    };
}

impl Default for PageSize {
    fn default() -> Self {
        Self::A4
    }
}

/// Fixed text printed on every certificate.
#[derive(Clone, Debug)]
pub struct InstitutionProfile {
    pub name: String,
    pub subtitle: String,
    /// Line naming the issuing authority, e.g. "Digitally Signed by Controller of Examinations".
    pub issuer_line: String,
    pub page: PageSize,
}

impl InstitutionProfile {
    pub fn watermark(&self) -> String {
        format!("{} - VERIFIED COPY", self.name)
    }
}

impl Default for InstitutionProfile {
    fn default() -> Self {
        Self {
            name: "GITAM UNIVERSITY".to_string(),
            subtitle: "Official Academic Transcript".to_string(),
            issuer_line: "Digitally Signed by Controller of Examinations".to_string(),
            page: PageSize::A4,
        }
    }
}

/// Data bound into one certificate at approval time.
#[derive(Clone, Debug)]
pub struct CertificateInput {
    pub request_id: RequestId,
    pub student: Student,
    /// Ascending by semester.
    pub records: Vec<AcademicRecord>,
    pub issued_at: Timestamp,
    /// Public base URL; the certificate points readers at `<base>/verify/<code>`.
    pub verify_base_url: String,
}

impl CertificateInput {
    pub fn verify_url(&self, code: &VerificationCode) -> String {
        format!(
            "{}/verify/{}",
            self.verify_base_url.trim_end_matches('/'),
            code.as_str()
        )
    }
}

/// A rendered certificate and the code it is bound to.
#[derive(Clone, Debug)]
pub struct RenderedCertificate {
    pub code: VerificationCode,
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub pages: usize,
}
