//! HTTP request handlers and their wire types.

use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use transcript_lifecycle::{ApprovalResult, BatchReport, BatchVerb, PendingItem, StudentSummary};
use transcript_types::params::SUBJECT_SLOTS;
use transcript_types::{
    AcademicRecord, ActorRef, AuditLogEntry, CertificationRequest, GradePoint, RequestId,
    Semester, Student, StudentRef, SubjectMark, Timestamp,
};
use transcript_utils::format_rfc3339;
use transcript_verification::VerificationResult;

use crate::pagination::{next_cursor, PaginationMeta, PaginationParams};
use crate::{AppState, RpcError};

pub const STUDENT_HEADER: &str = "x-student-ref";
pub const ACTOR_HEADER: &str = "x-actor-ref";

/// Run synchronous core work on the blocking pool.
async fn blocking<T, F>(f: F) -> Result<T, RpcError>
where
    F: FnOnce() -> Result<T, RpcError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| RpcError::Server(format!("worker task failed: {e}")))?
}

fn header_value<'a>(headers: &'a HeaderMap, name: &'static str) -> Result<&'a str, RpcError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or(RpcError::MissingHeader(name))
}

fn actor(headers: &HeaderMap) -> Result<ActorRef, RpcError> {
    Ok(ActorRef::parse(header_value(headers, ACTOR_HEADER)?)?)
}

fn request_id(raw: &str) -> Result<RequestId, RpcError> {
    Ok(raw.parse()?)
}

fn rfc3339(ts: Option<Timestamp>) -> Option<String> {
    ts.map(format_rfc3339)
}

// ── Verification ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyRequest {
    pub code: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct VerifyResponse {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_cgpa: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval_date: Option<String>,
}

impl From<VerificationResult> for VerifyResponse {
    fn from(r: VerificationResult) -> Self {
        Self {
            valid: r.valid,
            student_name: r.student_name,
            usn: r.usn,
            program: r.program,
            latest_cgpa: r.latest_cgpa.map(|g| g.to_string()),
            approval_date: rfc3339(r.approval_date),
        }
    }
}

async fn run_verify(state: AppState, code: String) -> Result<Json<VerifyResponse>, RpcError> {
    let service = state.verification.clone();
    let result = blocking(move || Ok(service.verify(&code))).await?;
    state.metrics.record_lookup(result.valid);
    Ok(Json(result.into()))
}

pub async fn verify_path(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<VerifyResponse>, RpcError> {
    run_verify(state, code).await
}

pub async fn verify_body(
    State(state): State<AppState>,
    Json(body): Json<VerifyRequest>,
) -> Result<Json<VerifyResponse>, RpcError> {
    run_verify(state, body.code).await
}

// ── Requests ─────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct RequestView {
    pub id: String,
    pub usn: String,
    pub status: String,
    pub requested_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decided_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decided_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

impl From<CertificationRequest> for RequestView {
    fn from(r: CertificationRequest) -> Self {
        Self {
            id: r.id.to_string(),
            usn: r.student.to_string(),
            status: r.status.as_str().to_string(),
            requested_at: format_rfc3339(r.requested_at),
            decided_at: rfc3339(r.decided_at),
            decided_by: r.decided_by.map(|a| a.to_string()),
            verification_code: r.verification_code.map(|c| c.as_str().to_string()),
            document_url: r.document_ref.map(|d| d.url),
            rejection_reason: r.rejection_reason,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub request_id: String,
    pub status: String,
}

pub async fn submit(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<(StatusCode, Json<SubmitResponse>), RpcError> {
    let student = StudentRef::parse(header_value(&headers, STUDENT_HEADER)?)?;
    let machine = state.machine.clone();
    let id = blocking(move || Ok(machine.submit(&student)?)).await?;
    state.metrics.requests_submitted.inc();
    Ok((
        StatusCode::CREATED,
        Json(SubmitResponse {
            request_id: id.to_string(),
            status: "Pending".to_string(),
        }),
    ))
}

pub async fn get_request(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RequestView>, RpcError> {
    let id = request_id(&id)?;
    let machine = state.machine.clone();
    let request = blocking(move || Ok(machine.get(&id)?)).await?;
    Ok(Json(request.into()))
}

#[derive(Debug, Deserialize)]
pub struct PendingParams {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PendingView {
    pub request: RequestView,
    pub student_name: String,
    pub student_email: String,
}

impl From<PendingItem> for PendingView {
    fn from(p: PendingItem) -> Self {
        Self {
            request: p.request.into(),
            student_name: p.student_name,
            student_email: p.student_email,
        }
    }
}

pub async fn pending(
    State(state): State<AppState>,
    Query(params): Query<PendingParams>,
) -> Result<Json<Vec<PendingView>>, RpcError> {
    let limit = params.limit.unwrap_or(100).clamp(1, 1000);
    let machine = state.machine.clone();
    let items = blocking(move || Ok(machine.list_pending(limit)?)).await?;
    Ok(Json(items.into_iter().map(Into::into).collect()))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApprovalView {
    pub request_id: String,
    pub verification_code: String,
    pub document_url: String,
    pub document_digest: String,
    pub decided_at: String,
}

impl From<ApprovalResult> for ApprovalView {
    fn from(a: ApprovalResult) -> Self {
        Self {
            request_id: a.request_id.to_string(),
            verification_code: a.verification_code.as_str().to_string(),
            document_url: a.document_ref.url,
            document_digest: a.document_ref.digest,
            decided_at: format_rfc3339(a.decided_at),
        }
    }
}

pub async fn approve(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<ApprovalView>, RpcError> {
    let id = request_id(&id)?;
    let actor = actor(&headers)?;
    let machine = state.machine.clone();
    let result = blocking(move || Ok(machine.approve(&id, &actor)?)).await;
    match result {
        Ok(approval) => {
            state.metrics.requests_approved.inc();
            Ok(Json(approval.into()))
        }
        Err(e) => {
            state.metrics.decisions_failed.inc();
            Err(e)
        }
    }
}

#[derive(Deserialize)]
pub struct RejectBody {
    pub reason: String,
}

pub async fn reject(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<RejectBody>,
) -> Result<Json<RequestView>, RpcError> {
    let id = request_id(&id)?;
    let actor = actor(&headers)?;
    let machine = state.machine.clone();
    let result = blocking(move || {
        machine.reject(&id, &actor, &body.reason)?;
        Ok(machine.get(&id)?)
    })
    .await;
    match result {
        Ok(request) => {
            state.metrics.requests_rejected.inc();
            Ok(Json(request.into()))
        }
        Err(e) => {
            state.metrics.decisions_failed.inc();
            Err(e)
        }
    }
}

// ── Batch ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BatchVerbName {
    Approve,
    Reject,
}

#[derive(Deserialize)]
pub struct BatchBody {
    pub ids: Vec<String>,
    pub verb: BatchVerbName,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BatchItemView {
    pub request_id: String,
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BatchView {
    pub succeeded: usize,
    pub failed: usize,
    pub outcomes: Vec<BatchItemView>,
}

impl From<BatchReport> for BatchView {
    fn from(report: BatchReport) -> Self {
        Self {
            succeeded: report.succeeded(),
            failed: report.failed(),
            outcomes: report
                .outcomes
                .into_iter()
                .map(|o| BatchItemView {
                    request_id: o.request_id.to_string(),
                    ok: o.result.is_ok(),
                    error: o.result.err().map(|k| k.as_str().to_string()),
                })
                .collect(),
        }
    }
}

pub async fn batch(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<BatchBody>,
) -> Result<Json<BatchView>, RpcError> {
    let actor = actor(&headers)?;
    let ids = body
        .ids
        .iter()
        .map(|s| request_id(s))
        .collect::<Result<Vec<_>, _>>()?;
    let verb = match body.verb {
        BatchVerbName::Approve => BatchVerb::ApproveAll,
        BatchVerbName::Reject => BatchVerb::RejectAll {
            reason: body.reason.unwrap_or_default(),
        },
    };
    let coordinator = state.batch.clone();
    let report = blocking(move || Ok(coordinator.run(&ids, &verb, &actor))).await?;

    let decided = match body.verb {
        BatchVerbName::Approve => &state.metrics.requests_approved,
        BatchVerbName::Reject => &state.metrics.requests_rejected,
    };
    decided.inc_by(report.succeeded() as u64);
    state.metrics.decisions_failed.inc_by(report.failed() as u64);
    Ok(Json(report.into()))
}

// ── Students and records ─────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct StudentBody {
    pub name: String,
    pub email: String,
    pub major: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StudentView {
    pub usn: String,
    pub name: String,
    pub email: String,
    pub major: String,
}

impl From<Student> for StudentView {
    fn from(s: Student) -> Self {
        Self {
            usn: s.usn.to_string(),
            name: s.name,
            email: s.email,
            major: s.major,
        }
    }
}

pub async fn upsert_student(
    State(state): State<AppState>,
    Path(usn): Path<String>,
    headers: HeaderMap,
    Json(body): Json<StudentBody>,
) -> Result<Json<StudentView>, RpcError> {
    let actor = actor(&headers)?;
    let student = Student::new(StudentRef::parse(&usn)?, &body.name, &body.email, &body.major)?;
    let records = state.records.clone();
    let student = blocking(move || {
        records.upsert_student(&student, &actor)?;
        Ok(student)
    })
    .await?;
    Ok(Json(student.into()))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubjectBody {
    pub name: String,
    pub mark: u16,
}

#[derive(Debug, Deserialize)]
pub struct RecordBody {
    pub sgpa: f64,
    pub cgpa: f64,
    #[serde(default)]
    pub subjects: Vec<SubjectBody>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecordView {
    pub semester: u8,
    pub sgpa: String,
    pub cgpa: String,
    pub subjects: Vec<SubjectBody>,
}

impl From<AcademicRecord> for RecordView {
    fn from(r: AcademicRecord) -> Self {
        Self {
            semester: r.semester.get(),
            sgpa: r.sgpa.to_string(),
            cgpa: r.cgpa.to_string(),
            subjects: r
                .populated_subjects()
                .map(|s| SubjectBody {
                    name: s.name.clone(),
                    mark: s.mark,
                })
                .collect(),
        }
    }
}

pub async fn upsert_record(
    State(state): State<AppState>,
    Path((usn, semester)): Path<(String, u8)>,
    headers: HeaderMap,
    Json(body): Json<RecordBody>,
) -> Result<Json<RecordView>, RpcError> {
    let actor = actor(&headers)?;
    if body.subjects.len() > SUBJECT_SLOTS {
        return Err(RpcError::InvalidRequest(format!(
            "at most {SUBJECT_SLOTS} subjects per semester"
        )));
    }
    let mut record = AcademicRecord::new(
        StudentRef::parse(&usn)?,
        Semester::new(semester)?,
        GradePoint::from_f64(body.sgpa)?,
        GradePoint::from_f64(body.cgpa)?,
    );
    for subject in &body.subjects {
        record.push_subject(SubjectMark::new(&subject.name, subject.mark)?);
    }
    let records = state.records.clone();
    let record = blocking(move || Ok(records.upsert_record(record, &actor)?)).await?;
    Ok(Json(record.into()))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryView {
    pub student: StudentView,
    pub records: Vec<RecordView>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_cgpa: Option<String>,
}

impl From<StudentSummary> for SummaryView {
    fn from(s: StudentSummary) -> Self {
        Self {
            student: s.student.into(),
            records: s.records.into_iter().map(Into::into).collect(),
            current_cgpa: s.current_cgpa.map(|g| g.to_string()),
        }
    }
}

pub async fn student_summary(
    State(state): State<AppState>,
    Path(usn): Path<String>,
) -> Result<Json<SummaryView>, RpcError> {
    let usn = StudentRef::parse(&usn)?;
    let records = state.records.clone();
    let summary = blocking(move || Ok(records.summary(&usn)?)).await?;
    Ok(Json(summary.into()))
}

pub async fn student_requests(
    State(state): State<AppState>,
    Path(usn): Path<String>,
) -> Result<Json<Vec<RequestView>>, RpcError> {
    let usn = StudentRef::parse(&usn)?;
    let records = state.records.clone();
    let history = blocking(move || Ok(records.history(&usn)?)).await?;
    Ok(Json(history.into_iter().map(Into::into).collect()))
}

// ── Audit ────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct AuditEntryView {
    pub id: String,
    pub action: String,
    pub entity_type: String,
    pub entity_id: String,
    pub actor: String,
    pub created_at: String,
    pub metadata: std::collections::BTreeMap<String, String>,
}

impl From<AuditLogEntry> for AuditEntryView {
    fn from(e: AuditLogEntry) -> Self {
        Self {
            id: e.id.to_string(),
            action: e.action.label().to_string(),
            entity_type: e.entity_type.as_str().to_string(),
            entity_id: e.entity_id,
            actor: e.actor.to_string(),
            created_at: format_rfc3339(e.created_at),
            metadata: e.metadata,
        }
    }
}

#[derive(Serialize)]
pub struct AuditPage {
    pub entries: Vec<AuditEntryView>,
    #[serde(flatten)]
    pub page: PaginationMeta,
}

pub async fn audit(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<AuditPage>, RpcError> {
    let count = params.effective_count(state.audit_page_default);
    let offset = params.decode_offset();
    let machine = state.machine.clone();
    let entries = blocking(move || Ok(machine.audit().latest(offset, count)?)).await?;
    let cursor = next_cursor(offset, entries.len(), count);
    Ok(Json(AuditPage {
        entries: entries.into_iter().map(Into::into).collect(),
        page: PaginationMeta { cursor },
    }))
}

// ── Artifacts and metrics ────────────────────────────────────────────────

pub async fn certificate(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response, RpcError> {
    let objects = state.objects.clone();
    let object = blocking(move || Ok(objects.get_object(&name)?)).await?;
    Ok((
        [(header::CONTENT_TYPE, object.content_type)],
        Body::from(object.bytes),
    )
        .into_response())
}

pub async fn metrics(State(state): State<AppState>) -> Result<String, RpcError> {
    state
        .metrics
        .encode()
        .map_err(|e| RpcError::Server(e.to_string()))
}
