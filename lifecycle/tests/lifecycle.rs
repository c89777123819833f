//! End-to-end lifecycle tests against the in-memory and LMDB stores.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Barrier, Mutex};

use transcript_crypto::{is_well_formed, OsCodeSource};
use transcript_lifecycle::{
    BatchCoordinator, BatchVerb, ErrorKind, IssuanceSettings, LifecycleError, RecordsService,
    RequestStateMachine, StoreSet,
};
use transcript_nullables::{NullClock, NullCodeSource, NullStore};
use transcript_render::{
    CertificateInput, CertificateRenderer, InstitutionProfile, PdfCertificateRenderer,
    RenderError, RenderedCertificate,
};
use transcript_store::{AuditStore, ObjectStore, RequestStore};
use transcript_types::{
    AcademicRecord, ActorRef, AuditAction, GradePoint, RequestId, RequestStatus, Semester,
    Student, StudentRef, SubjectMark,
};

// 2026-10-19T08:30:00Z
const NOW: u64 = 1_792_398_600;

struct Harness {
    store: Arc<NullStore>,
    clock: Arc<NullClock>,
    machine: Arc<RequestStateMachine>,
    records: RecordsService,
}

fn settings() -> IssuanceSettings {
    IssuanceSettings {
        public_base_url: "https://transcripts.example.edu".to_string(),
    }
}

fn harness_with(renderer: Arc<dyn CertificateRenderer>) -> Harness {
    let store = Arc::new(NullStore::new());
    let clock = Arc::new(NullClock::new(NOW));
    let stores = StoreSet::shared(store.clone());
    let machine = Arc::new(RequestStateMachine::new(stores.clone(), renderer, clock.clone(), settings()));
    let records = RecordsService::new(stores, clock.clone());
    Harness { store, clock, machine, records }
}

fn harness() -> Harness {
    harness_with(Arc::new(PdfCertificateRenderer::new(
        InstitutionProfile::default(),
        Arc::new(OsCodeSource),
    )))
}

fn usn(s: &str) -> StudentRef {
    StudentRef::parse(s).unwrap()
}

fn coe() -> ActorRef {
    ActorRef::parse("coe-office").unwrap()
}

/// Enrol a student with records for semesters `1..=semesters`.
fn enrol(h: &Harness, id: &str, semesters: u8) -> StudentRef {
    let student = Student::new(usn(id), "Asha Rao", "asha@example.edu", "B.Tech CSE").unwrap();
    h.records.upsert_student(&student, &coe()).unwrap();
    for sem in 1..=semesters {
        let mut record = AcademicRecord::new(
            student.usn.clone(),
            Semester::new(sem).unwrap(),
            GradePoint::from_hundredths(800 + u16::from(sem) * 10).unwrap(),
            GradePoint::from_hundredths(780 + u16::from(sem) * 10).unwrap(),
        );
        record.push_subject(SubjectMark::new("Algorithms", 88).unwrap());
        h.records.upsert_record(record, &coe()).unwrap();
    }
    student.usn
}

fn status(h: &Harness, id: &RequestId) -> RequestStatus {
    h.machine.get(id).unwrap().status
}

fn audit_actions(h: &Harness) -> Vec<AuditAction> {
    h.store.latest(0, 1000).unwrap().into_iter().map(|e| e.action).collect()
}

struct BrokenRenderer;

impl CertificateRenderer for BrokenRenderer {
    fn render(&self, _input: &CertificateInput) -> Result<RenderedCertificate, RenderError> {
        Err(RenderError::Layout("no fonts".to_string()))
    }
}

/// Parks the first render call until the test releases it; later calls
/// pass straight through.
struct GatedRenderer {
    inner: PdfCertificateRenderer,
    calls: AtomicUsize,
    entered: Mutex<Sender<()>>,
    release: Mutex<Receiver<()>>,
}

/// Returns the renderer, a receiver that fires once the first render is
/// parked, and a sender that lets it continue.
fn gated_renderer() -> (Arc<GatedRenderer>, Receiver<()>, Sender<()>) {
    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let renderer = Arc::new(GatedRenderer {
        inner: PdfCertificateRenderer::new(InstitutionProfile::default(), Arc::new(OsCodeSource)),
        calls: AtomicUsize::new(0),
        entered: Mutex::new(entered_tx),
        release: Mutex::new(release_rx),
    });
    (renderer, entered_rx, release_tx)
}

impl CertificateRenderer for GatedRenderer {
    fn render(&self, input: &CertificateInput) -> Result<RenderedCertificate, RenderError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            self.entered.lock().unwrap().send(()).unwrap();
            self.release.lock().unwrap().recv().unwrap();
        }
        self.inner.render(input)
    }
}

// ---------------------------------------------------------------------------
// Submit
// ---------------------------------------------------------------------------

#[test]
fn submit_creates_pending_request_and_audits_it() {
    let h = harness();
    let student = enrol(&h, "1GT20CS001", 2);
    let id = h.machine.submit(&student).unwrap();

    let request = h.machine.get(&id).unwrap();
    assert_eq!(request.status, RequestStatus::Pending);
    assert_eq!(request.requested_at.as_secs(), NOW);
    assert!(request.verification_code.is_none());
    assert_eq!(audit_actions(&h)[0], AuditAction::Submitted);
}

#[test]
fn submit_for_unknown_student_fails() {
    let h = harness();
    let err = h.machine.submit(&usn("GHOST")).unwrap_err();
    assert!(matches!(err, LifecycleError::StudentNotFound(_)));
    assert_eq!(h.store.request_count().unwrap(), 0);
}

#[test]
fn second_pending_request_is_refused_until_decided() {
    let h = harness();
    let student = enrol(&h, "1GT20CS001", 1);
    let first = h.machine.submit(&student).unwrap();

    let err = h.machine.submit(&student).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicatePendingRequest);

    h.machine.reject(&first, &coe(), "transcript fee unpaid").unwrap();
    let second = h.machine.submit(&student).unwrap();
    assert_ne!(first, second);
}

// ---------------------------------------------------------------------------
// Approve / reject
// ---------------------------------------------------------------------------

#[test]
fn approval_issues_code_stores_artifact_and_audits_once() {
    let h = harness();
    let student = enrol(&h, "1GT20CS001", 3);
    let id = h.machine.submit(&student).unwrap();
    h.clock.advance(3600);

    let result = h.machine.approve(&id, &coe()).unwrap();
    assert_eq!(result.request_id, id);
    assert!(result.verification_code.len() >= 22);
    assert!(is_well_formed(result.verification_code.as_str()));
    assert_eq!(result.decided_at.as_secs(), NOW + 3600);

    let request = h.machine.get(&id).unwrap();
    assert_eq!(request.status, RequestStatus::Approved);
    assert_eq!(request.verification_code.as_ref(), Some(&result.verification_code));
    assert_eq!(request.decided_by.as_ref(), Some(&coe()));
    assert_eq!(request.document_ref.as_ref(), Some(&result.document_ref));

    let doc = &result.document_ref;
    assert_eq!(
        doc.name,
        format!("1GT20CS001/certificate_{id}_{}.pdf", result.verification_code)
    );
    assert_eq!(doc.url, format!("https://transcripts.example.edu/certificates/{}", doc.name));
    let object = h.store.get_object(&doc.name).unwrap();
    assert!(object.bytes.starts_with(b"%PDF"));
    assert_eq!(object.content_type, "application/pdf");
    assert_eq!(doc.digest, transcript_crypto::artifact_digest(&object.bytes));
    assert_eq!(doc.size, object.bytes.len() as u64);

    let entries = h.store.latest(0, 10).unwrap();
    let approvals: Vec<_> = entries.iter().filter(|e| e.action == AuditAction::Approved).collect();
    assert_eq!(approvals.len(), 1);
    assert_eq!(approvals[0].entity_id, id.to_string());
    assert_eq!(approvals[0].metadata["student_usn"], "1GT20CS001");
    assert_eq!(approvals[0].metadata["verification_code"], result.verification_code.as_str());
    assert_eq!(approvals[0].action.label(), "Approved certification request");

    assert_eq!(h.store.find_by_code(result.verification_code.as_str()).unwrap().unwrap().id, id);
}

#[test]
fn approved_codes_are_unique_across_requests() {
    let h = harness();
    let mut codes = std::collections::HashSet::new();
    for i in 0..10 {
        let student = enrol(&h, &format!("1GT20CS{i:03}"), 1);
        let id = h.machine.submit(&student).unwrap();
        let result = h.machine.approve(&id, &coe()).unwrap();
        assert!(codes.insert(result.verification_code));
    }
}

#[test]
fn short_reason_is_refused_and_request_stays_pending() {
    let h = harness();
    let student = enrol(&h, "1GT20CS001", 1);
    let id = h.machine.submit(&student).unwrap();

    let err = h.machine.reject(&id, &coe(), "123456789").unwrap_err();
    assert!(matches!(err, LifecycleError::ReasonTooShort { len: 9 }));
    let err = h.machine.reject(&id, &coe(), "   short      ").unwrap_err();
    assert!(matches!(err, LifecycleError::ReasonTooShort { len: 5 }));
    assert_eq!(status(&h, &id), RequestStatus::Pending);
}

#[test]
fn rejection_records_trimmed_reason_and_audits() {
    let h = harness();
    let student = enrol(&h, "1GT20CS001", 1);
    let id = h.machine.submit(&student).unwrap();

    h.machine.reject(&id, &coe(), "  pending fees  ").unwrap();
    let request = h.machine.get(&id).unwrap();
    assert_eq!(request.status, RequestStatus::Rejected);
    assert_eq!(request.rejection_reason.as_deref(), Some("pending fees"));
    assert!(request.verification_code.is_none());

    let entry = &h.store.latest(0, 1).unwrap()[0];
    assert_eq!(entry.action, AuditAction::Rejected);
    assert_eq!(entry.metadata["reason"], "pending fees");
}

#[test]
fn decided_requests_are_terminal() {
    let h = harness();
    let student = enrol(&h, "1GT20CS001", 1);
    let id = h.machine.submit(&student).unwrap();
    h.machine.reject(&id, &coe(), "pending fees").unwrap();

    let err = h.machine.approve(&id, &coe()).unwrap_err();
    assert!(matches!(err, LifecycleError::InvalidTransition { status: RequestStatus::Rejected }));
    let err = h.machine.reject(&id, &coe(), "a different reason").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidTransition);
    assert_eq!(h.machine.get(&id).unwrap().rejection_reason.as_deref(), Some("pending fees"));
    assert_eq!(h.store.object_count().unwrap(), 0);
}

#[test]
fn unknown_request_is_not_found() {
    let h = harness();
    let id = RequestId::new_random();
    assert!(matches!(h.machine.approve(&id, &coe()), Err(LifecycleError::RequestNotFound(_))));
    assert!(matches!(
        h.machine.reject(&id, &coe(), "pending fees"),
        Err(LifecycleError::RequestNotFound(_))
    ));
}

#[test]
fn storage_failure_leaves_pending_and_retry_stores_one_artifact() {
    let h = harness();
    let student = enrol(&h, "1GT20CS001", 2);
    let id = h.machine.submit(&student).unwrap();

    h.store.fail_next_object_puts(1);
    let err = h.machine.approve(&id, &coe()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StorageFailure);
    assert_eq!(status(&h, &id), RequestStatus::Pending);
    assert_eq!(h.store.object_count().unwrap(), 0);
    assert!(!audit_actions(&h).contains(&AuditAction::Approved));

    let result = h.machine.approve(&id, &coe()).unwrap();
    assert_eq!(status(&h, &id), RequestStatus::Approved);
    assert_eq!(h.store.object_count().unwrap(), 1);
    assert_eq!(h.store.object_names(), vec![result.document_ref.name]);
}

#[test]
fn render_failure_leaves_pending() {
    let h = harness_with(Arc::new(BrokenRenderer));
    let student = enrol(&h, "1GT20CS001", 1);
    let id = h.machine.submit(&student).unwrap();

    let err = h.machine.approve(&id, &coe()).unwrap_err();
    assert!(matches!(err, LifecycleError::RenderFailure(_)));
    assert_eq!(status(&h, &id), RequestStatus::Pending);
    assert_eq!(h.store.object_count().unwrap(), 0);
}

#[test]
fn audit_outage_does_not_roll_back_decisions() {
    let h = harness();
    let student = enrol(&h, "1GT20CS001", 1);
    let id = h.machine.submit(&student).unwrap();
    let before = h.store.audit_count().unwrap();

    h.store.set_audit_down(true);
    h.machine.approve(&id, &coe()).unwrap();
    assert_eq!(status(&h, &id), RequestStatus::Approved);
    assert_eq!(h.store.audit_count().unwrap(), before);
}

#[test]
fn racing_approve_and_reject_have_one_winner() {
    for _ in 0..20 {
        let h = harness();
        let student = enrol(&h, "1GT20CS001", 1);
        let id = h.machine.submit(&student).unwrap();
        let barrier = Arc::new(Barrier::new(2));

        let approver = {
            let machine = h.machine.clone();
            let barrier = barrier.clone();
            std::thread::spawn(move || {
                barrier.wait();
                machine.approve(&id, &coe()).map(|_| RequestStatus::Approved)
            })
        };
        let rejecter = {
            let machine = h.machine.clone();
            let barrier = barrier.clone();
            std::thread::spawn(move || {
                barrier.wait();
                machine.reject(&id, &coe(), "pending fees").map(|_| RequestStatus::Rejected)
            })
        };
        let results = [approver.join().unwrap(), rejecter.join().unwrap()];

        let winners: Vec<RequestStatus> = results.iter().filter_map(|r| r.as_ref().ok().copied()).collect();
        assert_eq!(winners.len(), 1, "{results:?}");
        let loser = results.iter().find_map(|r| r.as_ref().err()).unwrap();
        assert_eq!(loser.kind(), ErrorKind::InvalidTransition);

        let request = h.machine.get(&id).unwrap();
        assert_eq!(request.status, winners[0]);
        request.check_invariants().unwrap();
        let decisions = audit_actions(&h)
            .into_iter()
            .filter(|a| matches!(a, AuditAction::Approved | AuditAction::Rejected))
            .count();
        assert_eq!(decisions, 1);
        let expected_objects = u64::from(winners[0] == RequestStatus::Approved);
        assert_eq!(h.store.object_count().unwrap(), expected_objects);
    }
}

#[test]
fn slower_approval_cannot_replace_the_winning_certificate() {
    let (renderer, entered, release) = gated_renderer();
    let h = harness_with(renderer);
    let student = enrol(&h, "1GT20CS001", 2);
    let id = h.machine.submit(&student).unwrap();

    let slow = {
        let machine = h.machine.clone();
        std::thread::spawn(move || machine.approve(&id, &coe()))
    };
    entered.recv().unwrap();

    let winner = h.machine.approve(&id, &coe()).unwrap();
    release.send(()).unwrap();
    let err = slow.join().unwrap().unwrap_err();
    assert!(matches!(err, LifecycleError::InvalidTransition { status: RequestStatus::Approved }));

    let request = h.machine.get(&id).unwrap();
    assert_eq!(request.verification_code.as_ref(), Some(&winner.verification_code));
    assert_eq!(request.document_ref.as_ref(), Some(&winner.document_ref));

    assert_eq!(h.store.object_names(), vec![winner.document_ref.name.clone()]);
    let object = h.store.get_object(&winner.document_ref.name).unwrap();
    assert_eq!(winner.document_ref.digest, transcript_crypto::artifact_digest(&object.bytes));
    let printed = object
        .bytes
        .windows(winner.verification_code.len())
        .any(|w| w == winner.verification_code.as_str().as_bytes());
    assert!(printed, "stored certificate should carry the winning code");
}

#[test]
fn approval_that_loses_to_rejection_leaves_no_artifact() {
    let (renderer, entered, release) = gated_renderer();
    let h = harness_with(renderer);
    let student = enrol(&h, "1GT20CS001", 1);
    let id = h.machine.submit(&student).unwrap();

    let slow = {
        let machine = h.machine.clone();
        std::thread::spawn(move || machine.approve(&id, &coe()))
    };
    entered.recv().unwrap();

    h.machine.reject(&id, &coe(), "pending fees").unwrap();
    release.send(()).unwrap();
    let err = slow.join().unwrap().unwrap_err();
    assert!(matches!(err, LifecycleError::InvalidTransition { status: RequestStatus::Rejected }));

    assert_eq!(status(&h, &id), RequestStatus::Rejected);
    assert_eq!(h.store.object_count().unwrap(), 0);
    assert!(!audit_actions(&h).contains(&AuditAction::Approved));
}

// ---------------------------------------------------------------------------
// Review queue and student views
// ---------------------------------------------------------------------------

#[test]
fn pending_queue_is_oldest_first_with_student_details() {
    let h = harness();
    let a = enrol(&h, "A1", 1);
    let b = enrol(&h, "B1", 1);
    let c = enrol(&h, "C1", 1);
    let first = h.machine.submit(&b).unwrap();
    h.clock.advance(10);
    let second = h.machine.submit(&a).unwrap();
    h.clock.advance(10);
    let third = h.machine.submit(&c).unwrap();
    h.machine.reject(&second, &coe(), "pending fees").unwrap();

    let queue = h.machine.list_pending(50).unwrap();
    let ids: Vec<_> = queue.iter().map(|p| p.request.id).collect();
    assert_eq!(ids, vec![first, third]);
    assert_eq!(queue[0].student_name, "Asha Rao");
    assert_eq!(queue[0].student_email, "asha@example.edu");
    assert_eq!(h.machine.list_pending(1).unwrap().len(), 1);
}

#[test]
fn summary_reports_cgpa_of_highest_semester() {
    let h = harness();
    let student = enrol(&h, "1GT20CS001", 4);
    let summary = h.records.summary(&student).unwrap();
    let sems: Vec<u8> = summary.records.iter().map(|r| r.semester.get()).collect();
    assert_eq!(sems, vec![1, 2, 3, 4]);
    assert_eq!(summary.current_cgpa.unwrap().to_string(), "8.20");
}

#[test]
fn records_require_a_known_student() {
    let h = harness();
    let record = AcademicRecord::new(
        usn("GHOST"),
        Semester::new(1).unwrap(),
        GradePoint::from_hundredths(900).unwrap(),
        GradePoint::from_hundredths(900).unwrap(),
    );
    assert!(matches!(
        h.records.upsert_record(record, &coe()),
        Err(LifecycleError::StudentNotFound(_))
    ));
    assert!(matches!(h.records.history(&usn("GHOST")), Err(LifecycleError::StudentNotFound(_))));
}

#[test]
fn history_is_newest_first() {
    let h = harness();
    let student = enrol(&h, "1GT20CS001", 1);
    let first = h.machine.submit(&student).unwrap();
    h.machine.reject(&first, &coe(), "pending fees").unwrap();
    h.clock.advance(60);
    let second = h.machine.submit(&student).unwrap();

    let ids: Vec<_> = h.records.history(&student).unwrap().into_iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![second, first]);
}

// ---------------------------------------------------------------------------
// Batch decisions
// ---------------------------------------------------------------------------

fn three_pending(h: &Harness) -> Vec<RequestId> {
    ["1GT20CS001", "1GT20CS002", "1GT20CS003"]
        .iter()
        .map(|id| {
            let student = enrol(h, id, 1);
            h.clock.advance(1);
            h.machine.submit(&student).unwrap()
        })
        .collect()
}

#[test]
fn batch_reject_isolates_an_item_decided_out_of_band() {
    let h = harness();
    let ids = three_pending(&h);
    h.machine.approve(&ids[1], &coe()).unwrap();

    let batch = BatchCoordinator::new(h.machine.clone(), 4).unwrap();
    let report = batch.run(
        &ids,
        &BatchVerb::RejectAll {
            reason: "pending fees".to_string(),
        },
        &coe(),
    );

    let got: Vec<_> = report.outcomes.iter().map(|o| (o.request_id, o.result)).collect();
    assert_eq!(
        got,
        vec![
            (ids[0], Ok(())),
            (ids[1], Err(ErrorKind::InvalidTransition)),
            (ids[2], Ok(())),
        ]
    );
    assert_eq!(report.succeeded(), 2);
    assert_eq!(report.failed(), 1);

    for id in [ids[0], ids[2]] {
        let request = h.machine.get(&id).unwrap();
        assert_eq!(request.status, RequestStatus::Rejected);
        assert_eq!(request.rejection_reason.as_deref(), Some("pending fees"));
    }
    assert_eq!(status(&h, &ids[1]), RequestStatus::Approved);

    let bulk = audit_actions(&h)
        .into_iter()
        .filter(|a| *a == AuditAction::BulkRejected)
        .count();
    assert_eq!(bulk, 2);
}

#[test]
fn batch_with_short_reason_touches_nothing() {
    let h = harness();
    let ids = three_pending(&h);
    let batch = BatchCoordinator::new(h.machine.clone(), 2).unwrap();
    let report = batch.run(&ids, &BatchVerb::RejectAll { reason: "too short".into() }, &coe());

    assert!(report.outcomes.iter().all(|o| o.result == Err(ErrorKind::ReasonTooShort)));
    assert!(ids.iter().all(|id| status(&h, id) == RequestStatus::Pending));
}

#[test]
fn batch_approve_deduplicates_and_keeps_input_order() {
    let h = harness();
    let ids = three_pending(&h);
    let unknown = RequestId::new_random();
    let input = vec![ids[2], ids[0], ids[2], unknown, ids[1], ids[0]];

    let batch = BatchCoordinator::new(h.machine.clone(), 3).unwrap();
    let report = batch.run(&input, &BatchVerb::ApproveAll, &coe());

    let order: Vec<_> = report.outcomes.iter().map(|o| o.request_id).collect();
    assert_eq!(order, vec![ids[2], ids[0], unknown, ids[1]]);
    assert_eq!(report.outcomes[2].result, Err(ErrorKind::RequestNotFound));
    assert_eq!(report.succeeded(), 3);
    assert!(ids.iter().all(|id| status(&h, id) == RequestStatus::Approved));
    assert_eq!(h.store.object_count().unwrap(), 3);
    assert_eq!(
        audit_actions(&h).into_iter().filter(|a| *a == AuditAction::BulkApproved).count(),
        3
    );
}

#[test]
fn batch_survives_a_failing_item() {
    let h = harness();
    let ids = three_pending(&h);
    h.store.fail_next_object_puts(1);

    let batch = BatchCoordinator::new(h.machine.clone(), 1).unwrap();
    let report = batch.run(&ids, &BatchVerb::ApproveAll, &coe());
    assert_eq!(report.succeeded(), 2);
    assert_eq!(report.failed(), 1);
    let failed = report.outcomes.iter().find(|o| o.result.is_err()).unwrap();
    assert_eq!(failed.result, Err(ErrorKind::StorageFailure));
    assert_eq!(status(&h, &failed.request_id), RequestStatus::Pending);
}

// ---------------------------------------------------------------------------
// LMDB backend
// ---------------------------------------------------------------------------

#[test]
fn lifecycle_runs_on_lmdb() {
    let dir = tempfile::tempdir().unwrap();
    let env = transcript_store_lmdb::LmdbEnvironment::open(dir.path(), 32 * 1024 * 1024).unwrap();
    let stores = StoreSet {
        requests: Arc::new(env.request_store()),
        students: Arc::new(env.student_store()),
        records: Arc::new(env.record_store()),
        audit: Arc::new(env.audit_store()),
        objects: Arc::new(env.object_store()),
    };
    let clock = Arc::new(NullClock::new(NOW));
    let renderer = Arc::new(PdfCertificateRenderer::new(
        InstitutionProfile::default(),
        Arc::new(NullCodeSource::sequential()),
    ));
    let machine = Arc::new(RequestStateMachine::new(stores.clone(), renderer, clock.clone(), settings()));
    let records = RecordsService::new(stores.clone(), clock);

    let student = Student::new(usn("1GT20CS001"), "Asha Rao", "asha@example.edu", "B.Tech CSE").unwrap();
    records.upsert_student(&student, &coe()).unwrap();
    let id = machine.submit(&student.usn).unwrap();

    let barrier = Arc::new(Barrier::new(2));
    let handles: Vec<_> = (0..2)
        .map(|_| {
            let machine = machine.clone();
            let barrier = barrier.clone();
            std::thread::spawn(move || {
                barrier.wait();
                machine.approve(&id, &coe())
            })
        })
        .collect();
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let winners: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
    assert_eq!(winners.len(), 1);
    assert!(results.iter().any(|r| matches!(r, Err(LifecycleError::InvalidTransition { .. }))));

    let request = machine.get(&id).unwrap();
    assert_eq!(request.verification_code.as_ref(), Some(&winners[0].verification_code));
    assert_eq!(stores.objects.object_count().unwrap(), 1);
}
