//! Route-level tests driving the router with `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use transcript_lifecycle::{
    BatchCoordinator, IssuanceSettings, RecordsService, RequestStateMachine, StoreSet,
};
use transcript_nullables::{NullClock, NullStore};
use transcript_render::{InstitutionProfile, PdfCertificateRenderer};
use transcript_rpc::{router, AppState, RpcMetrics};
use transcript_verification::VerificationService;

const NOW: u64 = 1_792_398_600;

fn app() -> (Router, Arc<NullStore>) {
    let store = Arc::new(NullStore::new());
    let clock = Arc::new(NullClock::new(NOW));
    let stores = StoreSet::shared(store.clone());
    let renderer = Arc::new(PdfCertificateRenderer::new(
        InstitutionProfile::default(),
        Arc::new(transcript_crypto::OsCodeSource),
    ));
    let machine = Arc::new(RequestStateMachine::new(
        stores.clone(),
        renderer,
        clock.clone(),
        IssuanceSettings {
            public_base_url: "http://localhost:8080".into(),
        },
    ));
    let state = AppState {
        batch: Arc::new(BatchCoordinator::new(machine.clone(), 2).unwrap()),
        records: Arc::new(RecordsService::new(stores, clock)),
        verification: Arc::new(VerificationService::new(store.clone(), store.clone(), store.clone())),
        objects: store.clone(),
        metrics: Arc::new(RpcMetrics::new().unwrap()),
        machine,
        audit_page_default: 50,
    };
    (router(state), store)
}

async fn call(
    app: &Router,
    method: &str,
    uri: &str,
    headers: &[(&str, &str)],
    body: Option<Value>,
) -> (StatusCode, Vec<u8>) {
    let mut builder = Request::builder().method(method).uri(uri);
    for (k, v) in headers {
        builder = builder.header(*k, *v);
    }
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

async fn call_json(
    app: &Router,
    method: &str,
    uri: &str,
    headers: &[(&str, &str)],
    body: Option<Value>,
) -> (StatusCode, Value) {
    let (status, bytes) = call(app, method, uri, headers, body).await;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

const COE: (&str, &str) = ("x-actor-ref", "coe-office");

async fn enrol(app: &Router, usn: &str) {
    let (status, _) = call_json(
        app,
        "PUT",
        &format!("/students/{usn}"),
        &[COE],
        Some(json!({"name": "Asha Rao", "email": "asha@example.edu", "major": "B.Tech CSE"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    for (sem, cgpa) in [(1, 8.1), (2, 8.45)] {
        let (status, body) = call_json(
            app,
            "PUT",
            &format!("/students/{usn}/records/{sem}"),
            &[COE],
            Some(json!({"sgpa": cgpa, "cgpa": cgpa, "subjects": [{"name": "Algorithms", "mark": 91}]})),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
    }
}

async fn submit(app: &Router, usn: &str) -> String {
    let (status, body) = call_json(app, "POST", "/requests", &[("x-student-ref", usn)], None).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["request_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn submit_approve_download_verify() {
    let (app, _store) = app();
    enrol(&app, "1GT20CS001").await;
    let id = submit(&app, "1GT20CS001").await;

    let (status, pending) = call_json(&app, "GET", "/requests/pending", &[], None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pending[0]["request"]["id"], id.as_str());
    assert_eq!(pending[0]["student_name"], "Asha Rao");

    let (status, approval) =
        call_json(&app, "POST", &format!("/requests/{id}/approve"), &[COE], None).await;
    assert_eq!(status, StatusCode::OK, "{approval}");
    let code = approval["verification_code"].as_str().unwrap().to_string();
    assert!(code.len() >= 22);

    let url = approval["document_url"].as_str().unwrap();
    let path = url.strip_prefix("http://localhost:8080").unwrap();
    let (status, pdf) = call(&app, "GET", path, &[], None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(pdf.starts_with(b"%PDF"));

    let (status, result) = call_json(&app, "GET", &format!("/verify/{code}"), &[], None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["valid"], true);
    assert_eq!(result["usn"], "1GT20CS001");
    assert_eq!(result["program"], "B.Tech CSE");
    assert_eq!(result["latest_cgpa"], "8.45");
    assert_eq!(result["approval_date"], "2026-10-19T08:30:00Z");

    let (_, by_body) = call_json(&app, "POST", "/verify", &[], Some(json!({"code": code}))).await;
    assert_eq!(by_body, result);

    let (_, audit) = call_json(&app, "GET", "/audit", &[], None).await;
    assert_eq!(audit["entries"][0]["action"], "Approved certification request");
}

#[tokio::test]
async fn invalid_codes_reveal_nothing() {
    let (app, _store) = app();
    enrol(&app, "1GT20CS001").await;
    submit(&app, "1GT20CS001").await;
    for code in ["not-a-real-code", "%20"] {
        let (status, body) = call_json(&app, "GET", &format!("/verify/{code}"), &[], None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"valid": false}));
    }
    let (_, body) = call_json(&app, "POST", "/verify", &[], Some(json!({"code": ""}))).await;
    assert_eq!(body, json!({"valid": false}));
}

#[tokio::test]
async fn decision_errors_map_to_statuses() {
    let (app, _store) = app();
    enrol(&app, "1GT20CS001").await;
    let id = submit(&app, "1GT20CS001").await;

    let (status, body) = call_json(&app, "POST", "/requests", &[("x-student-ref", "1GT20CS001")], None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "duplicate_pending_request");

    let (status, body) = call_json(
        &app,
        "POST",
        &format!("/requests/{id}/reject"),
        &[COE],
        Some(json!({"reason": "too short"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "reason_too_short");

    let (status, body) = call_json(
        &app,
        "POST",
        &format!("/requests/{id}/reject"),
        &[COE],
        Some(json!({"reason": "pending fees"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Rejected");
    assert_eq!(body["rejection_reason"], "pending fees");

    let (status, body) =
        call_json(&app, "POST", &format!("/requests/{id}/approve"), &[COE], None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "invalid_transition");

    let missing = "6f1c1d7e-3a51-4c1a-9a43-1f1f0e0b9c2d";
    let (status, _) =
        call_json(&app, "POST", &format!("/requests/{missing}/approve"), &[COE], None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = call_json(&app, "POST", &format!("/requests/{id}/approve"), &[], None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "missing_header");
}

#[tokio::test]
async fn storage_outage_is_bad_gateway() {
    let (app, store) = app();
    enrol(&app, "1GT20CS001").await;
    let id = submit(&app, "1GT20CS001").await;
    store.fail_next_object_puts(1);

    let (status, body) =
        call_json(&app, "POST", &format!("/requests/{id}/approve"), &[COE], None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "storage_failure");

    let (_, request) = call_json(&app, "GET", &format!("/requests/{id}"), &[], None).await;
    assert_eq!(request["status"], "Pending");
}

#[tokio::test]
async fn batch_reports_each_item() {
    let (app, _store) = app();
    let mut ids = Vec::new();
    for usn in ["A1", "B1", "C1"] {
        enrol(&app, usn).await;
        ids.push(submit(&app, usn).await);
    }
    call_json(&app, "POST", &format!("/requests/{}/approve", ids[1]), &[COE], None).await;

    let (status, report) = call_json(
        &app,
        "POST",
        "/requests/batch",
        &[COE],
        Some(json!({"ids": ids, "verb": "reject", "reason": "pending fees"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["succeeded"], 2);
    assert_eq!(report["failed"], 1);
    assert_eq!(report["outcomes"][1]["ok"], false);
    assert_eq!(report["outcomes"][1]["error"], "invalid_transition");
    assert_eq!(report["outcomes"][0]["request_id"], ids[0].as_str());
}

#[tokio::test]
async fn student_views_and_audit_paging() {
    let (app, _store) = app();
    enrol(&app, "1GT20CS001").await;
    let id = submit(&app, "1GT20CS001").await;

    let (status, summary) = call_json(&app, "GET", "/students/1gt20cs001/summary", &[], None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["current_cgpa"], "8.45");
    assert_eq!(summary["records"].as_array().unwrap().len(), 2);

    let (_, history) = call_json(&app, "GET", "/students/1GT20CS001/requests", &[], None).await;
    assert_eq!(history[0]["id"], id.as_str());

    let (status, _) = call_json(&app, "GET", "/students/NOBODY/summary", &[], None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // 1 student + 2 records + 1 submission = 4 entries.
    let (_, first) = call_json(&app, "GET", "/audit?count=3", &[], None).await;
    assert_eq!(first["entries"].as_array().unwrap().len(), 3);
    assert_eq!(first["entries"][0]["action"], "Submitted certification request");
    let cursor = first["cursor"].as_str().unwrap();
    let (_, second) = call_json(&app, "GET", &format!("/audit?count=3&cursor={cursor}"), &[], None).await;
    assert_eq!(second["entries"].as_array().unwrap().len(), 1);
    assert_eq!(second["entries"][0]["action"], "Upserted student profile");
    assert!(second.get("cursor").is_none());
}

#[tokio::test]
async fn record_validation_is_unprocessable() {
    let (app, _store) = app();
    enrol(&app, "1GT20CS001").await;
    let (status, body) = call_json(
        &app,
        "PUT",
        "/students/1GT20CS001/records/9",
        &[COE],
        Some(json!({"sgpa": 8.0, "cgpa": 8.0})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "invalid_request");

    let (status, _) = call_json(
        &app,
        "PUT",
        "/students/1GT20CS001/records/1",
        &[COE],
        Some(json!({"sgpa": 11.0, "cgpa": 8.0})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn metrics_count_lookups_and_decisions() {
    let (app, _store) = app();
    enrol(&app, "1GT20CS001").await;
    submit(&app, "1GT20CS001").await;
    call(&app, "GET", "/verify/nothing", &[], None).await;

    let (status, text) = call(&app, "GET", "/metrics", &[], None).await;
    assert_eq!(status, StatusCode::OK);
    let text = String::from_utf8(text).unwrap();
    assert!(text.contains("transcript_requests_submitted_total 1"));
    assert!(text.contains("transcript_verification_lookups_total{outcome=\"invalid\"} 1"));
}

#[tokio::test]
async fn unknown_certificate_is_404() {
    let (app, _store) = app();
    let (status, body) = call_json(&app, "GET", "/certificates/X/none.pdf", &[], None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}
