//! # Integration Tests for folio-api
//!
//! Drives the assembled router end to end: profile creation, owner-scoped
//! submissions, the verifier workflow with its notifications, assistant
//! fallback replies, certificate file uploads and their owner-only
//! download, authentication and authorization, health probes and the
//! OpenAPI document.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use folio_api::state::{AppConfig, AppState};

const STUDENT: &str = "Bearer student:user_1";
const OTHER_STUDENT: &str = "Bearer student:user_2";
const ADMIN: &str = "Bearer admin:ops";

/// Helper: build the test app with auth in development mode.
fn test_app() -> axum::Router {
    folio_api::app(AppState::new())
}

/// Helper: read response body as JSON.
async fn body_json(response: axum::http::Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_string(response: axum::http::Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    auth: Option<&str>,
    body: Option<Value>,
) -> axum::http::Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        builder = builder.header("authorization", auth);
    }
    let body = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    app.clone().oneshot(builder.body(body).unwrap()).await.unwrap()
}

fn profile_body(first_name: &str, roll_number: &str) -> Value {
    json!({
        "first_name": first_name,
        "last_name": "Sharma",
        "roll_number": roll_number,
        "department": "Computer Science",
        "course": "B.Tech",
        "year": 3,
        "semester": 5,
        "batch": "2022-2026"
    })
}

fn certificate_body(title: &str) -> Value {
    json!({
        "title": title,
        "issuer": "Coursera",
        "issue_date": "2024-03-01",
        "category": "technical",
        "file_path": "/uploads/certificates/x/cert.pdf",
        "file_type": "application/pdf",
        "file_size": 2048
    })
}

async fn create_profile(app: &axum::Router, auth: &str, first_name: &str, roll: &str) {
    let response = send(app, "PUT", "/v1/student/profile", Some(auth), Some(profile_body(first_name, roll))).await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

async fn create_certificate(app: &axum::Router, auth: &str, title: &str) -> Value {
    let response = send(
        app,
        "POST",
        "/v1/student/certificates",
        Some(auth),
        Some(certificate_body(title)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

/// Helper: a `title` + `file` multipart form. Returns the content type and body.
fn certificate_form(title: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> (String, Vec<u8>) {
    let boundary = "folio-form-boundary";
    let mut body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"title\"\r\n\r\n{title}\r\n\
         --{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
         Content-Type: {content_type}\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={boundary}"), body)
}

async fn upload(app: &axum::Router, auth: &str, form: (String, Vec<u8>)) -> axum::http::Response<Body> {
    let (content_type, body) = form;
    let request = Request::builder()
        .method("POST")
        .uri("/v1/upload/certificate")
        .header("authorization", auth)
        .header("content-type", content_type)
        .body(Body::from(body))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

// -- Health Probes ------------------------------------------------------------

#[tokio::test]
async fn test_health_probes_need_no_credentials() {
    let app = test_app();
    let response = send(&app, "GET", "/health/liveness", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ok");

    let response = send(&app, "GET", "/health/readiness", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ready");
}

// -- Authentication -----------------------------------------------------------

#[tokio::test]
async fn test_missing_token_is_rejected() {
    let app = test_app();
    let response = send(&app, "GET", "/v1/student/certificates", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_configured_secret_is_enforced() {
    let config = AppConfig {
        auth_token: Some("s3cret".into()),
        ..AppConfig::default()
    };
    let state = AppState::with_config(config, folio_assistant::Responder::fallback_only(), None);
    let app = folio_api::app(state);

    let response = send(&app, "GET", "/v1/skills", Some("Bearer student:user_1"), None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(&app, "GET", "/v1/skills", Some("Bearer student:user_1:s3cret"), None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_student_cannot_reach_admin_routes() {
    let app = test_app();
    let response = send(&app, "GET", "/v1/admin/verifications", Some(STUDENT), None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_submission_routes_require_a_profile() {
    let app = test_app();
    let response = send(&app, "GET", "/v1/student/certificates", Some(STUDENT), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// -- Profile ------------------------------------------------------------------

#[tokio::test]
async fn test_profile_create_then_update() {
    let app = test_app();
    create_profile(&app, STUDENT, "Asha", "CS-101").await;

    let response = send(
        &app,
        "PUT",
        "/v1/student/profile",
        Some(STUDENT),
        Some(profile_body("Asha Rani", "CS-101")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, "GET", "/v1/student/profile", Some(STUDENT), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("Asha Rani"));
}

#[tokio::test]
async fn test_profile_missing_fields_are_named() {
    let app = test_app();
    let response = send(
        &app,
        "PUT",
        "/v1/student/profile",
        Some(STUDENT),
        Some(json!({ "first_name": "Asha" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    let fields = body["error"]["details"]["fields"].as_array().unwrap();
    assert!(fields.iter().any(|f| f == "roll_number"));
    assert!(!fields.iter().any(|f| f == "first_name"));
}

// -- Submissions and Verification ---------------------------------------------

#[tokio::test]
async fn test_new_certificate_is_pending() {
    let app = test_app();
    create_profile(&app, STUDENT, "Asha", "CS-101").await;
    let cert = create_certificate(&app, STUDENT, "Rust Fundamentals").await;
    assert_eq!(cert["verification_status"], "PENDING");
    assert_eq!(cert["category"], "TECHNICAL");
    assert!(cert["verified_by"].is_null());

    let response = send(&app, "GET", "/v1/student/certificates?status=pending", Some(STUDENT), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let list = body_json(response).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_other_students_records_are_not_found() {
    let app = test_app();
    create_profile(&app, STUDENT, "Asha", "CS-101").await;
    create_profile(&app, OTHER_STUDENT, "Ravi", "CS-102").await;
    let cert = create_certificate(&app, STUDENT, "Rust Fundamentals").await;
    let uri = format!("/v1/student/certificates/{}", cert["id"].as_str().unwrap());

    let response = send(&app, "GET", &uri, Some(OTHER_STUDENT), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&app, "DELETE", &uri, Some(OTHER_STUDENT), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&app, "GET", &uri, Some(STUDENT), None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_verification_notifies_owner_and_locks_record() {
    let app = test_app();
    create_profile(&app, STUDENT, "Asha", "CS-101").await;
    let cert = create_certificate(&app, STUDENT, "Rust Fundamentals").await;
    let id = cert["id"].as_str().unwrap().to_string();

    let response = send(&app, "GET", "/v1/admin/verifications", Some(ADMIN), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);

    let response = send(
        &app,
        "POST",
        &format!("/v1/admin/certificates/{id}/verify"),
        Some(ADMIN),
        Some(json!({ "decision": "VERIFIED" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let verified = body_json(response).await;
    assert_eq!(verified["verification_status"], "VERIFIED");
    assert_eq!(verified["verified_by"], "ops");

    let response = send(&app, "GET", "/v1/student/notifications", Some(STUDENT), None).await;
    let notifications = body_json(response).await;
    let notifications = notifications.as_array().unwrap();
    assert_eq!(notifications.len(), 1);
    assert!(notifications[0]["title"].as_str().unwrap().contains("Verified"));

    let response = send(
        &app,
        "PUT",
        &format!("/v1/student/certificates/{id}"),
        Some(STUDENT),
        Some(certificate_body("Rust Advanced")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = send(
        &app,
        "DELETE",
        &format!("/v1/student/certificates/{id}"),
        Some(STUDENT),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = send(
        &app,
        "POST",
        &format!("/v1/admin/certificates/{id}/verify"),
        Some(ADMIN),
        Some(json!({ "decision": "REJECTED", "rejection_reason": "late" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_rejection_requires_reason_and_edit_resubmits() {
    let app = test_app();
    create_profile(&app, STUDENT, "Asha", "CS-101").await;
    let cert = create_certificate(&app, STUDENT, "Rust Fundamentals").await;
    let id = cert["id"].as_str().unwrap().to_string();
    let verify_uri = format!("/v1/admin/certificates/{id}/verify");

    let response = send(&app, "POST", &verify_uri, Some(ADMIN), Some(json!({ "decision": "REJECTED" }))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["details"]["fields"][0], "rejection_reason");

    let response = send(
        &app,
        "POST",
        &verify_uri,
        Some(ADMIN),
        Some(json!({ "decision": "rejected", "rejection_reason": "Scan is unreadable" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["rejection_reason"], "Scan is unreadable");

    let response = send(
        &app,
        "PUT",
        &format!("/v1/student/certificates/{id}"),
        Some(STUDENT),
        Some(certificate_body("Rust Fundamentals (rescan)")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let resubmitted = body_json(response).await;
    assert_eq!(resubmitted["verification_status"], "PENDING");
    assert!(resubmitted["rejection_reason"].is_null());
}

#[tokio::test]
async fn test_review_moves_pending_to_under_review() {
    let app = test_app();
    create_profile(&app, STUDENT, "Asha", "CS-101").await;
    let cert = create_certificate(&app, STUDENT, "Rust Fundamentals").await;
    let id = cert["id"].as_str().unwrap().to_string();

    let response = send(&app, "POST", &format!("/v1/admin/certificates/{id}/review"), Some(ADMIN), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["verification_status"], "UNDER_REVIEW");

    let response = send(&app, "POST", &format!("/v1/admin/awards/{id}/review"), Some(ADMIN), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // An owner edit while under review sends the record back to the queue.
    let response = send(
        &app,
        "PUT",
        &format!("/v1/student/certificates/{id}"),
        Some(STUDENT),
        Some(certificate_body("Rust Fundamentals (2nd attempt)")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let edited = body_json(response).await;
    assert_eq!(edited["verification_status"], "PENDING");
    assert!(edited["verified_by"].is_null());
    assert!(edited["verified_at"].is_null());

    let response = send(&app, "POST", &format!("/v1/admin/certificates/{id}/review"), Some(ADMIN), None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_stats_reflect_verification() {
    let app = test_app();
    create_profile(&app, STUDENT, "Asha", "CS-101").await;
    let cert = create_certificate(&app, STUDENT, "Rust Fundamentals").await;
    create_certificate(&app, STUDENT, "Go Basics").await;
    let id = cert["id"].as_str().unwrap().to_string();
    send(
        &app,
        "POST",
        &format!("/v1/admin/certificates/{id}/verify"),
        Some(ADMIN),
        Some(json!({ "decision": "VERIFIED" })),
    )
    .await;

    let response = send(&app, "GET", "/v1/student/certificates/stats", Some(STUDENT), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let stats = body_json(response).await;
    assert_eq!(stats["total"], 2);
    assert_eq!(stats["verified"], 1);
    assert_eq!(stats["pending"], 1);
}

// -- Assistant ----------------------------------------------------------------

#[tokio::test]
async fn test_chat_falls_back_without_backend() {
    let app = test_app();
    create_profile(&app, STUDENT, "Asha", "CS-101").await;

    let response = send(
        &app,
        "POST",
        "/v1/ai/chat",
        Some(STUDENT),
        Some(json!({ "message": "How do I prepare for interviews?", "category": "interview_prep" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let reply = body_json(response).await;
    assert_eq!(reply["source"], "fallback");
    assert!(!reply["message"].as_str().unwrap().is_empty());
    let conversation_id = reply["conversation_id"].as_str().unwrap().to_string();

    let response = send(&app, "GET", "/v1/ai/chat", Some(STUDENT), None).await;
    let summaries = body_json(response).await;
    assert_eq!(summaries.as_array().unwrap().len(), 1);
    assert_eq!(summaries[0]["message_count"], 2);

    let response = send(
        &app,
        "GET",
        &format!("/v1/ai/chat?conversation_id={conversation_id}"),
        Some(OTHER_STUDENT),
        None,
    )
    .await;
    // user_2 has no profile yet.
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_blank_chat_message_is_rejected() {
    let app = test_app();
    create_profile(&app, STUDENT, "Asha", "CS-101").await;
    let response = send(&app, "POST", "/v1/ai/chat", Some(STUDENT), Some(json!({ "message": "   " }))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// -- OpenAPI ------------------------------------------------------------------

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = test_app();
    let response = send(&app, "GET", "/openapi.json", Some(STUDENT), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let doc = body_json(response).await;
    assert!(doc["paths"]["/v1/student/certificates"].is_object());
    assert!(doc["paths"]["/v1/admin/{kind}/{id}/verify"].is_object());
}

// -- Uploads ------------------------------------------------------------------

#[tokio::test]
async fn test_upload_over_limit_names_the_file() {
    let app = test_app();
    create_profile(&app, STUDENT, "Asha", "CS-101").await;

    let oversized = vec![b'%'; 12 * 1024 * 1024];
    let response = upload(
        &app,
        STUDENT,
        certificate_form("Big Scan", "scan.pdf", "application/pdf", &oversized),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["details"]["fields"], json!(["file"]));
    assert!(body["error"]["message"].as_str().unwrap().contains("10MB"));
}

#[tokio::test]
async fn test_stored_file_is_served_only_to_owner_and_admin() {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig {
        upload_dir: dir.path().to_path_buf(),
        ..AppConfig::default()
    };
    let state = AppState::with_config(config, folio_assistant::Responder::fallback_only(), None);
    let app = folio_api::app(state);
    create_profile(&app, STUDENT, "Asha", "CS-101").await;
    create_profile(&app, OTHER_STUDENT, "Ravi", "CS-102").await;

    let pdf = b"%PDF-1.4 certificate";
    let response = upload(
        &app,
        STUDENT,
        certificate_form("Rust Fundamentals", "rust.pdf", "application/pdf", pdf),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let stored = body_json(response).await;
    let path = stored["file_path"].as_str().unwrap().to_string();
    assert!(path.starts_with("/uploads/certificates/"));

    let response = send(&app, "GET", &path, Some(STUDENT), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], pdf);

    let response = send(&app, "GET", &path, Some(OTHER_STUDENT), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&app, "GET", &path, Some(ADMIN), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, "GET", &path, None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
