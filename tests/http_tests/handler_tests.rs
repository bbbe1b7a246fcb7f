//! Tests for the HTTP API
//!
//! These tests verify:
//! - Status codes and bodies for every route
//! - Request validation (400)
//! - Not-found mapping (404) vs storage failure (500)
//! - CORS preflight

use std::fs;
use std::io;
use std::sync::Arc;

use axum::body::{to_bytes, Body, Bytes};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::DateTime;
use recordstore::http::{self, CreateResponse, ErrorResponse};
use recordstore::{Engine, Record, RecordStore, StoreError};
use tempfile::TempDir;
use tower::ServiceExt;

// =============================================================================
// Helper Functions
// =============================================================================

const VALID_BODY: &str = r#"{
    "IntValue": 42,
    "StrValue": "foo",
    "BoolValue": false,
    "TimeValue": "2023-12-31T12:42:59.987654321+01:00"
}"#;

fn setup_app() -> (TempDir, Arc<Engine>, Router) {
    let temp_dir = TempDir::new().unwrap();
    let engine = Arc::new(Engine::open_path(&temp_dir.path().join("records.bin")).unwrap());
    let app = http::router(engine.clone());
    (temp_dir, engine, app)
}

fn request(method: Method, uri: &str, body: Option<&str>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);
    match body {
        Some(b) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Bytes) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body)
}

async fn create(app: &Router, body: &str) -> i64 {
    let (status, bytes) = send(app, request(Method::POST, "/records", Some(body))).await;
    assert_eq!(status, StatusCode::CREATED);
    serde_json::from_slice::<CreateResponse>(&bytes).unwrap().id
}

fn err_text(bytes: &Bytes) -> String {
    serde_json::from_slice::<ErrorResponse>(bytes).unwrap().err_text
}

/// Store whose every call fails with an I/O error
struct BrokenStore;

impl RecordStore for BrokenStore {
    fn create(&self, _record: &Record) -> recordstore::Result<i64> {
        Err(StoreError::Io(io::Error::new(io::ErrorKind::Other, "disk full")))
    }

    fn get(&self, _id: i64) -> recordstore::Result<Option<Record>> {
        Err(StoreError::Io(io::Error::new(io::ErrorKind::Other, "disk gone")))
    }

    fn update(&self, _id: i64, _record: &Record) -> recordstore::Result<Option<i64>> {
        Err(StoreError::Io(io::Error::new(io::ErrorKind::Other, "disk gone")))
    }

    fn delete(&self, _id: i64) -> recordstore::Result<bool> {
        Err(StoreError::Io(io::Error::new(io::ErrorKind::Other, "disk gone")))
    }
}

// =============================================================================
// Readiness
// =============================================================================

#[tokio::test]
async fn test_readyz_ok() {
    let (_temp, _engine, app) = setup_app();

    let response = app
        .clone()
        .oneshot(request(Method::GET, "/readyz", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/html");
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"OK");
}

// =============================================================================
// Create
// =============================================================================

#[tokio::test]
async fn test_create_valid_records() {
    let (_temp, _engine, app) = setup_app();

    assert_eq!(create(&app, VALID_BODY).await, 1);
    assert_eq!(create(&app, VALID_BODY).await, 2);
    assert_eq!(create(&app, VALID_BODY).await, 3);
}

#[tokio::test]
async fn test_create_response_is_json() {
    let (_temp, _engine, app) = setup_app();

    let response = app
        .clone()
        .oneshot(request(Method::POST, "/records", Some(VALID_BODY)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], br#"{"ID":1}"#);
}

#[tokio::test]
async fn test_create_without_content_type_accepted() {
    let (_temp, _engine, app) = setup_app();
    let req = Request::builder()
        .method(Method::POST)
        .uri("/records")
        .body(Body::from(VALID_BODY))
        .unwrap();

    let (status, _) = send(&app, req).await;

    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_create_wrong_type_bad_request() {
    let (_temp, engine, app) = setup_app();
    let body = r#"{"IntValue": 42, "StrValue": 44, "BoolValue": false, "TimeValue": "2023-10-14T12:00:00Z"}"#;

    let (status, bytes) = send(&app, request(Method::POST, "/records", Some(body))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(!err_text(&bytes).is_empty());
    assert_eq!(engine.slot_count(), 0);
}

#[tokio::test]
async fn test_create_missing_time_bad_request() {
    let (_temp, engine, app) = setup_app();
    let body = r#"{"IntValue": 42, "StrValue": "Test Record", "BoolValue": false}"#;

    let (status, bytes) = send(&app, request(Method::POST, "/records", Some(body))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(err_text(&bytes).contains("TimeValue"));
    assert_eq!(engine.slot_count(), 0);
}

#[tokio::test]
async fn test_create_zero_int_bad_request() {
    let (_temp, _engine, app) = setup_app();
    let body = r#"{"IntValue": 0, "StrValue": "x", "TimeValue": "2023-10-14T12:00:00Z"}"#;

    let (status, bytes) = send(&app, request(Method::POST, "/records", Some(body))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(err_text(&bytes).contains("IntValue"));
}

#[tokio::test]
async fn test_create_unknown_field_bad_request() {
    let (_temp, _engine, app) = setup_app();
    let body = r#"{"IntValue": 1, "StrValue": "x", "TimeValue": "2023-10-14T12:00:00Z", "Extra": 1}"#;

    let (status, _) = send(&app, request(Method::POST, "/records", Some(body))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_long_string_bad_request() {
    let (_temp, engine, app) = setup_app();
    let body = format!(
        r#"{{"IntValue": 1, "StrValue": "{}", "TimeValue": "2023-10-14T12:00:00Z"}}"#,
        "s".repeat(65)
    );

    let (status, bytes) = send(&app, request(Method::POST, "/records", Some(&body))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(err_text(&bytes).contains("StrValue"));
    assert_eq!(engine.slot_count(), 0);
}

#[tokio::test]
async fn test_create_malformed_json_bad_request() {
    let (_temp, _engine, app) = setup_app();

    let (status, _) = send(&app, request(Method::POST, "/records", Some("{not json"))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Get
// =============================================================================

#[tokio::test]
async fn test_get_record() {
    let (_temp, _engine, app) = setup_app();
    create(&app, VALID_BODY).await;

    let (status, bytes) = send(&app, request(Method::GET, "/records/1", None)).await;

    assert_eq!(status, StatusCode::OK);
    let record: Record = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(record.id, 1);
    assert_eq!(record.int_value, 42);
    assert_eq!(record.str_value, "foo");
    assert!(!record.bool_value);
    assert_eq!(
        record.time_value,
        DateTime::parse_from_rfc3339("2023-12-31T12:42:59.987654321+01:00").unwrap()
    );
}

#[tokio::test]
async fn test_get_json_field_names() {
    let (_temp, _engine, app) = setup_app();
    create(&app, VALID_BODY).await;

    let (_, bytes) = send(&app, request(Method::GET, "/records/1", None)).await;
    let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    for field in ["id", "IntValue", "StrValue", "BoolValue", "TimeValue"] {
        assert!(value.get(field).is_some(), "missing {}", field);
    }
}

#[tokio::test]
async fn test_get_not_found() {
    let (_temp, _engine, app) = setup_app();

    let (status, bytes) = send(&app, request(Method::GET, "/records/99", None)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err_text(&bytes), "record not found");
}

#[tokio::test]
async fn test_non_numeric_id_not_found() {
    let (_temp, _engine, app) = setup_app();
    create(&app, VALID_BODY).await;

    let (status, _) = send(&app, request(Method::GET, "/records/abc", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, request(Method::PUT, "/records/abc", Some(VALID_BODY))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, request(Method::DELETE, "/records/abc", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_corrupt_slot_is_internal_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("records.bin");
    let mut slot = [0u8; 98];
    slot[0..8].copy_from_slice(&1i64.to_le_bytes());
    slot[97] = b'\n';
    fs::write(&path, slot).unwrap();
    let app = http::router(Arc::new(Engine::open_path(&path).unwrap()));

    let (status, bytes) = send(&app, request(Method::GET, "/records/1", None)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(err_text(&bytes).contains("time field"), "{}", err_text(&bytes));
}

// =============================================================================
// Edit
// =============================================================================

#[tokio::test]
async fn test_edit_record() {
    let (_temp, engine, app) = setup_app();
    create(&app, VALID_BODY).await;
    create(&app, VALID_BODY).await;
    let body = r#"{"id": 1, "IntValue": 90, "StrValue": "bar", "BoolValue": true, "TimeValue": "2024-01-01T00:00:00Z"}"#;

    let (status, _) = send(&app, request(Method::PUT, "/records/2", Some(body))).await;

    assert_eq!(status, StatusCode::OK);
    let edited = engine.get(2).unwrap().unwrap();
    assert_eq!(edited.id, 2);
    assert_eq!(edited.int_value, 90);
    assert_eq!(edited.str_value, "bar");
    assert!(edited.bool_value);
    assert_eq!(engine.get(1).unwrap().unwrap().str_value, "foo");
}

#[tokio::test]
async fn test_edit_not_found() {
    let (_temp, _engine, app) = setup_app();

    let (status, bytes) = send(&app, request(Method::PUT, "/records/5", Some(VALID_BODY))).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err_text(&bytes), "record not found");
}

#[tokio::test]
async fn test_edit_invalid_body() {
    let (_temp, _engine, app) = setup_app();
    create(&app, VALID_BODY).await;

    let (status, _) = send(&app, request(Method::PUT, "/records/1", Some(r#"{"IntValue": 1}"#))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Delete
// =============================================================================

#[tokio::test]
async fn test_delete_record() {
    let (_temp, engine, app) = setup_app();
    create(&app, VALID_BODY).await;
    let len_before = engine.file_len();

    let (status, bytes) = send(&app, request(Method::DELETE, "/records/1", None)).await;

    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(bytes.is_empty());
    assert_eq!(engine.file_len(), len_before);

    let (status, _) = send(&app, request(Method::GET, "/records/1", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_twice_not_found() {
    let (_temp, _engine, app) = setup_app();
    create(&app, VALID_BODY).await;
    send(&app, request(Method::DELETE, "/records/1", None)).await;

    let (status, _) = send(&app, request(Method::DELETE, "/records/1", None)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Storage Failures
// =============================================================================

#[tokio::test]
async fn test_storage_failure_is_internal_error() {
    let app = http::router(Arc::new(BrokenStore));

    let (status, bytes) = send(&app, request(Method::POST, "/records", Some(VALID_BODY))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(err_text(&bytes).contains("disk full"));

    let (status, _) = send(&app, request(Method::GET, "/records/1", None)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, _) = send(&app, request(Method::PUT, "/records/1", Some(VALID_BODY))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, _) = send(&app, request(Method::DELETE, "/records/1", None)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

// =============================================================================
// CORS
// =============================================================================

#[tokio::test]
async fn test_cors_preflight() {
    let (_temp, _engine, app) = setup_app();
    let req = Request::builder()
        .method(Method::OPTIONS)
        .uri("/records")
        .header(header::ORIGIN, "http://example.com")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap();

    let response = app.clone().oneshot(req).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    let methods = response.headers()[header::ACCESS_CONTROL_ALLOW_METHODS]
        .to_str()
        .unwrap()
        .to_string();
    assert!(methods.contains("POST"));
    assert!(methods.contains("DELETE"));
}
