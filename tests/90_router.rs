mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use common::{get, post, register_and_login, send, test_app};

#[tokio::test]
async fn index_reports_service_name_and_version() {
    let app = test_app();

    let (status, body) = get(&app, "/", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "SaveUp API");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn health_is_ok_on_the_memory_store() {
    let app = test_app();

    let (status, body) = get(&app, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn unknown_endpoint_is_a_structured_404() {
    let app = test_app();
    let (_user_id, token) = register_and_login(&app, "maya@example.com", "maya").await;

    let (status, body) = get(&app, "/api/nope", Some(&token)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Endpoint not found");
}

#[tokio::test]
async fn unknown_endpoint_without_a_token_is_unauthorized() {
    // Authentication runs before routing, so unauthenticated probes learn
    // nothing about which endpoints exist.
    let app = test_app();

    let (status, _) = get(&app, "/api/nope", None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_json_body_is_bad_request() {
    let app = test_app();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/users")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_required_fields_are_bad_request() {
    let app = test_app();
    let (_user_id, token) = register_and_login(&app, "maya@example.com", "maya").await;

    // NewChallenge requires title and targetAmount.
    let (status, _) = post(&app, "/api/challenges", Some(&token), json!({ "title": "x" })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn wrong_method_on_a_known_path_is_not_matched() {
    let app = test_app();
    let (_user_id, token) = register_and_login(&app, "maya@example.com", "maya").await;

    // Only POST is routed for /api/transactions.
    let (status, _) = send(&app, Method::DELETE, "/api/transactions", Some(&token), None).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn preflight_from_an_allowed_origin_is_accepted() {
    let app = test_app();

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/users/login")
        .header(header::ORIGIN, "http://localhost:3000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some("http://localhost:3000")
    );
}

#[tokio::test]
async fn responses_carry_the_cors_origin_header() {
    let app = test_app();

    let request = Request::builder()
        .method(Method::GET)
        .uri("/health")
        .header(header::ORIGIN, "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}
