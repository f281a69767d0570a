mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{get, post, register_and_login, test_app};

#[tokio::test]
async fn register_returns_created_user_without_credentials() {
    let app = test_app();

    let (status, body) = post(
        &app,
        "/api/users",
        None,
        json!({
            "email": "maya@example.com",
            "username": "maya",
            "name": "Maya",
            "password": "hunter2",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["email"], "maya@example.com");
    assert_eq!(body["username"], "maya");
    assert!(body["id"].is_i64());
    assert!(body.get("password").is_none());
    assert!(body.get("passwordHash").is_none());
}

#[tokio::test]
async fn register_without_password_is_rejected() {
    let app = test_app();

    let (status, body) = post(
        &app,
        "/api/users",
        None,
        json!({ "email": "maya@example.com", "username": "maya", "name": "Maya" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Password is required");
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let app = test_app();
    register_and_login(&app, "maya@example.com", "maya").await;

    let (status, body) = post(
        &app,
        "/api/users",
        None,
        json!({
            "email": "maya@example.com",
            "username": "maya2",
            "name": "Other Maya",
            "password": "hunter2",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email already registered");
}

#[tokio::test]
async fn login_returns_user_and_token() {
    let app = test_app();
    register_and_login(&app, "maya@example.com", "maya").await;

    let (status, body) = post(
        &app,
        "/api/users/login",
        None,
        json!({ "email": "maya@example.com", "password": "hunter2" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "maya@example.com");
    assert!(!body["token"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn login_with_wrong_password_is_unauthorized() {
    let app = test_app();
    register_and_login(&app, "maya@example.com", "maya").await;

    let (status, body) = post(
        &app,
        "/api/users/login",
        None,
        json!({ "email": "maya@example.com", "password": "wrong" }),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");
}

#[tokio::test]
async fn login_with_missing_fields_is_bad_request() {
    let app = test_app();

    let (status, body) = post(&app, "/api/users/login", None, json!({ "email": "x@y.z" })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email and password are required");
}

#[tokio::test]
async fn protected_routes_require_a_token() {
    let app = test_app();
    let (user_id, token) = register_and_login(&app, "maya@example.com", "maya").await;

    let (status, body) = get(&app, "/api/users/1", None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body["error"],
        "Authentication required. Please provide a valid Bearer token."
    );

    // The rejection happens before the handler runs: an unauthenticated write
    // leaves no trace in the store.
    let (status, _) = post(
        &app,
        "/api/transactions",
        None,
        json!({ "type": "roundup", "amount": "10.00" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, rows) =
        get(&app, &format!("/api/users/{user_id}/transactions"), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rows.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn garbage_token_is_unauthorized() {
    let app = test_app();

    let (status, body) = get(&app, "/api/users/1", Some("not.a.jwt")).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid or expired token. Please login again.");
}

#[tokio::test]
async fn public_catalogs_do_not_require_a_token() {
    let app = test_app();

    for path in [
        "/",
        "/health",
        "/api/achievements",
        "/api/rewards",
        "/api/education/modules",
        "/api/seasonal-challenges",
        "/api/teams",
        "/api/communities",
        "/api/group-goals",
    ] {
        let (status, _) = get(&app, path, None).await;
        assert_eq!(status, StatusCode::OK, "{path} should be public");
    }
}

#[tokio::test]
async fn token_grants_access_to_own_profile() {
    let app = test_app();
    let (user_id, token) = register_and_login(&app, "maya@example.com", "maya").await;

    let (status, body) = get(&app, &format!("/api/users/{user_id}"), Some(&token)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"].as_i64(), Some(user_id));
    assert_eq!(body["email"], "maya@example.com");
}
