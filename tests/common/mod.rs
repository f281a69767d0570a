// Not every test binary uses every helper.
#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use saveup_api::routes::{app, AppState};
use saveup_api::storage::MemoryStorage;

/// A fresh router over an empty in-memory store. Each test gets its own so
/// ids and fixtures never bleed between tests.
pub fn test_app() -> Router {
    app(AppState::new(Arc::new(MemoryStorage::new())))
}

/// Fire a single request at the router and decode the JSON response (Null for
/// empty bodies).
pub async fn send(
    app: &Router,
    method: Method,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request must build");

    let response = app.clone().oneshot(request).await.expect("router must respond");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body must be readable");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("body must be JSON")
    };
    (status, value)
}

pub async fn get(app: &Router, path: &str, token: Option<&str>) -> (StatusCode, Value) {
    send(app, Method::GET, path, token, None).await
}

pub async fn post(
    app: &Router,
    path: &str,
    token: Option<&str>,
    body: Value,
) -> (StatusCode, Value) {
    send(app, Method::POST, path, token, Some(body)).await
}

pub async fn put(
    app: &Router,
    path: &str,
    token: Option<&str>,
    body: Value,
) -> (StatusCode, Value) {
    send(app, Method::PUT, path, token, Some(body)).await
}

/// Register an account and log it in, returning `(user_id, token)`.
pub async fn register_and_login(app: &Router, email: &str, username: &str) -> (i64, String) {
    let (status, _) = post(
        app,
        "/api/users",
        None,
        json!({
            "email": email,
            "username": username,
            "name": "Test User",
            "password": "hunter2",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "registration must succeed");

    let (status, body) = post(
        app,
        "/api/users/login",
        None,
        json!({ "email": email, "password": "hunter2" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login must succeed");

    let user_id = body["user"]["id"].as_i64().expect("login returns the user id");
    let token = body["token"].as_str().expect("login returns a token").to_owned();
    (user_id, token)
}
