mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{get, post, put, register_and_login, test_app};

#[tokio::test]
async fn cannot_read_another_users_profile() {
    let app = test_app();
    let (_maya_id, maya) = register_and_login(&app, "maya@example.com", "maya").await;
    let (noor_id, _noor) = register_and_login(&app, "noor@example.com", "noor").await;

    let (status, body) = get(&app, &format!("/api/users/{noor_id}"), Some(&maya)).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Access denied. You can only access your own data.");
}

#[tokio::test]
async fn cannot_list_another_users_collections() {
    let app = test_app();
    let (_maya_id, maya) = register_and_login(&app, "maya@example.com", "maya").await;
    let (noor_id, _noor) = register_and_login(&app, "noor@example.com", "noor").await;

    for path in [
        format!("/api/users/{noor_id}/transactions"),
        format!("/api/users/{noor_id}/challenges"),
        format!("/api/users/{noor_id}/portfolios"),
        format!("/api/users/{noor_id}/budgets"),
        format!("/api/users/{noor_id}/streaks"),
    ] {
        let (status, _) = get(&app, &path, Some(&maya)).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{path} must be identity-scoped");
    }
}

#[tokio::test]
async fn cannot_update_another_users_challenge() {
    let app = test_app();
    let (maya_id, maya) = register_and_login(&app, "maya@example.com", "maya").await;
    let (_noor_id, noor) = register_and_login(&app, "noor@example.com", "noor").await;

    let (status, challenge) = post(
        &app,
        "/api/challenges",
        Some(&maya),
        json!({ "title": "No-spend week", "targetAmount": "500.00" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let challenge_id = challenge["id"].as_i64().unwrap();

    let (status, body) = put(
        &app,
        &format!("/api/challenges/{challenge_id}"),
        Some(&noor),
        json!({ "title": "Hijacked" }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body["error"],
        "Access denied. You can only modify your own resources."
    );

    // The record is untouched.
    let (status, listed) =
        get(&app, &format!("/api/users/{maya_id}/challenges"), Some(&maya)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed[0]["title"], "No-spend week");
}

#[tokio::test]
async fn cannot_read_another_users_portfolio() {
    let app = test_app();
    let (_maya_id, maya) = register_and_login(&app, "maya@example.com", "maya").await;
    let (_noor_id, noor) = register_and_login(&app, "noor@example.com", "noor").await;

    let (status, portfolio) = post(
        &app,
        "/api/portfolios",
        Some(&maya),
        json!({ "name": "Index funds", "type": "equity" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let portfolio_id = portfolio["id"].as_i64().unwrap();

    let (status, _) = get(&app, &format!("/api/portfolios/{portfolio_id}"), Some(&noor)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = get(&app, &format!("/api/portfolios/{portfolio_id}"), Some(&maya)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn owner_id_comes_from_the_token_not_the_body() {
    let app = test_app();
    let (maya_id, maya) = register_and_login(&app, "maya@example.com", "maya").await;

    // A spoofed userId in the body is ignored.
    let (status, tx) = post(
        &app,
        "/api/transactions",
        Some(&maya),
        json!({ "type": "roundup", "amount": "12.50", "userId": 9999 }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(tx["userId"].as_i64(), Some(maya_id));
}

#[tokio::test]
async fn missing_resource_is_not_found_for_its_owner() {
    let app = test_app();
    let (_maya_id, maya) = register_and_login(&app, "maya@example.com", "maya").await;

    let (status, body) = get(&app, "/api/portfolios/404", Some(&maya)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Portfolio not found");
}
