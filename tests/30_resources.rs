mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{get, post, put, register_and_login, test_app};

#[tokio::test]
async fn transaction_create_and_list_with_limit() {
    let app = test_app();
    let (user_id, token) = register_and_login(&app, "maya@example.com", "maya").await;

    for amount in ["10.00", "20.00", "30.00"] {
        let (status, _) = post(
            &app,
            "/api/transactions",
            Some(&token),
            json!({ "type": "roundup", "amount": amount }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, all) =
        get(&app, &format!("/api/users/{user_id}/transactions"), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 3);
    // Newest first.
    assert_eq!(all[0]["amount"], "30.00");

    let (status, limited) = get(
        &app,
        &format!("/api/users/{user_id}/transactions?limit=2"),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(limited.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn negative_limit_is_rejected() {
    let app = test_app();
    let (user_id, token) = register_and_login(&app, "maya@example.com", "maya").await;

    let (status, _) = post(
        &app,
        "/api/transactions",
        Some(&token),
        json!({ "type": "roundup", "amount": "10.00" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // A bad limit is a client error; it must not fall through to the store.
    for path in [
        format!("/api/users/{user_id}/transactions?limit=-1"),
        format!("/api/users/{user_id}/activities?limit=-1"),
        format!("/api/users/{user_id}/investments?limit=-1"),
    ] {
        let (status, body) = get(&app, &path, Some(&token)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Limit must not be negative");
    }

    // The data is still served once the limit is sane.
    let (status, all) =
        get(&app, &format!("/api/users/{user_id}/transactions"), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn challenge_lifecycle() {
    let app = test_app();
    let (user_id, token) = register_and_login(&app, "maya@example.com", "maya").await;

    let (status, challenge) = post(
        &app,
        "/api/challenges",
        Some(&token),
        json!({ "title": "No-spend week", "targetAmount": "500.00" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(challenge["status"], "active");
    assert_eq!(challenge["currentAmount"], "0.00");
    let id = challenge["id"].as_i64().unwrap();

    let (status, updated) = put(
        &app,
        &format!("/api/challenges/{id}"),
        Some(&token),
        json!({ "currentAmount": "120.00", "status": "completed" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["currentAmount"], "120.00");
    assert_eq!(updated["status"], "completed");
    // Partial update keeps the rest.
    assert_eq!(updated["title"], "No-spend week");

    let (_, listed) = get(&app, &format!("/api/users/{user_id}/challenges"), Some(&token)).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn badge_put_then_list() {
    let app = test_app();
    let (user_id, token) = register_and_login(&app, "maya@example.com", "maya").await;

    let (status, body) = put(
        &app,
        &format!("/api/users/{user_id}/badges/first-save"),
        Some(&token),
        json!({ "earned": true }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, badges) = get(&app, &format!("/api/users/{user_id}/badges"), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(badges[0]["badgeId"], "first-save");
    assert_eq!(badges[0]["earned"], true);
}

#[tokio::test]
async fn sip_plan_belongs_to_its_portfolio() {
    let app = test_app();
    let (user_id, token) = register_and_login(&app, "maya@example.com", "maya").await;

    let (_, portfolio) = post(
        &app,
        "/api/portfolios",
        Some(&token),
        json!({ "name": "Index funds", "type": "equity" }),
    )
    .await;
    let portfolio_id = portfolio["id"].as_i64().unwrap();

    let (status, plan) = post(
        &app,
        "/api/sip-plans",
        Some(&token),
        json!({
            "portfolioId": portfolio_id,
            "name": "Monthly index SIP",
            "monthlyAmount": "1000.00",
            "startDate": "2026-01-01T00:00:00Z",
            "nextPaymentDate": "2026-02-01T00:00:00Z",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(plan["portfolioId"].as_i64(), Some(portfolio_id));
    assert_eq!(plan["userId"].as_i64(), Some(user_id));

    let (status, plans) =
        get(&app, &format!("/api/users/{user_id}/sip-plans"), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(plans.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn investments_listed_per_portfolio() {
    let app = test_app();
    let (user_id, token) = register_and_login(&app, "maya@example.com", "maya").await;

    let (_, portfolio) = post(
        &app,
        "/api/portfolios",
        Some(&token),
        json!({ "name": "Index funds", "type": "equity" }),
    )
    .await;
    let portfolio_id = portfolio["id"].as_i64().unwrap();

    let (status, investment) = post(
        &app,
        "/api/investments",
        Some(&token),
        json!({
            "portfolioId": portfolio_id,
            "type": "buy",
            "amount": "500.00",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(investment["userId"].as_i64(), Some(user_id));

    let (status, rows) = get(
        &app,
        &format!("/api/portfolios/{portfolio_id}/investments"),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rows.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn streak_put_upserts_by_type() {
    let app = test_app();
    let (user_id, token) = register_and_login(&app, "maya@example.com", "maya").await;

    let (status, streak) = put(
        &app,
        &format!("/api/users/{user_id}/streaks/savings"),
        Some(&token),
        json!({ "currentStreak": 3, "longestStreak": 5 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(streak["currentStreak"], 3);

    // Second put updates the same row.
    let (_, streak) = put(
        &app,
        &format!("/api/users/{user_id}/streaks/savings"),
        Some(&token),
        json!({ "currentStreak": 4 }),
    )
    .await;
    assert_eq!(streak["currentStreak"], 4);
    assert_eq!(streak["longestStreak"], 5);

    let (_, streaks) = get(&app, &format!("/api/users/{user_id}/streaks"), Some(&token)).await;
    assert_eq!(streaks.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn budget_create_and_partial_update() {
    let app = test_app();
    let (user_id, token) = register_and_login(&app, "maya@example.com", "maya").await;

    let (status, budget) = post(
        &app,
        "/api/budgets",
        Some(&token),
        json!({ "category": "food", "monthlyLimit": "3000.00" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = budget["id"].as_i64().unwrap();

    let (status, updated) = put(
        &app,
        &format!("/api/budgets/{id}"),
        Some(&token),
        json!({ "currentSpent": "450.00" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["currentSpent"], "450.00");
    assert_eq!(updated["monthlyLimit"], "3000.00");

    let (_, budgets) = get(&app, &format!("/api/users/{user_id}/budgets"), Some(&token)).await;
    assert_eq!(budgets.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn financial_health_put_then_get() {
    let app = test_app();
    let (user_id, token) = register_and_login(&app, "maya@example.com", "maya").await;

    let (status, body) =
        get(&app, &format!("/api/users/{user_id}/financial-health"), Some(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Financial health data not found");

    let scores = json!({
        "overallScore": 72,
        "savingsScore": 80,
        "spendingScore": 65,
        "investmentScore": 70,
        "budgetScore": 75,
        "streakScore": 60,
    });
    let (status, _) = put(
        &app,
        &format!("/api/users/{user_id}/financial-health"),
        Some(&token),
        scores,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, health) =
        get(&app, &format!("/api/users/{user_id}/financial-health"), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["overallScore"], 72);
    assert_eq!(health["userId"].as_i64(), Some(user_id));
}

#[tokio::test]
async fn education_progress_completes_at_one_hundred() {
    let app = test_app();
    let (user_id, token) = register_and_login(&app, "maya@example.com", "maya").await;

    let (status, progress) = put(
        &app,
        &format!("/api/users/{user_id}/education/progress"),
        Some(&token),
        json!({ "moduleId": 7, "progress": 40 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(progress["progress"], 40);
    assert_eq!(progress["isCompleted"], false);

    let (_, progress) = put(
        &app,
        &format!("/api/users/{user_id}/education/progress"),
        Some(&token),
        json!({ "moduleId": 7, "progress": 100 }),
    )
    .await;
    assert_eq!(progress["isCompleted"], true);
    assert!(progress["completedAt"].is_string());

    let (_, rows) = get(
        &app,
        &format!("/api/users/{user_id}/education/progress"),
        Some(&token),
    )
    .await;
    assert_eq!(rows.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn bill_split_join_records_the_share() {
    let app = test_app();
    let (_maya_id, maya) = register_and_login(&app, "maya@example.com", "maya").await;
    let (noor_id, noor) = register_and_login(&app, "noor@example.com", "noor").await;

    let (status, bill) = post(
        &app,
        "/api/bill-splits",
        Some(&maya),
        json!({ "title": "Dinner", "totalAmount": "1200.00" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let bill_id = bill["id"].as_i64().unwrap();

    let (status, member) = post(
        &app,
        &format!("/api/bill-splits/{bill_id}/join"),
        Some(&noor),
        json!({ "shareAmount": "600.00" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(member["userId"].as_i64(), Some(noor_id));
    assert_eq!(member["owedAmount"], "600.00");
}

#[tokio::test]
async fn bank_accounts_and_scheduled_payments_are_per_user() {
    let app = test_app();
    let (user_id, token) = register_and_login(&app, "maya@example.com", "maya").await;

    let (status, account) = post(
        &app,
        "/api/bank-accounts",
        Some(&token),
        json!({ "bankName": "State Bank", "accountType": "savings" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(account["userId"].as_i64(), Some(user_id));

    let (status, payment) = post(
        &app,
        "/api/scheduled-payments",
        Some(&token),
        json!({
            "title": "Rent",
            "amount": "15000.00",
            "recipientUpi": "landlord@upi",
            "frequency": "monthly",
            "nextPaymentDate": "2026-09-01T00:00:00Z",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(payment["userId"].as_i64(), Some(user_id));

    let (_, accounts) =
        get(&app, &format!("/api/users/{user_id}/bank-accounts"), Some(&token)).await;
    assert_eq!(accounts.as_array().unwrap().len(), 1);
    let (_, payments) = get(
        &app,
        &format!("/api/users/{user_id}/scheduled-payments"),
        Some(&token),
    )
    .await;
    assert_eq!(payments.as_array().unwrap().len(), 1);
}
