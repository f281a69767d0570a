mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{get, post, put, register_and_login, test_app};

#[tokio::test]
async fn team_creator_is_seated_as_captain() {
    let app = test_app();
    let (maya_id, maya) = register_and_login(&app, "maya@example.com", "maya").await;

    let (status, team) = post(
        &app,
        "/api/teams",
        Some(&maya),
        json!({ "name": "Savers United", "type": "friends" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(team["captainId"].as_i64(), Some(maya_id));
    assert_eq!(team["memberCount"], 1);

    let (_, teams) = get(&app, &format!("/api/users/{maya_id}/teams"), Some(&maya)).await;
    assert_eq!(teams.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn joining_a_team_twice_is_rejected() {
    let app = test_app();
    let (_maya_id, maya) = register_and_login(&app, "maya@example.com", "maya").await;
    let (_noor_id, noor) = register_and_login(&app, "noor@example.com", "noor").await;

    let (_, team) = post(
        &app,
        "/api/teams",
        Some(&maya),
        json!({ "name": "Savers United", "type": "friends" }),
    )
    .await;
    let team_id = team["id"].as_i64().unwrap();

    let (status, member) =
        post(&app, &format!("/api/teams/{team_id}/join"), Some(&noor), json!({})).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(member["role"], "member");

    let (status, body) =
        post(&app, &format!("/api/teams/{team_id}/join"), Some(&noor), json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Already a member of this team");
}

#[tokio::test]
async fn full_team_rejects_new_members() {
    let app = test_app();
    let (_maya_id, maya) = register_and_login(&app, "maya@example.com", "maya").await;
    let (_noor_id, noor) = register_and_login(&app, "noor@example.com", "noor").await;

    // Capacity 1: the captain's seat.
    let (_, team) = post(
        &app,
        "/api/teams",
        Some(&maya),
        json!({ "name": "Solo", "type": "friends", "maxMembers": 1 }),
    )
    .await;
    let team_id = team["id"].as_i64().unwrap();

    let (status, body) =
        post(&app, &format!("/api/teams/{team_id}/join"), Some(&noor), json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Team is full");
}

#[tokio::test]
async fn community_creator_becomes_admin_member() {
    let app = test_app();
    let (_maya_id, maya) = register_and_login(&app, "maya@example.com", "maya").await;
    let (_noor_id, noor) = register_and_login(&app, "noor@example.com", "noor").await;

    let (status, community) = post(
        &app,
        "/api/communities",
        Some(&maya),
        json!({ "name": "Frugal Living", "category": "savings" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(community["memberCount"], 1);
    let community_id = community["id"].as_i64().unwrap();

    let (status, member) = post(
        &app,
        &format!("/api/communities/{community_id}/join"),
        Some(&noor),
        json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(member["role"], "member");

    let (_, listed) = get(&app, "/api/communities", None).await;
    assert_eq!(listed[0]["memberCount"], 2);
}

#[tokio::test]
async fn group_goal_join_and_listing() {
    let app = test_app();
    let (maya_id, maya) = register_and_login(&app, "maya@example.com", "maya").await;
    let (noor_id, noor) = register_and_login(&app, "noor@example.com", "noor").await;

    let (status, goal) = post(
        &app,
        "/api/group-goals",
        Some(&maya),
        json!({ "name": "Goa trip", "targetAmount": "40000.00" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let goal_id = goal["id"].as_i64().unwrap();

    let (status, member) = post(
        &app,
        &format!("/api/group-goals/{goal_id}/join"),
        Some(&noor),
        json!({ "contributedAmount": "500.00" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(member["contributedAmount"], "500.00");

    // The creator was auto-joined, so both users see the goal.
    for user_id_token in [(maya_id, &maya), (noor_id, &noor)] {
        let (_, goals) = get(
            &app,
            &format!("/api/users/{}/group-goals", user_id_token.0),
            Some(user_id_token.1),
        )
        .await;
        assert_eq!(goals.as_array().unwrap().len(), 1, "goal visible to both members");
    }
}

#[tokio::test]
async fn mentorship_accept_is_restricted_to_the_mentee() {
    let app = test_app();
    let (_maya_id, maya) = register_and_login(&app, "maya@example.com", "maya").await;
    let (noor_id, noor) = register_and_login(&app, "noor@example.com", "noor").await;
    let (_zed_id, zed) = register_and_login(&app, "zed@example.com", "zed").await;

    let (status, mentorship) = post(
        &app,
        "/api/mentorships",
        Some(&maya),
        json!({ "menteeId": noor_id, "specialization": "budgeting" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(mentorship["status"], "pending");
    let mentorship_id = mentorship["id"].as_i64().unwrap();

    let (status, body) = post(
        &app,
        &format!("/api/mentorships/{mentorship_id}/accept"),
        Some(&zed),
        json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Only the invited mentee can accept this mentorship");

    let (status, accepted) = post(
        &app,
        &format!("/api/mentorships/{mentorship_id}/accept"),
        Some(&noor),
        json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(accepted["status"], "active");
}

#[tokio::test]
async fn seasonal_challenge_join_and_progress() {
    let app = test_app();
    let (_maya_id, maya) = register_and_login(&app, "maya@example.com", "maya").await;
    let (noor_id, noor) = register_and_login(&app, "noor@example.com", "noor").await;

    let (status, challenge) = post(
        &app,
        "/api/seasonal-challenges",
        Some(&maya),
        json!({
            "title": "Monsoon saver",
            "type": "savings",
            "startDate": "2026-07-01T00:00:00Z",
            "endDate": "2026-09-30T00:00:00Z",
            "targetAmount": "5000.00",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let challenge_id = challenge["id"].as_i64().unwrap();

    let (status, participation) = post(
        &app,
        &format!("/api/seasonal-challenges/{challenge_id}/join"),
        Some(&noor),
        json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(participation["currentProgress"], "0.00");

    let (status, body) = post(
        &app,
        &format!("/api/seasonal-challenges/{challenge_id}/join"),
        Some(&noor),
        json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Already joined this challenge");

    let (status, updated) = put(
        &app,
        &format!("/api/seasonal-challenges/{challenge_id}/progress"),
        Some(&noor),
        json!({ "progress": "1200.00" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["currentProgress"], "1200.00");

    let (_, mine) = get(
        &app,
        &format!("/api/users/{noor_id}/seasonal-challenges"),
        Some(&noor),
    )
    .await;
    assert_eq!(mine.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn awarding_an_achievement_twice_returns_the_same_row() {
    let app = test_app();
    let (maya_id, maya) = register_and_login(&app, "maya@example.com", "maya").await;

    let (status, first) = post(
        &app,
        &format!("/api/users/{maya_id}/achievements"),
        Some(&maya),
        json!({ "achievementId": 11 }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["isUnlocked"], true);

    let (_, second) = post(
        &app,
        &format!("/api/users/{maya_id}/achievements"),
        Some(&maya),
        json!({ "achievementId": 11 }),
    )
    .await;
    assert_eq!(second["id"], first["id"]);

    let (_, mine) =
        get(&app, &format!("/api/users/{maya_id}/achievements"), Some(&maya)).await;
    assert_eq!(mine.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn redeeming_a_reward_issues_a_code_with_expiry() {
    let app = test_app();
    let (maya_id, maya) = register_and_login(&app, "maya@example.com", "maya").await;

    let (status, redemption) = post(
        &app,
        &format!("/api/users/{maya_id}/rewards/redeem"),
        Some(&maya),
        json!({ "rewardId": 3, "pointsSpent": 150 }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(redemption["status"], "active");
    assert!(redemption["redemptionCode"].as_str().unwrap().starts_with("RDM-"));
    assert!(redemption["expiresAt"].is_string());

    let (_, mine) = get(&app, &format!("/api/users/{maya_id}/rewards"), Some(&maya)).await;
    assert_eq!(mine.as_array().unwrap().len(), 1);
}
