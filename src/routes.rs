use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config;
use crate::handlers;
use crate::middleware::jwt_auth_middleware;
use crate::storage::Storage;

/// Shared application state: every handler reaches the store through this.
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn Storage>,
}

impl AppState {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }
}

/// Assemble the full application router. Authentication runs as a middleware
/// layer; route handlers only see requests that already carry a verified
/// principal (or hit a public endpoint).
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .merge(user_routes())
        .merge(savings_routes())
        .merge(investing_routes())
        .merge(gamification_routes())
        .merge(social_routes())
        .merge(insights_routes())
        .merge(education_routes())
        .merge(banking_routes())
        .fallback(endpoint_not_found)
        .layer(axum::middleware::from_fn(jwt_auth_middleware))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    let origins: Vec<HeaderValue> = config::config()
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

async fn endpoint_not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Endpoint not found" })))
}

fn user_routes() -> Router<AppState> {
    use handlers::users;

    Router::new()
        .route("/api/users", post(users::register))
        .route("/api/users/login", post(users::login))
        .route("/api/users/:id", get(users::get_user).put(users::update_user))
}

fn savings_routes() -> Router<AppState> {
    use handlers::savings;

    Router::new()
        .route("/api/transactions", post(savings::create_transaction))
        .route("/api/users/:id/transactions", get(savings::list_transactions))
        .route("/api/challenges", post(savings::create_challenge))
        .route("/api/users/:id/challenges", get(savings::list_challenges))
        .route("/api/challenges/:id", put(savings::update_challenge))
        .route("/api/activities", post(savings::create_activity))
        .route("/api/users/:id/activities", get(savings::list_activities))
        .route("/api/users/:id/badges", get(savings::list_badges))
        .route("/api/users/:id/badges/:badge_id", put(savings::set_badge))
}

fn investing_routes() -> Router<AppState> {
    use handlers::investing;

    Router::new()
        .route("/api/portfolios", post(investing::create_portfolio))
        .route("/api/users/:id/portfolios", get(investing::list_portfolios))
        .route(
            "/api/portfolios/:id",
            get(investing::get_portfolio).put(investing::update_portfolio),
        )
        .route("/api/sip-plans", post(investing::create_sip_plan))
        .route("/api/users/:id/sip-plans", get(investing::list_sip_plans))
        .route("/api/sip-plans/:id", put(investing::update_sip_plan))
        .route("/api/investments", post(investing::create_investment))
        .route("/api/users/:id/investments", get(investing::list_investments))
        .route(
            "/api/portfolios/:id/investments",
            get(investing::list_portfolio_investments),
        )
        .route("/api/investment-goals", post(investing::create_investment_goal))
        .route(
            "/api/users/:id/investment-goals",
            get(investing::list_investment_goals),
        )
        .route("/api/investment-goals/:id", put(investing::update_investment_goal))
}

fn gamification_routes() -> Router<AppState> {
    use handlers::gamification;

    Router::new()
        .route("/api/users/:id/streaks", get(gamification::list_streaks))
        .route("/api/users/:id/streaks/:type", put(gamification::put_streak))
        .route(
            "/api/seasonal-challenges",
            get(gamification::list_seasonal_challenges)
                .post(gamification::create_seasonal_challenge),
        )
        .route(
            "/api/seasonal-challenges/:id/join",
            post(gamification::join_seasonal_challenge),
        )
        .route(
            "/api/users/:id/seasonal-challenges",
            get(gamification::list_user_seasonal_challenges),
        )
        .route(
            "/api/seasonal-challenges/:id/progress",
            put(gamification::update_challenge_progress),
        )
        .route("/api/achievements", get(gamification::list_achievements))
        .route(
            "/api/users/:id/achievements",
            get(gamification::list_user_achievements).post(gamification::award_achievement),
        )
        .route("/api/rewards", get(gamification::list_rewards))
        .route("/api/users/:id/rewards", get(gamification::list_user_rewards))
        .route("/api/users/:id/rewards/redeem", post(gamification::redeem_reward))
}

fn social_routes() -> Router<AppState> {
    use handlers::social;

    Router::new()
        .route("/api/teams", get(social::list_teams).post(social::create_team))
        .route("/api/teams/:id/join", post(social::join_team))
        .route("/api/users/:id/teams", get(social::list_user_teams))
        .route(
            "/api/communities",
            get(social::list_communities).post(social::create_community),
        )
        .route("/api/communities/:id/join", post(social::join_community))
        .route(
            "/api/group-goals",
            get(social::list_group_goals).post(social::create_group_goal),
        )
        .route("/api/group-goals/:id/join", post(social::join_group_goal))
        .route("/api/users/:id/group-goals", get(social::list_user_group_goals))
        .route(
            "/api/mentorships",
            get(social::list_mentorships).post(social::create_mentorship),
        )
        .route("/api/users/:id/mentorships", get(social::list_user_mentorships))
        .route("/api/mentorships/:id/accept", post(social::accept_mentorship))
}

fn insights_routes() -> Router<AppState> {
    use handlers::insights;

    Router::new()
        .route("/api/budgets", post(insights::create_budget))
        .route("/api/users/:id/budgets", get(insights::list_budgets))
        .route("/api/budgets/:id", put(insights::update_budget))
        .route(
            "/api/users/:id/financial-health",
            get(insights::get_financial_health).put(insights::put_financial_health),
        )
}

fn education_routes() -> Router<AppState> {
    use handlers::education;

    Router::new()
        .route("/api/education/modules", get(education::list_modules))
        .route(
            "/api/users/:id/education/progress",
            get(education::list_progress).put(education::put_progress),
        )
}

fn banking_routes() -> Router<AppState> {
    use handlers::banking;

    Router::new()
        .route("/api/bank-accounts", post(banking::create_bank_account))
        .route("/api/users/:id/bank-accounts", get(banking::list_bank_accounts))
        .route("/api/bill-splits", post(banking::create_bill_split))
        .route("/api/users/:id/bill-splits", get(banking::list_bill_splits))
        .route("/api/bill-splits/:id/join", post(banking::join_bill_split))
        .route("/api/scheduled-payments", post(banking::create_scheduled_payment))
        .route(
            "/api/users/:id/scheduled-payments",
            get(banking::list_scheduled_payments),
        )
}
