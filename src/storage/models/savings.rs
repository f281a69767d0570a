use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A payment or round-up event on a user's account.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    pub r#type: String,
    pub amount: String,
    pub original_amount: Option<String>,
    pub round_up_amount: Option<String>,
    pub payee: Option<String>,
    pub upi_id: Option<String>,
    pub note: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    pub r#type: String,
    pub amount: String,
    pub original_amount: Option<String>,
    pub round_up_amount: Option<String>,
    pub payee: Option<String>,
    pub upi_id: Option<String>,
    pub note: Option<String>,
    pub status: Option<String>,
}

/// A personal savings challenge.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub target_amount: String,
    pub current_amount: String,
    pub deadline: Option<DateTime<Utc>>,
    pub status: String,
    pub category: Option<String>,
    pub is_template: bool,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewChallenge {
    pub title: String,
    pub target_amount: String,
    pub description: Option<String>,
    pub current_amount: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub status: Option<String>,
    pub category: Option<String>,
    pub is_template: Option<bool>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub target_amount: Option<String>,
    pub current_amount: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub status: Option<String>,
    pub category: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Feed entry shown on the user's activity timeline.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: i64,
    pub user_id: i64,
    pub r#type: String,
    pub amount: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub metadata: Option<Value>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewActivity {
    pub r#type: String,
    pub amount: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserBadge {
    pub id: i64,
    pub user_id: i64,
    pub badge_id: String,
    pub earned: bool,
    pub earned_at: Option<DateTime<Utc>>,
}
