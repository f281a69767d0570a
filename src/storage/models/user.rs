use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A SaveUp account. The password hash is deliberately not a field here: it
/// never leaves the storage layer, so a serialized `User` can never leak it.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub name: String,
    pub upi_id: Option<String>,
    pub total_savings: String,
    pub today_round_up: String,
    pub current_streak: i32,
    pub member_since: DateTime<Utc>,
    pub profile_picture: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Registration payload. `password` is optional only so that its absence can
/// be reported as a validation error rather than a deserialization failure.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub name: String,
    pub password: Option<String>,
    pub upi_id: Option<String>,
    pub total_savings: Option<String>,
    pub today_round_up: Option<String>,
    pub current_streak: Option<i32>,
    pub profile_picture: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    pub username: Option<String>,
    pub name: Option<String>,
    pub upi_id: Option<String>,
    pub total_savings: Option<String>,
    pub today_round_up: Option<String>,
    pub current_streak: Option<i32>,
    pub profile_picture: Option<String>,
}
