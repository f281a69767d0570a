use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Per-user streak counter, one row per streak type ("daily_save" etc.).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Streak {
    pub id: i64,
    pub user_id: i64,
    pub r#type: String,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub last_activity_date: Option<DateTime<Utc>>,
    pub streak_multiplier: String,
    pub total_rewards_earned: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakUpdate {
    pub current_streak: Option<i32>,
    pub longest_streak: Option<i32>,
    pub last_activity_date: Option<DateTime<Utc>>,
    pub streak_multiplier: Option<String>,
    pub total_rewards_earned: Option<String>,
}

/// Time-boxed community-wide challenge.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SeasonalChallenge {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub r#type: String,
    pub target_amount: Option<String>,
    pub target_count: Option<i32>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub reward_points: i32,
    pub reward_badges: Option<Value>,
    pub participant_limit: Option<i32>,
    pub is_active: bool,
    pub created_by: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSeasonalChallenge {
    pub title: String,
    pub r#type: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub description: Option<String>,
    pub target_amount: Option<String>,
    pub target_count: Option<i32>,
    pub reward_points: Option<i32>,
    pub reward_badges: Option<Value>,
    pub participant_limit: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeParticipant {
    pub id: i64,
    pub challenge_id: i64,
    pub user_id: i64,
    pub current_progress: String,
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub rank: Option<i32>,
    pub joined_at: DateTime<Utc>,
}

/// Catalog entry in the achievement tree.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub level: i32,
    pub prerequisite_ids: Option<Value>,
    pub reward_points: i32,
    pub reward_coins: i32,
    pub unlocks_features: Option<Value>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserAchievement {
    pub id: i64,
    pub user_id: i64,
    pub achievement_id: i64,
    pub progress: String,
    pub is_unlocked: bool,
    pub unlocked_at: Option<DateTime<Utc>>,
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Redeemable item in the reward store.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Reward {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub r#type: String,
    pub points_cost: i32,
    pub coins_cost: i32,
    pub value: Option<String>,
    pub category: Option<String>,
    pub vendor: Option<String>,
    pub validity_days: i32,
    pub stock_quantity: Option<i32>,
    pub is_active: bool,
    pub image_url: Option<String>,
    pub terms_conditions: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserReward {
    pub id: i64,
    pub user_id: i64,
    pub reward_id: i64,
    pub points_spent: i32,
    pub coins_spent: i32,
    pub status: String,
    pub redemption_code: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub used_at: Option<DateTime<Utc>>,
    pub redeemed_at: DateTime<Utc>,
}
