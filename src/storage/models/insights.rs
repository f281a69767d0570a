use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Monthly spending cap for one category.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub id: i64,
    pub user_id: i64,
    pub category: String,
    pub monthly_limit: String,
    pub current_spent: String,
    pub alert_threshold: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBudget {
    pub category: String,
    pub monthly_limit: String,
    pub alert_threshold: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetUpdate {
    pub monthly_limit: Option<String>,
    pub current_spent: Option<String>,
    pub alert_threshold: Option<String>,
    pub is_active: Option<bool>,
}

/// Snapshot of a user's composite financial health score (0-100 per axis).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FinancialHealth {
    pub id: i64,
    pub user_id: i64,
    pub overall_score: i32,
    pub savings_score: i32,
    pub spending_score: i32,
    pub investment_score: i32,
    pub budget_score: i32,
    pub streak_score: i32,
    pub calculated_at: DateTime<Utc>,
    pub recommendations: Option<Value>,
    pub trends: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthScores {
    pub overall_score: i32,
    pub savings_score: i32,
    pub spending_score: i32,
    pub investment_score: i32,
    pub budget_score: i32,
    pub streak_score: i32,
    pub recommendations: Option<Value>,
    pub trends: Option<Value>,
}
