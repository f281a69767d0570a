use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Financial literacy lesson.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EducationModule {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub level: String,
    pub content: String,
    pub video_url: Option<String>,
    pub duration: Option<i32>,
    pub prerequisite_ids: Option<Value>,
    pub reward_points: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Per-user progress through a module. Progress is a whole percentage;
/// 100 marks the module completed.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EducationProgress {
    pub id: i64,
    pub user_id: i64,
    pub module_id: i64,
    pub progress: i32,
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub last_accessed_at: DateTime<Utc>,
    pub time_spent: i32,
}
