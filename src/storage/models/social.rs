use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub r#type: String,
    pub captain_id: i64,
    pub total_savings: String,
    pub member_count: i32,
    pub max_members: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTeam {
    pub name: String,
    pub r#type: String,
    pub description: Option<String>,
    pub max_members: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub id: i64,
    pub team_id: i64,
    pub user_id: i64,
    pub role: String,
    pub joined_at: DateTime<Utc>,
    pub contributed_amount: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Community {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub created_by: i64,
    pub member_count: i32,
    pub is_public: bool,
    pub image_url: Option<String>,
    pub rules: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCommunity {
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub is_public: Option<bool>,
    pub image_url: Option<String>,
    pub rules: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CommunityMember {
    pub id: i64,
    pub community_id: i64,
    pub user_id: i64,
    pub role: String,
    pub joined_at: DateTime<Utc>,
}

/// Shared savings goal that several users contribute to.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct GroupGoal {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub target_amount: String,
    pub current_amount: String,
    pub target_date: Option<DateTime<Utc>>,
    pub category: Option<String>,
    pub created_by: i64,
    pub is_active: bool,
    pub is_public: bool,
    pub member_limit: i32,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGroupGoal {
    pub name: String,
    pub target_amount: String,
    pub description: Option<String>,
    pub target_date: Option<DateTime<Utc>>,
    pub category: Option<String>,
    pub is_public: Option<bool>,
    pub member_limit: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct GroupGoalMember {
    pub id: i64,
    pub goal_id: i64,
    pub user_id: i64,
    pub contributed_amount: String,
    pub target_contribution: Option<String>,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Mentorship {
    pub id: i64,
    pub mentor_id: i64,
    pub mentee_id: i64,
    pub status: String,
    pub specialization: Option<String>,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMentorship {
    pub mentee_id: i64,
    pub specialization: Option<String>,
}
