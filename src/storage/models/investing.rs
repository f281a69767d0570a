use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub r#type: String,
    pub total_invested: String,
    pub current_value: String,
    pub returns: String,
    pub returns_percentage: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPortfolio {
    pub name: String,
    pub r#type: String,
    pub total_invested: Option<String>,
    pub current_value: Option<String>,
    pub returns: Option<String>,
    pub returns_percentage: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioUpdate {
    pub name: Option<String>,
    pub r#type: Option<String>,
    pub total_invested: Option<String>,
    pub current_value: Option<String>,
    pub returns: Option<String>,
    pub returns_percentage: Option<String>,
    pub is_active: Option<bool>,
}

/// Systematic investment plan attached to a portfolio.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SipPlan {
    pub id: i64,
    pub user_id: i64,
    pub portfolio_id: i64,
    pub name: String,
    pub monthly_amount: String,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub next_payment_date: DateTime<Utc>,
    pub is_active: bool,
    pub auto_invest_roundups: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSipPlan {
    pub portfolio_id: i64,
    pub name: String,
    pub monthly_amount: String,
    pub start_date: DateTime<Utc>,
    pub next_payment_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
    pub auto_invest_roundups: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SipPlanUpdate {
    pub name: Option<String>,
    pub monthly_amount: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub next_payment_date: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
    pub auto_invest_roundups: Option<bool>,
}

/// A single buy/sell/SIP installment against a portfolio.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Investment {
    pub id: i64,
    pub user_id: i64,
    pub portfolio_id: i64,
    pub r#type: String,
    pub amount: String,
    pub units: Option<String>,
    pub price_per_unit: Option<String>,
    pub transaction_date: DateTime<Utc>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInvestment {
    pub portfolio_id: i64,
    pub r#type: String,
    pub amount: String,
    pub units: Option<String>,
    pub price_per_unit: Option<String>,
    pub transaction_date: Option<DateTime<Utc>>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentGoal {
    pub id: i64,
    pub user_id: i64,
    pub portfolio_id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub target_amount: String,
    pub current_amount: String,
    pub target_date: Option<DateTime<Utc>>,
    pub category: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInvestmentGoal {
    pub title: String,
    pub target_amount: String,
    pub portfolio_id: Option<i64>,
    pub description: Option<String>,
    pub current_amount: Option<String>,
    pub target_date: Option<DateTime<Utc>>,
    pub category: Option<String>,
    pub is_active: Option<bool>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentGoalUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub target_amount: Option<String>,
    pub current_amount: Option<String>,
    pub target_date: Option<DateTime<Utc>>,
    pub category: Option<String>,
    pub is_active: Option<bool>,
    pub completed_at: Option<DateTime<Utc>>,
}
