use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BankAccount {
    pub id: i64,
    pub user_id: i64,
    pub bank_name: String,
    pub account_type: String,
    pub account_number: Option<String>,
    pub balance: Option<String>,
    pub is_active: bool,
    pub is_primary: bool,
    pub last_sync_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBankAccount {
    pub bank_name: String,
    pub account_type: String,
    pub account_number: Option<String>,
    pub balance: Option<String>,
    pub is_primary: Option<bool>,
}

/// Shared expense split between several users.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BillSplit {
    pub id: i64,
    pub created_by: i64,
    pub title: String,
    pub total_amount: String,
    pub description: Option<String>,
    pub r#type: String,
    pub status: String,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBillSplit {
    pub title: String,
    pub total_amount: String,
    pub description: Option<String>,
    pub r#type: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BillSplitMember {
    pub id: i64,
    pub bill_id: i64,
    pub user_id: i64,
    pub owed_amount: String,
    pub paid_amount: String,
    pub status: String,
    pub paid_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledPayment {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub amount: String,
    pub recipient_upi: String,
    pub frequency: String,
    pub next_payment_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub auto_execute: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewScheduledPayment {
    pub title: String,
    pub amount: String,
    pub recipient_upi: String,
    pub frequency: String,
    pub next_payment_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub auto_execute: Option<bool>,
}
