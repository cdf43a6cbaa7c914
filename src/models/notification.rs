use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Durable notification record. Created by the dispatcher, mutated only by
/// read-state transitions; the live path never deletes one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub message: String,
    pub loan_id: Option<i64>,
    /// Decimal string, never floating point.
    pub amount: Option<String>,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: i64,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub loan_id: Option<i64>,
    pub amount: Option<String>,
}
