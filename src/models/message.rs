use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    #[default]
    Text,
    Image,
    Video,
    File,
}

/// Ordered so the forward-only invariant is a single comparison: the status
/// may advance along this order but never move back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Sent,
    Delivered,
    Read,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadReceipt {
    pub user_id: i64,
    pub read_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: i64,
    pub conversation_id: i64,
    pub sender_id: i64,
    pub sender_name: String,
    pub kind: MessageKind,
    pub text: Option<String>,
    pub attachments: Vec<Value>,
    pub reply_to_message_id: Option<i64>,
    pub reactions: Vec<Value>,
    pub read_receipts: Vec<ReadReceipt>,
    pub edited: bool,
    pub edited_at: Option<DateTime<Utc>>,
    pub deleted: bool,
    pub delivery_status: DeliveryStatus,
    pub created_at: DateTime<Utc>,
}

/// Sender-supplied fields for a new message; the store assigns the rest.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub conversation_id: i64,
    pub sender_id: i64,
    pub sender_name: String,
    pub kind: MessageKind,
    pub text: Option<String>,
    pub attachments: Vec<Value>,
    pub reply_to_message_id: Option<i64>,
}
