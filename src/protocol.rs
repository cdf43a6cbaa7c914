use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::message::{ChatMessage, MessageKind};
use crate::models::notification::Notification;

/// Inbound frames on a chat connection, tagged by `type`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    Message {
        #[serde(default)]
        text: Option<String>,
        #[serde(default)]
        attachments: Vec<Value>,
        #[serde(default)]
        reply_to_message_id: Option<i64>,
        #[serde(default)]
        message_type: MessageKind,
    },
    Typing {
        #[serde(default)]
        is_typing: bool,
    },
    ReadReceipt {
        message_id: i64,
    },
    EditMessage {
        message_id: i64,
        #[serde(default)]
        text: String,
    },
    DeleteMessage {
        message_id: i64,
    },
}

/// Inbound frames on a notification connection.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotificationAction {
    MarkRead { notification_id: i64 },
    MarkAllRead,
}

/// Whether a frame may be evicted from a full outbound queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    Lossy,
    Critical,
}

/// Outbound frames across all three streams, tagged by `type`. Monetary
/// amounts travel as exact decimal strings.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Frame {
    ChatMessage {
        message: ChatMessage,
    },
    TypingIndicator {
        user_id: i64,
        username: String,
        is_typing: bool,
    },
    ReadReceipt {
        message_id: i64,
        user_id: i64,
        read_at: DateTime<Utc>,
    },
    MessageEdited {
        message_id: i64,
        text: String,
        edited_at: DateTime<Utc>,
    },
    MessageDeleted {
        message_id: i64,
    },
    UserJoined {
        user_id: i64,
        username: String,
    },
    UserLeft {
        user_id: i64,
        username: String,
    },
    Notification {
        notification: Notification,
    },
    UnreadCount {
        count: u64,
    },
    LoanStatusChanged {
        loan_id: i64,
        status: String,
        message: String,
        updated_at: DateTime<Utc>,
    },
    LoanApproved {
        loan_id: i64,
        amount: String,
        message: String,
    },
    LoanDisbursed {
        loan_id: i64,
        amount: String,
        account_number: String,
    },
    PaymentReceived {
        loan_id: i64,
        payment_id: i64,
        amount: String,
        remaining_balance: String,
    },
    PaymentDueReminder {
        loan_id: i64,
        due_date: String,
        amount: String,
    },
}

impl Frame {
    /// Typing indicators are the only frames a congested connection may shed.
    pub fn priority(&self) -> Priority {
        match self {
            Frame::TypingIndicator { .. } => Priority::Lossy,
            _ => Priority::Critical,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_event_defaults_message_type_to_text() {
        let event: ChatEvent = serde_json::from_str(r#"{"type":"message","text":"hi"}"#).unwrap();
        match event {
            ChatEvent::Message {
                text, message_type, ..
            } => {
                assert_eq!(text.as_deref(), Some("hi"));
                assert_eq!(message_type, MessageKind::Text);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn outbound_frames_carry_literal_type_names() {
        let frame = Frame::UnreadCount { count: 3 };
        let value: Value = serde_json::to_value(&frame).unwrap();
        assert_eq!(value["type"], "unread_count");
        assert_eq!(value["count"], 3);

        let frame = Frame::PaymentReceived {
            loan_id: 1,
            payment_id: 2,
            amount: "150.00".into(),
            remaining_balance: "850.00".into(),
        };
        let value: Value = serde_json::to_value(&frame).unwrap();
        assert_eq!(value["type"], "payment_received");
        assert_eq!(value["amount"], "150.00");
    }
}
