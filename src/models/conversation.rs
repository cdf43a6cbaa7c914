use serde::{Deserialize, Serialize};

/// The last-message pointer drives list-view ordering and moves on every new
/// message in the conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: i64,
    pub title: Option<String>,
    pub participants: Vec<i64>,
    pub last_message_id: Option<i64>,
}
