mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::conversation::Conversation;
use crate::models::message::{ChatMessage, NewMessage};
use crate::models::notification::{NewNotification, Notification};

/// Error type of the persistence collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("persistence unavailable: {0}")]
    Unavailable(String),
}

/// Outcome of a mutation that must not leak existence or ownership to the
/// requester: handlers drop NotFound and Denied without an error frame.
#[derive(Debug)]
pub enum MutationOutcome {
    Applied(ChatMessage),
    NotFound,
    Denied,
}

/// Narrow interface over the rows the chat handlers touch. Schema and
/// storage engine live with the collaborator, not here.
#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn conversation(&self, id: i64) -> Result<Option<Conversation>, StoreError>;

    /// Persists a new message and moves the conversation's last-message
    /// pointer to it.
    async fn create_message(&self, new: NewMessage) -> Result<ChatMessage, StoreError>;

    async fn message(&self, id: i64) -> Result<Option<ChatMessage>, StoreError>;

    /// Appends a read receipt unless one already exists for this user and
    /// advances the delivery status to read. Never regresses the status.
    async fn append_read_receipt(
        &self,
        message_id: i64,
        user_id: i64,
        read_at: DateTime<Utc>,
    ) -> Result<MutationOutcome, StoreError>;

    /// Replaces the text when `requester` is the original sender and the
    /// message is not soft-deleted.
    async fn edit_message(
        &self,
        message_id: i64,
        requester: i64,
        text: String,
        edited_at: DateTime<Utc>,
    ) -> Result<MutationOutcome, StoreError>;

    /// Soft delete: the row is retained with `deleted` set.
    async fn delete_message(&self, message_id: i64, requester: i64)
    -> Result<MutationOutcome, StoreError>;
}

#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn create_notification(&self, new: NewNotification) -> Result<Notification, StoreError>;

    async fn count_unread(&self, user_id: i64) -> Result<u64, StoreError>;

    /// Idempotent and owner-scoped: unknown ids and foreign rows are no-ops.
    async fn mark_read(
        &self,
        notification_id: i64,
        user_id: i64,
        read_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Marks every unread row owned by `user_id`; returns how many changed.
    async fn mark_all_read(&self, user_id: i64, read_at: DateTime<Utc>)
    -> Result<u64, StoreError>;
}
