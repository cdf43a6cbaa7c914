use std::cmp;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{MessageStore, MutationOutcome, NotificationStore, StoreError};
use crate::models::conversation::Conversation;
use crate::models::message::{ChatMessage, DeliveryStatus, NewMessage, ReadReceipt};
use crate::models::notification::{NewNotification, Notification};

#[derive(Default)]
struct Inner {
    conversations: HashMap<i64, Conversation>,
    messages: HashMap<i64, ChatMessage>,
    notifications: HashMap<i64, Notification>,
    next_message_id: i64,
    next_notification_id: i64,
}

/// In-memory persistence collaborator used for default wiring and tests. A
/// database-backed implementation plugs in behind the same traits.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Conversations are owned by the out-of-scope CRUD layer; tests and
    /// default wiring seed them directly.
    pub async fn insert_conversation(&self, conversation: Conversation) {
        self.inner
            .write()
            .await
            .conversations
            .insert(conversation.id, conversation);
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn conversation(&self, id: i64) -> Result<Option<Conversation>, StoreError> {
        Ok(self.inner.read().await.conversations.get(&id).cloned())
    }

    async fn create_message(&self, new: NewMessage) -> Result<ChatMessage, StoreError> {
        let mut inner = self.inner.write().await;
        inner.next_message_id += 1;
        let id = inner.next_message_id;
        let message = ChatMessage {
            id,
            conversation_id: new.conversation_id,
            sender_id: new.sender_id,
            sender_name: new.sender_name,
            kind: new.kind,
            text: new.text,
            attachments: new.attachments,
            reply_to_message_id: new.reply_to_message_id,
            reactions: Vec::new(),
            read_receipts: Vec::new(),
            edited: false,
            edited_at: None,
            deleted: false,
            delivery_status: DeliveryStatus::Sent,
            created_at: Utc::now(),
        };
        inner.messages.insert(id, message.clone());
        if let Some(conversation) = inner.conversations.get_mut(&new.conversation_id) {
            conversation.last_message_id = Some(id);
        }
        Ok(message)
    }

    async fn message(&self, id: i64) -> Result<Option<ChatMessage>, StoreError> {
        Ok(self.inner.read().await.messages.get(&id).cloned())
    }

    async fn append_read_receipt(
        &self,
        message_id: i64,
        user_id: i64,
        read_at: DateTime<Utc>,
    ) -> Result<MutationOutcome, StoreError> {
        let mut inner = self.inner.write().await;
        let Some(message) = inner.messages.get_mut(&message_id) else {
            return Ok(MutationOutcome::NotFound);
        };
        if !message.read_receipts.iter().any(|r| r.user_id == user_id) {
            message.read_receipts.push(ReadReceipt { user_id, read_at });
        }
        message.delivery_status = cmp::max(message.delivery_status, DeliveryStatus::Read);
        Ok(MutationOutcome::Applied(message.clone()))
    }

    async fn edit_message(
        &self,
        message_id: i64,
        requester: i64,
        text: String,
        edited_at: DateTime<Utc>,
    ) -> Result<MutationOutcome, StoreError> {
        let mut inner = self.inner.write().await;
        let Some(message) = inner.messages.get_mut(&message_id) else {
            return Ok(MutationOutcome::NotFound);
        };
        if message.sender_id != requester || message.deleted {
            return Ok(MutationOutcome::Denied);
        }
        message.text = Some(text);
        message.edited = true;
        message.edited_at = Some(edited_at);
        Ok(MutationOutcome::Applied(message.clone()))
    }

    async fn delete_message(
        &self,
        message_id: i64,
        requester: i64,
    ) -> Result<MutationOutcome, StoreError> {
        let mut inner = self.inner.write().await;
        let Some(message) = inner.messages.get_mut(&message_id) else {
            return Ok(MutationOutcome::NotFound);
        };
        if message.sender_id != requester {
            return Ok(MutationOutcome::Denied);
        }
        message.deleted = true;
        Ok(MutationOutcome::Applied(message.clone()))
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn create_notification(&self, new: NewNotification) -> Result<Notification, StoreError> {
        let mut inner = self.inner.write().await;
        inner.next_notification_id += 1;
        let id = inner.next_notification_id;
        let notification = Notification {
            id,
            user_id: new.user_id,
            kind: new.kind,
            title: new.title,
            message: new.message,
            loan_id: new.loan_id,
            amount: new.amount,
            is_read: false,
            read_at: None,
            created_at: Utc::now(),
        };
        inner.notifications.insert(id, notification.clone());
        Ok(notification)
    }

    async fn count_unread(&self, user_id: i64) -> Result<u64, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .notifications
            .values()
            .filter(|n| n.user_id == user_id && !n.is_read)
            .count() as u64)
    }

    async fn mark_read(
        &self,
        notification_id: i64,
        user_id: i64,
        read_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if let Some(notification) = inner.notifications.get_mut(&notification_id) {
            if notification.user_id == user_id && !notification.is_read {
                notification.is_read = true;
                notification.read_at = Some(read_at);
            }
        }
        Ok(())
    }

    async fn mark_all_read(
        &self,
        user_id: i64,
        read_at: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        let mut inner = self.inner.write().await;
        let mut changed = 0;
        for notification in inner.notifications.values_mut() {
            if notification.user_id == user_id && !notification.is_read {
                notification.is_read = true;
                notification.read_at = Some(read_at);
                changed += 1;
            }
        }
        Ok(changed)
    }
}
