use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;

use crate::broker::{Exclude, chat_group};
use crate::error::SessionError;
use crate::models::message::{MessageKind, NewMessage};
use crate::protocol::{ChatEvent, Frame};
use crate::registry::ConnectionHandle;
use crate::state::AppState;
use crate::store::MutationOutcome;
use crate::websocket::connection::SessionHandler;

/// Per-connection handler for one conversation's chat stream.
///
/// Chat is best-effort: events referencing unknown messages and mutations by
/// non-senders are dropped with a log record, never an error frame, so stale
/// clients cannot crash the session and unauthorized actors learn nothing.
pub struct ChatSession {
    state: Arc<AppState>,
    conn: ConnectionHandle,
    conversation_id: i64,
    group: String,
}

impl ChatSession {
    /// Resolves the conversation, registers the connection, joins the chat
    /// group and announces the user. Nothing is registered when the
    /// conversation id does not resolve.
    pub async fn join(
        state: Arc<AppState>,
        conn: ConnectionHandle,
        conversation_id: i64,
    ) -> Result<Self, SessionError> {
        if state.messages.conversation(conversation_id).await?.is_none() {
            return Err(SessionError::NotFound("conversation"));
        }
        let group = chat_group(conversation_id);
        state.registry.register(conn.clone()).await;
        state.registry.join_group(&conn.id, &group).await;
        state
            .broker
            .publish(
                &group,
                &Frame::UserJoined {
                    user_id: conn.user.user_id,
                    username: conn.user.username.clone(),
                },
                Some(Exclude::User(conn.user.user_id)),
            )
            .await;
        tracing::debug!(conn = %conn.id, conversation_id, "chat session joined");
        Ok(Self {
            state,
            conn,
            conversation_id,
            group,
        })
    }

    async fn handle_message(
        &self,
        text: Option<String>,
        attachments: Vec<Value>,
        reply_to_message_id: Option<i64>,
        message_type: MessageKind,
    ) {
        let no_text = text.as_deref().map_or(true, |t| t.trim().is_empty());
        if no_text && attachments.is_empty() {
            tracing::debug!(conn = %self.conn.id, "dropping empty chat message");
            return;
        }

        // A stale reply-to id degrades to no reply rather than a rejection.
        let reply_to = match reply_to_message_id {
            Some(id) => match self.state.messages.message(id).await {
                Ok(found) => found.map(|m| m.id),
                Err(err) => {
                    tracing::error!(conn = %self.conn.id, error = %err, "reply lookup failed");
                    return;
                }
            },
            None => None,
        };

        let created = self
            .state
            .messages
            .create_message(NewMessage {
                conversation_id: self.conversation_id,
                sender_id: self.conn.user.user_id,
                sender_name: self.conn.user.display_name.clone(),
                kind: message_type,
                text,
                attachments,
                reply_to_message_id: reply_to,
            })
            .await;

        match created {
            Ok(message) => {
                self.state
                    .broker
                    .publish(&self.group, &Frame::ChatMessage { message }, None)
                    .await;
            }
            Err(err) => {
                tracing::error!(conn = %self.conn.id, error = %err, "failed to persist chat message");
            }
        }
    }

    async fn handle_typing(&self, is_typing: bool) {
        self.state
            .broker
            .publish(
                &self.group,
                &Frame::TypingIndicator {
                    user_id: self.conn.user.user_id,
                    username: self.conn.user.username.clone(),
                    is_typing,
                },
                Some(Exclude::Connection(&self.conn.id)),
            )
            .await;
    }

    async fn handle_read_receipt(&self, message_id: i64) {
        let read_at = Utc::now();
        let outcome = self
            .state
            .messages
            .append_read_receipt(message_id, self.conn.user.user_id, read_at)
            .await;
        match outcome {
            Ok(MutationOutcome::Applied(_)) => {
                self.state
                    .broker
                    .publish(
                        &self.group,
                        &Frame::ReadReceipt {
                            message_id,
                            user_id: self.conn.user.user_id,
                            read_at,
                        },
                        None,
                    )
                    .await;
            }
            Ok(outcome) => self.log_dropped("read_receipt", message_id, &outcome),
            Err(err) => {
                tracing::error!(conn = %self.conn.id, message_id, error = %err, "read receipt failed");
            }
        }
    }

    async fn handle_edit(&self, message_id: i64, text: String) {
        let edited_at = Utc::now();
        let outcome = self
            .state
            .messages
            .edit_message(message_id, self.conn.user.user_id, text.clone(), edited_at)
            .await;
        match outcome {
            Ok(MutationOutcome::Applied(_)) => {
                self.state
                    .broker
                    .publish(
                        &self.group,
                        &Frame::MessageEdited {
                            message_id,
                            text,
                            edited_at,
                        },
                        None,
                    )
                    .await;
            }
            Ok(outcome) => self.log_dropped("edit_message", message_id, &outcome),
            Err(err) => {
                tracing::error!(conn = %self.conn.id, message_id, error = %err, "edit failed");
            }
        }
    }

    async fn handle_delete(&self, message_id: i64) {
        let outcome = self
            .state
            .messages
            .delete_message(message_id, self.conn.user.user_id)
            .await;
        match outcome {
            Ok(MutationOutcome::Applied(_)) => {
                self.state
                    .broker
                    .publish(&self.group, &Frame::MessageDeleted { message_id }, None)
                    .await;
            }
            Ok(outcome) => self.log_dropped("delete_message", message_id, &outcome),
            Err(err) => {
                tracing::error!(conn = %self.conn.id, message_id, error = %err, "delete failed");
            }
        }
    }

    /// Dropped silently on the wire; this log line is the only audit trail.
    fn log_dropped(&self, event: &'static str, message_id: i64, outcome: &MutationOutcome) {
        tracing::info!(
            conn = %self.conn.id,
            user_id = self.conn.user.user_id,
            event,
            message_id,
            ?outcome,
            "dropped chat mutation"
        );
    }
}

#[async_trait]
impl SessionHandler for ChatSession {
    async fn handle_frame(&self, text: &str) {
        let event: ChatEvent = match serde_json::from_str(text) {
            Ok(event) => event,
            Err(err) => {
                tracing::debug!(conn = %self.conn.id, error = %err, "unrecognized chat frame");
                return;
            }
        };
        match event {
            ChatEvent::Message {
                text,
                attachments,
                reply_to_message_id,
                message_type,
            } => {
                self.handle_message(text, attachments, reply_to_message_id, message_type)
                    .await;
            }
            ChatEvent::Typing { is_typing } => self.handle_typing(is_typing).await,
            ChatEvent::ReadReceipt { message_id } => self.handle_read_receipt(message_id).await,
            ChatEvent::EditMessage { message_id, text } => {
                self.handle_edit(message_id, text).await;
            }
            ChatEvent::DeleteMessage { message_id } => self.handle_delete(message_id).await,
        }
    }

    async fn close(&self) {
        self.state
            .broker
            .publish(
                &self.group,
                &Frame::UserLeft {
                    user_id: self.conn.user.user_id,
                    username: self.conn.user.username.clone(),
                },
                Some(Exclude::User(self.conn.user.user_id)),
            )
            .await;
        self.state.registry.unregister(&self.conn.id).await;
        tracing::debug!(conn = %self.conn.id, conversation_id = self.conversation_id, "chat session closed");
    }
}
