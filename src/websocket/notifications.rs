use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::broker::notifications_group;
use crate::error::SessionError;
use crate::protocol::{Frame, NotificationAction};
use crate::registry::ConnectionHandle;
use crate::state::AppState;
use crate::websocket::connection::SessionHandler;

/// Per-connection handler for a user's personal notification stream.
///
/// Read-state mutations are not echoed back, and sibling connections of the
/// same user are not synchronized either; they catch up on their next join.
pub struct NotificationSession {
    state: Arc<AppState>,
    conn: ConnectionHandle,
}

impl NotificationSession {
    /// Registers into the user's notification group and immediately queues
    /// the current unread count, so the client never has to guess staleness.
    pub async fn join(state: Arc<AppState>, conn: ConnectionHandle) -> Result<Self, SessionError> {
        let count = state
            .notifications
            .count_unread(conn.user.user_id)
            .await?;
        let group = notifications_group(conn.user.user_id);
        state.registry.register(conn.clone()).await;
        state.registry.join_group(&conn.id, &group).await;

        let frame = Frame::UnreadCount { count };
        match serde_json::to_string(&frame) {
            Ok(text) => {
                conn.outbox.push(text, frame.priority()).await;
            }
            Err(err) => tracing::error!(conn = %conn.id, error = %err, "failed to encode unread count"),
        }
        Ok(Self { state, conn })
    }
}

#[async_trait]
impl SessionHandler for NotificationSession {
    async fn handle_frame(&self, text: &str) {
        let action: NotificationAction = match serde_json::from_str(text) {
            Ok(action) => action,
            Err(err) => {
                tracing::debug!(conn = %self.conn.id, error = %err, "unrecognized notification frame");
                return;
            }
        };
        let user_id = self.conn.user.user_id;
        let result = match action {
            NotificationAction::MarkRead { notification_id } => {
                self.state
                    .notifications
                    .mark_read(notification_id, user_id, Utc::now())
                    .await
            }
            NotificationAction::MarkAllRead => self
                .state
                .notifications
                .mark_all_read(user_id, Utc::now())
                .await
                .map(|_| ()),
        };
        if let Err(err) = result {
            tracing::error!(conn = %self.conn.id, user_id, error = %err, "read-state mutation failed");
        }
    }

    async fn close(&self) {
        self.state.registry.unregister(&self.conn.id).await;
    }
}
