use crate::protocol::Frame;
use crate::registry::ConnectionRegistry;

/// Canonical group names; stable across implementations for interop.
pub fn chat_group(conversation_id: i64) -> String {
    format!("chat:{conversation_id}")
}

pub fn notifications_group(user_id: i64) -> String {
    format!("notifications:{user_id}")
}

pub fn loan_updates_group(user_id: i64) -> String {
    format!("loanUpdates:{user_id}")
}

/// Receivers to skip during a publish.
#[derive(Debug, Clone, Copy)]
pub enum Exclude<'a> {
    /// One connection; typing indicators never echo to their sender.
    Connection(&'a str),
    /// Every connection of one user; join/leave announcements never echo to
    /// the user's own tabs.
    User(i64),
}

#[derive(Clone)]
pub struct GroupBroker {
    registry: ConnectionRegistry,
}

impl GroupBroker {
    pub fn new(registry: ConnectionRegistry) -> Self {
        Self { registry }
    }

    /// Delivers `frame` to the members of `group` as observed at call time.
    /// An empty or unknown group is a no-op. A member whose queue rejects
    /// the frame is skipped; the rest still receive it.
    pub async fn publish(&self, group: &str, frame: &Frame, exclude: Option<Exclude<'_>>) {
        let members = self.registry.snapshot(group).await;
        if members.is_empty() {
            return;
        }
        let text = match serde_json::to_string(frame) {
            Ok(text) => text,
            Err(err) => {
                tracing::error!(group, error = %err, "failed to encode frame");
                return;
            }
        };
        let priority = frame.priority();
        for conn in members {
            let skip = match exclude {
                Some(Exclude::Connection(id)) => conn.id.as_ref() == id,
                Some(Exclude::User(user_id)) => conn.user.user_id == user_id,
                None => false,
            };
            if skip {
                continue;
            }
            if !conn.outbox.push(text.clone(), priority).await {
                tracing::warn!(group, conn = %conn.id, "frame dropped for slow or closed connection");
            }
        }
    }
}
