use std::sync::Arc;

use async_trait::async_trait;

use crate::broker::loan_updates_group;
use crate::error::SessionError;
use crate::registry::ConnectionHandle;
use crate::state::AppState;
use crate::websocket::connection::SessionHandler;

/// Per-connection handler for a user's loan-event stream. Pure fan-out: any
/// inbound payload is ignored.
pub struct LoanUpdateSession {
    state: Arc<AppState>,
    conn: ConnectionHandle,
}

impl LoanUpdateSession {
    pub async fn join(state: Arc<AppState>, conn: ConnectionHandle) -> Result<Self, SessionError> {
        let group = loan_updates_group(conn.user.user_id);
        state.registry.register(conn.clone()).await;
        state.registry.join_group(&conn.id, &group).await;
        Ok(Self { state, conn })
    }
}

#[async_trait]
impl SessionHandler for LoanUpdateSession {
    async fn handle_frame(&self, _text: &str) {
        tracing::debug!(conn = %self.conn.id, "ignoring inbound frame on loan-update stream");
    }

    async fn close(&self) {
        self.state.registry.unregister(&self.conn.id).await;
    }
}
