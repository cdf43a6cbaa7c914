#![allow(dead_code)]

use std::{collections::HashMap, net::SocketAddr, sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;

use lendstream::auth::AuthVerifier;
use lendstream::error::SessionError;
use lendstream::models::auth::Identity;
use lendstream::models::conversation::Conversation;
use lendstream::outbox::Outbox;
use lendstream::registry::ConnectionHandle;
use lendstream::state::AppState;
use lendstream::store::MemoryStore;
use lendstream::utils::ids::connection_id;

/// Verifier that accepts any numeric token as the user id. Keeps tests off
/// the network entirely.
pub struct StaticAuth;

#[async_trait]
impl AuthVerifier for StaticAuth {
    async fn verify(
        &self,
        token: &str,
        _ip: SocketAddr,
        _headers: &HashMap<String, String>,
    ) -> Result<Identity, SessionError> {
        let user_id: i64 = token.parse().map_err(|_| SessionError::Unauthorized)?;
        Ok(Identity {
            user_id,
            username: format!("user{user_id}"),
            display_name: format!("User {user_id}"),
        })
    }
}

pub fn test_state() -> (Arc<AppState>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(
        store.clone(),
        store.clone(),
        Arc::new(StaticAuth),
        "test_admin_token".to_string(),
        10,
        Duration::from_secs(1),
    );
    (Arc::new(state), store)
}

pub async fn seed_conversation(store: &MemoryStore, id: i64, participants: Vec<i64>) {
    store
        .insert_conversation(Conversation {
            id,
            title: None,
            participants,
            last_message_id: None,
        })
        .await;
}

pub fn test_connection(user_id: i64) -> ConnectionHandle {
    ConnectionHandle {
        id: connection_id(),
        user: Identity {
            user_id,
            username: format!("user{user_id}"),
            display_name: format!("User {user_id}"),
        },
        ip: "127.0.0.1:8080".parse().unwrap(),
        user_agent: Some("test-agent".to_string()),
        connected_at: Utc::now(),
        outbox: Arc::new(Outbox::new(8)),
    }
}

/// Next frame queued on the connection, decoded. Panics if none arrives
/// promptly.
pub async fn recv_frame(conn: &ConnectionHandle) -> Value {
    let text = tokio::time::timeout(Duration::from_millis(100), conn.outbox.recv())
        .await
        .expect("timed out waiting for frame")
        .expect("outbox closed");
    serde_json::from_str(&text).expect("frame is not valid JSON")
}

pub async fn assert_no_frame(conn: &ConnectionHandle) {
    let result = tokio::time::timeout(Duration::from_millis(50), conn.outbox.recv()).await;
    assert!(result.is_err(), "unexpected frame: {:?}", result);
}
