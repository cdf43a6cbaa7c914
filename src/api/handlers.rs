use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::state::AppState;

#[derive(Serialize)]
struct GroupStats {
    group: String,
    members: usize,
}

#[derive(Serialize)]
struct ConnectionStats {
    id: Arc<str>,
    user_id: i64,
    username: String,
    ip: String,
    user_agent: Option<String>,
    connected_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct Stats {
    groups: Vec<GroupStats>,
    connections: Vec<ConnectionStats>,
}

pub async fn stats_handler(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    let groups = state
        .registry
        .group_counts()
        .await
        .into_iter()
        .map(|(group, members)| GroupStats { group, members })
        .collect();

    let connections = state
        .registry
        .connections()
        .await
        .into_iter()
        .map(|conn| ConnectionStats {
            id: conn.id.clone(),
            user_id: conn.user.user_id,
            username: conn.user.username.clone(),
            ip: conn.ip.to_string(),
            user_agent: conn.user_agent.clone(),
            connected_at: conn.connected_at,
        })
        .collect();

    (
        StatusCode::OK,
        Json(serde_json::json!(Stats {
            groups,
            connections
        })),
    )
}

#[derive(Deserialize)]
pub struct DisconnectPayload {
    pub connection_id: String,
}

/// Force-disconnects one connection. Closing its outbox ends the send task;
/// the socket pump then runs the normal cleanup path (user_left, group
/// sweep, unregister).
pub async fn disconnect_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<DisconnectPayload>,
) -> Result<StatusCode, (StatusCode, Json<Value>)> {
    match state.registry.connection(&payload.connection_id).await {
        Some(conn) => {
            conn.outbox.close();
            Ok(StatusCode::OK)
        }
        None => Err((
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": "NOT_FOUND" })),
        )),
    }
}
