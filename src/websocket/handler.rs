use std::{collections::HashMap, net::SocketAddr, sync::Arc};

use axum::{
    Json,
    extract::{
        ConnectInfo, Path, Query, State, rejection::QueryRejection, ws::WebSocketUpgrade,
    },
    http::{HeaderMap, StatusCode},
    response::Response,
};
use chrono::Utc;
use serde_json::Value;

use crate::{
    models::auth::{Identity, WsQuery},
    outbox::Outbox,
    registry::ConnectionHandle,
    state::{AppState, OUTBOX_CAPACITY},
    utils::{ids::connection_id, rate_limit::check_rate_limit},
    websocket::{
        chat::ChatSession, connection, loan_updates::LoanUpdateSession,
        notifications::NotificationSession,
    },
};

type WsError = (StatusCode, Json<Value>);

/// Rate limit and token check shared by all three streams. An
/// unauthenticated handshake is refused before anything is registered.
async fn authenticate(
    state: &AppState,
    query: Result<Query<WsQuery>, QueryRejection>,
    addr: SocketAddr,
    headers: &HeaderMap,
) -> Result<Identity, WsError> {
    let query = query
        .map_err(|_| {
            (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": "BAD_REQUEST" })),
            )
        })?
        .0;

    check_rate_limit(state, addr).await?;

    let headers_json: HashMap<String, String> = headers
        .iter()
        .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.to_string(), v.to_string())))
        .collect();

    state
        .auth
        .verify(&query.token, addr, &headers_json)
        .await
        .map_err(|err| {
            tracing::info!(ip = %addr, error = %err, "websocket handshake rejected");
            (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({ "error": "UNAUTHORIZED" })),
            )
        })
}

fn new_connection(user: Identity, addr: SocketAddr, headers: &HeaderMap) -> ConnectionHandle {
    let user_agent = headers
        .get("user-agent")
        .and_then(|h| h.to_str().ok())
        .map(String::from);
    ConnectionHandle {
        id: connection_id(),
        user,
        ip: addr,
        user_agent,
        connected_at: Utc::now(),
        outbox: Arc::new(Outbox::new(OUTBOX_CAPACITY)),
    }
}

pub async fn chat_ws_handler(
    Path(conversation_id): Path<i64>,
    query: Result<Query<WsQuery>, QueryRejection>,
    ws: WebSocketUpgrade,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, WsError> {
    let user = authenticate(&state, query, addr, &headers).await?;
    let conn = new_connection(user, addr, &headers);
    Ok(ws.on_upgrade(move |socket| async move {
        let outbox = conn.outbox.clone();
        match ChatSession::join(state, conn, conversation_id).await {
            Ok(session) => connection::drive(socket, outbox, session).await,
            // Socket drops closed; nothing was registered.
            Err(err) => tracing::info!(conversation_id, error = %err, "chat join refused"),
        }
    }))
}

pub async fn notifications_ws_handler(
    query: Result<Query<WsQuery>, QueryRejection>,
    ws: WebSocketUpgrade,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, WsError> {
    let user = authenticate(&state, query, addr, &headers).await?;
    let conn = new_connection(user, addr, &headers);
    Ok(ws.on_upgrade(move |socket| async move {
        let outbox = conn.outbox.clone();
        match NotificationSession::join(state, conn).await {
            Ok(session) => connection::drive(socket, outbox, session).await,
            Err(err) => tracing::info!(error = %err, "notification join refused"),
        }
    }))
}

pub async fn loan_updates_ws_handler(
    query: Result<Query<WsQuery>, QueryRejection>,
    ws: WebSocketUpgrade,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, WsError> {
    let user = authenticate(&state, query, addr, &headers).await?;
    let conn = new_connection(user, addr, &headers);
    Ok(ws.on_upgrade(move |socket| async move {
        let outbox = conn.outbox.clone();
        match LoanUpdateSession::join(state, conn).await {
            Ok(session) => connection::drive(socket, outbox, session).await,
            Err(err) => tracing::info!(error = %err, "loan update join refused"),
        }
    }))
}
