use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::ws::{Message as WsMessage, WebSocket};
use futures_util::{SinkExt, StreamExt};

use crate::outbox::Outbox;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(80);
const HEARTBEAT_MESSAGE: &str = "ping";

/// One joined session: the pump owns the socket and the outbox, the session
/// owns the semantics.
#[async_trait]
pub trait SessionHandler: Send + Sync {
    async fn handle_frame(&self, text: &str);

    /// Cleanup. The pump runs this on every exit path, clean or not.
    async fn close(&self);
}

/// Drives one connection to completion: a send task drains the outbox into
/// the socket (with heartbeat), a receive task feeds inbound frames to the
/// session. Whichever side ends first, cleanup runs before this returns.
pub async fn drive<S>(socket: WebSocket, outbox: Arc<Outbox>, session: S)
where
    S: SessionHandler + 'static,
{
    let session = Arc::new(session);
    let (mut ws_sender, mut ws_receiver) = socket.split();

    let drain = outbox.clone();
    let mut send_task = tokio::spawn(async move {
        let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
        loop {
            tokio::select! {
                frame = drain.recv() => {
                    match frame {
                        Some(text) => {
                            if ws_sender.send(WsMessage::Text(text.into())).await.is_err() {
                                break;
                            }
                        }
                        None => break,
                    }
                }
                _ = heartbeat.tick() => {
                    if ws_sender.send(WsMessage::Text(HEARTBEAT_MESSAGE.into())).await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    let recv_session = session.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = ws_receiver.next().await {
            match msg {
                Ok(WsMessage::Text(text)) => recv_session.handle_frame(text.as_str()).await,
                Ok(WsMessage::Close(_)) => break,
                Ok(_) => continue,
                Err(_) => break,
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    outbox.close();
    session.close().await;
}
