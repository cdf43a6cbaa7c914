use axum::{Json, Router, http::StatusCode, routing::get};
use std::{net::SocketAddr, sync::Arc, time::Duration};

use crate::api::routes;
use crate::auth::HttpAuthVerifier;
use crate::state::AppState;
use crate::store::MemoryStore;
use crate::websocket::handler;

pub struct ServerConfig {
    pub admin_token: String,
    pub auth_endpoint: String,
    pub rate_limit_count: u32,
    pub rate_limit_seconds: u64,
    pub port: u16,
}

pub struct Server {
    state: Arc<AppState>,
    port: u16,
}

impl Server {
    pub fn new(config: ServerConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(
            store.clone(),
            store,
            Arc::new(HttpAuthVerifier::new(
                reqwest::Client::new(),
                config.auth_endpoint,
            )),
            config.admin_token,
            config.rate_limit_count,
            Duration::from_secs(config.rate_limit_seconds),
        );

        Self {
            state: Arc::new(state),
            port: config.port,
        }
    }

    /// Builds a server around pre-wired state. Lets callers swap in their
    /// own stores or auth verifier.
    pub fn with_state(state: Arc<AppState>, port: u16) -> Self {
        Self { state, port }
    }

    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let app = Router::new()
            .route("/ws/chat/{conversation_id}", get(handler::chat_ws_handler))
            .route("/ws/notifications", get(handler::notifications_ws_handler))
            .route("/ws/loan-updates", get(handler::loan_updates_ws_handler))
            .merge(routes::configure_api_routes(self.state.clone()))
            .fallback(|| async {
                (
                    StatusCode::NOT_FOUND,
                    Json(serde_json::json!({ "error": "NOT_FOUND" })),
                )
            })
            .with_state(self.state.clone());

        let url = format!("0.0.0.0:{}", self.port);
        tracing::info!(addr = %url, "listening");

        axum::serve(
            tokio::net::TcpListener::bind(&url).await?,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await?;

        Ok(())
    }
}
