use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::SessionError;
use crate::models::auth::{AuthResponse, Identity};

const AUTH_TIMEOUT: Duration = Duration::from_secs(2);

/// Handshake authentication against the session-issuing collaborator. The
/// core never mints identities itself.
#[async_trait]
pub trait AuthVerifier: Send + Sync {
    async fn verify(
        &self,
        token: &str,
        ip: SocketAddr,
        headers: &HashMap<String, String>,
    ) -> Result<Identity, SessionError>;
}

/// POSTs the token to the configured endpoint; anything but `ok: true` with
/// a resolved user is Unauthorized.
pub struct HttpAuthVerifier {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpAuthVerifier {
    pub fn new(client: reqwest::Client, endpoint: String) -> Self {
        Self { client, endpoint }
    }
}

#[async_trait]
impl AuthVerifier for HttpAuthVerifier {
    async fn verify(
        &self,
        token: &str,
        ip: SocketAddr,
        headers: &HashMap<String, String>,
    ) -> Result<Identity, SessionError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&serde_json::json!({
                "token": token,
                "ip": ip.to_string(),
                "headers": headers,
            }))
            .timeout(AUTH_TIMEOUT)
            .send()
            .await
            .map_err(|err| SessionError::Transport(err.to_string()))?;

        let auth: AuthResponse = response
            .json()
            .await
            .map_err(|err| SessionError::Transport(err.to_string()))?;

        match auth {
            AuthResponse {
                ok: true,
                user: Some(user),
            } => Ok(user),
            _ => Err(SessionError::Unauthorized),
        }
    }
}
