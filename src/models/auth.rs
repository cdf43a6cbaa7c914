use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct WsQuery {
    pub token: String,
}

/// Authenticated identity resolved by the session-issuing collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: i64,
    pub username: String,
    pub display_name: String,
}

#[derive(Clone, Deserialize)]
pub struct AuthResponse {
    pub ok: bool,
    #[serde(default)]
    pub user: Option<Identity>,
}
