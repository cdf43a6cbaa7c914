use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::Arc,
    time::{Duration, Instant},
};

use tokio::sync::RwLock;

use crate::auth::AuthVerifier;
use crate::broker::GroupBroker;
use crate::dispatch::NotificationDispatcher;
use crate::registry::ConnectionRegistry;
use crate::store::{MessageStore, NotificationStore};

#[derive(Clone)]
pub struct RateLimitEntry {
    pub count: u32,
    pub last_reset: Instant,
}

pub type RateLimits = Arc<RwLock<HashMap<SocketAddr, RateLimitEntry>>>;

/// Per-connection outbound queue capacity.
pub const OUTBOX_CAPACITY: usize = 64;

pub struct AppState {
    pub registry: ConnectionRegistry,
    pub broker: GroupBroker,
    pub messages: Arc<dyn MessageStore>,
    pub notifications: Arc<dyn NotificationStore>,
    pub dispatcher: NotificationDispatcher,
    pub auth: Arc<dyn AuthVerifier>,
    pub rate_limits: RateLimits,
    pub admin_token: String,
    pub rate_limit_count: u32,
    pub rate_limit_duration: Duration,
}

impl AppState {
    pub fn new(
        messages: Arc<dyn MessageStore>,
        notifications: Arc<dyn NotificationStore>,
        auth: Arc<dyn AuthVerifier>,
        admin_token: String,
        rate_limit_count: u32,
        rate_limit_duration: Duration,
    ) -> Self {
        let registry = ConnectionRegistry::new();
        let broker = GroupBroker::new(registry.clone());
        let dispatcher = NotificationDispatcher::new(broker.clone(), notifications.clone());
        Self {
            registry,
            broker,
            messages,
            notifications,
            dispatcher,
            auth,
            rate_limits: Arc::new(RwLock::new(HashMap::new())),
            admin_token,
            rate_limit_count,
            rate_limit_duration,
        }
    }
}
