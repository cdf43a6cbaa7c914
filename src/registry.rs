use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::models::auth::Identity;
use crate::outbox::Outbox;

/// One live, authenticated transport session. Carrying the identity here is
/// what makes unauthenticated registration unrepresentable.
#[derive(Clone)]
pub struct ConnectionHandle {
    pub id: Arc<str>,
    pub user: Identity,
    pub ip: SocketAddr,
    pub user_agent: Option<String>,
    pub connected_at: DateTime<Utc>,
    pub outbox: Arc<Outbox>,
}

#[derive(Default)]
struct Inner {
    connections: HashMap<Arc<str>, ConnectionHandle>,
    groups: HashMap<String, HashSet<Arc<str>>>,
}

/// Live connection table plus group membership. Both maps sit behind one
/// lock so disconnect cleanup is atomic across them.
#[derive(Clone, Default)]
pub struct ConnectionRegistry {
    inner: Arc<RwLock<Inner>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, conn: ConnectionHandle) -> Arc<str> {
        let id = conn.id.clone();
        self.inner.write().await.connections.insert(id.clone(), conn);
        id
    }

    /// Removes the connection from every group it joined, freeing groups
    /// that become empty. Returns the handle and the groups it left, so the
    /// caller can announce the departure. Runs on clean and abnormal
    /// disconnects alike.
    pub async fn unregister(&self, conn_id: &str) -> Option<(ConnectionHandle, Vec<String>)> {
        let mut inner = self.inner.write().await;
        let conn = inner.connections.remove(conn_id)?;
        let mut left = Vec::new();
        inner.groups.retain(|name, members| {
            if members.remove(conn_id) {
                left.push(name.clone());
            }
            !members.is_empty()
        });
        Some((conn, left))
    }

    /// Idempotent; a repeated join is a no-op. Returns false for an unknown
    /// connection.
    pub async fn join_group(&self, conn_id: &str, group: &str) -> bool {
        let mut inner = self.inner.write().await;
        let Some(conn) = inner.connections.get(conn_id) else {
            return false;
        };
        let id = conn.id.clone();
        inner.groups.entry(group.to_string()).or_default().insert(id);
        true
    }

    /// Idempotent; frees the group when the last member leaves.
    pub async fn leave_group(&self, conn_id: &str, group: &str) {
        let mut inner = self.inner.write().await;
        if let Some(members) = inner.groups.get_mut(group) {
            members.remove(conn_id);
            if members.is_empty() {
                inner.groups.remove(group);
            }
        }
    }

    pub async fn members_of(&self, group: &str) -> HashSet<Arc<str>> {
        self.inner
            .read()
            .await
            .groups
            .get(group)
            .cloned()
            .unwrap_or_default()
    }

    /// Membership snapshot with live handles; the set is fixed at call time,
    /// concurrent joins and leaves do not affect it.
    pub async fn snapshot(&self, group: &str) -> Vec<ConnectionHandle> {
        let inner = self.inner.read().await;
        match inner.groups.get(group) {
            Some(members) => members
                .iter()
                .filter_map(|id| inner.connections.get(id).cloned())
                .collect(),
            None => Vec::new(),
        }
    }

    pub async fn connection(&self, conn_id: &str) -> Option<ConnectionHandle> {
        self.inner.read().await.connections.get(conn_id).cloned()
    }

    pub async fn connections(&self) -> Vec<ConnectionHandle> {
        self.inner.read().await.connections.values().cloned().collect()
    }

    /// (group name, member count) pairs for the stats endpoint.
    pub async fn group_counts(&self) -> Vec<(String, usize)> {
        self.inner
            .read()
            .await
            .groups
            .iter()
            .map(|(name, members)| (name.clone(), members.len()))
            .collect()
    }
}
