//! WebSocket connection manager.
//!
//! Tracks every open connection and whether its chat has started. Session
//! contents are owned by the connection task, not stored here.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::debug;

use super::messages::ServerMessage;

/// State for a single WebSocket connection
pub(crate) struct ConnectionState {
    pub(crate) tx: mpsc::UnboundedSender<ServerMessage>,
    pub(crate) connected_at: DateTime<Utc>,
    pub(crate) chat_active: bool,
}

/// Manager for all WebSocket connections
pub struct WebSocketManager {
    pub(crate) connections: DashMap<String, ConnectionState>,
}

impl Default for WebSocketManager {
    fn default() -> Self {
        Self::new()
    }
}

impl WebSocketManager {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    pub(crate) fn add_connection(
        &self,
        session_id: String,
        tx: mpsc::UnboundedSender<ServerMessage>,
    ) {
        debug!(session_id = %session_id, "Adding WebSocket connection");
        self.connections.insert(
            session_id,
            ConnectionState {
                tx,
                connected_at: Utc::now(),
                chat_active: false,
            },
        );
        metrics::gauge!("aura_ws_connections").set(self.connections.len() as f64);
    }

    pub(crate) fn remove_connection(&self, session_id: &str) {
        if let Some((_, conn)) = self.connections.remove(session_id) {
            let open_for = Utc::now().signed_duration_since(conn.connected_at);
            debug!(
                session_id = %session_id,
                open_seconds = open_for.num_seconds(),
                "Removing WebSocket connection"
            );
        }
        metrics::gauge!("aura_ws_connections").set(self.connections.len() as f64);
    }

    pub(crate) fn set_chat_active(&self, session_id: &str, active: bool) {
        if let Some(mut conn) = self.connections.get_mut(session_id) {
            conn.chat_active = active;
        }
    }

    /// Send a message to a specific connection
    pub fn send_to(&self, session_id: &str, msg: ServerMessage) {
        if let Some(conn) = self.connections.get(session_id)
            && conn.tx.send(msg).is_err()
        {
            tracing::warn!(session_id = %session_id, "Failed to send message to connection");
        }
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Connections with a chat in progress
    pub fn active_chat_count(&self) -> usize {
        self.connections
            .iter()
            .filter(|entry| entry.value().chat_active)
            .count()
    }
}
