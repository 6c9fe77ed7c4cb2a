//! Connection registry and room-scoped delivery
//!
//! Each authenticated socket registers exactly one connection here. A
//! connection is a member of its `user:{id}` room and, when the credential
//! carried an organization, of its `org:{id}` room. Membership is fixed at
//! registration and only released on unregister; the org room is never
//! reassigned mid-connection.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use serde_json::Value;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

pub type ConnectionId = u64;

struct ConnectionEntry {
    user_id: String,
    org_id: Option<String>,
    sender: UnboundedSender<String>,
}

/// Room membership and connection table. A single lock guards all three maps
/// so each register/unregister is atomic with respect to lookups.
#[derive(Default)]
struct Registry {
    connections: HashMap<ConnectionId, ConnectionEntry>,
    user_rooms: HashMap<String, HashSet<ConnectionId>>,
    org_rooms: HashMap<String, HashSet<ConnectionId>>,
}

/// Delivers best-effort push events to live connections.
///
/// Sending never blocks the caller beyond enqueuing onto each connection's
/// unbounded queue; a connection whose receiver is gone simply misses the
/// event. Delivery within one connection preserves send order; there is no
/// ordering guarantee across connections.
pub struct Broadcaster {
    registry: RwLock<Registry>,
    next_id: AtomicU64,
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl Broadcaster {
    pub fn new() -> Self {
        Self {
            registry: RwLock::new(Registry::default()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register an authenticated connection and join its rooms.
    ///
    /// Returns the connection id and the receiving end of the connection's
    /// event queue; the transport task pumps the receiver into the socket.
    pub fn register(
        &self,
        user_id: &str,
        org_id: Option<&str>,
    ) -> (ConnectionId, UnboundedReceiver<String>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        let mut registry = self.registry.write();
        registry
            .user_rooms
            .entry(user_id.to_string())
            .or_default()
            .insert(id);
        if let Some(org) = org_id {
            registry.org_rooms.entry(org.to_string()).or_default().insert(id);
        }
        registry.connections.insert(
            id,
            ConnectionEntry {
                user_id: user_id.to_string(),
                org_id: org_id.map(str::to_string),
                sender,
            },
        );

        debug!(connection = id, user = %user_id, org = ?org_id, "connection registered");
        (id, receiver)
    }

    /// Remove a connection and leave all of its rooms.
    pub fn unregister(&self, id: ConnectionId) {
        let mut registry = self.registry.write();
        if let Some(entry) = registry.connections.remove(&id) {
            if let Some(room) = registry.user_rooms.get_mut(&entry.user_id) {
                room.remove(&id);
                if room.is_empty() {
                    registry.user_rooms.remove(&entry.user_id);
                }
            }
            if let Some(org) = entry.org_id
                && let Some(room) = registry.org_rooms.get_mut(&org)
            {
                room.remove(&id);
                if room.is_empty() {
                    registry.org_rooms.remove(&org);
                }
            }
            debug!(connection = id, "connection unregistered");
        }
    }

    /// Deliver an event to every connection of one user.
    ///
    /// An offline user (no live connections) is not an error; the event is
    /// silently dropped and the count of reached connections is 0.
    pub fn send_to_user(&self, user_id: &str, event: &str, payload: Value) -> usize {
        let registry = self.registry.read();
        let Some(members) = registry.user_rooms.get(user_id) else {
            return 0;
        };
        deliver(&registry, members, event, &payload)
    }

    /// Deliver an event to every connection in an organization room.
    ///
    /// A missing organization (`None`) or an empty room is a no-op.
    pub fn send_to_org(&self, org_id: Option<&str>, event: &str, payload: Value) -> usize {
        let Some(org) = org_id else {
            return 0;
        };
        let registry = self.registry.read();
        let Some(members) = registry.org_rooms.get(org) else {
            return 0;
        };
        deliver(&registry, members, event, &payload)
    }

    /// Number of live connections (for handshake logging)
    pub fn connection_count(&self) -> usize {
        self.registry.read().connections.len()
    }
}

fn deliver(registry: &Registry, members: &HashSet<ConnectionId>, event: &str, payload: &Value) -> usize {
    let frame = envelope(event, payload);
    let mut delivered = 0;
    for id in members {
        if let Some(entry) = registry.connections.get(id)
            && entry.sender.send(frame.clone()).is_ok()
        {
            delivered += 1;
        }
    }
    delivered
}

/// JSON text frame shared by every push event
fn envelope(event: &str, payload: &Value) -> String {
    serde_json::json!({ "event": event, "data": payload }).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_send_to_user_delivers_in_order() {
        let broadcaster = Broadcaster::new();
        let (_id, mut rx) = broadcaster.register("user-1", None);

        assert_eq!(broadcaster.send_to_user("user-1", "NEW_NOTIFICATION", json!({"n": 1})), 1);
        assert_eq!(broadcaster.send_to_user("user-1", "NEW_NOTIFICATION", json!({"n": 2})), 1);

        let first: Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
        let second: Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
        assert_eq!(first["event"], "NEW_NOTIFICATION");
        assert_eq!(first["data"]["n"], 1);
        assert_eq!(second["data"]["n"], 2);
    }

    #[tokio::test]
    async fn test_send_to_offline_user_is_silent() {
        let broadcaster = Broadcaster::new();
        assert_eq!(broadcaster.send_to_user("nobody", "TASK_CREATED", json!({})), 0);
    }

    #[tokio::test]
    async fn test_send_to_missing_org_is_noop() {
        let broadcaster = Broadcaster::new();
        let (_id, _rx) = broadcaster.register("user-1", Some("org-1"));
        assert_eq!(broadcaster.send_to_org(None, "TASK_CREATED", json!({})), 0);
        assert_eq!(broadcaster.send_to_org(Some("other-org"), "TASK_CREATED", json!({})), 0);
    }

    #[tokio::test]
    async fn test_org_room_reaches_all_members() {
        let broadcaster = Broadcaster::new();
        let (_a, mut rx_a) = broadcaster.register("user-1", Some("org-1"));
        let (_b, mut rx_b) = broadcaster.register("user-2", Some("org-1"));
        let (_c, mut rx_c) = broadcaster.register("user-3", None);

        assert_eq!(broadcaster.send_to_org(Some("org-1"), "MEETING_CREATED", json!({"id": "m1"})), 2);

        assert!(rx_a.recv().await.is_some());
        assert!(rx_b.recv().await.is_some());
        assert!(rx_c.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_two_connections_same_user() {
        let broadcaster = Broadcaster::new();
        let (_a, mut rx_a) = broadcaster.register("user-1", None);
        let (_b, mut rx_b) = broadcaster.register("user-1", None);

        assert_eq!(broadcaster.send_to_user("user-1", "ORG_JOINED", json!({})), 2);
        assert!(rx_a.recv().await.is_some());
        assert!(rx_b.recv().await.is_some());
    }

    #[tokio::test]
    async fn test_unregister_leaves_all_rooms() {
        let broadcaster = Broadcaster::new();
        let (id, _rx) = broadcaster.register("user-1", Some("org-1"));
        assert_eq!(broadcaster.connection_count(), 1);

        broadcaster.unregister(id);
        assert_eq!(broadcaster.connection_count(), 0);
        assert_eq!(broadcaster.send_to_user("user-1", "TASK_CREATED", json!({})), 0);
        assert_eq!(broadcaster.send_to_org(Some("org-1"), "TASK_CREATED", json!({})), 0);
    }

    #[tokio::test]
    async fn test_dropped_receiver_not_counted() {
        let broadcaster = Broadcaster::new();
        let (_id, rx) = broadcaster.register("user-1", None);
        drop(rx);
        assert_eq!(broadcaster.send_to_user("user-1", "TASK_CREATED", json!({})), 0);
    }

    #[test]
    fn test_envelope_shape() {
        let frame = envelope("TASK_CREATED", &json!({"id": "t1"}));
        let parsed: Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(parsed["event"], "TASK_CREATED");
        assert_eq!(parsed["data"]["id"], "t1");
    }
}
