//! Connection registry and broadcast bus
//!
//! Every open WebSocket connection registers here and gets a minted
//! `ClientId` plus its own unbounded event channel. The channel gives each
//! connection FIFO delivery; across connections no ordering is promised.
//!
//! Broadcast is best effort: a failed send means the receiving task is gone,
//! so the connection is dropped from the registry immediately and its id is
//! queued for the same cleanup an explicit disconnect would get. The
//! protocol layer drains that queue after every operation.

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;
use types::events::ServerEvent;
use types::ids::ClientId;

pub type EventSender = mpsc::UnboundedSender<ServerEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<ServerEvent>;

/// Bookkeeping of currently-open connections.
pub struct ConnectionRegistry {
    next_id: AtomicU64,
    connections: DashMap<ClientId, EventSender>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            connections: DashMap::new(),
        }
    }

    /// Register a new connection: mints its identity token and returns the
    /// receiving end of its event channel.
    pub fn register(&self) -> (ClientId, EventReceiver) {
        let id = ClientId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = mpsc::unbounded_channel();
        self.connections.insert(id, tx);
        (id, rx)
    }

    /// Remove a connection. Removing an already-absent connection is a no-op
    /// since disconnect cleanup may race with broadcast-side removal.
    pub fn unregister(&self, id: ClientId) {
        self.connections.remove(&id);
    }

    /// Unicast an event to one connection. Returns whether the send reached
    /// a live channel.
    pub fn send_to(&self, id: ClientId, event: ServerEvent) -> bool {
        match self.connections.get(&id) {
            Some(tx) => tx.send(event).is_ok(),
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    fn senders(&self) -> Vec<(ClientId, EventSender)> {
        self.connections
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Best-effort multicast of events to every registered connection.
pub struct BroadcastBus {
    registry: Arc<ConnectionRegistry>,
    dead: Mutex<Vec<ClientId>>,
}

impl BroadcastBus {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self {
            registry,
            dead: Mutex::new(Vec::new()),
        }
    }

    /// Send the event to every live connection. A send failure on one
    /// connection never aborts delivery to the others: the dead connection
    /// is unregistered on the spot and queued for lock cleanup.
    pub fn broadcast(&self, event: &ServerEvent) {
        for (id, tx) in self.registry.senders() {
            if tx.send(event.clone()).is_err() {
                tracing::debug!(
                    client = %id,
                    event = event.event_type_label(),
                    "connection dead during broadcast"
                );
                self.registry.unregister(id);
                self.dead
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(id);
            }
        }
    }

    /// Take the connections found dead during broadcasts since the last
    /// drain. The caller owes each of them the full disconnect cleanup.
    pub fn take_dead(&self) -> Vec<ClientId> {
        std::mem::take(&mut *self.dead.lock().unwrap_or_else(PoisonError::into_inner))
    }
}
