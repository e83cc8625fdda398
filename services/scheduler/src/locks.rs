//! Advisory slot lock table
//!
//! Maps a slot key to the connection currently holding it for UI purposes.
//! A key is either absent (free) or held by exactly one client; entries live
//! only in process memory. The table is a hint for real-time feedback, not
//! mutual exclusion — the durable store runs its own authoritative conflict
//! check at commit time.
//!
//! Lock and free broadcasts are emitted while the table mutex is held, so
//! the event order observed for one key always matches its transition order.

use crate::bus::BroadcastBus;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use types::events::ServerEvent;
use types::ids::{ClientId, ProviderId};
use types::key::SlotKey;

pub struct SlotLockTable {
    bus: Arc<BroadcastBus>,
    locks: Mutex<HashMap<SlotKey, ClientId>>,
}

impl SlotLockTable {
    pub fn new(bus: Arc<BroadcastBus>) -> Self {
        Self {
            bus,
            locks: Mutex::new(HashMap::new()),
        }
    }

    fn guard(&self) -> MutexGuard<'_, HashMap<SlotKey, ClientId>> {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Try to place an advisory hold on a slot.
    ///
    /// Succeeds when the slot is free (broadcasting the lock event) or when
    /// the same holder re-acquires its own hold (idempotent, no duplicate
    /// broadcast). Fails without any state change when another client holds
    /// the slot.
    pub fn acquire(&self, key: SlotKey, holder: ClientId) -> bool {
        let mut locks = self.guard();
        match locks.get(&key) {
            Some(current) if *current != holder => false,
            Some(_) => true,
            None => {
                locks.insert(key.clone(), holder);
                self.bus.broadcast(&ServerEvent::SlotLocked {
                    resource: key,
                    holder,
                });
                true
            }
        }
    }

    /// Release a hold, broadcasting the free event if an entry existed.
    /// Releasing an absent key is a no-op.
    pub fn release(&self, key: &SlotKey) {
        let mut locks = self.guard();
        if locks.remove(key).is_some() {
            self.bus.broadcast(&ServerEvent::SlotFreed {
                resource: key.clone(),
            });
        }
    }

    /// Remove an entry without broadcasting.
    ///
    /// Commit-time handoff: once a slot is durably booked its advisory entry
    /// must vanish silently, so a later disconnect of the former holder does
    /// not announce a taken slot as free.
    pub fn consume(&self, key: &SlotKey) {
        self.guard().remove(key);
    }

    /// Atomically remove every hold owned by the given client, returning the
    /// removed keys. The caller broadcasts the free event for each.
    pub fn release_all_for(&self, holder: ClientId) -> Vec<SlotKey> {
        let mut locks = self.guard();
        let mut removed = Vec::new();
        locks.retain(|key, owner| {
            if *owner == holder {
                removed.push(key.clone());
                false
            } else {
                true
            }
        });
        removed
    }

    /// Administrative bulk release of every hold under a provider, announced
    /// as a single resource-removed event rather than per-slot frees.
    pub fn force_release_provider(&self, provider: ProviderId) {
        let mut locks = self.guard();
        locks.retain(|key, _| !key.belongs_to(provider));
        self.bus.broadcast(&ServerEvent::ProviderRemoved { id: provider });
    }

    /// Current holder of a key, if any.
    pub fn holder_of(&self, key: &SlotKey) -> Option<ClientId> {
        self.guard().get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.guard().len()
    }

    pub fn is_empty(&self) -> bool {
        self.guard().is_empty()
    }
}
