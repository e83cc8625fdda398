use crate::audit::AuditLog;
use crate::bus::{BroadcastBus, ConnectionRegistry};
use crate::config::Config;
use crate::locks::SlotLockTable;
use crate::storage::{JsonStore, StoreError};
use std::sync::Arc;
use types::records::{Appointment, Provider};

/// Process-wide shared state, constructed once at startup and handed to
/// every handler through axum state. No ambient globals.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ConnectionRegistry>,
    pub bus: Arc<BroadcastBus>,
    pub locks: Arc<SlotLockTable>,
    pub providers: Arc<JsonStore<Provider>>,
    pub appointments: Arc<JsonStore<Appointment>>,
    pub audit: Arc<AuditLog>,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self, StoreError> {
        let registry = Arc::new(ConnectionRegistry::new());
        let bus = Arc::new(BroadcastBus::new(Arc::clone(&registry)));
        let locks = Arc::new(SlotLockTable::new(Arc::clone(&bus)));
        let providers = Arc::new(JsonStore::open(config.providers_file())?);
        let appointments = Arc::new(JsonStore::open(config.appointments_file())?);
        let audit = Arc::new(AuditLog::new(JsonStore::open(config.audit_file())?));

        Ok(Self {
            registry,
            bus,
            locks,
            providers,
            appointments,
            audit,
        })
    }
}
