//! Durable record types
//!
//! One struct per persisted collection. Field names on disk and on the wire
//! keep the legacy Portuguese vocabulary (`nome`, `medico_id`, `data_hora`,
//! ...) for compatibility with existing clients and data files; the Rust
//! field names are English.
//!
//! Record ids are assigned by the store on first insert; `id: None` means
//! "not yet persisted".

use crate::ids::ProviderId;
use crate::key::SlotKey;
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Common surface the durable store needs from every persisted record.
pub trait Record {
    fn id(&self) -> Option<u64>;
    fn set_id(&mut self, id: u64);
}

fn default_true() -> bool {
    true
}

/// A provider of bookable time slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "especialidade")]
    pub specialty: String,
    #[serde(rename = "ativo", default = "default_true")]
    pub active: bool,
}

impl Provider {
    pub fn new(name: impl Into<String>, specialty: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            specialty: specialty.into(),
            active: true,
        }
    }

    /// The provider id, once persisted.
    pub fn provider_id(&self) -> Option<ProviderId> {
        self.id.map(ProviderId::new)
    }
}

impl Record for Provider {
    fn id(&self) -> Option<u64> {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = Some(id);
    }
}

/// Status of a confirmed appointment.
///
/// Cancelled bookings are removed from the collection rather than
/// status-flipped, so only the confirmed state is ever stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppointmentStatus {
    #[default]
    #[serde(rename = "confirmado")]
    Confirmed,
}

/// A durably committed booking of one provider time slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(rename = "paciente")]
    pub patient: String,
    #[serde(rename = "medico_id")]
    pub provider_id: ProviderId,
    #[serde(rename = "data_hora")]
    pub slot: String,
    pub status: AppointmentStatus,
}

impl Appointment {
    pub fn new(patient: impl Into<String>, provider_id: ProviderId, slot: impl Into<String>) -> Self {
        Self {
            id: None,
            patient: patient.into(),
            provider_id,
            slot: slot.into(),
            status: AppointmentStatus::Confirmed,
        }
    }

    /// The resource key this booking occupies.
    pub fn slot_key(&self) -> SlotKey {
        SlotKey::from_parts(self.provider_id, &self.slot)
    }
}

impl Record for Appointment {
    fn id(&self) -> Option<u64> {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = Some(id);
    }
}

/// One structured audit log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub timestamp: String,
    #[serde(rename = "tipo")]
    pub kind: String,
    #[serde(rename = "usuario")]
    pub user: String,
    #[serde(rename = "mensagem")]
    pub message: String,
}

impl AuditEntry {
    /// Create an entry stamped with the current time.
    pub fn now(kind: impl Into<String>, user: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: None,
            timestamp: Utc::now().to_rfc3339(),
            kind: kind.into(),
            user: user.into(),
            message: message.into(),
        }
    }
}

impl Record for AuditEntry {
    fn id(&self) -> Option<u64> {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = Some(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_wire_field_names() {
        let provider = Provider::new("Ana", "Cardiologia");
        let json = serde_json::to_value(&provider).unwrap();
        assert_eq!(json["nome"], "Ana");
        assert_eq!(json["especialidade"], "Cardiologia");
        assert_eq!(json["ativo"], true);
        // Unassigned id is omitted entirely, matching the legacy files.
        assert!(json.get("id").is_none());
    }

    #[test]
    fn test_appointment_wire_field_names() {
        let appt = Appointment::new("Bruno", ProviderId::new(1), "2025-11-20T14:00:00");
        let json = serde_json::to_value(&appt).unwrap();
        assert_eq!(json["paciente"], "Bruno");
        assert_eq!(json["medico_id"], 1);
        assert_eq!(json["data_hora"], "2025-11-20T14:00:00");
        assert_eq!(json["status"], "confirmado");
    }

    #[test]
    fn test_appointment_slot_key() {
        let appt = Appointment::new("Bruno", ProviderId::new(1), "2025-11-20T14:00:00");
        assert_eq!(appt.slot_key().as_str(), "1|2025-11-20T14:00:00");
    }

    #[test]
    fn test_record_roundtrip_with_id() {
        let mut appt = Appointment::new("Bruno", ProviderId::new(1), "2025-11-20T14:00:00");
        appt.set_id(3);
        let json = serde_json::to_string(&appt).unwrap();
        let back: Appointment = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id(), Some(3));
        assert_eq!(back, appt);
    }

    #[test]
    fn test_audit_entry_wire_field_names() {
        let entry = AuditEntry::now("AGENDAMENTO", "SYSTEM", "slot booked");
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["tipo"], "AGENDAMENTO");
        assert_eq!(json["usuario"], "SYSTEM");
        assert_eq!(json["mensagem"], "slot booked");
        assert!(json["timestamp"].is_string());
    }
}
