//! Wire vocabulary of the real-time channel
//!
//! Inbound messages are client intents over a slot (`selecionar`,
//! `cancelar_selecao`); outbound messages are the events the service
//! broadcasts or replies with. Both sides are tagged JSON objects using the
//! legacy discriminator fields (`acao` inbound, `tipo` outbound).

use crate::ids::{ClientId, ProviderId};
use crate::key::SlotKey;
use crate::records::{Appointment, Provider};
use serde::{Deserialize, Serialize};

/// A client intent received on the real-time channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "acao")]
pub enum ClientIntent {
    /// The client wants to hold a slot while filling the booking form.
    #[serde(rename = "selecionar")]
    Select {
        #[serde(rename = "medico_id")]
        provider_id: ProviderId,
        #[serde(rename = "data_hora")]
        slot: String,
    },
    /// The client gave up on a previously selected slot.
    #[serde(rename = "cancelar_selecao")]
    CancelSelection {
        #[serde(rename = "medico_id")]
        provider_id: ProviderId,
        #[serde(rename = "data_hora")]
        slot: String,
    },
}

impl ClientIntent {
    /// Parse a raw JSON frame into an intent.
    ///
    /// Returns `None` for unparseable frames or unknown actions; the caller
    /// drops (and logs) those without closing the connection.
    pub fn parse(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }

    /// The resource key this intent targets.
    pub fn slot_key(&self) -> SlotKey {
        match self {
            ClientIntent::Select { provider_id, slot }
            | ClientIntent::CancelSelection { provider_id, slot } => {
                SlotKey::from_parts(*provider_id, slot)
            }
        }
    }
}

/// An event sent to clients, either unicast (select replies) or broadcast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tipo")]
pub enum ServerEvent {
    /// Unicast reply to the connection that issued a select intent.
    #[serde(rename = "resposta_selecao")]
    SelectionReply {
        #[serde(rename = "sucesso")]
        success: bool,
        #[serde(rename = "recurso")]
        resource: SlotKey,
    },

    /// An advisory hold was placed on a slot.
    #[serde(rename = "bloqueio_temporario")]
    SlotLocked {
        #[serde(rename = "recurso")]
        resource: SlotKey,
        #[serde(rename = "dono_id")]
        holder: ClientId,
    },

    /// An advisory hold was released.
    #[serde(rename = "desbloqueio_temporario")]
    SlotFreed {
        #[serde(rename = "recurso")]
        resource: SlotKey,
    },

    /// A booking was durably committed.
    #[serde(rename = "novo_agendamento")]
    AppointmentBooked {
        #[serde(rename = "dados")]
        appointment: Appointment,
    },

    /// A durable booking was removed.
    #[serde(rename = "agendamento_cancelado")]
    AppointmentCancelled {
        #[serde(rename = "medico_id")]
        provider_id: ProviderId,
        #[serde(rename = "data_hora")]
        slot: String,
    },

    /// A provider was removed; every slot under it is gone.
    #[serde(rename = "recurso_removido")]
    ProviderRemoved { id: ProviderId },

    /// A provider record was created.
    #[serde(rename = "novo_medico")]
    ProviderCreated {
        #[serde(rename = "dados")]
        provider: Provider,
    },

    /// A provider record was updated.
    #[serde(rename = "atualizacao_medico")]
    ProviderUpdated {
        #[serde(rename = "dados")]
        provider: Provider,
    },
}

impl ServerEvent {
    /// Get the event type as a string label for logging.
    pub fn event_type_label(&self) -> &'static str {
        match self {
            ServerEvent::SelectionReply { .. } => "resposta_selecao",
            ServerEvent::SlotLocked { .. } => "bloqueio_temporario",
            ServerEvent::SlotFreed { .. } => "desbloqueio_temporario",
            ServerEvent::AppointmentBooked { .. } => "novo_agendamento",
            ServerEvent::AppointmentCancelled { .. } => "agendamento_cancelado",
            ServerEvent::ProviderRemoved { .. } => "recurso_removido",
            ServerEvent::ProviderCreated { .. } => "novo_medico",
            ServerEvent::ProviderUpdated { .. } => "atualizacao_medico",
        }
    }
}
