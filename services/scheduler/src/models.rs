use serde::{Deserialize, Serialize};
use types::ids::ProviderId;

/// Body of the durable-commit trigger (`POST /api/agendar`).
#[derive(Debug, Clone, Deserialize)]
pub struct BookingRequest {
    #[serde(rename = "paciente_nome")]
    pub patient_name: String,
    #[serde(rename = "medico_id")]
    pub provider_id: ProviderId,
    #[serde(rename = "data_hora")]
    pub slot: String,
}

/// Body of the durable-cancel trigger (`POST /api/consultas/cancelar`).
#[derive(Debug, Clone, Deserialize)]
pub struct CancelBookingRequest {
    #[serde(rename = "medico_id")]
    pub provider_id: ProviderId,
    #[serde(rename = "data_hora")]
    pub slot: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewProviderRequest {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "especialidade")]
    pub specialty: String,
}

/// Partial provider update; only the supplied fields are merged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateProviderRequest {
    #[serde(rename = "nome", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "especialidade", skip_serializing_if = "Option::is_none")]
    pub specialty: Option<String>,
    #[serde(rename = "ativo", skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}
