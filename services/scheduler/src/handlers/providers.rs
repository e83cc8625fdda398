use crate::error::AppError;
use crate::models::{NewProviderRequest, UpdateProviderRequest};
use crate::protocol;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use types::events::ServerEvent;
use types::ids::ProviderId;
use types::records::Provider;

pub async fn list_providers(State(state): State<AppState>) -> Result<Json<Vec<Provider>>, AppError> {
    Ok(Json(state.providers.read()?))
}

pub async fn create_provider(
    State(state): State<AppState>,
    Json(request): Json<NewProviderRequest>,
) -> Result<(StatusCode, Json<Provider>), AppError> {
    let stored = state
        .providers
        .add(Provider::new(request.name, request.specialty))?;

    state.bus.broadcast(&ServerEvent::ProviderCreated {
        provider: stored.clone(),
    });
    state
        .audit
        .record("MEDICO_CRIADO", format!("provider {} created", stored.name));
    protocol::reap_dead(&state);

    Ok((StatusCode::CREATED, Json(stored)))
}

pub async fn update_provider(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(request): Json<UpdateProviderRequest>,
) -> Result<Json<Provider>, AppError> {
    let changes = serde_json::to_value(&request)
        .map_err(|e| AppError::BadRequest(format!("invalid update body: {}", e)))?;

    if !state.providers.update(id, &changes)? {
        return Err(AppError::NotFound(format!("provider {} not found", id)));
    }

    let updated = state
        .providers
        .read()?
        .into_iter()
        .find(|provider| provider.id == Some(id))
        .ok_or_else(|| AppError::NotFound(format!("provider {} not found", id)))?;

    state.bus.broadcast(&ServerEvent::ProviderUpdated {
        provider: updated.clone(),
    });
    state
        .audit
        .record("MEDICO_ATUALIZADO", format!("provider {} updated", id));
    protocol::reap_dead(&state);

    Ok(Json(updated))
}

/// Administrative delete: removes the record, then force-releases every
/// advisory hold under the provider with a single resource-removed event.
pub async fn delete_provider(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<StatusCode, AppError> {
    if !state.providers.delete(id)? {
        return Err(AppError::NotFound(format!("provider {} not found", id)));
    }

    state.locks.force_release_provider(ProviderId::new(id));
    state
        .audit
        .record("MEDICO_REMOVIDO", format!("provider {} removed", id));
    protocol::reap_dead(&state);

    Ok(StatusCode::NO_CONTENT)
}
