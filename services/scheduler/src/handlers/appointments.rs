use crate::error::AppError;
use crate::models::{BookingRequest, CancelBookingRequest};
use crate::protocol;
use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use types::records::Appointment;

pub async fn list_appointments(
    State(state): State<AppState>,
) -> Result<Json<Vec<Appointment>>, AppError> {
    Ok(Json(state.appointments.read()?))
}

/// Durable-commit trigger. Replies 409 when the authoritative conflict check
/// finds the slot already booked.
pub async fn book_appointment(
    State(state): State<AppState>,
    Json(request): Json<BookingRequest>,
) -> Result<(StatusCode, Json<Appointment>), AppError> {
    let appointment = protocol::confirm_booking(&state, request)?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

/// Durable-cancel trigger ("free this slot").
pub async fn cancel_appointment(
    State(state): State<AppState>,
    Json(request): Json<CancelBookingRequest>,
) -> Result<StatusCode, AppError> {
    protocol::cancel_booking(&state, request.provider_id, &request.slot)?;
    Ok(StatusCode::NO_CONTENT)
}
