//! Reservation protocol — the per-message state machine over a slot
//!
//! A slot moves FREE → SOFT_HELD → {FREE | CONFIRMED}. Select and cancel
//! intents arrive on the real-time channel and only touch the advisory lock
//! table; confirm and durable-cancel arrive as HTTP triggers and go through
//! the durable store, which is the single source of conflict truth.
//!
//! Confirm deliberately does not check who holds the advisory lock (or that
//! anyone does): the advisory layer is UI feedback only, and the durable
//! check-and-append decides the race. See DESIGN.md before tightening this.

use crate::error::AppError;
use crate::models::BookingRequest;
use crate::state::AppState;
use types::events::{ClientIntent, ServerEvent};
use types::ids::{ClientId, ProviderId};
use types::key::SlotKey;
use types::records::Appointment;

/// Handle one raw frame from a connection's message loop.
///
/// Malformed frames are dropped and logged; the connection stays open.
pub fn process_message(state: &AppState, client: ClientId, raw: &str) {
    let Some(intent) = ClientIntent::parse(raw) else {
        tracing::warn!(client = %client, "dropping malformed message");
        return;
    };

    let key = intent.slot_key();
    match intent {
        ClientIntent::Select { .. } => {
            let success = state.locks.acquire(key.clone(), client);
            // Reply only to the requester; on success the table has already
            // broadcast the lock event to everyone.
            state.registry.send_to(
                client,
                ServerEvent::SelectionReply {
                    success,
                    resource: key,
                },
            );
        }
        ClientIntent::CancelSelection { .. } => {
            // Unconditional release: a client cancelling its own selection is
            // trusted, and releasing an absent key is a no-op.
            state.locks.release(&key);
        }
    }
    reap_dead(state);
}

/// Durable-commit flow.
///
/// The conflict check and the append run in one store critical section; on
/// success the advisory entry is consumed silently and the booking is
/// broadcast. A confirm can succeed with no advisory holder, and can lose to
/// a faster confirm even if the requester held the advisory lock.
pub fn confirm_booking(state: &AppState, request: BookingRequest) -> Result<Appointment, AppError> {
    let key = SlotKey::from_parts(request.provider_id, &request.slot);
    let candidate = Appointment::new(request.patient_name, request.provider_id, request.slot);

    let stored = state
        .appointments
        .add_if_absent(candidate, |existing| existing.slot_key() == key)?
        .ok_or_else(|| AppError::Conflict(format!("slot {} is already booked", key)))?;

    state.locks.consume(&key);
    state.bus.broadcast(&ServerEvent::AppointmentBooked {
        appointment: stored.clone(),
    });
    state.audit.record(
        "AGENDAMENTO",
        format!("booking confirmed for slot {}", key),
    );
    reap_dead(state);
    Ok(stored)
}

/// Durable-cancel flow: filter-and-rewrite the appointment collection, then
/// announce the cancellation. The advisory table is not touched.
pub fn cancel_booking(
    state: &AppState,
    provider_id: ProviderId,
    slot: &str,
) -> Result<(), AppError> {
    let key = SlotKey::from_parts(provider_id, slot);
    let removed = state
        .appointments
        .delete_where(|appointment| appointment.slot_key() == key)?;
    if removed.is_empty() {
        return Err(AppError::NotFound(format!("no booking for slot {}", key)));
    }

    state.bus.broadcast(&ServerEvent::AppointmentCancelled {
        provider_id,
        slot: slot.to_string(),
    });
    state
        .audit
        .record("CANCELAMENTO", format!("booking cancelled for slot {}", key));
    reap_dead(state);
    Ok(())
}

/// Disconnect flow: deterministically release every advisory hold the client
/// owned, announce each, then drop the connection from the registry.
pub fn disconnect(state: &AppState, client: ClientId) {
    release_client(state, client);
    reap_dead(state);
}

fn release_client(state: &AppState, client: ClientId) {
    let freed = state.locks.release_all_for(client);
    if !freed.is_empty() {
        tracing::info!(client = %client, orphaned = freed.len(), "releasing abandoned holds");
    }
    for key in freed {
        state.bus.broadcast(&ServerEvent::SlotFreed { resource: key });
    }
    state.registry.unregister(client);
}

/// Run the disconnect cleanup for every connection found dead during
/// broadcasts. Cleaning one up can surface more dead connections, so drain
/// until quiet.
pub fn reap_dead(state: &AppState) {
    loop {
        let dead = state.bus.take_dead();
        if dead.is_empty() {
            break;
        }
        for client in dead {
            tracing::info!(client = %client, "cleaning up connection lost mid-broadcast");
            release_client(state, client);
        }
    }
}
