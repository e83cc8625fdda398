//! End-to-end protocol tests
//!
//! Drives the reservation flows directly against an `AppState` backed by a
//! temporary data directory, with registered channels standing in for live
//! WebSocket connections.

use scheduler::config::Config;
use scheduler::error::AppError;
use scheduler::models::BookingRequest;
use scheduler::protocol;
use scheduler::state::AppState;
use std::net::SocketAddr;
use tempfile::TempDir;
use types::events::ServerEvent;
use types::ids::ProviderId;
use types::key::SlotKey;
use types::records::Appointment;

fn test_state(tmp: &TempDir) -> AppState {
    let config = Config {
        listen_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        data_dir: tmp.path().to_path_buf(),
    };
    config.ensure_layout().unwrap();
    AppState::new(&config).unwrap()
}

fn booking(provider: u64, slot: &str) -> BookingRequest {
    BookingRequest {
        patient_name: "Bruno".to_string(),
        provider_id: ProviderId::new(provider),
        slot: slot.to_string(),
    }
}

const SLOT: &str = "2025-11-20T14:00:00";

#[test]
fn test_select_grants_lock_and_notifies_everyone() {
    let tmp = TempDir::new().unwrap();
    let state = test_state(&tmp);
    let (x, mut rx_x) = state.registry.register();
    let (_y, mut rx_y) = state.registry.register();

    protocol::process_message(
        &state,
        x,
        r#"{"acao":"selecionar","medico_id":1,"data_hora":"2025-11-20T14:00:00"}"#,
    );

    let key = SlotKey::from_parts(ProviderId::new(1), SLOT);
    // The requester sees the broadcast first (emitted during acquire), then
    // its private reply.
    assert_eq!(
        rx_x.try_recv().unwrap(),
        ServerEvent::SlotLocked {
            resource: key.clone(),
            holder: x,
        }
    );
    assert_eq!(
        rx_x.try_recv().unwrap(),
        ServerEvent::SelectionReply {
            success: true,
            resource: key.clone(),
        }
    );
    // Everyone else sees only the broadcast.
    assert_eq!(
        rx_y.try_recv().unwrap(),
        ServerEvent::SlotLocked {
            resource: key,
            holder: x,
        }
    );
    assert!(rx_y.try_recv().is_err());
}

#[test]
fn test_losing_select_gets_private_denial_and_no_broadcast() {
    let tmp = TempDir::new().unwrap();
    let state = test_state(&tmp);
    let (x, mut rx_x) = state.registry.register();
    let (y, mut rx_y) = state.registry.register();

    let select = r#"{"acao":"selecionar","medico_id":1,"data_hora":"2025-11-20T14:00:00"}"#;
    protocol::process_message(&state, x, select);
    // Drain X's lock broadcast + reply, Y's lock broadcast.
    rx_x.try_recv().unwrap();
    rx_x.try_recv().unwrap();
    rx_y.try_recv().unwrap();

    protocol::process_message(&state, y, select);

    let key = SlotKey::from_parts(ProviderId::new(1), SLOT);
    assert_eq!(
        rx_y.try_recv().unwrap(),
        ServerEvent::SelectionReply {
            success: false,
            resource: key.clone(),
        }
    );
    assert!(rx_y.try_recv().is_err());
    assert!(rx_x.try_recv().is_err(), "denial must not be broadcast");
    assert_eq!(state.locks.holder_of(&key), Some(x));
}

#[test]
fn test_cancel_selection_frees_the_slot() {
    let tmp = TempDir::new().unwrap();
    let state = test_state(&tmp);
    let (x, mut rx_x) = state.registry.register();

    protocol::process_message(
        &state,
        x,
        r#"{"acao":"selecionar","medico_id":1,"data_hora":"2025-11-20T14:00:00"}"#,
    );
    rx_x.try_recv().unwrap();
    rx_x.try_recv().unwrap();

    protocol::process_message(
        &state,
        x,
        r#"{"acao":"cancelar_selecao","medico_id":1,"data_hora":"2025-11-20T14:00:00"}"#,
    );

    let key = SlotKey::from_parts(ProviderId::new(1), SLOT);
    assert_eq!(
        rx_x.try_recv().unwrap(),
        ServerEvent::SlotFreed { resource: key },
    );
    assert!(state.locks.is_empty());
}

#[test]
fn test_malformed_frames_are_dropped_without_closing_anything() {
    let tmp = TempDir::new().unwrap();
    let state = test_state(&tmp);
    let (x, mut rx_x) = state.registry.register();

    protocol::process_message(&state, x, "not json at all");
    protocol::process_message(&state, x, r#"{"acao":"selecionar"}"#);

    assert!(rx_x.try_recv().is_err());
    assert_eq!(state.registry.len(), 1);
}

#[test]
fn test_confirm_books_consumes_and_broadcasts() {
    let tmp = TempDir::new().unwrap();
    let state = test_state(&tmp);
    let (x, mut rx_x) = state.registry.register();

    protocol::process_message(
        &state,
        x,
        r#"{"acao":"selecionar","medico_id":1,"data_hora":"2025-11-20T14:00:00"}"#,
    );
    rx_x.try_recv().unwrap();
    rx_x.try_recv().unwrap();

    let stored = protocol::confirm_booking(&state, booking(1, SLOT)).unwrap();
    assert_eq!(stored.id, Some(1));

    // The booking broadcast arrives, and the consume step emitted no free
    // event even though the advisory entry is gone.
    assert_eq!(
        rx_x.try_recv().unwrap(),
        ServerEvent::AppointmentBooked {
            appointment: stored.clone(),
        }
    );
    assert!(rx_x.try_recv().is_err(), "consume must not broadcast a free");
    assert!(state.locks.is_empty());

    let on_disk = state.appointments.read().unwrap();
    assert_eq!(on_disk, vec![stored]);
}

#[test]
fn test_confirm_conflict_is_authoritative_not_advisory() {
    let tmp = TempDir::new().unwrap();
    let state = test_state(&tmp);

    // A durable record exists but nobody holds the advisory lock.
    state
        .appointments
        .add(Appointment::new("Ana", ProviderId::new(7), SLOT))
        .unwrap();
    assert!(state.locks.is_empty());

    let err = protocol::confirm_booking(&state, booking(7, SLOT)).unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
    assert_eq!(state.appointments.read().unwrap().len(), 1);

    // A free slot with no advisory holder confirms fine.
    let other = protocol::confirm_booking(&state, booking(7, "2025-11-20T15:00:00")).unwrap();
    assert_eq!(other.id, Some(2));
}

#[test]
fn test_confirm_ignores_who_holds_the_advisory_lock() {
    let tmp = TempDir::new().unwrap();
    let state = test_state(&tmp);
    let (x, _rx_x) = state.registry.register();

    let key = SlotKey::from_parts(ProviderId::new(1), SLOT);
    assert!(state.locks.acquire(key.clone(), x));

    // The commit comes from a path with no advisory hold at all and still
    // wins; the durable check is the only arbiter.
    let stored = protocol::confirm_booking(&state, booking(1, SLOT)).unwrap();
    assert_eq!(stored.provider_id, ProviderId::new(1));
    assert_eq!(state.locks.holder_of(&key), None);
}

#[test]
fn test_disconnect_releases_every_hold_with_one_free_each() {
    let tmp = TempDir::new().unwrap();
    let state = test_state(&tmp);
    let (x, rx_x) = state.registry.register();
    let (_y, mut rx_y) = state.registry.register();

    for raw in [
        r#"{"acao":"selecionar","medico_id":1,"data_hora":"2025-11-20T14:00:00"}"#,
        r#"{"acao":"selecionar","medico_id":2,"data_hora":"2025-11-21T09:00:00"}"#,
        r#"{"acao":"selecionar","medico_id":3,"data_hora":"2025-11-22T10:00:00"}"#,
    ] {
        protocol::process_message(&state, x, raw);
        rx_y.try_recv().unwrap();
    }
    drop(rx_x);

    protocol::disconnect(&state, x);

    let mut freed = Vec::new();
    while let Ok(event) = rx_y.try_recv() {
        match event {
            ServerEvent::SlotFreed { resource } => freed.push(resource),
            other => panic!("unexpected event: {:?}", other),
        }
    }
    freed.sort();
    assert_eq!(
        freed,
        vec![
            SlotKey::from_parts(ProviderId::new(1), "2025-11-20T14:00:00"),
            SlotKey::from_parts(ProviderId::new(2), "2025-11-21T09:00:00"),
            SlotKey::from_parts(ProviderId::new(3), "2025-11-22T10:00:00"),
        ]
    );
    assert!(state.locks.is_empty());
    assert_eq!(state.registry.len(), 1);
}

#[test]
fn test_connection_dead_during_broadcast_gets_full_cleanup() {
    let tmp = TempDir::new().unwrap();
    let state = test_state(&tmp);
    let (x, rx_x) = state.registry.register();
    let (y, mut rx_y) = state.registry.register();

    protocol::process_message(
        &state,
        x,
        r#"{"acao":"selecionar","medico_id":1,"data_hora":"2025-11-20T14:00:00"}"#,
    );
    rx_y.try_recv().unwrap();

    // X dies without a close frame; the next broadcast discovers it.
    drop(rx_x);
    protocol::process_message(
        &state,
        y,
        r#"{"acao":"selecionar","medico_id":2,"data_hora":"2025-11-21T09:00:00"}"#,
    );

    assert_eq!(
        rx_y.try_recv().unwrap(),
        ServerEvent::SlotLocked {
            resource: SlotKey::from_parts(ProviderId::new(2), "2025-11-21T09:00:00"),
            holder: y,
        }
    );
    assert_eq!(
        rx_y.try_recv().unwrap(),
        ServerEvent::SelectionReply {
            success: true,
            resource: SlotKey::from_parts(ProviderId::new(2), "2025-11-21T09:00:00"),
        }
    );
    // X's orphaned hold was released as if it had disconnected explicitly.
    assert_eq!(
        rx_y.try_recv().unwrap(),
        ServerEvent::SlotFreed {
            resource: SlotKey::from_parts(ProviderId::new(1), "2025-11-20T14:00:00"),
        }
    );
    assert_eq!(state.registry.len(), 1);
    assert_eq!(state.locks.len(), 1);
}

#[test]
fn test_durable_cancel_removes_record_and_announces() {
    let tmp = TempDir::new().unwrap();
    let state = test_state(&tmp);
    let (_obs, mut rx) = state.registry.register();

    protocol::confirm_booking(&state, booking(1, SLOT)).unwrap();
    rx.try_recv().unwrap();

    protocol::cancel_booking(&state, ProviderId::new(1), SLOT).unwrap();

    assert_eq!(
        rx.try_recv().unwrap(),
        ServerEvent::AppointmentCancelled {
            provider_id: ProviderId::new(1),
            slot: SLOT.to_string(),
        }
    );
    assert!(state.appointments.read().unwrap().is_empty());

    // Cancelling again: nothing matches.
    let err = protocol::cancel_booking(&state, ProviderId::new(1), SLOT).unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}
