//! Unit tests for the one-shot initialization gate.

use wallpaper_host::models::handshake::{HandshakeResult, InitError, WindowHandle};
use wallpaper_host::models::state::SupervisorState;
use wallpaper_host::worker::shared::SharedState;

fn awaiting() -> (SharedState, wallpaper_host::worker::shared::InitReceiver) {
    let (shared, rx) = SharedState::new();
    assert!(shared.transition(SupervisorState::Starting));
    assert!(shared.transition(SupervisorState::AwaitingHandshake));
    (shared, rx)
}

#[test]
fn first_delivery_wins_and_later_ones_are_dropped() {
    let (shared, mut rx) = awaiting();
    let window = WindowHandle::new(4321).unwrap();

    assert!(shared.deliver(HandshakeResult::resolved(window, "HWND1234")));
    assert!(!shared.deliver(HandshakeResult::failed(InitError::PrematureExit, "")));
    assert!(shared.is_initialized());

    let result = rx.try_recv().expect("event delivered");
    assert!(result.success);
    assert_eq!(result.window, Some(window));
    assert_eq!(shared.window(), Some(window));
    assert_eq!(shared.state(), SupervisorState::Running);
}

#[test]
fn failed_handshake_keeps_worker_state_and_no_window() {
    let (shared, mut rx) = awaiting();

    assert!(shared.deliver(HandshakeResult::failed(
        InitError::Handshake("bad".into()),
        "HWNDbad"
    )));
    assert!(!shared.deliver(HandshakeResult::resolved(
        WindowHandle::new(7).unwrap(),
        "HWND7"
    )));

    let result = rx.try_recv().expect("event delivered");
    assert!(!result.success);
    assert_eq!(shared.window(), None);
    assert_eq!(shared.state(), SupervisorState::AwaitingHandshake);
}

#[test]
fn finish_clears_window_and_records_outcome() {
    let (shared, _rx) = awaiting();
    shared.deliver(HandshakeResult::resolved(WindowHandle::new(9).unwrap(), "HWND1"));
    assert!(shared.transition(SupervisorState::Terminating));

    assert_eq!(shared.finish(), SupervisorState::Terminated { failed: false });
    assert_eq!(shared.window(), None);
    assert_eq!(shared.finish(), SupervisorState::Terminated { failed: false });
}

#[test]
fn finish_without_success_is_failed() {
    let (shared, _rx) = awaiting();
    assert_eq!(shared.finish(), SupervisorState::Terminated { failed: true });
}

#[test]
fn success_after_termination_does_not_restore_window() {
    let (shared, _rx) = awaiting();
    shared.finish();
    shared.deliver(HandshakeResult::resolved(WindowHandle::new(5).unwrap(), "HWND5"));
    assert_eq!(shared.window(), None);
}

#[test]
fn null_window_handle_is_rejected() {
    assert!(WindowHandle::new(0).is_none());
    assert_eq!(WindowHandle::new(-3).map(WindowHandle::raw), Some(-3));
}
