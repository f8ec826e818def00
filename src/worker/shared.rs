//! State shared between the control surface and the worker's background tasks.
//!
//! The output listener, the exit monitor and the host's control calls all
//! touch the lifecycle state, the resolved window and the one-shot
//! initialization sender. They live behind one mutex so the "already
//! initialized" decision, the window assignment and the delivery happen as a
//! single step.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::models::handshake::{HandshakeResult, WindowHandle};
use crate::models::state::SupervisorState;

/// Receiver for the single `Initialized` event.
pub type InitReceiver = oneshot::Receiver<HandshakeResult>;

#[derive(Debug)]
struct Inner {
    state: SupervisorState,
    window: Option<WindowHandle>,
    init_tx: Option<oneshot::Sender<HandshakeResult>>,
    init_succeeded: bool,
}

/// Lifecycle state, resolved window and initialization gate of one worker.
#[derive(Debug)]
pub struct SharedState {
    inner: Mutex<Inner>,
}

impl SharedState {
    /// Fresh state in [`SupervisorState::Created`] plus the receiving end of
    /// the initialization event.
    #[must_use]
    pub fn new() -> (Self, InitReceiver) {
        let (init_tx, init_rx) = oneshot::channel();
        let shared = Self {
            inner: Mutex::new(Inner {
                state: SupervisorState::Created,
                window: None,
                init_tx: Some(init_tx),
                init_succeeded: false,
            }),
        };
        (shared, init_rx)
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SupervisorState {
        self.lock().state
    }

    /// Resolved content window, if initialization succeeded.
    #[must_use]
    pub fn window(&self) -> Option<WindowHandle> {
        self.lock().window
    }

    /// Whether the initialization event has been decided.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.lock().init_tx.is_none()
    }

    /// Move to `next` if the transition is permitted.
    ///
    /// Returns `false` and leaves the state untouched otherwise.
    pub fn transition(&self, next: SupervisorState) -> bool {
        let mut inner = self.lock();
        if inner.state.can_transition_to(next) {
            debug!(from = ?inner.state, to = ?next, "supervisor state transition");
            inner.state = next;
            true
        } else {
            debug!(from = ?inner.state, to = ?next, "supervisor state transition skipped");
            false
        }
    }

    /// Deliver the initialization event unless one was already delivered.
    ///
    /// On success the window is recorded and the state moves to `Running`.
    /// Returns whether this call delivered the event.
    pub fn deliver(&self, result: HandshakeResult) -> bool {
        let mut inner = self.lock();
        let Some(init_tx) = inner.init_tx.take() else {
            return false;
        };

        if result.success && !inner.state.is_terminated() {
            inner.window = result.window;
            inner.init_succeeded = true;
            if inner.state.can_transition_to(SupervisorState::Running) {
                inner.state = SupervisorState::Running;
            }
        }

        if init_tx.send(result).is_err() {
            debug!("initialization receiver dropped before delivery");
        }
        true
    }

    /// Enter the terminal state and forget the window.
    ///
    /// Idempotent; returns the terminal state.
    pub fn finish(&self) -> SupervisorState {
        let mut inner = self.lock();
        inner.window = None;
        if !inner.state.is_terminated() {
            let next = SupervisorState::Terminated {
                failed: !inner.init_succeeded,
            };
            if !inner.state.can_transition_to(next) {
                warn!(from = ?inner.state, "forcing supervisor into terminal state");
            }
            inner.state = next;
        }
        inner.state
    }
}
