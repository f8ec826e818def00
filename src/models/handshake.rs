//! Initialization outcome delivered once per worker.

use serde::Serialize;

/// Opaque OS window identifier reported by the worker.
///
/// Zero is never a valid handle, so construction goes through
/// [`WindowHandle::new`].
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct WindowHandle(i64);

impl WindowHandle {
    /// Wrap a raw handle value; returns `None` for the null handle.
    #[must_use]
    pub fn new(raw: i64) -> Option<Self> {
        (raw != 0).then_some(Self(raw))
    }

    /// Raw numeric value.
    #[must_use]
    pub fn raw(self) -> i64 {
        self.0
    }
}

/// Why initialization failed.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "kind", content = "detail")]
pub enum InitError {
    /// The worker could not be started.
    Launch(String),
    /// The handshake payload was malformed or its window was not found.
    Handshake(String),
    /// The worker exited before reporting a window.
    PrematureExit,
    /// The worker was terminated by the host before reporting a window.
    Terminated,
}

impl std::fmt::Display for InitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Launch(msg) => write!(f, "worker failed to start: {msg}"),
            Self::Handshake(msg) => write!(f, "handshake failed: {msg}"),
            Self::PrematureExit => f.write_str("process exited before reporting a window"),
            Self::Terminated => f.write_str("process terminated before reporting a window"),
        }
    }
}

/// The single `Initialized` event surfaced to the host.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct HandshakeResult {
    /// Whether a content window was resolved.
    pub success: bool,
    /// Resolved content window on success.
    pub window: Option<WindowHandle>,
    /// The handshake line as received, empty when none arrived.
    pub raw_message: String,
    /// Failure classification.
    pub error: Option<InitError>,
}

impl HandshakeResult {
    /// Successful resolution of `window` from `raw_message`.
    #[must_use]
    pub fn resolved(window: WindowHandle, raw_message: impl Into<String>) -> Self {
        Self {
            success: true,
            window: Some(window),
            raw_message: raw_message.into(),
            error: None,
        }
    }

    /// Failed initialization.
    #[must_use]
    pub fn failed(error: InitError, raw_message: impl Into<String>) -> Self {
        Self {
            success: false,
            window: None,
            raw_message: raw_message.into(),
            error: Some(error),
        }
    }
}
