//! Content window lookup under the handle reported by the worker.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::models::handshake::WindowHandle;
use crate::platform::WindowSystem;

/// Window class of the renderer's top-level widget.
pub const CONTENT_WINDOW_CLASS: &str = "Chrome_WidgetWin_0";

/// Maps the worker's container window to the widget the host composites.
///
/// Only the container's immediate children are searched. Handing the host
/// the container itself, or a deeper render widget, has left the desktop
/// composition unable to start again.
#[derive(Clone)]
pub struct WindowResolver {
    windows: Arc<dyn WindowSystem>,
}

impl WindowResolver {
    /// Resolver over `windows`.
    #[must_use]
    pub fn new(windows: Arc<dyn WindowSystem>) -> Self {
        Self { windows }
    }

    /// Resolve the content window under the raw container handle `raw`.
    ///
    /// Hides the container as a side effect; a failure to hide is logged and
    /// does not affect the result. Returns `None` for a null container or
    /// when no child carries [`CONTENT_WINDOW_CLASS`].
    #[must_use]
    pub fn resolve(&self, raw: i64) -> Option<WindowHandle> {
        let container = WindowHandle::new(raw)?;

        if let Err(err) = self.windows.hide(container) {
            warn!(container = raw, %err, "failed to hide worker container window");
        }

        let found = self
            .windows
            .find_child_window(container, CONTENT_WINDOW_CLASS);
        debug!(
            container = raw,
            window = found.map(WindowHandle::raw),
            "content window lookup"
        );
        found
    }
}

impl std::fmt::Debug for WindowResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowResolver").finish_non_exhaustive()
    }
}
