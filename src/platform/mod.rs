//! Operating-system seams: window tree access and process enumeration.
//!
//! The window calls only exist on Windows; elsewhere a
//! [`HeadlessWindowSystem`] stands in so the supervisor still runs (every
//! handshake then fails to resolve a window, which is the honest outcome on
//! a platform without a desktop window tree).

pub mod process_tree;
#[cfg(windows)]
pub mod win32;

use std::sync::Arc;

use tracing::debug;

use crate::models::handshake::WindowHandle;
use crate::Result;

/// Window-tree operations the supervisor needs.
pub trait WindowSystem: Send + Sync {
    /// First immediate child of `parent` whose class is `class_name`.
    ///
    /// Must not search grandchildren.
    fn find_child_window(&self, parent: WindowHandle, class_name: &str) -> Option<WindowHandle>;

    /// Remove `window` from the normal desktop order.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Window` if the OS call fails.
    fn hide(&self, window: WindowHandle) -> Result<()>;

    /// Restore `window` to its normal size and show it.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Window` if the OS call fails.
    fn restore(&self, window: WindowHandle) -> Result<()>;

    /// Minimize `window`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Window` if the OS call fails.
    fn minimize(&self, window: WindowHandle) -> Result<()>;
}

/// Window system for hosts without a desktop window tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessWindowSystem;

impl WindowSystem for HeadlessWindowSystem {
    fn find_child_window(&self, parent: WindowHandle, class_name: &str) -> Option<WindowHandle> {
        debug!(
            parent = parent.raw(),
            class_name, "headless window system: no window tree to search"
        );
        None
    }

    fn hide(&self, _window: WindowHandle) -> Result<()> {
        Ok(())
    }

    fn restore(&self, _window: WindowHandle) -> Result<()> {
        Ok(())
    }

    fn minimize(&self, _window: WindowHandle) -> Result<()> {
        Ok(())
    }
}

/// The window system of the current platform.
#[must_use]
pub fn native_window_system() -> Arc<dyn WindowSystem> {
    #[cfg(windows)]
    {
        Arc::new(win32::Win32WindowSystem)
    }

    #[cfg(not(windows))]
    {
        Arc::new(HeadlessWindowSystem)
    }
}
