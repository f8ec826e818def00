//! Win32 implementation of [`WindowSystem`].

#![allow(unsafe_code)]

use std::ffi::c_void;

use windows::core::{HSTRING, PCWSTR};
use windows::Win32::Foundation::HWND;
use windows::Win32::UI::WindowsAndMessaging::{
    FindWindowExW, ShowWindow, SHOW_WINDOW_CMD, SW_HIDE, SW_MINIMIZE, SW_SHOW, SW_SHOWNORMAL,
};

use crate::models::handshake::WindowHandle;
use crate::platform::WindowSystem;
use crate::Result;

/// Window system backed by `user32`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Win32WindowSystem;

#[allow(clippy::cast_possible_truncation)]
fn to_hwnd(window: WindowHandle) -> HWND {
    HWND(window.raw() as isize as *mut c_void)
}

fn show(window: WindowHandle, command: SHOW_WINDOW_CMD) {
    // SAFETY: ShowWindow tolerates stale or foreign handles; it only reports
    // the previous visibility, which is not an error signal.
    let _ = unsafe { ShowWindow(to_hwnd(window), command) };
}

impl WindowSystem for Win32WindowSystem {
    fn find_child_window(&self, parent: WindowHandle, class_name: &str) -> Option<WindowHandle> {
        let class = HSTRING::from(class_name);
        // SAFETY: both string arguments outlive the call; a null child-after
        // handle restricts the search to the first immediate child.
        let found =
            unsafe { FindWindowExW(to_hwnd(parent), HWND::default(), &class, PCWSTR::null()) }
                .ok()?;
        WindowHandle::new(found.0 as isize as i64)
    }

    fn hide(&self, window: WindowHandle) -> Result<()> {
        show(window, SW_HIDE);
        Ok(())
    }

    fn restore(&self, window: WindowHandle) -> Result<()> {
        show(window, SW_SHOWNORMAL);
        show(window, SW_SHOW);
        Ok(())
    }

    fn minimize(&self, window: WindowHandle) -> Result<()> {
        show(window, SW_MINIMIZE);
        Ok(())
    }
}
