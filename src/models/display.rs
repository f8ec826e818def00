//! Target monitor description.

use serde::{Deserialize, Serialize};

/// Pixel rectangle in virtual-desktop coordinates.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Identifies the monitor a worker renders for.
///
/// `numeric_id` is the trailing number of the OS device name
/// (`\\.\DISPLAY4` -> `"4"`) and is used both as the worker's `--display`
/// argument and as the per-monitor directory name for cache and property
/// paths.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DisplayDescriptor {
    /// Numeric monitor identifier as a string.
    pub numeric_id: String,
    /// Monitor bounds.
    pub geometry: Rect,
}

impl DisplayDescriptor {
    /// Construct a descriptor from an id and its bounds.
    #[must_use]
    pub fn new(numeric_id: impl Into<String>, geometry: Rect) -> Self {
        Self {
            numeric_id: numeric_id.into(),
            geometry,
        }
    }

    /// Extract the numeric id from an OS device name such as `\\.\DISPLAY4`.
    ///
    /// Returns `None` when the name carries no trailing digits.
    #[must_use]
    pub fn id_from_device_name(device_name: &str) -> Option<String> {
        let digits: Vec<char> = device_name
            .chars()
            .rev()
            .take_while(char::is_ascii_digit)
            .collect();
        if digits.is_empty() {
            None
        } else {
            Some(digits.into_iter().rev().collect())
        }
    }
}

impl std::fmt::Display for DisplayDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.numeric_id)
    }
}
