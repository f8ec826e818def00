//! Domain model module declarations.

pub mod content;
pub mod display;
pub mod handshake;
pub mod state;
