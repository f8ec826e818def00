//! Web worker process supervision.
//!
//! Each supervised worker is an external renderer process that reports its
//! window handle over stdout and takes control lines on stdin.
//!
//! - `launcher`: command-line construction and process spawn.
//! - `listener`: output reader and handshake evaluation.
//! - `resolver`: content window lookup under the reported handle.
//! - `lifecycle`: play / pause / messages, exit monitor, teardown.
//! - `supervisor`: the facade the host holds.
//! - `codec`: line framing for the worker's standard streams.
//! - `shared`: state shared between the facade and background tasks.

pub mod codec;
pub mod launcher;
pub mod lifecycle;
pub mod listener;
pub mod resolver;
pub mod shared;
pub mod supervisor;
