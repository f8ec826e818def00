#![deny(unsafe_code)]

pub mod config;
pub mod errors;
pub mod host;
pub mod models;
pub mod platform;
pub mod worker;

pub use config::GlobalConfig;
pub use errors::{AppError, Result};
