//! CamKit Settings Crate
//!
//! Handles application configuration and its persistence.

pub mod config;
pub mod error;

pub use config::{CamSettings, LogLevel};
pub use error::{ConfigError, SettingsError, SettingsResult};
