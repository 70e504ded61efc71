//! MapKit Settings Crate
//!
//! Handles application configuration: timeline depth limits, event bus sizing
//! and logging, persisted as JSON or TOML.

pub mod config;
pub mod error;

pub use config::{Config, EventBusSettings, HistorySettings, LogFormat, LoggingSettings};
pub use error::{SettingsError, SettingsResult};
