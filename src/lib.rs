//! # MapKit
//!
//! An interactive map editor in which every destructive action is reversible.
//!
//! ## Architecture
//!
//! MapKit is organized as a workspace with multiple crates:
//!
//! 1. **mapkit-core** - History keys, capability records, event bus
//! 2. **mapkit-settings** - Configuration files and validation
//! 3. **mapkit-history** - Changesets, timelines and the history service
//! 4. **mapkit-document** - Map document model and its concrete changesets
//! 5. **mapkit** - Editor session, logging setup and the demo binary
//!
//! ## Features
//!
//! - **Independent timelines**: main map, print layout, shared views and
//!   export each keep their own undo/redo history
//! - **Safe failure**: a failed undo or redo leaves its timeline untouched
//! - **Observable capability**: undo/redo availability is pushed over the
//!   event bus and readable as a snapshot

pub mod error;
pub mod session;

pub use error::{Error, Result};
pub use session::EditorSession;

pub use mapkit_core::{
    AppEvent, Capability, EventBus, EventFilter, HistoryEvent, HistoryKey, NotificationEvent,
    NotificationLevel,
};
pub use mapkit_document as document;
pub use mapkit_history::{
    BoxedChangeset, Changeset, ChangesetError, CompositeChangeset, HistoryConfig, HistoryError,
    HistoryService,
};
pub use mapkit_settings::{Config, LogFormat, LoggingSettings};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize logging from the logging settings
///
/// Sets up structured logging with:
/// - `RUST_LOG` support (takes precedence over the configured level)
/// - Pretty or JSON console output
///
/// Calling it again after a subscriber is installed is a no-op.
pub fn init_logging(settings: &LoggingSettings) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(settings.level.to_ascii_lowercase()))?;

    let registry = tracing_subscriber::registry().with(env_filter);
    let installed = match settings.format {
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stdout)
                    .with_target(true)
                    .with_level(true)
                    .with_thread_ids(true)
                    .with_thread_names(true)
                    .with_line_number(true)
                    .pretty(),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stdout)
                    .with_target(true)
                    .json(),
            )
            .try_init(),
    };

    if installed.is_err() {
        tracing::debug!("Logging already initialized");
    }

    Ok(())
}
