//! Unified error type for the MapKit application layer.
//!
//! Each crate owns its error enum; this one wraps them so session code can
//! use a single `Result`.

use mapkit_document::DocumentError;
use mapkit_history::HistoryError;
use mapkit_settings::SettingsError;
use thiserror::Error;

/// Main error type
#[derive(Error, Debug)]
pub enum Error {
    /// Undo/redo engine error
    #[error(transparent)]
    History(#[from] HistoryError),

    /// Document model error (usually while building a changeset)
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// Configuration error
    #[error(transparent)]
    Settings(#[from] SettingsError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Check if this is an undo/redo on an empty timeline
    pub fn is_empty_history(&self) -> bool {
        matches!(self, Error::History(e) if e.is_empty_history())
    }

    /// Check if this is a history engine error
    pub fn is_history_error(&self) -> bool {
        matches!(self, Error::History(_))
    }

    /// Check if this is a document model error
    pub fn is_document_error(&self) -> bool {
        matches!(self, Error::Document(_))
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
