//! Error types for the history engine.
//!
//! Timeline and service operations never swallow changeset failures; they are
//! wrapped here with the key and changeset name and returned to the caller.
//! Disposal failures are the one exception: they are logged and dropped.

use mapkit_core::{HistoryKey, HistoryOperation};
use thiserror::Error;

use crate::changeset::ChangesetError;

/// Errors that can occur during timeline operations.
#[derive(Error, Debug)]
pub enum HistoryError {
    /// Undo or redo was requested on an empty stack.
    #[error("Nothing to {operation} on {key}")]
    EmptyHistory {
        key: HistoryKey,
        operation: HistoryOperation,
    },

    /// A changeset's forward operation failed (first apply or redo).
    #[error("Failed to apply '{changeset}' on {key}: {source}")]
    ChangesetApplyFailed {
        key: HistoryKey,
        changeset: String,
        #[source]
        source: ChangesetError,
    },

    /// A changeset's backward operation failed.
    #[error("Failed to undo '{changeset}' on {key}: {source}")]
    ChangesetUndoFailed {
        key: HistoryKey,
        changeset: String,
        #[source]
        source: ChangesetError,
    },

    /// Releasing a discarded changeset failed. Logged only.
    #[error("Failed to dispose '{changeset}': {source}")]
    DisposalError {
        changeset: String,
        #[source]
        source: ChangesetError,
    },
}

impl HistoryError {
    /// The timeline the error belongs to, if any.
    pub fn key(&self) -> Option<HistoryKey> {
        match self {
            HistoryError::EmptyHistory { key, .. }
            | HistoryError::ChangesetApplyFailed { key, .. }
            | HistoryError::ChangesetUndoFailed { key, .. } => Some(*key),
            HistoryError::DisposalError { .. } => None,
        }
    }

    /// Check if this is an empty-stack error
    pub fn is_empty_history(&self) -> bool {
        matches!(self, HistoryError::EmptyHistory { .. })
    }
}

/// Result type alias for history operations.
pub type HistoryResult<T> = Result<T, HistoryError>;
