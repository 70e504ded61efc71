//! Backward/forward stack pair for one editing surface.
//!
//! # Invariants
//!
//! 1. `backward.len() <= max_depth` after every `register`
//! 2. `forward` is empty after every `register` (no branching history)
//! 3. A changeset moves between stacks only after its operation resolved `Ok`;
//!    a failed or dropped undo/redo leaves both stacks as they were
//! 4. Changesets leaving the timeline for good (branch clear, eviction,
//!    `clear`) are disposed, never undone
//!
//! ```text
//! register(c4)                     undo() x2                    register(c5)
//! backward: [c1, c2, c3, c4]       backward: [c1, c2]           backward: [c1, c2, c5]
//! forward:  []                     forward:  [c4, c3]           forward:  []  (c3, c4 disposed)
//! ```

use std::collections::VecDeque;

use mapkit_core::{Capability, HistoryKey, HistoryOperation};

use crate::changeset::BoxedChangeset;
use crate::error::{HistoryError, HistoryResult};

/// Undo/redo stacks for one [`HistoryKey`].
pub struct Timeline {
    key: HistoryKey,
    /// Applied changesets, oldest at the front, most recent at the back.
    backward: VecDeque<BoxedChangeset>,
    /// Undone changesets, the next redo at the back.
    forward: Vec<BoxedChangeset>,
    max_depth: usize,
}

impl Timeline {
    /// Create an empty timeline bounded to `max_depth` backward entries.
    pub fn new(key: HistoryKey, max_depth: usize) -> Self {
        Self {
            key,
            backward: VecDeque::new(),
            forward: Vec::new(),
            max_depth: max_depth.max(1),
        }
    }

    /// The editing surface this timeline belongs to.
    pub fn key(&self) -> HistoryKey {
        self.key
    }

    /// Maximum backward depth.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Record an already-applied changeset.
    ///
    /// Clears the forward stack and evicts the oldest entries beyond
    /// `max_depth`. Discarded changesets are disposed.
    pub async fn register(&mut self, changeset: BoxedChangeset) {
        let mut discarded: Vec<BoxedChangeset> = self.forward.drain(..).collect();
        self.backward.push_back(changeset);
        while self.backward.len() > self.max_depth {
            if let Some(oldest) = self.backward.pop_front() {
                discarded.push(oldest);
            }
        }

        if !discarded.is_empty() {
            tracing::debug!(
                "History {}: discarding {} changeset(s) on register",
                self.key,
                discarded.len()
            );
        }
        dispose_all(self.key, discarded).await;
    }

    /// Reverse the most recent changeset and move it to the forward stack.
    pub async fn undo(&mut self) -> HistoryResult<()> {
        let key = self.key;
        let changeset = self.backward.back_mut().ok_or(HistoryError::EmptyHistory {
            key,
            operation: HistoryOperation::Undo,
        })?;

        if let Err(source) = changeset.undo().await {
            return Err(HistoryError::ChangesetUndoFailed {
                key,
                changeset: changeset.name().to_string(),
                source,
            });
        }

        if let Some(changeset) = self.backward.pop_back() {
            self.forward.push(changeset);
        }
        Ok(())
    }

    /// Replay the most recently undone changeset and move it back.
    pub async fn redo(&mut self) -> HistoryResult<()> {
        let key = self.key;
        let changeset = self.forward.last_mut().ok_or(HistoryError::EmptyHistory {
            key,
            operation: HistoryOperation::Redo,
        })?;

        if let Err(source) = changeset.apply().await {
            return Err(HistoryError::ChangesetApplyFailed {
                key,
                changeset: changeset.name().to_string(),
                source,
            });
        }

        if let Some(changeset) = self.forward.pop() {
            self.backward.push_back(changeset);
        }
        Ok(())
    }

    /// Dispose and drop every changeset on both stacks without undoing them.
    ///
    /// Returns how many changesets were discarded.
    pub async fn clear(&mut self) -> usize {
        let discarded: Vec<BoxedChangeset> = self
            .backward
            .drain(..)
            .chain(self.forward.drain(..))
            .collect();
        let count = discarded.len();
        dispose_all(self.key, discarded).await;
        count
    }

    /// Derive the capability from the current stack depths.
    pub fn capability(&self) -> Capability {
        Capability::from_depths(self.backward.len(), self.forward.len())
    }

    /// Number of changesets that can be undone.
    pub fn undo_depth(&self) -> usize {
        self.backward.len()
    }

    /// Number of changesets that can be redone.
    pub fn redo_depth(&self) -> usize {
        self.forward.len()
    }

    /// Name of the changeset the next undo would reverse (for logs).
    pub fn peek_undo(&self) -> Option<&str> {
        self.backward.back().map(|c| c.name())
    }

    /// Name of the changeset the next redo would replay (for logs).
    pub fn peek_redo(&self) -> Option<&str> {
        self.forward.last().map(|c| c.name())
    }
}

impl std::fmt::Debug for Timeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timeline")
            .field("key", &self.key)
            .field("undo_depth", &self.backward.len())
            .field("redo_depth", &self.forward.len())
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

/// Best-effort disposal: failures are logged, never returned.
async fn dispose_all(key: HistoryKey, changesets: Vec<BoxedChangeset>) {
    for mut changeset in changesets {
        if let Err(source) = changeset.dispose().await {
            let err = HistoryError::DisposalError {
                changeset: changeset.name().to_string(),
                source,
            };
            tracing::warn!("History {}: {}", key, err);
        }
    }
}
