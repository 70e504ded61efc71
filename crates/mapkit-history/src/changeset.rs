//! Reversible units of work.
//!
//! A [`Changeset`] is constructed by a UI action, captures the "before" state
//! it will need (as owned copies, never live handles into the scene graph)
//! and is then applied once and undone/redone any number of times.
//!
//! # Contract
//!
//! - Construction never mutates the document. The first [`Changeset::apply`]
//!   performs the change.
//! - `apply()` then `undo()` restores every field the changeset touched to
//!   its captured value.
//! - `apply()`, `undo()` and `dispose()` touch the document model only: no
//!   notifications or other user-facing side effects.
//! - `dispose()` releases copies retained only for undo. It is called once,
//!   when the changeset leaves its timeline for good.

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by a changeset's own operations.
#[derive(Error, Debug)]
pub enum ChangesetError {
    /// The entity the changeset operates on no longer exists.
    #[error("{kind} {id} not found")]
    TargetNotFound { kind: String, id: String },

    /// The document no longer matches what the changeset captured.
    #[error("State drift: {0}")]
    StateDrift(String),

    /// The changeset was used after `dispose()`.
    #[error("Changeset already disposed")]
    Disposed,

    /// Any other error reported by the document model.
    #[error(transparent)]
    Model(Box<dyn std::error::Error + Send + Sync>),
}

impl ChangesetError {
    /// Shorthand for [`ChangesetError::TargetNotFound`].
    pub fn not_found(kind: impl Into<String>, id: impl ToString) -> Self {
        ChangesetError::TargetNotFound {
            kind: kind.into(),
            id: id.to_string(),
        }
    }
}

/// Result type alias for changeset operations.
pub type ChangesetResult<T = ()> = Result<T, ChangesetError>;

/// Owned, type-erased changeset as stored on a timeline.
pub type BoxedChangeset = Box<dyn Changeset>;

/// A reversible unit of work with exactly two required operations.
#[async_trait]
pub trait Changeset: Send + Sync {
    /// Short label for logs ("Add layer", "Update style").
    fn name(&self) -> &str;

    /// Perform (or re-perform) the forward mutation.
    async fn apply(&mut self) -> ChangesetResult;

    /// Exactly reverse [`Changeset::apply`].
    async fn undo(&mut self) -> ChangesetResult;

    /// Release resources held only for undo.
    async fn dispose(&mut self) -> ChangesetResult {
        Ok(())
    }

    /// Box the changeset for a timeline.
    fn boxed(self) -> BoxedChangeset
    where
        Self: Sized + 'static,
    {
        Box::new(self)
    }
}

/// Several changesets that apply and undo as one timeline entry.
///
/// Items apply in order and undo in reverse order. No partial rollback is
/// attempted: the first failing item's error is returned as-is and the items
/// after it are not run.
pub struct CompositeChangeset {
    name: String,
    items: Vec<BoxedChangeset>,
}

impl CompositeChangeset {
    /// Create an empty composite.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            items: Vec::new(),
        }
    }

    /// Create a composite from existing items.
    pub fn from_items(name: impl Into<String>, items: Vec<BoxedChangeset>) -> Self {
        Self {
            name: name.into(),
            items,
        }
    }

    /// Append an item (builder style).
    pub fn with(mut self, item: BoxedChangeset) -> Self {
        self.items.push(item);
        self
    }

    /// Append an item.
    pub fn push(&mut self, item: BoxedChangeset) {
        self.items.push(item);
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when the composite has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl std::fmt::Debug for CompositeChangeset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeChangeset")
            .field("name", &self.name)
            .field("items", &self.items.iter().map(|c| c.name()).collect::<Vec<_>>())
            .finish()
    }
}

#[async_trait]
impl Changeset for CompositeChangeset {
    fn name(&self) -> &str {
        &self.name
    }

    async fn apply(&mut self) -> ChangesetResult {
        for item in self.items.iter_mut() {
            item.apply().await?;
        }
        Ok(())
    }

    async fn undo(&mut self) -> ChangesetResult {
        for item in self.items.iter_mut().rev() {
            item.undo().await?;
        }
        Ok(())
    }

    async fn dispose(&mut self) -> ChangesetResult {
        // Every item gets released; the first failure is reported.
        let mut first_error = None;
        for item in self.items.iter_mut() {
            if let Err(e) = item.dispose().await {
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
