//! Reversible edits of the map document.
//!
//! Constructors read whatever "before" state they need from the document and
//! keep owned copies; they never mutate. The first [`apply`] performs the
//! edit, [`undo`] restores the captured values.
//!
//! Changesets that take an entity out of the document (removals, and
//! additions while undone) keep it in a [`Stash`] until it goes back in.
//! `dispose()` drops the stash, after which the changeset refuses to run.
//!
//! [`apply`]: mapkit_history::Changeset::apply
//! [`undo`]: mapkit_history::Changeset::undo

mod feature;
mod layer;
mod layout;
mod shared_view;

pub use feature::{
    AddFeatures, MoveFeatures, RemoveFeatures, SetFeatureMetadata, SetFeatureStyle, SetGeometry,
    UpdateStyles,
};
pub use layer::{
    AddLayer, MoveLayer, RemoveLayer, RenameLayer, SetActiveLayer, SetLayerOpacity,
    SetLayerVisibility,
};
pub use layout::{AddLayoutPage, RemoveLayoutPage, UpdateLayoutPage};
pub use shared_view::{AddSharedView, RemoveSharedView, SetActiveView, UpdateSharedView};

use mapkit_history::{ChangesetError, ChangesetResult};

/// Value a changeset holds while it is out of the document.
#[derive(Debug)]
pub(crate) struct Stash<T> {
    value: Option<T>,
    released: bool,
}

impl<T> Stash<T> {
    pub(crate) fn empty() -> Self {
        Self {
            value: None,
            released: false,
        }
    }

    pub(crate) fn holding(value: T) -> Self {
        Self {
            value: Some(value),
            released: false,
        }
    }

    /// Borrow the held value.
    pub(crate) fn peek(&self) -> ChangesetResult<&T> {
        self.ensure_live()?;
        self.value
            .as_ref()
            .ok_or_else(|| ChangesetError::StateDrift("no captured value to restore".to_string()))
    }

    pub(crate) fn put(&mut self, value: T) {
        self.value = Some(value);
    }

    /// Forget the held value once it is back in the document.
    pub(crate) fn clear(&mut self) {
        self.value = None;
    }

    pub(crate) fn ensure_live(&self) -> ChangesetResult {
        if self.released {
            return Err(ChangesetError::Disposed);
        }
        Ok(())
    }

    /// Drop the held value for good.
    pub(crate) fn release(&mut self) {
        self.value = None;
        self.released = true;
    }
}
