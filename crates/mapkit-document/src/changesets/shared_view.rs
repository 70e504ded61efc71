//! Shared-view edits.

use async_trait::async_trait;
use mapkit_history::{Changeset, ChangesetResult};

use super::Stash;
use crate::document::Document;
use crate::error::DocumentResult;
use crate::model::{SharedView, SharedViewId};

pub struct AddSharedView {
    doc: Document,
    id: SharedViewId,
    index: Option<usize>,
    view: Stash<SharedView>,
}

impl AddSharedView {
    pub fn new(doc: &Document, view: SharedView, index: Option<usize>) -> Self {
        Self {
            doc: doc.clone(),
            id: view.id,
            index,
            view: Stash::holding(view),
        }
    }
}

#[async_trait]
impl Changeset for AddSharedView {
    fn name(&self) -> &str {
        "Add shared view"
    }

    async fn apply(&mut self) -> ChangesetResult {
        let view = self.view.peek()?.clone();
        self.index = Some(self.doc.insert_shared_view(view, self.index)?);
        self.view.clear();
        Ok(())
    }

    async fn undo(&mut self) -> ChangesetResult {
        self.view.ensure_live()?;
        let (_, view) = self.doc.remove_shared_view(self.id)?;
        self.view.put(view);
        Ok(())
    }

    async fn dispose(&mut self) -> ChangesetResult {
        self.view.release();
        Ok(())
    }
}

/// Delete a shared view. Undo reselects it if it was the active view.
pub struct RemoveSharedView {
    doc: Document,
    id: SharedViewId,
    /// `(index, view, was_active)`
    removed: Stash<(usize, SharedView, bool)>,
}

impl RemoveSharedView {
    pub fn new(doc: &Document, id: SharedViewId) -> DocumentResult<Self> {
        doc.shared_view_index(id)?;
        Ok(Self {
            doc: doc.clone(),
            id,
            removed: Stash::empty(),
        })
    }
}

#[async_trait]
impl Changeset for RemoveSharedView {
    fn name(&self) -> &str {
        "Remove shared view"
    }

    async fn apply(&mut self) -> ChangesetResult {
        self.removed.ensure_live()?;
        let was_active = self.doc.active_view() == Some(self.id);
        let (index, view) = self.doc.remove_shared_view(self.id)?;
        self.removed.put((index, view, was_active));
        Ok(())
    }

    async fn undo(&mut self) -> ChangesetResult {
        let (index, view, was_active) = self.removed.peek()?.clone();
        self.doc.insert_shared_view(view, Some(index))?;
        if was_active {
            self.doc.set_active_view(Some(self.id))?;
        }
        self.removed.clear();
        Ok(())
    }

    async fn dispose(&mut self) -> ChangesetResult {
        self.removed.release();
        Ok(())
    }
}

/// Replace a shared view's title, camera or layer list.
pub struct UpdateSharedView {
    doc: Document,
    before: SharedView,
    after: SharedView,
}

impl UpdateSharedView {
    pub fn new(doc: &Document, view: SharedView) -> DocumentResult<Self> {
        let before = doc.shared_view(view.id)?;
        Ok(Self {
            doc: doc.clone(),
            before,
            after: view,
        })
    }

    pub fn edit(
        doc: &Document,
        id: SharedViewId,
        edit: impl FnOnce(&mut SharedView),
    ) -> DocumentResult<Self> {
        let mut view = doc.shared_view(id)?;
        edit(&mut view);
        view.id = id;
        Self::new(doc, view)
    }
}

#[async_trait]
impl Changeset for UpdateSharedView {
    fn name(&self) -> &str {
        "Update shared view"
    }

    async fn apply(&mut self) -> ChangesetResult {
        self.doc.replace_shared_view(self.after.clone())?;
        Ok(())
    }

    async fn undo(&mut self) -> ChangesetResult {
        self.doc.replace_shared_view(self.before.clone())?;
        Ok(())
    }
}

pub struct SetActiveView {
    doc: Document,
    before: Option<SharedViewId>,
    after: Option<SharedViewId>,
}

impl SetActiveView {
    pub fn new(doc: &Document, id: Option<SharedViewId>) -> DocumentResult<Self> {
        if let Some(id) = id {
            doc.shared_view_index(id)?;
        }
        Ok(Self {
            doc: doc.clone(),
            before: doc.active_view(),
            after: id,
        })
    }
}

#[async_trait]
impl Changeset for SetActiveView {
    fn name(&self) -> &str {
        "Switch view"
    }

    async fn apply(&mut self) -> ChangesetResult {
        self.doc.set_active_view(self.after)?;
        Ok(())
    }

    async fn undo(&mut self) -> ChangesetResult {
        self.doc.set_active_view(self.before)?;
        Ok(())
    }
}
