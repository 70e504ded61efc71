//! Print-layout page edits.

use async_trait::async_trait;
use mapkit_history::{Changeset, ChangesetResult};

use super::Stash;
use crate::document::Document;
use crate::error::DocumentResult;
use crate::model::{LayoutId, LayoutPage};

pub struct AddLayoutPage {
    doc: Document,
    id: LayoutId,
    index: Option<usize>,
    page: Stash<LayoutPage>,
}

impl AddLayoutPage {
    pub fn new(doc: &Document, page: LayoutPage, index: Option<usize>) -> Self {
        Self {
            doc: doc.clone(),
            id: page.id,
            index,
            page: Stash::holding(page),
        }
    }
}

#[async_trait]
impl Changeset for AddLayoutPage {
    fn name(&self) -> &str {
        "Add layout page"
    }

    async fn apply(&mut self) -> ChangesetResult {
        let page = self.page.peek()?.clone();
        self.index = Some(self.doc.insert_layout(page, self.index)?);
        self.page.clear();
        Ok(())
    }

    async fn undo(&mut self) -> ChangesetResult {
        self.page.ensure_live()?;
        let (_, page) = self.doc.remove_layout(self.id)?;
        self.page.put(page);
        Ok(())
    }

    async fn dispose(&mut self) -> ChangesetResult {
        self.page.release();
        Ok(())
    }
}

pub struct RemoveLayoutPage {
    doc: Document,
    id: LayoutId,
    removed: Stash<(usize, LayoutPage)>,
}

impl RemoveLayoutPage {
    pub fn new(doc: &Document, id: LayoutId) -> DocumentResult<Self> {
        doc.layout_index(id)?;
        Ok(Self {
            doc: doc.clone(),
            id,
            removed: Stash::empty(),
        })
    }
}

#[async_trait]
impl Changeset for RemoveLayoutPage {
    fn name(&self) -> &str {
        "Remove layout page"
    }

    async fn apply(&mut self) -> ChangesetResult {
        self.removed.ensure_live()?;
        let removed = self.doc.remove_layout(self.id)?;
        self.removed.put(removed);
        Ok(())
    }

    async fn undo(&mut self) -> ChangesetResult {
        let (index, page) = self.removed.peek()?.clone();
        self.doc.insert_layout(page, Some(index))?;
        self.removed.clear();
        Ok(())
    }

    async fn dispose(&mut self) -> ChangesetResult {
        self.removed.release();
        Ok(())
    }
}

/// Replace a page's settings (format, orientation, title, extent, name).
pub struct UpdateLayoutPage {
    doc: Document,
    before: LayoutPage,
    after: LayoutPage,
}

impl UpdateLayoutPage {
    /// `page` is the edited copy; its id selects the page to update.
    pub fn new(doc: &Document, page: LayoutPage) -> DocumentResult<Self> {
        let before = doc.layout(page.id)?;
        Ok(Self {
            doc: doc.clone(),
            before,
            after: page,
        })
    }

    /// Edit a copy of the current page with `edit`.
    pub fn edit(
        doc: &Document,
        id: LayoutId,
        edit: impl FnOnce(&mut LayoutPage),
    ) -> DocumentResult<Self> {
        let mut page = doc.layout(id)?;
        edit(&mut page);
        page.id = id;
        Self::new(doc, page)
    }
}

#[async_trait]
impl Changeset for UpdateLayoutPage {
    fn name(&self) -> &str {
        "Update layout page"
    }

    async fn apply(&mut self) -> ChangesetResult {
        self.doc.replace_layout(self.after.clone())?;
        Ok(())
    }

    async fn undo(&mut self) -> ChangesetResult {
        self.doc.replace_layout(self.before.clone())?;
        Ok(())
    }
}
