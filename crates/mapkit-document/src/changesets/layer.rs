//! Layer stack edits.

use async_trait::async_trait;
use mapkit_history::{Changeset, ChangesetResult};

use super::Stash;
use crate::document::Document;
use crate::error::DocumentResult;
use crate::model::{Layer, LayerId};

/// Add a layer to the stack.
pub struct AddLayer {
    doc: Document,
    id: LayerId,
    index: Option<usize>,
    /// Holds the layer while it is not in the document.
    layer: Stash<Layer>,
}

impl AddLayer {
    /// Add `layer` at `index`, or on top when `None`.
    pub fn new(doc: &Document, layer: Layer, index: Option<usize>) -> Self {
        Self {
            doc: doc.clone(),
            id: layer.id,
            index,
            layer: Stash::holding(layer),
        }
    }

    pub fn layer_id(&self) -> LayerId {
        self.id
    }
}

#[async_trait]
impl Changeset for AddLayer {
    fn name(&self) -> &str {
        "Add layer"
    }

    async fn apply(&mut self) -> ChangesetResult {
        let layer = self.layer.peek()?.clone();
        let index = self.doc.insert_layer(layer, self.index)?;
        // Redo puts the layer back where it first landed
        self.index = Some(index);
        self.layer.clear();
        Ok(())
    }

    async fn undo(&mut self) -> ChangesetResult {
        self.layer.ensure_live()?;
        let (_, layer) = self.doc.remove_layer(self.id)?;
        self.layer.put(layer);
        Ok(())
    }

    async fn dispose(&mut self) -> ChangesetResult {
        self.layer.release();
        Ok(())
    }
}

/// Remove a layer with all of its features.
///
/// Undo restores the layer at its original index and, if it was the active
/// layer, reselects it.
pub struct RemoveLayer {
    doc: Document,
    id: LayerId,
    /// `(index, layer, was_active)` while the layer is removed.
    removed: Stash<(usize, Layer, bool)>,
}

impl RemoveLayer {
    pub fn new(doc: &Document, id: LayerId) -> DocumentResult<Self> {
        doc.layer_index(id)?;
        Ok(Self {
            doc: doc.clone(),
            id,
            removed: Stash::empty(),
        })
    }
}

#[async_trait]
impl Changeset for RemoveLayer {
    fn name(&self) -> &str {
        "Remove layer"
    }

    async fn apply(&mut self) -> ChangesetResult {
        self.removed.ensure_live()?;
        let was_active = self.doc.active_layer() == Some(self.id);
        let (index, layer) = self.doc.remove_layer(self.id)?;
        self.removed.put((index, layer, was_active));
        Ok(())
    }

    async fn undo(&mut self) -> ChangesetResult {
        let (index, layer, was_active) = self.removed.peek()?.clone();
        self.doc.insert_layer(layer, Some(index))?;
        if was_active {
            self.doc.set_active_layer(Some(self.id))?;
        }
        self.removed.clear();
        Ok(())
    }

    async fn dispose(&mut self) -> ChangesetResult {
        self.removed.release();
        Ok(())
    }
}

/// Rename a layer.
pub struct RenameLayer {
    doc: Document,
    id: LayerId,
    before: String,
    after: String,
}

impl RenameLayer {
    pub fn new(doc: &Document, id: LayerId, name: impl Into<String>) -> DocumentResult<Self> {
        let before = doc.layer(id)?.name;
        Ok(Self {
            doc: doc.clone(),
            id,
            before,
            after: name.into(),
        })
    }
}

#[async_trait]
impl Changeset for RenameLayer {
    fn name(&self) -> &str {
        "Rename layer"
    }

    async fn apply(&mut self) -> ChangesetResult {
        self.doc.set_layer_name(self.id, self.after.clone())?;
        Ok(())
    }

    async fn undo(&mut self) -> ChangesetResult {
        self.doc.set_layer_name(self.id, self.before.clone())?;
        Ok(())
    }
}

/// Show or hide a layer.
pub struct SetLayerVisibility {
    doc: Document,
    id: LayerId,
    before: bool,
    after: bool,
}

impl SetLayerVisibility {
    pub fn new(doc: &Document, id: LayerId, visible: bool) -> DocumentResult<Self> {
        let before = doc.layer(id)?.visible;
        Ok(Self {
            doc: doc.clone(),
            id,
            before,
            after: visible,
        })
    }
}

#[async_trait]
impl Changeset for SetLayerVisibility {
    fn name(&self) -> &str {
        if self.after {
            "Show layer"
        } else {
            "Hide layer"
        }
    }

    async fn apply(&mut self) -> ChangesetResult {
        self.doc.set_layer_visibility(self.id, self.after)?;
        Ok(())
    }

    async fn undo(&mut self) -> ChangesetResult {
        self.doc.set_layer_visibility(self.id, self.before)?;
        Ok(())
    }
}

/// Change a layer's opacity.
pub struct SetLayerOpacity {
    doc: Document,
    id: LayerId,
    before: f64,
    after: f64,
}

impl SetLayerOpacity {
    pub fn new(doc: &Document, id: LayerId, opacity: f64) -> DocumentResult<Self> {
        let before = doc.layer(id)?.opacity;
        Ok(Self {
            doc: doc.clone(),
            id,
            before,
            after: opacity,
        })
    }
}

#[async_trait]
impl Changeset for SetLayerOpacity {
    fn name(&self) -> &str {
        "Set layer opacity"
    }

    async fn apply(&mut self) -> ChangesetResult {
        self.doc.set_layer_opacity(self.id, self.after)?;
        Ok(())
    }

    async fn undo(&mut self) -> ChangesetResult {
        self.doc.set_layer_opacity(self.id, self.before)?;
        Ok(())
    }
}

/// Move a layer to another position in draw order.
pub struct MoveLayer {
    doc: Document,
    id: LayerId,
    from: usize,
    to: usize,
}

impl MoveLayer {
    pub fn new(doc: &Document, id: LayerId, to: usize) -> DocumentResult<Self> {
        let from = doc.layer_index(id)?;
        Ok(Self {
            doc: doc.clone(),
            id,
            from,
            to,
        })
    }
}

#[async_trait]
impl Changeset for MoveLayer {
    fn name(&self) -> &str {
        "Reorder layer"
    }

    async fn apply(&mut self) -> ChangesetResult {
        self.doc.move_layer(self.id, self.to)?;
        Ok(())
    }

    async fn undo(&mut self) -> ChangesetResult {
        self.doc.move_layer(self.id, self.from)?;
        Ok(())
    }
}

/// Select the layer new features are drawn into.
pub struct SetActiveLayer {
    doc: Document,
    before: Option<LayerId>,
    after: Option<LayerId>,
}

impl SetActiveLayer {
    pub fn new(doc: &Document, id: Option<LayerId>) -> DocumentResult<Self> {
        if let Some(id) = id {
            doc.layer_index(id)?;
        }
        Ok(Self {
            doc: doc.clone(),
            before: doc.active_layer(),
            after: id,
        })
    }
}

#[async_trait]
impl Changeset for SetActiveLayer {
    fn name(&self) -> &str {
        "Select layer"
    }

    async fn apply(&mut self) -> ChangesetResult {
        self.doc.set_active_layer(self.after)?;
        Ok(())
    }

    async fn undo(&mut self) -> ChangesetResult {
        self.doc.set_active_layer(self.before)?;
        Ok(())
    }
}
