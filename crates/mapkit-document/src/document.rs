//! Shared handle over the mutable map document.
//!
//! Every primitive takes the lock for its own duration only. Mutations take
//! owned values and return the value they replaced; queries return clones.
//! Nothing here hands out a reference into the graph.

use std::collections::BTreeMap;

use mapkit_core::{thread_safe_rw, ThreadSafeRw};

use crate::error::{DocumentError, DocumentResult};
use crate::model::{
    DocumentState, Feature, FeatureId, Geometry, Layer, LayerId, LayoutId, LayoutPage, SharedView,
    SharedViewId, Style,
};

/// Cheaply clonable handle to a document. Clones share the same state.
#[derive(Clone, Default)]
pub struct Document {
    state: ThreadSafeRw<DocumentState>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: DocumentState) -> Self {
        Self {
            state: thread_safe_rw(state),
        }
    }

    // ---- layers -------------------------------------------------------

    /// Insert `layer` at `index` (top of the stack when `None`).
    pub fn insert_layer(&self, layer: Layer, index: Option<usize>) -> DocumentResult<usize> {
        let mut state = self.state.write();
        if state.layer_position(layer.id).is_some() {
            return Err(DocumentError::DuplicateId(layer.id.to_string()));
        }
        if let Some(feature) = layer
            .features
            .iter()
            .find(|f| state.locate_feature(f.id).is_some())
        {
            return Err(DocumentError::DuplicateId(feature.id.to_string()));
        }

        let index = checked_insert_index(index, state.layers.len())?;
        tracing::trace!("Insert layer {} at {}", layer.id, index);
        state.layers.insert(index, layer);
        Ok(index)
    }

    /// Remove a layer, returning its index and contents.
    ///
    /// Clears the active layer if it was this one.
    pub fn remove_layer(&self, id: LayerId) -> DocumentResult<(usize, Layer)> {
        let mut state = self.state.write();
        let index = state
            .layer_position(id)
            .ok_or(DocumentError::LayerNotFound(id))?;
        let layer = state.layers.remove(index);
        if state.active_layer == Some(id) {
            state.active_layer = None;
        }
        tracing::trace!("Remove layer {} from {}", id, index);
        Ok((index, layer))
    }

    /// Rename a layer, returning the previous name.
    pub fn set_layer_name(&self, id: LayerId, name: String) -> DocumentResult<String> {
        if name.trim().is_empty() {
            return Err(DocumentError::invalid("layer.name", "must not be empty"));
        }
        let mut state = self.state.write();
        let layer = state.layer_mut(id)?;
        Ok(std::mem::replace(&mut layer.name, name))
    }

    pub fn set_layer_visibility(&self, id: LayerId, visible: bool) -> DocumentResult<bool> {
        let mut state = self.state.write();
        let layer = state.layer_mut(id)?;
        Ok(std::mem::replace(&mut layer.visible, visible))
    }

    pub fn set_layer_opacity(&self, id: LayerId, opacity: f64) -> DocumentResult<f64> {
        if !(0.0..=1.0).contains(&opacity) {
            return Err(DocumentError::invalid("layer.opacity", "must be within 0.0..=1.0"));
        }
        let mut state = self.state.write();
        let layer = state.layer_mut(id)?;
        Ok(std::mem::replace(&mut layer.opacity, opacity))
    }

    /// Move a layer to `index` in draw order, returning its previous index.
    pub fn move_layer(&self, id: LayerId, index: usize) -> DocumentResult<usize> {
        let mut state = self.state.write();
        let from = state
            .layer_position(id)
            .ok_or(DocumentError::LayerNotFound(id))?;
        let len = state.layers.len();
        if index >= len {
            return Err(DocumentError::IndexOutOfBounds { index, len });
        }
        let layer = state.layers.remove(from);
        state.layers.insert(index, layer);
        Ok(from)
    }

    /// Select the layer new features go into, returning the previous one.
    pub fn set_active_layer(&self, id: Option<LayerId>) -> DocumentResult<Option<LayerId>> {
        let mut state = self.state.write();
        if let Some(id) = id {
            state.layer_position(id).ok_or(DocumentError::LayerNotFound(id))?;
        }
        Ok(std::mem::replace(&mut state.active_layer, id))
    }

    // ---- features -----------------------------------------------------

    /// Insert a feature into `layer` at `index` (on top when `None`).
    pub fn insert_feature(
        &self,
        layer: LayerId,
        feature: Feature,
        index: Option<usize>,
    ) -> DocumentResult<usize> {
        if let Some(style) = &feature.style {
            style.validate()?;
        }
        let mut state = self.state.write();
        if state.locate_feature(feature.id).is_some() {
            return Err(DocumentError::DuplicateId(feature.id.to_string()));
        }
        let target = state.layer_mut(layer)?;
        let index = checked_insert_index(index, target.features.len())?;
        target.features.insert(index, feature);
        Ok(index)
    }

    /// Remove a feature, returning where it was and its contents.
    pub fn remove_feature(&self, id: FeatureId) -> DocumentResult<(LayerId, usize, Feature)> {
        let mut state = self.state.write();
        let (layer_index, feature_index) = state
            .locate_feature(id)
            .ok_or(DocumentError::FeatureNotFound(id))?;
        let layer = &mut state.layers[layer_index];
        let feature = layer.features.remove(feature_index);
        Ok((layer.id, feature_index, feature))
    }

    /// Replace a feature's geometry, returning the previous one.
    pub fn set_feature_geometry(&self, id: FeatureId, geometry: Geometry) -> DocumentResult<Geometry> {
        let mut state = self.state.write();
        let feature = state.feature_mut(id)?;
        Ok(std::mem::replace(&mut feature.geometry, geometry))
    }

    /// Replace a feature's style, returning the previous one.
    pub fn set_feature_style(
        &self,
        id: FeatureId,
        style: Option<Style>,
    ) -> DocumentResult<Option<Style>> {
        if let Some(style) = &style {
            style.validate()?;
        }
        let mut state = self.state.write();
        let feature = state.feature_mut(id)?;
        Ok(std::mem::replace(&mut feature.style, style))
    }

    /// Replace a feature's metadata, returning the previous map.
    pub fn set_feature_metadata(
        &self,
        id: FeatureId,
        metadata: BTreeMap<String, String>,
    ) -> DocumentResult<BTreeMap<String, String>> {
        let mut state = self.state.write();
        let feature = state.feature_mut(id)?;
        Ok(std::mem::replace(&mut feature.metadata, metadata))
    }

    // ---- layouts ------------------------------------------------------

    pub fn insert_layout(&self, page: LayoutPage, index: Option<usize>) -> DocumentResult<usize> {
        let mut state = self.state.write();
        if state.layout_position(page.id).is_some() {
            return Err(DocumentError::DuplicateId(page.id.to_string()));
        }
        let index = checked_insert_index(index, state.layouts.len())?;
        state.layouts.insert(index, page);
        Ok(index)
    }

    pub fn remove_layout(&self, id: LayoutId) -> DocumentResult<(usize, LayoutPage)> {
        let mut state = self.state.write();
        let index = state
            .layout_position(id)
            .ok_or(DocumentError::LayoutNotFound(id))?;
        Ok((index, state.layouts.remove(index)))
    }

    /// Replace the page with the same id, returning the previous version.
    pub fn replace_layout(&self, page: LayoutPage) -> DocumentResult<LayoutPage> {
        let mut state = self.state.write();
        let index = state
            .layout_position(page.id)
            .ok_or(DocumentError::LayoutNotFound(page.id))?;
        Ok(std::mem::replace(&mut state.layouts[index], page))
    }

    // ---- shared views -------------------------------------------------

    pub fn insert_shared_view(&self, view: SharedView, index: Option<usize>) -> DocumentResult<usize> {
        if !(view.zoom.is_finite() && view.zoom > 0.0) {
            return Err(DocumentError::invalid("shared_view.zoom", "must be finite and > 0"));
        }
        let mut state = self.state.write();
        if state.shared_view_position(view.id).is_some() {
            return Err(DocumentError::DuplicateId(view.id.to_string()));
        }
        let index = checked_insert_index(index, state.shared_views.len())?;
        state.shared_views.insert(index, view);
        Ok(index)
    }

    /// Remove a shared view. Clears the active view if it was this one.
    pub fn remove_shared_view(&self, id: SharedViewId) -> DocumentResult<(usize, SharedView)> {
        let mut state = self.state.write();
        let index = state
            .shared_view_position(id)
            .ok_or(DocumentError::SharedViewNotFound(id))?;
        let view = state.shared_views.remove(index);
        if state.active_view == Some(id) {
            state.active_view = None;
        }
        Ok((index, view))
    }

    pub fn replace_shared_view(&self, view: SharedView) -> DocumentResult<SharedView> {
        if !(view.zoom.is_finite() && view.zoom > 0.0) {
            return Err(DocumentError::invalid("shared_view.zoom", "must be finite and > 0"));
        }
        let mut state = self.state.write();
        let index = state
            .shared_view_position(view.id)
            .ok_or(DocumentError::SharedViewNotFound(view.id))?;
        Ok(std::mem::replace(&mut state.shared_views[index], view))
    }

    pub fn set_active_view(&self, id: Option<SharedViewId>) -> DocumentResult<Option<SharedViewId>> {
        let mut state = self.state.write();
        if let Some(id) = id {
            state
                .shared_view_position(id)
                .ok_or(DocumentError::SharedViewNotFound(id))?;
        }
        Ok(std::mem::replace(&mut state.active_view, id))
    }

    /// Swap in a whole new state (project load), returning the old one.
    pub fn replace_state(&self, state: DocumentState) -> DocumentState {
        std::mem::replace(&mut *self.state.write(), state)
    }

    // ---- queries ------------------------------------------------------

    pub fn layer(&self, id: LayerId) -> DocumentResult<Layer> {
        let state = self.state.read();
        state
            .layer_position(id)
            .map(|i| state.layers[i].clone())
            .ok_or(DocumentError::LayerNotFound(id))
    }

    pub fn layers(&self) -> Vec<Layer> {
        self.state.read().layers.clone()
    }

    pub fn layer_index(&self, id: LayerId) -> DocumentResult<usize> {
        self.state
            .read()
            .layer_position(id)
            .ok_or(DocumentError::LayerNotFound(id))
    }

    pub fn active_layer(&self) -> Option<LayerId> {
        self.state.read().active_layer
    }

    pub fn feature(&self, id: FeatureId) -> DocumentResult<Feature> {
        let state = self.state.read();
        state
            .locate_feature(id)
            .map(|(l, f)| state.layers[l].features[f].clone())
            .ok_or(DocumentError::FeatureNotFound(id))
    }

    /// Layer holding the feature and the feature's index within it.
    pub fn feature_location(&self, id: FeatureId) -> DocumentResult<(LayerId, usize)> {
        let state = self.state.read();
        state
            .locate_feature(id)
            .map(|(l, f)| (state.layers[l].id, f))
            .ok_or(DocumentError::FeatureNotFound(id))
    }

    pub fn layouts(&self) -> Vec<LayoutPage> {
        self.state.read().layouts.clone()
    }

    pub fn layout(&self, id: LayoutId) -> DocumentResult<LayoutPage> {
        let state = self.state.read();
        state
            .layout_position(id)
            .map(|i| state.layouts[i].clone())
            .ok_or(DocumentError::LayoutNotFound(id))
    }

    pub fn layout_index(&self, id: LayoutId) -> DocumentResult<usize> {
        self.state
            .read()
            .layout_position(id)
            .ok_or(DocumentError::LayoutNotFound(id))
    }

    pub fn shared_views(&self) -> Vec<SharedView> {
        self.state.read().shared_views.clone()
    }

    pub fn shared_view(&self, id: SharedViewId) -> DocumentResult<SharedView> {
        let state = self.state.read();
        state
            .shared_view_position(id)
            .map(|i| state.shared_views[i].clone())
            .ok_or(DocumentError::SharedViewNotFound(id))
    }

    pub fn shared_view_index(&self, id: SharedViewId) -> DocumentResult<usize> {
        self.state
            .read()
            .shared_view_position(id)
            .ok_or(DocumentError::SharedViewNotFound(id))
    }

    pub fn active_view(&self) -> Option<SharedViewId> {
        self.state.read().active_view
    }

    /// Deep copy of the whole state.
    pub fn snapshot(&self) -> DocumentState {
        self.state.read().clone()
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("Document")
            .field("layers", &state.layers.len())
            .field("features", &state.feature_count())
            .field("layouts", &state.layouts.len())
            .field("shared_views", &state.shared_views.len())
            .finish()
    }
}

/// Resolve an optional insert position against a collection of `len` items.
fn checked_insert_index(index: Option<usize>, len: usize) -> DocumentResult<usize> {
    match index {
        None => Ok(len),
        Some(index) if index <= len => Ok(index),
        Some(index) => Err(DocumentError::IndexOutOfBounds { index, len }),
    }
}

impl DocumentState {
    fn layer_position(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|l| l.id == id)
    }

    fn layer_mut(&mut self, id: LayerId) -> DocumentResult<&mut Layer> {
        self.layers
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or(DocumentError::LayerNotFound(id))
    }

    /// `(layer index, feature index)` of a feature.
    fn locate_feature(&self, id: FeatureId) -> Option<(usize, usize)> {
        self.layers
            .iter()
            .enumerate()
            .find_map(|(l, layer)| layer.feature_index(id).map(|f| (l, f)))
    }

    fn feature_mut(&mut self, id: FeatureId) -> DocumentResult<&mut Feature> {
        let (l, f) = self
            .locate_feature(id)
            .ok_or(DocumentError::FeatureNotFound(id))?;
        Ok(&mut self.layers[l].features[f])
    }

    fn layout_position(&self, id: LayoutId) -> Option<usize> {
        self.layouts.iter().position(|p| p.id == id)
    }

    fn shared_view_position(&self, id: SharedViewId) -> Option<usize> {
        self.shared_views.iter().position(|v| v.id == id)
    }
}
