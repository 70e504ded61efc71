//! Feature edits: drawing, deleting, reshaping and styling.

use std::collections::BTreeMap;

use async_trait::async_trait;
use mapkit_history::{Changeset, ChangesetResult, CompositeChangeset};

use super::Stash;
use crate::document::Document;
use crate::error::DocumentResult;
use crate::model::{Feature, FeatureId, Geometry, LayerId, Style};

/// Add one or more features to a layer.
///
/// A failed apply removes the features it already inserted.
pub struct AddFeatures {
    doc: Document,
    layer: LayerId,
    ids: Vec<FeatureId>,
    features: Stash<Vec<Feature>>,
}

impl AddFeatures {
    pub fn new(doc: &Document, layer: LayerId, features: Vec<Feature>) -> DocumentResult<Self> {
        doc.layer_index(layer)?;
        Ok(Self {
            doc: doc.clone(),
            layer,
            ids: features.iter().map(|f| f.id).collect(),
            features: Stash::holding(features),
        })
    }

    pub fn feature_ids(&self) -> &[FeatureId] {
        &self.ids
    }
}

#[async_trait]
impl Changeset for AddFeatures {
    fn name(&self) -> &str {
        "Add features"
    }

    async fn apply(&mut self) -> ChangesetResult {
        let features = self.features.peek()?.clone();
        let mut inserted = Vec::with_capacity(features.len());
        for feature in features {
            let id = feature.id;
            if let Err(err) = self.doc.insert_feature(self.layer, feature, None) {
                for id in inserted.into_iter().rev() {
                    let _ = self.doc.remove_feature(id);
                }
                return Err(err.into());
            }
            inserted.push(id);
        }
        self.features.clear();
        Ok(())
    }

    async fn undo(&mut self) -> ChangesetResult {
        self.features.ensure_live()?;
        for id in &self.ids {
            self.doc.feature(*id)?;
        }
        let mut removed = Vec::with_capacity(self.ids.len());
        for id in self.ids.iter().rev() {
            let (_, _, feature) = self.doc.remove_feature(*id)?;
            removed.push(feature);
        }
        removed.reverse();
        self.features.put(removed);
        Ok(())
    }

    async fn dispose(&mut self) -> ChangesetResult {
        self.features.release();
        Ok(())
    }
}

/// Delete features, possibly spread over several layers.
///
/// Undo puts every feature back into its original layer at its original
/// index.
pub struct RemoveFeatures {
    doc: Document,
    ids: Vec<FeatureId>,
    /// `(layer, index, feature)` in removal order.
    removed: Stash<Vec<(LayerId, usize, Feature)>>,
}

impl RemoveFeatures {
    pub fn new(doc: &Document, ids: Vec<FeatureId>) -> DocumentResult<Self> {
        for id in &ids {
            doc.feature_location(*id)?;
        }
        Ok(Self {
            doc: doc.clone(),
            ids,
            removed: Stash::empty(),
        })
    }

    /// Put removed features back; all or nothing.
    fn restore(&self, removed: Vec<(LayerId, usize, Feature)>) -> DocumentResult<()> {
        let mut inserted = Vec::with_capacity(removed.len());
        // Reverse removal order so every recorded index is valid again
        for (layer, index, feature) in removed.into_iter().rev() {
            let id = feature.id;
            if let Err(err) = self.doc.insert_feature(layer, feature, Some(index)) {
                for id in inserted.iter().rev() {
                    if let Err(remove_err) = self.doc.remove_feature(*id) {
                        tracing::warn!("Could not roll back partial restore: {}", remove_err);
                    }
                }
                return Err(err);
            }
            inserted.push(id);
        }
        Ok(())
    }
}

#[async_trait]
impl Changeset for RemoveFeatures {
    fn name(&self) -> &str {
        "Delete features"
    }

    async fn apply(&mut self) -> ChangesetResult {
        self.removed.ensure_live()?;
        let mut removed = Vec::with_capacity(self.ids.len());
        for id in &self.ids {
            match self.doc.remove_feature(*id) {
                Ok(entry) => removed.push(entry),
                Err(err) => {
                    if let Err(restore_err) = self.restore(removed) {
                        tracing::warn!("Could not roll back partial delete: {}", restore_err);
                    }
                    return Err(err.into());
                }
            }
        }
        self.removed.put(removed);
        Ok(())
    }

    async fn undo(&mut self) -> ChangesetResult {
        let removed = self.removed.peek()?.clone();
        self.restore(removed)?;
        self.removed.clear();
        Ok(())
    }

    async fn dispose(&mut self) -> ChangesetResult {
        self.removed.release();
        Ok(())
    }
}

/// Replace one feature's geometry (vertex edit, reshape).
pub struct SetGeometry {
    doc: Document,
    id: FeatureId,
    before: Geometry,
    after: Geometry,
}

impl SetGeometry {
    pub fn new(doc: &Document, id: FeatureId, geometry: Geometry) -> DocumentResult<Self> {
        let before = doc.feature(id)?.geometry;
        Ok(Self {
            doc: doc.clone(),
            id,
            before,
            after: geometry,
        })
    }
}

#[async_trait]
impl Changeset for SetGeometry {
    fn name(&self) -> &str {
        "Edit geometry"
    }

    async fn apply(&mut self) -> ChangesetResult {
        self.doc.set_feature_geometry(self.id, self.after.clone())?;
        Ok(())
    }

    async fn undo(&mut self) -> ChangesetResult {
        self.doc.set_feature_geometry(self.id, self.before.clone())?;
        Ok(())
    }
}

/// Translate several features by the same offset.
///
/// Stores both geometries per feature, so undo and redo never accumulate
/// floating-point drift.
pub struct MoveFeatures {
    doc: Document,
    /// `(id, before, after)`
    moves: Vec<(FeatureId, Geometry, Geometry)>,
}

impl MoveFeatures {
    pub fn new(doc: &Document, ids: &[FeatureId], dx: f64, dy: f64) -> DocumentResult<Self> {
        let moves = ids
            .iter()
            .map(|id| {
                let before = doc.feature(*id)?.geometry;
                let after = before.translated(dx, dy);
                Ok((*id, before, after))
            })
            .collect::<DocumentResult<Vec<_>>>()?;
        Ok(Self {
            doc: doc.clone(),
            moves,
        })
    }

    /// Set every geometry to the `before` (`false`) or `after` (`true`) copy,
    /// rolling back the ones already written if one fails.
    fn write(&self, forward: bool) -> DocumentResult<()> {
        for (done, (id, before, after)) in self.moves.iter().enumerate() {
            let target = if forward { after } else { before };
            if let Err(err) = self.doc.set_feature_geometry(*id, target.clone()) {
                for (id, before, after) in self.moves[..done].iter().rev() {
                    let original = if forward { before } else { after };
                    let _ = self.doc.set_feature_geometry(*id, original.clone());
                }
                return Err(err);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Changeset for MoveFeatures {
    fn name(&self) -> &str {
        "Move features"
    }

    async fn apply(&mut self) -> ChangesetResult {
        self.write(true)?;
        Ok(())
    }

    async fn undo(&mut self) -> ChangesetResult {
        self.write(false)?;
        Ok(())
    }
}

/// Set or clear one feature's style. The building block of [`UpdateStyles`].
pub struct SetFeatureStyle {
    doc: Document,
    id: FeatureId,
    before: Option<Style>,
    after: Option<Style>,
}

impl SetFeatureStyle {
    pub fn new(doc: &Document, id: FeatureId, style: Option<Style>) -> DocumentResult<Self> {
        if let Some(style) = &style {
            style.validate()?;
        }
        let before = doc.feature(id)?.style;
        Ok(Self {
            doc: doc.clone(),
            id,
            before,
            after: style,
        })
    }
}

#[async_trait]
impl Changeset for SetFeatureStyle {
    fn name(&self) -> &str {
        "Set style"
    }

    async fn apply(&mut self) -> ChangesetResult {
        self.doc.set_feature_style(self.id, self.after.clone())?;
        Ok(())
    }

    async fn undo(&mut self) -> ChangesetResult {
        self.doc.set_feature_style(self.id, self.before.clone())?;
        Ok(())
    }
}

/// Style update over a selection, undone and redone as one entry.
pub struct UpdateStyles {
    inner: CompositeChangeset,
}

impl UpdateStyles {
    /// Apply the same style to every feature in `ids`.
    pub fn new(doc: &Document, ids: &[FeatureId], style: Style) -> DocumentResult<Self> {
        Self::per_feature(
            doc,
            ids.iter().map(|id| (*id, Some(style.clone()))).collect(),
        )
    }

    /// Give each feature its own style (`None` clears it).
    pub fn per_feature(doc: &Document, styles: Vec<(FeatureId, Option<Style>)>) -> DocumentResult<Self> {
        let mut inner = CompositeChangeset::new("Update styles");
        for (id, style) in styles {
            inner.push(SetFeatureStyle::new(doc, id, style)?.boxed());
        }
        Ok(Self { inner })
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[async_trait]
impl Changeset for UpdateStyles {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn apply(&mut self) -> ChangesetResult {
        self.inner.apply().await
    }

    async fn undo(&mut self) -> ChangesetResult {
        self.inner.undo().await
    }

    async fn dispose(&mut self) -> ChangesetResult {
        self.inner.dispose().await
    }
}

/// Replace a feature's attribute table entries.
pub struct SetFeatureMetadata {
    doc: Document,
    id: FeatureId,
    before: BTreeMap<String, String>,
    after: BTreeMap<String, String>,
}

impl SetFeatureMetadata {
    pub fn new(
        doc: &Document,
        id: FeatureId,
        metadata: BTreeMap<String, String>,
    ) -> DocumentResult<Self> {
        let before = doc.feature(id)?.metadata;
        Ok(Self {
            doc: doc.clone(),
            id,
            before,
            after: metadata,
        })
    }

    /// Change a single attribute, keeping the others.
    pub fn set_value(
        doc: &Document,
        id: FeatureId,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> DocumentResult<Self> {
        let mut metadata = doc.feature(id)?.metadata;
        metadata.insert(key.into(), value.into());
        Self::new(doc, id, metadata)
    }
}

#[async_trait]
impl Changeset for SetFeatureMetadata {
    fn name(&self) -> &str {
        "Edit attributes"
    }

    async fn apply(&mut self) -> ChangesetResult {
        self.doc.set_feature_metadata(self.id, self.after.clone())?;
        Ok(())
    }

    async fn undo(&mut self) -> ChangesetResult {
        self.doc.set_feature_metadata(self.id, self.before.clone())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Color, Coordinate, Layer};
    use mapkit_history::ChangesetError;

    fn point(x: f64, y: f64) -> Geometry {
        Geometry::Point(Coordinate::new(x, y))
    }

    /// Two layers with three points each.
    fn fixture() -> (Document, Vec<LayerId>, Vec<FeatureId>) {
        let doc = Document::new();
        let mut layers = Vec::new();
        let mut features = Vec::new();
        for name in ["wells", "pumps"] {
            let layer = Layer::new(name).with_features((0..3).map(|i| {
                let feature = Feature::new(point(i as f64, 0.0));
                features.push(feature.id);
                feature
            }));
            layers.push(layer.id);
            doc.insert_layer(layer, None).unwrap();
        }
        (doc, layers, features)
    }

    #[tokio::test]
    async fn test_add_features_round_trip() {
        let (doc, layers, _) = fixture();
        let before = doc.snapshot();

        let mut add = AddFeatures::new(
            &doc,
            layers[0],
            vec![Feature::new(point(9.0, 9.0)), Feature::new(point(8.0, 8.0))],
        )
        .unwrap();
        assert_eq!(doc.snapshot(), before);

        add.apply().await.unwrap();
        let after = doc.snapshot();
        assert_eq!(after.layers[0].features.len(), 5);

        add.undo().await.unwrap();
        assert_eq!(doc.snapshot(), before);

        add.apply().await.unwrap();
        assert_eq!(doc.snapshot(), after);
    }

    #[tokio::test]
    async fn test_add_features_rolls_back_on_failure() {
        let (doc, layers, existing) = fixture();
        let before = doc.snapshot();

        let mut duplicate = Feature::new(point(0.0, 0.0));
        duplicate.id = existing[0];
        let mut add = AddFeatures::new(&doc, layers[1], vec![Feature::new(point(5.0, 5.0)), duplicate])
            .unwrap();

        assert!(matches!(add.apply().await, Err(ChangesetError::Model(_))));
        assert_eq!(doc.snapshot(), before);
    }

    #[tokio::test]
    async fn test_remove_features_restores_positions_across_layers() {
        let (doc, _, features) = fixture();
        let before = doc.snapshot();

        let mut remove =
            RemoveFeatures::new(&doc, vec![features[1], features[0], features[4]]).unwrap();
        remove.apply().await.unwrap();
        assert_eq!(doc.snapshot().feature_count(), 3);

        remove.undo().await.unwrap();
        assert_eq!(doc.snapshot(), before);
    }

    #[tokio::test]
    async fn test_remove_features_failed_undo_leaves_document_untouched() {
        let (doc, layers, features) = fixture();
        let before = doc.snapshot();

        // wells is restored first, pumps second
        let mut remove = RemoveFeatures::new(&doc, vec![features[4], features[0]]).unwrap();
        remove.apply().await.unwrap();
        let (index, pumps) = doc.remove_layer(layers[1]).unwrap();
        let edited = doc.snapshot();

        assert!(matches!(
            remove.undo().await,
            Err(ChangesetError::TargetNotFound { .. })
        ));
        assert_eq!(doc.snapshot(), edited);

        doc.insert_layer(pumps, Some(index)).unwrap();
        remove.undo().await.unwrap();
        assert_eq!(doc.snapshot(), before);
    }

    #[tokio::test]
    async fn test_remove_features_dispose() {
        let (doc, _, features) = fixture();
        let mut remove = RemoveFeatures::new(&doc, vec![features[2]]).unwrap();
        remove.apply().await.unwrap();
        remove.dispose().await.unwrap();
        assert!(matches!(remove.undo().await, Err(ChangesetError::Disposed)));
    }

    #[tokio::test]
    async fn test_move_features_is_exact() {
        let (doc, _, features) = fixture();
        let before = doc.snapshot();

        let mut mv = MoveFeatures::new(&doc, &features[..2], 0.1, 0.2).unwrap();
        for _ in 0..10 {
            mv.apply().await.unwrap();
            mv.undo().await.unwrap();
        }
        assert_eq!(doc.snapshot(), before);

        mv.apply().await.unwrap();
        assert_eq!(doc.feature(features[1]).unwrap().geometry, point(1.0, 0.0).translated(0.1, 0.2));
    }

    #[tokio::test]
    async fn test_move_features_rolls_back_when_one_is_missing() {
        let (doc, _, features) = fixture();
        let mut mv = MoveFeatures::new(&doc, &features[..3], 1.0, 1.0).unwrap();
        doc.remove_feature(features[2]).unwrap();
        let before = doc.snapshot();

        assert!(mv.apply().await.is_err());
        assert_eq!(doc.snapshot(), before);
    }

    #[tokio::test]
    async fn test_set_geometry_keeps_its_own_copy() {
        let (doc, _, features) = fixture();
        let mut shape = Geometry::LineString(vec![Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 1.0)]);
        let mut set = SetGeometry::new(&doc, features[0], shape.clone()).unwrap();
        set.apply().await.unwrap();

        // Mutating the caller's copy must not leak into the document or the changeset
        shape.translate(100.0, 100.0);
        set.undo().await.unwrap();
        set.apply().await.unwrap();
        assert_eq!(
            doc.feature(features[0]).unwrap().geometry,
            Geometry::LineString(vec![Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 1.0)])
        );
    }

    #[tokio::test]
    async fn test_update_styles_restores_all_features() {
        let (doc, _, features) = fixture();
        doc.set_feature_style(features[1], Some(Style::filled(Color::BLACK)))
            .unwrap();
        let before = doc.snapshot();

        let mut update =
            UpdateStyles::new(&doc, &features[..3], Style::filled(Color::rgb(255, 0, 0))).unwrap();
        assert_eq!(update.len(), 3);
        update.apply().await.unwrap();
        for id in &features[..3] {
            assert_eq!(
                doc.feature(*id).unwrap().style,
                Some(Style::filled(Color::rgb(255, 0, 0)))
            );
        }

        update.undo().await.unwrap();
        assert_eq!(doc.snapshot(), before);
    }

    #[tokio::test]
    async fn test_metadata_round_trip() {
        let (doc, _, features) = fixture();
        let before = doc.snapshot();

        let mut edit = SetFeatureMetadata::set_value(&doc, features[3], "depth", "40m").unwrap();
        edit.apply().await.unwrap();
        assert_eq!(
            doc.feature(features[3]).unwrap().metadata.get("depth").map(String::as_str),
            Some("40m")
        );
        edit.undo().await.unwrap();
        assert_eq!(doc.snapshot(), before);
    }

    #[tokio::test]
    async fn test_invalid_style_rejected_at_construction() {
        let (doc, _, features) = fixture();
        let mut style = Style::default();
        style.point = Some(crate::model::PointSymbol {
            radius: -1.0,
            color: Color::BLACK,
        });
        assert!(SetFeatureStyle::new(&doc, features[0], Some(style)).is_err());
    }
}
