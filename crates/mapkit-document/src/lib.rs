//! # MapKit Document
//!
//! The mutable map document (layers, features, styles, print layouts and
//! shared views) and the concrete changesets the editors record against it.
//!
//! The [`Document`] handle is the only way to read or change the scene graph.
//! Changesets in [`changesets`] capture owned "before" copies at construction
//! and go through the same handle on apply and undo.
//!
//! ```rust,ignore
//! let doc = Document::new();
//! let history = HistoryService::new(HistoryConfig::default(), bus);
//!
//! let roads = Layer::new("Roads");
//! history
//!     .execute(HistoryKey::MainMap, AddLayer::new(&doc, roads, None).boxed())
//!     .await?;
//! ```

pub mod changesets;
pub mod document;
pub mod error;
pub mod model;

pub use changesets::{
    AddFeatures, AddLayer, AddLayoutPage, AddSharedView, MoveFeatures, MoveLayer, RemoveFeatures,
    RemoveLayer, RemoveLayoutPage, RemoveSharedView, RenameLayer, SetActiveLayer, SetActiveView,
    SetFeatureMetadata, SetFeatureStyle, SetGeometry, SetLayerOpacity, SetLayerVisibility,
    UpdateLayoutPage, UpdateSharedView, UpdateStyles,
};
pub use document::Document;
pub use error::{DocumentError, DocumentResult};
pub use model::{
    Color, Coordinate, DocumentState, Extent, Feature, FeatureId, Fill, Geometry, Label, Layer,
    LayerId, LayoutId, LayoutPage, Orientation, PageFormat, PointSymbol, SharedView, SharedViewId,
    Stroke, Style,
};
