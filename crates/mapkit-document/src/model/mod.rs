//! Plain data types of the map document.
//!
//! Every type here is an owned value (`Clone + PartialEq`). The document hands
//! out clones and takes ownership of what it is given, so a changeset can keep
//! a copy for undo without aliasing anything the document later mutates.

mod feature;
mod geometry;
mod layer;
mod layout;
mod shared_view;
mod style;

pub use feature::Feature;
pub use geometry::{Coordinate, Extent, Geometry};
pub use layer::Layer;
pub use layout::{LayoutPage, Orientation, PageFormat};
pub use shared_view::SharedView;
pub use style::{Color, Fill, Label, PointSymbol, Stroke, Style};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a fresh random id.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Identifies a layer.
    LayerId
);
entity_id!(
    /// Identifies a feature across all layers.
    FeatureId
);
entity_id!(
    /// Identifies a print-layout page.
    LayoutId
);
entity_id!(
    /// Identifies a shared view.
    SharedViewId
);

/// The complete inspectable state of a map document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DocumentState {
    /// Layers in draw order, bottom first.
    pub layers: Vec<Layer>,
    /// Layer new features are drawn into.
    pub active_layer: Option<LayerId>,
    /// Print-layout pages in display order.
    pub layouts: Vec<LayoutPage>,
    /// Saved shareable views in display order.
    pub shared_views: Vec<SharedView>,
    /// View currently shown in the shared-view editor.
    pub active_view: Option<SharedViewId>,
}

impl DocumentState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of features across all layers.
    pub fn feature_count(&self) -> usize {
        self.layers.iter().map(|l| l.features.len()).sum()
    }
}
