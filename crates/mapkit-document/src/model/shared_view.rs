use serde::{Deserialize, Serialize};

use super::{Coordinate, LayerId, SharedViewId};

/// A saved map view that can be shared by link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedView {
    pub id: SharedViewId,
    pub title: String,
    pub center: Coordinate,
    pub zoom: f64,
    /// Layers shown in this view, in draw order.
    pub visible_layers: Vec<LayerId>,
}

impl SharedView {
    pub fn new(title: impl Into<String>, center: Coordinate, zoom: f64) -> Self {
        Self {
            id: SharedViewId::new(),
            title: title.into(),
            center,
            zoom,
            visible_layers: Vec::new(),
        }
    }
}
