use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{FeatureId, Geometry, Style};

/// A drawable map feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub id: FeatureId,
    pub geometry: Geometry,
    /// Per-feature style; `None` falls back to the layer default.
    pub style: Option<Style>,
    /// Free-form attributes shown in the attribute table.
    pub metadata: BTreeMap<String, String>,
}

impl Feature {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            id: FeatureId::new(),
            geometry,
            style: None,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = Some(style);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}
