//! Data types shared by the history engine and the presentation layer.
//!
//! - [`HistoryKey`]: identifies one independent editing surface
//! - [`Capability`]: the `{can_undo, can_redo}` pair rendered by undo/redo controls

use serde::{Deserialize, Serialize};

/// Identifier partitioning independent undo/redo timelines.
///
/// Every editing surface owns exactly one timeline; keys never share one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HistoryKey {
    /// The main map editor (layers, features, styles)
    MainMap,
    /// The print-layout editor
    Layout,
    /// The shared-view editor
    SharedViews,
    /// The export dialog
    Export,
}

impl HistoryKey {
    /// Every key, in display order.
    pub const ALL: [HistoryKey; 4] = [
        HistoryKey::MainMap,
        HistoryKey::Layout,
        HistoryKey::SharedViews,
        HistoryKey::Export,
    ];

    /// Stable kebab-case name, identical to the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MainMap => "main-map",
            Self::Layout => "layout",
            Self::SharedViews => "shared-views",
            Self::Export => "export",
        }
    }
}

impl std::fmt::Display for HistoryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for HistoryKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HistoryKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| format!("unknown history key: {}", s))
    }
}

/// Whether a timeline has entries to reverse or replay.
///
/// This is the only history information exposed to the presentation layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Capability {
    pub can_undo: bool,
    pub can_redo: bool,
}

impl Capability {
    /// Both controls disabled.
    pub const NONE: Capability = Capability {
        can_undo: false,
        can_redo: false,
    };

    /// Derive the capability from the depth of the backward and forward stacks.
    pub fn from_depths(backward: usize, forward: usize) -> Self {
        Self {
            can_undo: backward > 0,
            can_redo: forward > 0,
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "undo={} redo={}", self.can_undo, self.can_redo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_key_names() {
        assert_eq!(HistoryKey::MainMap.to_string(), "main-map");
        assert_eq!(HistoryKey::SharedViews.as_str(), "shared-views");
        assert_eq!("layout".parse::<HistoryKey>(), Ok(HistoryKey::Layout));
        assert!("timeline".parse::<HistoryKey>().is_err());
    }

    #[test]
    fn test_history_key_serde_matches_display() {
        for key in HistoryKey::ALL {
            let json = serde_json::to_string(&key).unwrap();
            assert_eq!(json, format!("\"{}\"", key));
            let back: HistoryKey = serde_json::from_str(&json).unwrap();
            assert_eq!(back, key);
        }
    }

    #[test]
    fn test_capability_from_depths() {
        assert_eq!(Capability::from_depths(0, 0), Capability::NONE);
        assert_eq!(Capability::default(), Capability::NONE);

        let cap = Capability::from_depths(2, 0);
        assert!(cap.can_undo);
        assert!(!cap.can_redo);

        let cap = Capability::from_depths(0, 1);
        assert!(!cap.can_undo);
        assert!(cap.can_redo);
    }
}
