use serde::{Deserialize, Serialize};

use super::{Extent, LayoutId};

/// Paper size of a print-layout page.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum PageFormat {
    #[default]
    A4,
    A3,
    Letter,
    Custom {
        width_mm: f64,
        height_mm: f64,
    },
}

impl PageFormat {
    /// `(width, height)` in millimetres, portrait.
    pub fn size_mm(&self) -> (f64, f64) {
        match self {
            PageFormat::A4 => (210.0, 297.0),
            PageFormat::A3 => (297.0, 420.0),
            PageFormat::Letter => (215.9, 279.4),
            PageFormat::Custom {
                width_mm,
                height_mm,
            } => (*width_mm, *height_mm),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// One page of the print-layout editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutPage {
    pub id: LayoutId,
    pub name: String,
    pub format: PageFormat,
    pub orientation: Orientation,
    /// Title printed on the page.
    pub title: String,
    /// Map area shown on the page; `None` follows the main map.
    pub extent: Option<Extent>,
}

impl LayoutPage {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: LayoutId::new(),
            name: name.into(),
            format: PageFormat::default(),
            orientation: Orientation::default(),
            title: String::new(),
            extent: None,
        }
    }

    /// Page size in millimetres with the orientation applied.
    pub fn page_size_mm(&self) -> (f64, f64) {
        let (w, h) = self.format.size_mm();
        match self.orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }
}
