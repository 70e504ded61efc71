//! Feature styling records.

use serde::{Deserialize, Serialize};

use crate::error::{DocumentError, DocumentResult};

/// RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#rrggbb` or `#rrggbbaa` (the `#` is optional).
    pub fn from_hex(hex: &str) -> DocumentResult<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if !(digits.len() == 6 || digits.len() == 8) || !digits.is_ascii() {
            return Err(DocumentError::invalid("color", format!("'{}' is not #rrggbb[aa]", hex)));
        }

        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|_| DocumentError::invalid("color", format!("'{}' is not hex", hex)))
        };

        Ok(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
            a: if digits.len() == 8 { channel(6)? } else { 255 },
        })
    }

    /// `#rrggbb`, or `#rrggbbaa` when not fully opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub color: Color,
    pub width: f64,
    /// Dash pattern in pixels; empty for a solid line.
    pub dash: Vec<f64>,
}

impl Stroke {
    pub fn solid(color: Color, width: f64) -> Self {
        Self {
            color,
            width,
            dash: Vec::new(),
        }
    }
}

/// Marker drawn for point geometries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointSymbol {
    pub radius: f64,
    pub color: Color,
}

/// Text label drawn next to a feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub text: String,
    pub size: f64,
    pub color: Color,
}

/// Complete style record of a feature. Unset parts are not drawn.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Style {
    pub fill: Option<Fill>,
    pub stroke: Option<Stroke>,
    pub point: Option<PointSymbol>,
    pub label: Option<Label>,
}

impl Style {
    pub fn filled(color: Color) -> Self {
        Self {
            fill: Some(Fill { color }),
            ..Self::default()
        }
    }

    pub fn with_stroke(mut self, stroke: Stroke) -> Self {
        self.stroke = Some(stroke);
        self
    }

    pub fn with_label(mut self, text: impl Into<String>) -> Self {
        self.label = Some(Label {
            text: text.into(),
            size: 12.0,
            color: Color::BLACK,
        });
        self
    }

    /// Reject values a renderer cannot draw.
    pub fn validate(&self) -> DocumentResult<()> {
        if let Some(stroke) = &self.stroke {
            if !(stroke.width.is_finite() && stroke.width >= 0.0) {
                return Err(DocumentError::invalid("stroke.width", "must be finite and >= 0"));
            }
        }
        if let Some(point) = &self.point {
            if !(point.radius.is_finite() && point.radius > 0.0) {
                return Err(DocumentError::invalid("point.radius", "must be finite and > 0"));
            }
        }
        Ok(())
    }
}
