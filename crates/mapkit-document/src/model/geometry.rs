//! Geometry primitives in map units.

use serde::{Deserialize, Serialize};

/// A 2D position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

impl Coordinate {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Extent {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Coordinate {
        Coordinate::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Grow to include `c`.
    fn include(&mut self, c: &Coordinate) {
        self.min_x = self.min_x.min(c.x);
        self.min_y = self.min_y.min(c.y);
        self.max_x = self.max_x.max(c.x);
        self.max_y = self.max_y.max(c.y);
    }

    fn from_point(c: &Coordinate) -> Self {
        Self::new(c.x, c.y, c.x, c.y)
    }
}

/// Feature geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    Point(Coordinate),
    LineString(Vec<Coordinate>),
    /// Exterior ring first, then holes.
    Polygon(Vec<Vec<Coordinate>>),
    MultiPoint(Vec<Coordinate>),
}

impl Geometry {
    /// Closed rectangle polygon, handy for layout extents and tests.
    pub fn rectangle(min: Coordinate, max: Coordinate) -> Self {
        Geometry::Polygon(vec![vec![
            min,
            Coordinate::new(max.x, min.y),
            max,
            Coordinate::new(min.x, max.y),
            min,
        ]])
    }

    /// Shift every vertex by `(dx, dy)` in place.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.for_each_mut(|c| *c = c.translated(dx, dy));
    }

    /// Copy of this geometry shifted by `(dx, dy)`.
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        let mut moved = self.clone();
        moved.translate(dx, dy);
        moved
    }

    /// Bounding box, or `None` for a geometry without vertices.
    pub fn bounds(&self) -> Option<Extent> {
        let mut extent: Option<Extent> = None;
        self.for_each(|c| match extent.as_mut() {
            Some(e) => e.include(c),
            None => extent = Some(Extent::from_point(c)),
        });
        extent
    }

    pub fn vertex_count(&self) -> usize {
        match self {
            Geometry::Point(_) => 1,
            Geometry::LineString(coords) | Geometry::MultiPoint(coords) => coords.len(),
            Geometry::Polygon(rings) => rings.iter().map(Vec::len).sum(),
        }
    }

    /// Short type name for logs and labels.
    pub fn kind(&self) -> &'static str {
        match self {
            Geometry::Point(_) => "Point",
            Geometry::LineString(_) => "LineString",
            Geometry::Polygon(_) => "Polygon",
            Geometry::MultiPoint(_) => "MultiPoint",
        }
    }

    fn for_each(&self, mut f: impl FnMut(&Coordinate)) {
        match self {
            Geometry::Point(c) => f(c),
            Geometry::LineString(coords) | Geometry::MultiPoint(coords) => coords.iter().for_each(f),
            Geometry::Polygon(rings) => rings.iter().flatten().for_each(f),
        }
    }

    fn for_each_mut(&mut self, mut f: impl FnMut(&mut Coordinate)) {
        match self {
            Geometry::Point(c) => f(c),
            Geometry::LineString(coords) | Geometry::MultiPoint(coords) => {
                coords.iter_mut().for_each(f)
            }
            Geometry::Polygon(rings) => rings.iter_mut().flatten().for_each(f),
        }
    }
}
