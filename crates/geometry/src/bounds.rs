//! Axis-aligned bounds in page space
//!
//! True geometry bounds for rotated and curved shapes: computed from
//! flattened outline samples mapped through the object's matrix, not
//! from transformed corner points of a naive bounding box.

use crate::object::VectorObject;
use crate::path::FlattenQuality;
use crate::transform::Point;

/// Axis-aligned rectangle, min corner to max corner
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    /// Create bounds from two corner coordinates in any order
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            min_x: x1.min(x2),
            min_y: y1.min(y2),
            max_x: x1.max(x2),
            max_y: y1.max(y2),
        }
    }

    /// Smallest bounds containing all points; None for an empty set
    pub fn from_points(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let mut bounds = Bounds {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        for p in &points[1..] {
            bounds.include(*p);
        }
        Some(bounds)
    }

    /// Grow to include a point
    pub fn include(&mut self, p: Point) {
        self.min_x = self.min_x.min(p.x);
        self.min_y = self.min_y.min(p.y);
        self.max_x = self.max_x.max(p.x);
        self.max_y = self.max_y.max(p.y);
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Boundary-inclusive point containment
    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    /// True when `other` lies entirely within self (boundary inclusive)
    pub fn contains(&self, other: &Bounds) -> bool {
        other.min_x >= self.min_x
            && other.max_x <= self.max_x
            && other.min_y >= self.min_y
            && other.max_y <= self.max_y
    }

    /// Boundary-inclusive overlap test
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.min_x <= other.max_x
            && other.min_x <= self.max_x
            && self.min_y <= other.max_y
            && other.min_y <= self.max_y
    }

    /// The rectangle's four corners, counter-clockwise from min
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.min_x, self.min_y),
            Point::new(self.max_x, self.min_y),
            Point::new(self.max_x, self.max_y),
            Point::new(self.min_x, self.max_y),
        ]
    }
}

/// Page-space bounds of an object's true geometry.
///
/// Outline quality sampling so curve extrema are captured; groups
/// resolve through their children's composed matrices. Returns None for
/// objects with no geometry (empty paths, empty groups).
pub fn object_bounds(object: &VectorObject) -> Option<Bounds> {
    let mut bounds: Option<Bounds> = None;
    for line in object.world_outline(FlattenQuality::OUTLINE, None) {
        for p in line {
            match &mut bounds {
                Some(b) => b.include(p),
                None => bounds = Bounds::from_points(&[p]),
            }
        }
    }
    bounds
}
