//! Geometric primitives shared by the anchor, intersection and routing code
//!
//! All coordinates are in diagram-local space: x grows to the right, y grows
//! downward (screen convention), angles in degrees increase clockwise.

pub mod anchor;
pub mod intersect;
pub mod path;
pub mod shape;

pub use anchor::{resolve_anchor, AnchorAddress, Side};
pub use intersect::boundary_intersection;
pub use path::{anchor_on_path, PathAnchor, PathOffset, PathPosition, PathSnap};
pub use shape::Shape;

use serde::{Deserialize, Serialize};

/// A 2D point in diagram-local coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: Point) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Translate by a vector
    pub fn offset(&self, v: Vector) -> Point {
        Point::new(self.x + v.x, self.y + v.y)
    }
}

/// A 2D direction or displacement
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
}

impl Vector {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Vector from one point to another
    pub fn between(from: Point, to: Point) -> Self {
        Self::new(to.x - from.x, to.y - from.y)
    }

    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Unit-length copy, or `None` when the vector is (numerically) zero
    pub fn normalized(&self) -> Option<Vector> {
        let len = self.length();
        if len <= 1e-12 {
            return None;
        }
        Some(Vector::new(self.x / len, self.y / len))
    }

    /// This vector rotated 90 degrees clockwise in screen space (y-down):
    /// `(x, y)` becomes `(-y, x)`
    pub fn perpendicular(&self) -> Vector {
        Vector::new(-self.y, self.x)
    }

    pub fn scaled(&self, factor: f64) -> Vector {
        Vector::new(self.x * factor, self.y * factor)
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge x-coordinate
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge y-coordinate
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Center point of the bounding box
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Check if this bounding box contains a point
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.right()
            && point.y >= self.y
            && point.y <= self.bottom()
    }

    /// Smallest box enclosing a set of points; zero box when empty
    pub fn around_points(points: &[Point]) -> Self {
        let Some(first) = points.first() else {
            return Self::default();
        };
        let mut min_x = first.x;
        let mut min_y = first.y;
        let mut max_x = first.x;
        let mut max_y = first.y;
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Self::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }
}
