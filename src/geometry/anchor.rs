//! Shape anchor resolution
//!
//! Maps a layout address (named side, angle, absolute coordinates) to a
//! concrete point on or relative to a shape. Resolution is total: address
//! and shape combinations without exact math degrade to a bounding-box
//! approximation instead of failing.

use serde::{Deserialize, Serialize};

use super::{Point, Shape, Vector};

/// Named side of a shape, in screen orientation (top = smaller y)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

impl Side {
    /// The screen-space angle pointing out of this side, in degrees
    /// (0 = +x, clockwise positive)
    pub fn degrees(&self) -> f64 {
        match self {
            Side::Right => 0.0,
            Side::Bottom => 90.0,
            Side::Left => 180.0,
            Side::Top => -90.0,
        }
    }
}

/// How a point on a shape is addressed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum AnchorAddress {
    /// Midpoint of a named side (boundary point at the cardinal angle for
    /// circles and ellipses)
    Preset { side: Side },
    /// Boundary point hit by a ray cast from the center at the given angle
    /// in degrees (0 = +x axis, increasing clockwise in screen space)
    Angle { degrees: f64 },
    /// Caller-supplied coordinates, returned unchanged
    Absolute { x: f64, y: f64 },
}

/// Resolve an address against a shape. With no address the shape center is
/// returned.
pub fn resolve_anchor(shape: &Shape, address: Option<&AnchorAddress>) -> Point {
    let Some(address) = address else {
        return shape.center();
    };
    match address {
        AnchorAddress::Absolute { x, y } => Point::new(*x, *y),
        AnchorAddress::Preset { side } => preset_anchor(shape, *side),
        AnchorAddress::Angle { degrees } => angle_anchor(shape, *degrees),
    }
}

fn preset_anchor(shape: &Shape, side: Side) -> Point {
    match shape {
        // Rectangles and polygons use (bounding-box) side midpoints. For
        // polygons this is an approximation, not the true boundary.
        Shape::Rect { .. } | Shape::Polygon { .. } => {
            let bb = shape.bounding_box();
            let center = bb.center();
            match side {
                Side::Top => Point::new(center.x, bb.y),
                Side::Bottom => Point::new(center.x, bb.bottom()),
                Side::Left => Point::new(bb.x, center.y),
                Side::Right => Point::new(bb.right(), center.y),
            }
        }
        Shape::Circle { .. } | Shape::Ellipse { .. } => angle_anchor(shape, side.degrees()),
    }
}

fn angle_anchor(shape: &Shape, degrees: f64) -> Point {
    let theta = degrees.to_radians();
    let direction = Vector::new(theta.cos(), theta.sin());
    match shape {
        Shape::Circle { cx, cy, r } => {
            Point::new(cx + direction.x * r, cy + direction.y * r)
        }
        Shape::Ellipse { cx, cy, rx, ry } => {
            Point::new(cx + theta.cos() * rx, cy + theta.sin() * ry)
        }
        Shape::Rect { .. } => {
            let bb = shape.bounding_box();
            let center = bb.center();
            let corners = [
                Point::new(bb.x, bb.y),
                Point::new(bb.right(), bb.y),
                Point::new(bb.right(), bb.bottom()),
                Point::new(bb.x, bb.bottom()),
            ];
            let mut nearest: Option<f64> = None;
            for i in 0..4 {
                let a = corners[i];
                let b = corners[(i + 1) % 4];
                if let Some(t) = ray_segment_intersection(center, direction, a, b) {
                    nearest = Some(nearest.map_or(t, |n: f64| n.min(t)));
                }
            }
            match nearest {
                Some(t) => center.offset(direction.scaled(t)),
                None => center,
            }
        }
        Shape::Polygon { points } => {
            let center = shape.center();
            if points.len() < 2 {
                return center;
            }
            let mut nearest: Option<f64> = None;
            for i in 0..points.len() {
                let a = points[i];
                let b = points[(i + 1) % points.len()];
                if let Some(t) = ray_segment_intersection(center, direction, a, b) {
                    if t > 1e-9 {
                        nearest = Some(nearest.map_or(t, |n: f64| n.min(t)));
                    }
                }
            }
            match nearest {
                Some(t) => center.offset(direction.scaled(t)),
                None => center,
            }
        }
    }
}

/// Parametric distance along a ray to its crossing with segment `a`-`b`,
/// or `None` when the ray misses the segment.
fn ray_segment_intersection(origin: Point, direction: Vector, a: Point, b: Point) -> Option<f64> {
    let seg = Vector::between(a, b);
    let denom = direction.x * seg.y - direction.y * seg.x;
    if denom.abs() <= 1e-12 {
        // Parallel (or degenerate segment)
        return None;
    }
    let to_a = Vector::between(origin, a);
    let t = (to_a.x * seg.y - to_a.y * seg.x) / denom;
    let s = (to_a.x * direction.y - to_a.y * direction.x) / denom;
    if t >= 0.0 && (-1e-9..=1.0 + 1e-9).contains(&s) {
        Some(t)
    } else {
        None
    }
}
