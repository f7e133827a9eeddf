//! Boundary intersection for node-to-node edges
//!
//! When an edge connects two node bodies (rather than ports), its rendered
//! path should start and end on the visible shape boundaries instead of the
//! node centers. This module computes where the straight line between two
//! centers exits a shape.
//!
//! Circle and rectangle have exact intersections. Ellipse and polygon fall
//! back to the shape center: a known approximation carried over from the
//! behavior this engine models, not an accident. Port-addressed edges never
//! go through this code, so precise ellipse/polygon attachment is still
//! available via angle anchors.

use super::{Point, Shape, Vector};

/// Point where the ray from the shape's center toward `toward` crosses the
/// shape's boundary. Degenerate directions (zero-length, `toward` at the
/// center) and unsupported shape kinds return the center.
pub fn boundary_intersection(shape: &Shape, toward: Point) -> Point {
    let center = shape.center();
    let Some(direction) = Vector::between(center, toward).normalized() else {
        return center;
    };
    match shape {
        Shape::Circle { cx, cy, r } => Point::new(
            cx + direction.x * r.max(0.0),
            cy + direction.y * r.max(0.0),
        ),
        Shape::Rect { .. } => rect_exit(shape, center, direction),
        // Center fallback, see module docs.
        Shape::Ellipse { .. } | Shape::Polygon { .. } => center,
    }
}

/// Exit point on a rectangle: test only the two sides the direction points
/// toward and keep the nearer candidate whose perpendicular coordinate stays
/// within the opposite side's span.
fn rect_exit(shape: &Shape, center: Point, direction: Vector) -> Point {
    let bb = shape.bounding_box();
    let hw = bb.width / 2.0;
    let hh = bb.height / 2.0;

    let mut best: Option<(f64, Point)> = None;
    let mut consider = |t: f64, candidate: Point| {
        if t <= 0.0 {
            return;
        }
        match best {
            Some((bt, _)) if bt <= t => {}
            _ => best = Some((t, candidate)),
        }
    };

    if direction.x.abs() > 1e-12 {
        // Right side when moving right, left side when moving left
        let sx = if direction.x > 0.0 { hw } else { -hw };
        let t = sx / direction.x;
        let y = center.y + t * direction.y;
        if (y - center.y).abs() <= hh + 1e-9 {
            consider(t, Point::new(center.x + sx, y));
        }
    }
    if direction.y.abs() > 1e-12 {
        let sy = if direction.y > 0.0 { hh } else { -hh };
        let t = sy / direction.y;
        let x = center.x + t * direction.x;
        if (x - center.x).abs() <= hw + 1e-9 {
            consider(t, Point::new(x, center.y + sy));
        }
    }

    match best {
        Some((_, point)) => point,
        None => center,
    }
}
