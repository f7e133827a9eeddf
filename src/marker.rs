//! End markers for edges
//!
//! A marker is a small decoration placed at a path anchor, typically on an
//! edge's first or last point. Directional markers (arrowheads) are rotated
//! so their local forward axis follows the path tangent; dots only take the
//! position. Marker geometry is rebuilt from its template on every update,
//! never adjusted incrementally.

use serde::{Deserialize, Serialize};

use crate::geometry::{PathAnchor, Point};

/// Visual kind of a marker
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MarkerShape {
    /// Triangular arrowhead: apex forward, base trailing. `spread` scales
    /// the half-width of the base relative to `size`.
    Arrow { size: f64, spread: f64 },
    /// Non-directional dot
    Dot { radius: f64 },
}

impl MarkerShape {
    pub fn arrow(size: f64) -> Self {
        MarkerShape::Arrow { size, spread: 0.5 }
    }

    pub fn dot(radius: f64) -> Self {
        MarkerShape::Dot { radius }
    }
}

/// World-space geometry of a placed marker
#[derive(Debug, Clone, PartialEq)]
pub enum MarkerOutline {
    /// Arrowhead triangle, apex first
    Triangle([Point; 3]),
    Circle { center: Point, radius: f64 },
}

/// A marker resolved against a path anchor
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerPlacement {
    pub position: Point,
    /// Rotation applied to directional templates, in degrees (0 = +x,
    /// clockwise positive in screen space)
    pub angle: f64,
    pub outline: MarkerOutline,
}

/// Place a marker at a path anchor. `None` anchor (degenerate edge) yields
/// no placement.
pub fn place_marker(shape: MarkerShape, anchor: Option<&PathAnchor>) -> Option<MarkerPlacement> {
    let anchor = anchor?;
    let radians = anchor.tangent.y.atan2(anchor.tangent.x);
    let outline = match shape {
        MarkerShape::Dot { radius } => MarkerOutline::Circle {
            center: anchor.point,
            radius,
        },
        MarkerShape::Arrow { size, spread } => {
            let half_base = size * spread;
            let template = [
                Point::new(0.0, 0.0),
                Point::new(-size, half_base),
                Point::new(-size, -half_base),
            ];
            let (sin, cos) = radians.sin_cos();
            let rotated = template.map(|p| {
                Point::new(
                    anchor.point.x + p.x * cos - p.y * sin,
                    anchor.point.y + p.x * sin + p.y * cos,
                )
            });
            MarkerOutline::Triangle(rotated)
        }
    };
    Some(MarkerPlacement {
        position: anchor.point,
        angle: radians.to_degrees(),
        outline,
    })
}
