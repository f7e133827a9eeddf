//! Parametric anchors along a multi-segment edge path
//!
//! An edge path is an ordered polyline. Markers and labels address a point
//! on it by normalized position, named snap or explicit segment, with an
//! optional tangential/normal offset. Every query recomputes from the
//! current path points; anchors are never cached across an edit.

use serde::{Deserialize, Serialize};

use super::{Point, Vector};

/// Named snap position on a path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathSnap {
    Start,
    Middle,
    End,
}

impl PathSnap {
    fn ratio(&self) -> f64 {
        match self {
            PathSnap::Start => 0.0,
            PathSnap::Middle => 0.5,
            PathSnap::End => 1.0,
        }
    }
}

/// Base selector for a path position. Exactly one selector applies; a forced
/// segment carries its own inner ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathBase {
    /// Normalized position over the total arclength, clamped to [0, 1]
    Ratio(f64),
    Snap(PathSnap),
    /// Forced segment (index clamped to the valid range) with a normalized
    /// position inside that segment
    Segment { index: usize, t: f64 },
}

/// Displacement applied to the base point along the local tangent and normal
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PathOffset {
    pub along: f64,
    pub normal: f64,
}

/// Full path-position address for a marker or label
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathPosition {
    pub base: PathBase,
    pub offset: Option<PathOffset>,
}

impl Default for PathPosition {
    /// Path midpoint, matching the default of `t = 0.5`
    fn default() -> Self {
        Self {
            base: PathBase::Ratio(0.5),
            offset: None,
        }
    }
}

impl PathPosition {
    pub fn ratio(t: f64) -> Self {
        Self {
            base: PathBase::Ratio(t),
            offset: None,
        }
    }

    pub fn snap(snap: PathSnap) -> Self {
        Self {
            base: PathBase::Snap(snap),
            offset: None,
        }
    }

    pub fn segment(index: usize, t: f64) -> Self {
        Self {
            base: PathBase::Segment { index, t },
            offset: None,
        }
    }

    pub fn with_offset(mut self, along: f64, normal: f64) -> Self {
        self.offset = Some(PathOffset { along, normal });
        self
    }
}

/// A resolved point on a path with its local frame. Tangent and normal are
/// unit length and mutually perpendicular (normal = tangent rotated 90
/// degrees, `(-ty, tx)`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathAnchor {
    pub point: Point,
    pub tangent: Vector,
    pub normal: Vector,
}

/// Fallback tangent for zero-length paths and segments
const FALLBACK_TANGENT: Vector = Vector { x: 1.0, y: 0.0 };

/// Resolve a path position to a concrete anchor. A degenerate path (fewer
/// than two points, or zero total length) resolves to the first point (or
/// the origin when empty) with the fallback tangent.
pub fn anchor_on_path(path: &[Point], position: &PathPosition) -> PathAnchor {
    let base = match position.base {
        PathBase::Segment { index, t } => segment_anchor(path, index, t),
        PathBase::Ratio(t) => arclength_anchor(path, t.clamp(0.0, 1.0)),
        PathBase::Snap(snap) => arclength_anchor(path, snap.ratio()),
    };
    match position.offset {
        None => base,
        Some(offset) => PathAnchor {
            point: base
                .point
                .offset(base.tangent.scaled(offset.along))
                .offset(base.normal.scaled(offset.normal)),
            ..base
        },
    }
}

fn anchor_at(point: Point, direction: Option<Vector>) -> PathAnchor {
    let tangent = direction.unwrap_or(FALLBACK_TANGENT);
    PathAnchor {
        point,
        tangent,
        normal: tangent.perpendicular(),
    }
}

fn arclength_anchor(path: &[Point], t: f64) -> PathAnchor {
    let Some(&first) = path.first() else {
        return anchor_at(Point::default(), None);
    };
    if path.len() < 2 {
        return anchor_at(first, None);
    }

    let lengths: Vec<f64> = path.windows(2).map(|w| w[0].distance_to(w[1])).collect();
    let total: f64 = lengths.iter().sum();
    if total <= 1e-12 {
        return anchor_at(first, None);
    }

    let target = t * total;
    let mut walked = 0.0;
    for (i, len) in lengths.iter().enumerate() {
        // Last segment absorbs the end point so t = 1 resolves on it
        if walked + len >= target || i == lengths.len() - 1 {
            return interpolate_on_segment(path[i], path[i + 1], target - walked, *len);
        }
        walked += len;
    }
    // Unreachable: the loop always returns on the last segment
    anchor_at(first, None)
}

fn segment_anchor(path: &[Point], index: usize, t: f64) -> PathAnchor {
    let Some(&first) = path.first() else {
        return anchor_at(Point::default(), None);
    };
    if path.len() < 2 {
        return anchor_at(first, None);
    }
    let index = index.min(path.len() - 2);
    let a = path[index];
    let b = path[index + 1];
    let len = a.distance_to(b);
    interpolate_on_segment(a, b, t.clamp(0.0, 1.0) * len, len)
}

fn interpolate_on_segment(a: Point, b: Point, distance: f64, length: f64) -> PathAnchor {
    let direction = Vector::between(a, b).normalized();
    let point = if length <= 1e-12 {
        a
    } else {
        let frac = (distance / length).clamp(0.0, 1.0);
        Point::new(a.x + (b.x - a.x) * frac, a.y + (b.y - a.y) * frac)
    };
    anchor_at(point, direction)
}
