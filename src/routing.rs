//! Edge routing strategies
//!
//! A router turns two endpoint coordinates (and optional waypoints) into the
//! ordered points an edge path follows. Routers are stateless apart from
//! configuration fixed at construction; explicit waypoints always take
//! precedence over strategy-specific routing.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Default grid step for Manhattan routing
pub const DEFAULT_MANHATTAN_STEP: f64 = 10.0;

/// Routing strategy for an edge
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "lowercase")]
pub enum RoutingMode {
    /// Straight line from source to target
    Direct,
    /// S-shaped path with two bends at the horizontal midpoint
    Orthogonal,
    /// Orthogonal with the bend x snapped to a grid step
    Manhattan { step: f64 },
}

impl Default for RoutingMode {
    fn default() -> Self {
        RoutingMode::Direct
    }
}

impl RoutingMode {
    pub fn manhattan() -> Self {
        RoutingMode::Manhattan {
            step: DEFAULT_MANHATTAN_STEP,
        }
    }
}

/// Produce the ordered path points for an edge. When waypoints are supplied
/// they are threaded between the endpoints unmodified, whatever the mode.
pub fn route(mode: RoutingMode, from: Point, to: Point, waypoints: &[Point]) -> Vec<Point> {
    if !waypoints.is_empty() {
        let mut path = Vec::with_capacity(waypoints.len() + 2);
        path.push(from);
        path.extend_from_slice(waypoints);
        path.push(to);
        return path;
    }
    match mode {
        RoutingMode::Direct => vec![from, to],
        RoutingMode::Orthogonal => bend_path(from, to, (from.x + to.x) / 2.0),
        RoutingMode::Manhattan { step } => {
            let mid_x = (from.x + to.x) / 2.0;
            let snapped = if step > 0.0 {
                (mid_x / step).round() * step
            } else {
                mid_x
            };
            bend_path(from, to, snapped)
        }
    }
}

fn bend_path(from: Point, to: Point, bend_x: f64) -> Vec<Point> {
    vec![
        from,
        Point::new(bend_x, from.y),
        Point::new(bend_x, to.y),
        to,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_returns_endpoints() {
        let path = route(
            RoutingMode::Direct,
            Point::new(0.0, 0.0),
            Point::new(100.0, 100.0),
            &[],
        );
        assert_eq!(path, vec![Point::new(0.0, 0.0), Point::new(100.0, 100.0)]);
    }

    #[test]
    fn test_orthogonal_s_path() {
        let path = route(
            RoutingMode::Orthogonal,
            Point::new(0.0, 0.0),
            Point::new(100.0, 100.0),
            &[],
        );
        assert_eq!(
            path,
            vec![
                Point::new(0.0, 0.0),
                Point::new(50.0, 0.0),
                Point::new(50.0, 100.0),
                Point::new(100.0, 100.0),
            ]
        );
    }

    #[test]
    fn test_manhattan_aligned_midpoint_unchanged() {
        // Midpoint 50 is already a multiple of 10
        let path = route(
            RoutingMode::manhattan(),
            Point::new(0.0, 0.0),
            Point::new(100.0, 100.0),
            &[],
        );
        assert_eq!(
            path,
            vec![
                Point::new(0.0, 0.0),
                Point::new(50.0, 0.0),
                Point::new(50.0, 100.0),
                Point::new(100.0, 100.0),
            ]
        );
    }

    #[test]
    fn test_manhattan_snaps_bend() {
        let path = route(
            RoutingMode::manhattan(),
            Point::new(0.0, 0.0),
            Point::new(93.0, 40.0),
            &[],
        );
        // Midpoint 46.5 snaps to 50
        assert_eq!(path[1], Point::new(50.0, 0.0));
        assert_eq!(path[2], Point::new(50.0, 40.0));
    }

    #[test]
    fn test_waypoints_take_precedence() {
        let waypoints = [Point::new(10.0, 90.0)];
        for mode in [
            RoutingMode::Direct,
            RoutingMode::Orthogonal,
            RoutingMode::manhattan(),
        ] {
            let path = route(mode, Point::new(0.0, 0.0), Point::new(100.0, 100.0), &waypoints);
            assert_eq!(
                path,
                vec![
                    Point::new(0.0, 0.0),
                    Point::new(10.0, 90.0),
                    Point::new(100.0, 100.0),
                ]
            );
        }
    }
}
