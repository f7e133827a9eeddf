//! Shape descriptors for node and port boundaries
//!
//! A shape is a plain value owned by the node or port that renders it; the
//! geometry functions read it and never mutate it. The set of kinds is
//! closed: every geometry function matches on it exhaustively and degrades
//! to a bounding-box approximation for kinds it has no exact math for.

use serde::{Deserialize, Serialize};

use super::{BoundingBox, Point};

/// Boundary shape of a node or connection point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Shape {
    /// Axis-aligned rectangle with top-left origin
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    Circle {
        cx: f64,
        cy: f64,
        r: f64,
    },
    Ellipse {
        cx: f64,
        cy: f64,
        rx: f64,
        ry: f64,
    },
    /// Closed polygon (or open polyline) given as an ordered point list
    Polygon {
        points: Vec<Point>,
    },
}

impl Shape {
    /// Axis-aligned bounding box of this shape
    pub fn bounding_box(&self) -> BoundingBox {
        match self {
            Shape::Rect {
                x,
                y,
                width,
                height,
            } => BoundingBox::new(*x, *y, *width, *height),
            Shape::Circle { cx, cy, r } => {
                BoundingBox::new(cx - r, cy - r, r * 2.0, r * 2.0)
            }
            Shape::Ellipse { cx, cy, rx, ry } => {
                BoundingBox::new(cx - rx, cy - ry, rx * 2.0, ry * 2.0)
            }
            Shape::Polygon { points } => BoundingBox::around_points(points),
        }
    }

    /// Center of this shape (polygon: bounding-box center)
    pub fn center(&self) -> Point {
        match self {
            Shape::Circle { cx, cy, .. } | Shape::Ellipse { cx, cy, .. } => {
                Point::new(*cx, *cy)
            }
            Shape::Rect { .. } | Shape::Polygon { .. } => self.bounding_box().center(),
        }
    }

    /// Translate the shape so its center lands on `center`
    pub fn centered_at(&self, center: Point) -> Shape {
        let current = self.center();
        let dx = center.x - current.x;
        let dy = center.y - current.y;
        self.translated(dx, dy)
    }

    /// Copy of this shape displaced by (dx, dy)
    pub fn translated(&self, dx: f64, dy: f64) -> Shape {
        match self {
            Shape::Rect {
                x,
                y,
                width,
                height,
            } => Shape::Rect {
                x: x + dx,
                y: y + dy,
                width: *width,
                height: *height,
            },
            Shape::Circle { cx, cy, r } => Shape::Circle {
                cx: cx + dx,
                cy: cy + dy,
                r: *r,
            },
            Shape::Ellipse { cx, cy, rx, ry } => Shape::Ellipse {
                cx: cx + dx,
                cy: cy + dy,
                rx: *rx,
                ry: *ry,
            },
            Shape::Polygon { points } => Shape::Polygon {
                points: points
                    .iter()
                    .map(|p| Point::new(p.x + dx, p.y + dy))
                    .collect(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_center() {
        let shape = Shape::Rect {
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 50.0,
        };
        assert_eq!(shape.center(), Point::new(50.0, 25.0));
    }

    #[test]
    fn test_circle_bounding_box() {
        let shape = Shape::Circle {
            cx: 10.0,
            cy: 20.0,
            r: 5.0,
        };
        let bb = shape.bounding_box();
        assert_eq!(bb.x, 5.0);
        assert_eq!(bb.y, 15.0);
        assert_eq!(bb.width, 10.0);
        assert_eq!(bb.height, 10.0);
    }

    #[test]
    fn test_polygon_center_is_bbox_center() {
        let shape = Shape::Polygon {
            points: vec![
                Point::new(0.0, 0.0),
                Point::new(40.0, 0.0),
                Point::new(20.0, 20.0),
            ],
        };
        assert_eq!(shape.center(), Point::new(20.0, 10.0));
    }

    #[test]
    fn test_centered_at_moves_all_points() {
        let shape = Shape::Polygon {
            points: vec![Point::new(0.0, 0.0), Point::new(10.0, 10.0)],
        };
        let moved = shape.centered_at(Point::new(100.0, 100.0));
        assert_eq!(moved.center(), Point::new(100.0, 100.0));
    }
}
