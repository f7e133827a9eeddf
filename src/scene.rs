//! Interfaces to the external scene-graph collaborator
//!
//! The rendering engine owns the visual tree; this crate only computes
//! geometry and writes it into rendering primitives addressed by stable
//! keys. Hit-testing is likewise external: the engine answers a spatial
//! query around a point, synchronously or with a deferred ticket, and this
//! crate reduces the candidates to a single preferred pick target.

use std::cell::RefCell;
use std::rc::Rc;

use crate::diagram::{Diagram, Edge, EdgeId, Endpoint, EndpointRef, NodeId, PortId};
use crate::geometry::Point;
use crate::marker::MarkerOutline;

/// Stable key addressing one rendering primitive owned by this crate
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PrimitiveKey(pub String);

impl PrimitiveKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    fn for_edge(edge: &EdgeId, part: &str) -> Self {
        Self(format!("{edge}/{part}"))
    }
}

/// Write access to the scene graph's primitives. Implementations create the
/// primitive on first upsert and update it in place afterwards; geometry is
/// the only thing this crate ever writes.
pub trait SceneWriter {
    fn upsert_polyline(&mut self, key: &PrimitiveKey, points: &[Point]);
    fn upsert_polygon(&mut self, key: &PrimitiveKey, points: &[Point]);
    fn upsert_circle(&mut self, key: &PrimitiveKey, center: Point, radius: f64);
    fn upsert_text(&mut self, key: &PrimitiveKey, position: Point, text: &str);
    fn remove(&mut self, key: &PrimitiveKey);
}

/// Write an edge's current derived geometry into the scene. Parts without
/// geometry (no marker configured, degenerate path) are removed so stale
/// visuals never outlive an edit.
pub fn write_edge(edge: &Edge, writer: &mut dyn SceneWriter) {
    let path_key = PrimitiveKey::for_edge(edge.id(), "path");
    if edge.path().len() >= 2 {
        writer.upsert_polyline(&path_key, edge.path());
    } else {
        writer.remove(&path_key);
    }

    for (part, placement) in [
        ("marker-start", edge.start_placement()),
        ("marker-end", edge.end_placement()),
    ] {
        let key = PrimitiveKey::for_edge(edge.id(), part);
        match placement.map(|p| &p.outline) {
            Some(MarkerOutline::Triangle(points)) => writer.upsert_polygon(&key, points),
            Some(MarkerOutline::Circle { center, radius }) => {
                writer.upsert_circle(&key, *center, *radius)
            }
            None => writer.remove(&key),
        }
    }

    let label_key = PrimitiveKey::for_edge(edge.id(), "label");
    match (edge.label.as_ref(), edge.label_anchor()) {
        (Some(label), Some(anchor)) => {
            writer.upsert_text(&label_key, anchor.point, &label.text)
        }
        _ => writer.remove(&label_key),
    }
}

/// Remove every primitive an edge may have written
pub fn clear_edge(id: &EdgeId, writer: &mut dyn SceneWriter) {
    for part in ["path", "marker-start", "marker-end", "label"] {
        writer.remove(&PrimitiveKey::for_edge(id, part));
    }
}

/// Write every connected edge of a diagram
pub fn write_diagram(diagram: &Diagram, writer: &mut dyn SceneWriter) {
    for edge in diagram.edges().filter(|e| e.is_connected()) {
        write_edge(edge, writer);
    }
}

/// A pickable element. Edges and decorative primitives are never pick
/// targets, which the type makes unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickTarget {
    Node(NodeId),
    Port { node: NodeId, port: PortId },
}

impl PickTarget {
    /// Resolved endpoint this target stands for
    pub fn endpoint(&self) -> Endpoint {
        match self {
            PickTarget::Node(id) => Endpoint {
                node: id.clone(),
                port: None,
            },
            PickTarget::Port { node, port } => Endpoint {
                node: node.clone(),
                port: Some(port.clone()),
            },
        }
    }

    /// Endpoint reference for defining an edge to this target
    pub fn endpoint_ref(&self) -> EndpointRef {
        match self {
            PickTarget::Node(id) => EndpointRef::Node(id.clone()),
            PickTarget::Port { node, port } => EndpointRef::Port {
                node: node.clone(),
                port: port.clone(),
            },
        }
    }

    fn preference_rank(&self) -> u8 {
        match self {
            PickTarget::Port { .. } => 0,
            PickTarget::Node(_) => 1,
        }
    }
}

/// Reduce pick candidates (target plus distance to the pointer) to the
/// preferred one: connection points before node bodies, nearer before
/// farther.
pub fn prefer_candidate(
    candidates: impl IntoIterator<Item = (PickTarget, f64)>,
) -> Option<PickTarget> {
    candidates
        .into_iter()
        .min_by(|(a, da), (b, db)| {
            a.preference_rank()
                .cmp(&b.preference_rank())
                .then(da.partial_cmp(db).unwrap_or(std::cmp::Ordering::Equal))
        })
        .map(|(target, _)| target)
}

/// Deferred pick resolution. The hit-test implementation hands one of these
/// out, completes it exactly once, and the gesture machine drains it on its
/// next poll. A ticket the machine no longer holds (the gesture was
/// cancelled or superseded) completes into the void.
#[derive(Debug, Clone, Default)]
pub struct PickTicket {
    cell: Rc<RefCell<Option<Option<PickTarget>>>>,
}

impl PickTicket {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver the pick result. Completing twice keeps the first value.
    pub fn complete(&self, target: Option<PickTarget>) {
        let mut cell = self.cell.borrow_mut();
        if cell.is_none() {
            *cell = Some(target);
        }
    }

    /// Take the delivered result, if any
    pub fn take(&self) -> Option<Option<PickTarget>> {
        self.cell.borrow_mut().take()
    }

    pub fn is_complete(&self) -> bool {
        self.cell.borrow().is_some()
    }
}

/// Result of a spatial pick query: immediate, or pending on a ticket
#[derive(Debug, Clone)]
pub enum PickOutcome {
    Resolved(Option<PickTarget>),
    Pending(PickTicket),
}

/// The external hit-test contract: candidate elements within a small
/// rectangle around a point. Implementations may answer immediately or
/// return a pending ticket they complete later.
pub trait SpatialQuery {
    fn pick(&self, diagram: &Diagram, around: Point, radius: f64) -> PickOutcome;
}
