//! Edges and endpoint references
//!
//! An edge is defined by two endpoint references (node, or node + port).
//! References are resolved once at connect time into endpoints carrying an
//! explicit kind; from then on the edge holds resolved endpoints, not raw
//! identifiers. All rendered geometry on an edge (path points, marker
//! placements, label anchor) is derived state, rebuilt by the diagram's
//! refresh and never independently mutable.

use serde::{Deserialize, Serialize};

use crate::config::EdgeStyle;
use crate::geometry::{PathAnchor, PathPosition, Point};
use crate::marker::{MarkerPlacement, MarkerShape};
use crate::routing::RoutingMode;

use super::port::PortId;
use super::NodeId;

/// Identifier of an edge within a diagram
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeId(pub String);

impl EdgeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EdgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unresolved endpoint reference, as supplied when the edge is defined
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EndpointRef {
    Node(NodeId),
    Port { node: NodeId, port: PortId },
}

impl EndpointRef {
    pub fn node(id: impl Into<String>) -> Self {
        EndpointRef::Node(NodeId::new(id))
    }

    pub fn port(node: impl Into<String>, port: impl Into<String>) -> Self {
        EndpointRef::Port {
            node: NodeId::new(node),
            port: PortId::new(port),
        }
    }

    pub fn node_id(&self) -> &NodeId {
        match self {
            EndpointRef::Node(id) => id,
            EndpointRef::Port { node, .. } => node,
        }
    }
}

impl std::fmt::Display for EndpointRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EndpointRef::Node(id) => f.write_str(id.as_str()),
            EndpointRef::Port { node, port } => write!(f, "{node}#{port}"),
        }
    }
}

/// What kind of element an endpoint resolved to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointKind {
    Node,
    Port,
}

/// An endpoint resolved at connect time. The ids are validated against the
/// diagram when the edge connects, so lookups through them cannot miss while
/// the endpoint stays connected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub node: NodeId,
    pub port: Option<PortId>,
}

impl Endpoint {
    pub fn kind(&self) -> EndpointKind {
        if self.port.is_some() {
            EndpointKind::Port
        } else {
            EndpointKind::Node
        }
    }
}

/// One end of a connected edge: a resolved endpoint, or the gesture's
/// pointer-following virtual endpoint. At most one end of one edge may be
/// virtual at a time, and only while a connect gesture is in progress.
#[derive(Debug, Clone, PartialEq)]
pub enum EdgeEnd {
    Fixed(Endpoint),
    Virtual,
}

/// Label attached to an edge at a parametric path position
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeLabel {
    pub text: String,
    pub position: PathPosition,
}

impl EdgeLabel {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            position: PathPosition::default(),
        }
    }

    pub fn at(text: impl Into<String>, position: PathPosition) -> Self {
        Self {
            text: text.into(),
            position,
        }
    }
}

/// An edge between two endpoints
#[derive(Debug, Clone)]
pub struct Edge {
    id: EdgeId,
    source_ref: EndpointRef,
    target_ref: EndpointRef,
    /// Resolved ends, present only while connected
    pub(super) connected: Option<(EdgeEnd, EdgeEnd)>,
    pub routing: RoutingMode,
    pub waypoints: Vec<Point>,
    pub start_marker: Option<MarkerShape>,
    pub end_marker: Option<MarkerShape>,
    pub label: Option<EdgeLabel>,
    pub style: EdgeStyle,
    /// True for the gesture's temporary rubber-band edge
    pub(super) temporary: bool,

    // Derived geometry, rebuilt by Diagram::refresh_edge
    pub(super) path: Vec<Point>,
    pub(super) start_placement: Option<MarkerPlacement>,
    pub(super) end_placement: Option<MarkerPlacement>,
    pub(super) label_anchor: Option<PathAnchor>,
}

impl Edge {
    pub fn new(id: impl Into<String>, source: EndpointRef, target: EndpointRef) -> Self {
        Self {
            id: EdgeId::new(id),
            source_ref: source,
            target_ref: target,
            connected: None,
            routing: RoutingMode::Direct,
            waypoints: Vec::new(),
            start_marker: None,
            end_marker: None,
            label: None,
            style: EdgeStyle::default(),
            temporary: false,
            path: Vec::new(),
            start_placement: None,
            end_placement: None,
            label_anchor: None,
        }
    }

    pub fn with_routing(mut self, routing: RoutingMode) -> Self {
        self.routing = routing;
        self
    }

    pub fn with_waypoints(mut self, waypoints: Vec<Point>) -> Self {
        self.waypoints = waypoints;
        self
    }

    pub fn with_end_marker(mut self, marker: MarkerShape) -> Self {
        self.end_marker = Some(marker);
        self
    }

    pub fn with_start_marker(mut self, marker: MarkerShape) -> Self {
        self.start_marker = Some(marker);
        self
    }

    pub fn with_label(mut self, label: EdgeLabel) -> Self {
        self.label = Some(label);
        self
    }

    pub fn with_style(mut self, style: EdgeStyle) -> Self {
        self.style = style;
        self
    }

    pub fn id(&self) -> &EdgeId {
        &self.id
    }

    /// Node id on the source side of the definition
    pub fn source_id(&self) -> &NodeId {
        self.source_ref.node_id()
    }

    /// Node id on the target side of the definition
    pub fn target_id(&self) -> &NodeId {
        self.target_ref.node_id()
    }

    pub fn source_ref(&self) -> &EndpointRef {
        &self.source_ref
    }

    pub fn target_ref(&self) -> &EndpointRef {
        &self.target_ref
    }

    pub fn is_connected(&self) -> bool {
        self.connected.is_some()
    }

    pub fn is_temporary(&self) -> bool {
        self.temporary
    }

    /// Current rendered path points; empty until the first refresh
    pub fn path(&self) -> &[Point] {
        &self.path
    }

    pub fn start_placement(&self) -> Option<&MarkerPlacement> {
        self.start_placement.as_ref()
    }

    pub fn end_placement(&self) -> Option<&MarkerPlacement> {
        self.end_placement.as_ref()
    }

    /// Resolved label anchor; `None` when the edge has no label or has not
    /// been refreshed yet
    pub fn label_anchor(&self) -> Option<&PathAnchor> {
        self.label_anchor.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_ref_node_id() {
        let node = EndpointRef::node("a");
        assert_eq!(node.node_id().as_str(), "a");
        let port = EndpointRef::port("a", "out");
        assert_eq!(port.node_id().as_str(), "a");
        assert_eq!(port.to_string(), "a#out");
    }

    #[test]
    fn test_endpoint_kind_discriminant() {
        let plain = Endpoint {
            node: NodeId::new("a"),
            port: None,
        };
        assert_eq!(plain.kind(), EndpointKind::Node);
        let ported = Endpoint {
            node: NodeId::new("a"),
            port: Some(PortId::new("out")),
        };
        assert_eq!(ported.kind(), EndpointKind::Port);
    }

    #[test]
    fn test_new_edge_is_unconnected() {
        let edge = Edge::new("e1", EndpointRef::node("a"), EndpointRef::node("b"));
        assert!(!edge.is_connected());
        assert!(edge.path().is_empty());
        assert_eq!(edge.source_id().as_str(), "a");
        assert_eq!(edge.target_id().as_str(), "b");
    }
}
