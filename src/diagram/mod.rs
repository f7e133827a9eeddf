//! Diagram model: nodes, ports, edges and the refresh machinery
//!
//! The diagram owns every element and the per-diagram move channel. All
//! geometry components receive what they need explicitly — an edge never
//! discovers its diagram by walking an ownership chain; the diagram drives
//! edge refresh itself with direct access to both.

pub mod edge;
pub mod error;
pub mod port;

pub use edge::{Edge, EdgeEnd, EdgeId, EdgeLabel, Endpoint, EndpointKind, EndpointRef};
pub use error::DiagramError;
pub use port::{ConnectionPoint, PortId};

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::DiagramConfig;
use crate::geometry::{anchor_on_path, boundary_intersection, PathPosition, PathSnap, Point, Shape};
use crate::marker::place_marker;
use crate::routing::route;
use crate::sync::MoveChannel;

/// Identifier of a node within a diagram
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A node: a shape placed by its center, with optional connection points
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    position: Point,
    /// Boundary shape in the node's local frame, centered at the origin
    shape: Shape,
    ports: Vec<ConnectionPoint>,
}

impl Node {
    /// Create a node from a shape. The shape's own coordinates only define
    /// its proportions; it is recentered on the node's local origin and
    /// placed in the diagram by the node position.
    pub fn new(id: impl Into<String>, shape: Shape) -> Self {
        Self {
            id: NodeId::new(id),
            position: Point::default(),
            shape: shape.centered_at(Point::default()),
            ports: Vec::new(),
        }
    }

    /// Place the node center at the given diagram coordinates
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Point::new(x, y);
        self
    }

    /// Attach a connection point, resolving its position immediately
    pub fn with_port(mut self, mut port: ConnectionPoint) -> Self {
        port.update_position(&self.shape);
        self.ports.push(port);
        self
    }

    pub fn position(&self) -> Point {
        self.position
    }

    /// Shape in the node's local frame
    pub fn local_shape(&self) -> &Shape {
        &self.shape
    }

    /// Shape in diagram coordinates
    pub fn world_shape(&self) -> Shape {
        self.shape.centered_at(self.position)
    }

    pub fn port(&self, id: &PortId) -> Option<&ConnectionPoint> {
        self.ports.iter().find(|p| &p.id == id)
    }

    pub fn ports(&self) -> &[ConnectionPoint] {
        &self.ports
    }
}

/// Transient position holder standing in for a real endpoint while the
/// connect gesture drags a temporary edge. Lives in the diagram only for the
/// duration of a gesture; the gesture machine creates and discards it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VirtualEndpoint {
    position: Point,
}

impl VirtualEndpoint {
    pub fn new(position: Point) -> Self {
        Self { position }
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn set_position(&mut self, position: Point) {
        self.position = position;
    }
}

/// A diagram: element registry plus the move channel
#[derive(Debug, Default)]
pub struct Diagram {
    config: DiagramConfig,
    nodes: HashMap<NodeId, Node>,
    node_order: Vec<NodeId>,
    edges: HashMap<EdgeId, Edge>,
    edge_order: Vec<EdgeId>,
    channel: MoveChannel,
    virtual_endpoint: Option<VirtualEndpoint>,
    next_generated_edge: u64,
}

impl Diagram {
    pub fn new(config: DiagramConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &DiagramConfig {
        &self.config
    }

    // ----- nodes -----

    pub fn add_node(&mut self, node: Node) -> Result<(), DiagramError> {
        if self.nodes.contains_key(&node.id) {
            return Err(DiagramError::DuplicateNode {
                id: node.id.0.clone(),
            });
        }
        self.node_order.push(node.id.clone());
        self.nodes.insert(node.id.clone(), node);
        Ok(())
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.node_order.iter().filter_map(|id| self.nodes.get(id))
    }

    /// Attach a connection point to an existing node
    pub fn add_port(&mut self, node: &NodeId, mut port: ConnectionPoint) -> Result<(), DiagramError> {
        let node = self
            .nodes
            .get_mut(node)
            .ok_or_else(|| DiagramError::unknown_node(node.as_str()))?;
        port.update_position(&node.shape);
        node.ports.push(port);
        Ok(())
    }

    /// Replace a node's shape (resize). Ports re-resolve their positions and
    /// every edge touching the node recomputes.
    pub fn resize_node(&mut self, id: &NodeId, shape: Shape) -> Result<(), DiagramError> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| DiagramError::unknown_node(id.as_str()))?;
        node.shape = shape.centered_at(Point::default());
        let local = node.shape.clone();
        for port in &mut node.ports {
            port.update_position(&local);
        }
        self.refresh_subscribers(id);
        Ok(())
    }

    // ----- edges -----

    /// Edge definition pre-filled with this diagram's configured defaults
    pub fn default_edge(
        &self,
        id: impl Into<String>,
        source: EndpointRef,
        target: EndpointRef,
    ) -> Edge {
        Edge::new(id, source, target)
            .with_routing(self.config.default_routing)
            .with_style(self.config.edge_style.clone())
    }

    /// Register an edge definition. The edge stays unconnected (and invisible
    /// to the move channel) until `connect_edge` or `connect_all` resolves it.
    pub fn add_edge(&mut self, edge: Edge) -> EdgeId {
        let id = edge.id().clone();
        if self.edges.contains_key(&id) {
            // Re-registering an id replaces the old definition outright
            self.channel.unsubscribe_all(&id);
        } else {
            self.edge_order.push(id.clone());
        }
        self.edges.insert(id.clone(), edge);
        id
    }

    pub fn edge(&self, id: &EdgeId) -> Option<&Edge> {
        self.edges.get(id)
    }

    /// Edges in registration order
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edge_order.iter().filter_map(|id| self.edges.get(id))
    }

    /// Connected, non-temporary edges
    pub fn permanent_edge_count(&self) -> usize {
        self.edges()
            .filter(|e| e.is_connected() && !e.is_temporary())
            .count()
    }

    /// Resolve an edge's endpoint references, subscribe it to both endpoint
    /// ids and compute its initial geometry. Fails without side effects when
    /// a referenced node or port does not exist.
    pub fn connect_edge(&mut self, id: &EdgeId) -> Result<(), DiagramError> {
        let edge = self
            .edges
            .get(id)
            .ok_or_else(|| DiagramError::unknown_edge(id.as_str()))?;
        let source = self.resolve_endpoint(id, edge.source_ref())?;
        let target = self.resolve_endpoint(id, edge.target_ref())?;

        self.channel.subscribe(&source.node, id);
        self.channel.subscribe(&target.node, id);
        let edge = self.edges.get_mut(id).expect("edge presence checked above");
        edge.connected = Some((EdgeEnd::Fixed(source), EdgeEnd::Fixed(target)));
        self.refresh_edge(id)
    }

    /// Connect every registered edge that is not connected yet. Edges whose
    /// endpoints do not resolve are skipped and reported; the rest of the
    /// load continues.
    pub fn connect_all(&mut self) -> Vec<(EdgeId, DiagramError)> {
        let pending: Vec<EdgeId> = self
            .edge_order
            .iter()
            .filter(|id| self.edges.get(id).is_some_and(|e| !e.is_connected()))
            .cloned()
            .collect();
        let mut failures = Vec::new();
        for id in pending {
            if let Err(err) = self.connect_edge(&id) {
                warn!(edge = %id, error = %err, "skipping unconnectable edge");
                failures.push((id, err));
            }
        }
        failures
    }

    /// Unsubscribe an edge from the move channel and drop its resolved
    /// endpoints and derived geometry. Safe to call on an already
    /// disconnected edge.
    pub fn disconnect_edge(&mut self, id: &EdgeId) {
        self.channel.unsubscribe_all(id);
        if let Some(edge) = self.edges.get_mut(id) {
            edge.connected = None;
            edge.path.clear();
            edge.start_placement = None;
            edge.end_placement = None;
            edge.label_anchor = None;
        }
    }

    /// Disconnect and remove an edge entirely
    pub fn remove_edge(&mut self, id: &EdgeId) -> Option<Edge> {
        self.disconnect_edge(id);
        self.edge_order.retain(|e| e != id);
        self.edges.remove(id)
    }

    /// Generate an id for an edge created by the interactive gesture
    pub(crate) fn generate_edge_id(&mut self) -> EdgeId {
        self.next_generated_edge += 1;
        EdgeId::new(format!("edge-{}", self.next_generated_edge))
    }

    /// Create the gesture's rubber-band edge: a temporary edge from a
    /// resolved source endpoint to the virtual endpoint. The edge follows
    /// its source node while the drag is in flight.
    pub(crate) fn begin_temporary_edge(
        &mut self,
        source: Endpoint,
        source_ref: EndpointRef,
        at: Point,
    ) -> EdgeId {
        self.place_virtual_endpoint(at);
        let id = self.generate_edge_id();
        let mut edge = Edge::new(id.as_str(), source_ref.clone(), source_ref)
            .with_routing(self.config.default_routing)
            .with_style(self.config.temp_edge_style.clone());
        edge.temporary = true;
        edge.connected = Some((EdgeEnd::Fixed(source.clone()), EdgeEnd::Virtual));
        let id = self.add_edge(edge);
        self.channel.subscribe(&source.node, &id);
        let _ = self.refresh_edge(&id);
        id
    }

    /// Remove the gesture's temporary edge and its virtual endpoint
    pub(crate) fn end_temporary_edge(&mut self, id: &EdgeId) {
        self.remove_edge(id);
        self.clear_virtual_endpoint();
    }

    fn resolve_endpoint(
        &self,
        edge: &EdgeId,
        reference: &EndpointRef,
    ) -> Result<Endpoint, DiagramError> {
        let node = self
            .nodes
            .get(reference.node_id())
            .ok_or_else(|| DiagramError::unresolved(edge.as_str(), reference.to_string()))?;
        match reference {
            EndpointRef::Node(_) => Ok(Endpoint {
                node: node.id.clone(),
                port: None,
            }),
            EndpointRef::Port { port, .. } => {
                if node.port(port).is_none() {
                    return Err(DiagramError::unresolved(
                        edge.as_str(),
                        reference.to_string(),
                    ));
                }
                Ok(Endpoint {
                    node: node.id.clone(),
                    port: Some(port.clone()),
                })
            }
        }
    }

    // ----- movement & refresh -----

    /// The integration point for anything that relocates a node: a drag
    /// plugin, programmatic placement, a layout pass. Moves the node and
    /// synchronously refreshes every subscribed edge before returning.
    /// Unknown endpoint ids are ignored.
    pub fn notify_endpoint_moved(&mut self, id: &NodeId, x: f64, y: f64) {
        let Some(node) = self.nodes.get_mut(id) else {
            debug!(endpoint = %id, "move notification for unknown endpoint ignored");
            return;
        };
        node.position = Point::new(x, y);
        self.refresh_subscribers(id);
    }

    fn refresh_subscribers(&mut self, id: &NodeId) {
        let affected = self.channel.subscribers(id);
        debug!(endpoint = %id, edges = affected.len(), "refreshing subscribed edges");
        for edge_id in affected {
            // A subscriber list entry can outlive its edge only within this
            // loop (an earlier refresh cannot remove edges), so missing ids
            // are skipped rather than treated as errors.
            let _ = self.refresh_edge(&edge_id);
        }
    }

    /// Recompute an edge's derived geometry from its endpoints' current
    /// positions: boundary intersections, then the routed path, then marker
    /// placements, then the label anchor — in that order, atomically from
    /// the caller's perspective.
    pub fn refresh_edge(&mut self, id: &EdgeId) -> Result<(), DiagramError> {
        let edge = self
            .edges
            .get(id)
            .ok_or_else(|| DiagramError::unknown_edge(id.as_str()))?;
        let Some((source, target)) = edge.connected.clone() else {
            return Ok(());
        };
        let Some(source_pos) = self.end_position(&source) else {
            return Ok(());
        };
        let Some(target_pos) = self.end_position(&target) else {
            return Ok(());
        };

        // Boundary clipping applies to node-to-node edges only; port and
        // virtual ends attach exactly where they are.
        let (start, end) = match (&source, &target) {
            (EdgeEnd::Fixed(a), EdgeEnd::Fixed(b))
                if a.kind() == EndpointKind::Node && b.kind() == EndpointKind::Node =>
            {
                let shape_a = self.nodes[&a.node].world_shape();
                let shape_b = self.nodes[&b.node].world_shape();
                (
                    boundary_intersection(&shape_a, target_pos),
                    boundary_intersection(&shape_b, source_pos),
                )
            }
            _ => (source_pos, target_pos),
        };

        let edge = self.edges.get(id).expect("edge presence checked above");
        let path = route(edge.routing, start, end, &edge.waypoints);
        let start_anchor = anchor_on_path(&path, &PathPosition::snap(PathSnap::Start));
        let end_anchor = anchor_on_path(&path, &PathPosition::snap(PathSnap::End));
        let start_placement = edge
            .start_marker
            .and_then(|m| place_marker(m, Some(&start_anchor)));
        let end_placement = edge
            .end_marker
            .and_then(|m| place_marker(m, Some(&end_anchor)));
        let label_anchor = edge
            .label
            .as_ref()
            .map(|label| anchor_on_path(&path, &label.position));

        let edge = self.edges.get_mut(id).expect("edge presence checked above");
        edge.path = path;
        edge.start_placement = start_placement;
        edge.end_placement = end_placement;
        edge.label_anchor = label_anchor;
        Ok(())
    }

    /// Externally triggerable recompute, e.g. after a bulk data load
    pub fn update_edge_positions(&mut self, id: &EdgeId) -> Result<(), DiagramError> {
        self.refresh_edge(id)
    }

    /// Current diagram-space position of one edge end
    fn end_position(&self, end: &EdgeEnd) -> Option<Point> {
        match end {
            EdgeEnd::Virtual => self.virtual_endpoint.map(|v| v.position()),
            EdgeEnd::Fixed(endpoint) => {
                let node = self.nodes.get(&endpoint.node)?;
                match &endpoint.port {
                    None => Some(node.position),
                    Some(port_id) => node
                        .port(port_id)
                        .map(|p| p.absolute_position(node.position)),
                }
            }
        }
    }

    /// Anchor position where a pick target attaches: port position for
    /// ports, shape center for node bodies
    pub fn endpoint_anchor(&self, endpoint: &Endpoint) -> Option<Point> {
        self.end_position(&EdgeEnd::Fixed(endpoint.clone()))
    }

    // ----- virtual endpoint -----

    pub(crate) fn place_virtual_endpoint(&mut self, position: Point) {
        self.virtual_endpoint = Some(VirtualEndpoint::new(position));
    }

    pub(crate) fn move_virtual_endpoint(&mut self, position: Point) {
        if let Some(v) = &mut self.virtual_endpoint {
            v.set_position(position);
        }
    }

    pub(crate) fn clear_virtual_endpoint(&mut self) {
        self.virtual_endpoint = None;
    }

    pub fn virtual_endpoint(&self) -> Option<&VirtualEndpoint> {
        self.virtual_endpoint.as_ref()
    }

    /// Read access to the move channel's subscription state
    pub fn channel(&self) -> &MoveChannel {
        &self.channel
    }
}
