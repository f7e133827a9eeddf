//! nodelink - geometry and synchronization for interactive node-link diagrams
//!
//! This library computes where edges attach to node shapes, routes them,
//! orients their end markers, and keeps all of that fresh while nodes move.
//! It draws nothing itself: derived geometry is handed to a host through the
//! [`scene::SceneWriter`] trait, and pointer input comes in through the
//! [`interact::ConnectGesture`] state machine.
//!
//! # Example
//!
//! ```rust
//! use nodelink::{
//!     config::DiagramConfig,
//!     diagram::{Diagram, EndpointRef, Node},
//!     geometry::Shape,
//! };
//!
//! let mut diagram = Diagram::new(DiagramConfig::default());
//! diagram
//!     .add_node(
//!         Node::new("a", Shape::Rect { x: 0.0, y: 0.0, width: 40.0, height: 40.0 }).at(0.0, 0.0),
//!     )
//!     .unwrap();
//! diagram
//!     .add_node(
//!         Node::new("b", Shape::Rect { x: 0.0, y: 0.0, width: 40.0, height: 40.0 }).at(100.0, 0.0),
//!     )
//!     .unwrap();
//!
//! let edge = diagram.default_edge("a-b", EndpointRef::node("a"), EndpointRef::node("b"));
//! let id = diagram.add_edge(edge);
//! diagram.connect_edge(&id).unwrap();
//!
//! // The path stays clipped to the node boundaries as nodes move.
//! diagram.notify_endpoint_moved(&nodelink::diagram::NodeId::new("b"), 200.0, 0.0);
//! assert_eq!(diagram.edge(&id).unwrap().path().first().unwrap().x, 20.0);
//! ```

pub mod config;
pub mod diagram;
pub mod geometry;
pub mod interact;
pub mod marker;
pub mod routing;
pub mod scene;
pub mod sync;

pub use config::{ConfigError, DiagramConfig, EdgeStyle};
pub use diagram::{
    ConnectionPoint, Diagram, DiagramError, Edge, EdgeId, EdgeLabel, Endpoint, EndpointRef, Node,
    NodeId, PortId,
};
pub use geometry::{
    anchor_on_path, boundary_intersection, resolve_anchor, AnchorAddress, BoundingBox, PathAnchor,
    PathPosition, Point, Shape, Side, Vector,
};
pub use interact::{ConnectGesture, GestureState};
pub use marker::{MarkerPlacement, MarkerShape};
pub use routing::RoutingMode;
pub use scene::{PickOutcome, PickTarget, PickTicket, SceneWriter, SpatialQuery};

use thiserror::Error;

/// Errors surfaced by the library's fallible entry points
#[derive(Debug, Error)]
pub enum Error {
    /// Diagram structure error: unknown ids, unresolvable endpoints
    #[error(transparent)]
    Diagram(#[from] DiagramError),

    /// Configuration file error
    #[error(transparent)]
    Config(#[from] ConfigError),
}
