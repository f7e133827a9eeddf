//! End-to-end checks for edge connection and position synchronization

use pretty_assertions::assert_eq;

use nodelink::config::DiagramConfig;
use nodelink::diagram::{
    ConnectionPoint, Diagram, EdgeLabel, EndpointRef, Node, NodeId, PortId,
};
use nodelink::geometry::{AnchorAddress, PathPosition, Point, Shape, Side};
use nodelink::marker::MarkerShape;
use nodelink::routing::RoutingMode;

fn square(size: f64) -> Shape {
    Shape::Rect {
        x: 0.0,
        y: 0.0,
        width: size,
        height: size,
    }
}

fn two_node_diagram() -> Diagram {
    let mut d = Diagram::new(DiagramConfig::default());
    d.add_node(Node::new("a", square(40.0)).at(0.0, 0.0)).unwrap();
    d.add_node(Node::new("b", square(40.0)).at(200.0, 0.0)).unwrap();
    d
}

#[test]
fn test_node_edge_clips_to_both_boundaries() {
    let mut d = two_node_diagram();
    let edge = d.default_edge("a-b", EndpointRef::node("a"), EndpointRef::node("b"));
    let id = d.add_edge(edge);
    d.connect_edge(&id).unwrap();

    let path = d.edge(&id).unwrap().path();
    // Centers at (0,0) and (200,0); 40x40 squares clip at x = 20 and 180
    assert_eq!(path, &[Point::new(20.0, 0.0), Point::new(180.0, 0.0)]);
}

#[test]
fn test_moving_a_node_refreshes_its_edges() {
    let mut d = two_node_diagram();
    let edge = d.default_edge("a-b", EndpointRef::node("a"), EndpointRef::node("b"));
    let id = d.add_edge(edge);
    d.connect_edge(&id).unwrap();

    d.notify_endpoint_moved(&NodeId::new("b"), 0.0, 200.0);

    let path = d.edge(&id).unwrap().path();
    assert_eq!(path, &[Point::new(0.0, 20.0), Point::new(0.0, 180.0)]);
}

#[test]
fn test_port_edges_attach_exactly_at_the_port() {
    let mut d = two_node_diagram();
    d.add_port(
        &NodeId::new("a"),
        ConnectionPoint::new("out", AnchorAddress::Preset { side: Side::Right }),
    )
    .unwrap();

    let edge = d.default_edge("a-b", EndpointRef::port("a", "out"), EndpointRef::node("b"));
    let id = d.add_edge(edge);
    d.connect_edge(&id).unwrap();

    let path = d.edge(&id).unwrap().path();
    // Port end is not clipped: it starts exactly on the right-side port
    assert_eq!(path[0], Point::new(20.0, 0.0));
    // The node-body end is not clipped either when the other end is a port
    assert_eq!(path[1], Point::new(200.0, 0.0));
}

#[test]
fn test_port_tracks_both_moves_and_resizes() {
    let mut d = two_node_diagram();
    let a = NodeId::new("a");
    d.add_port(
        &a,
        ConnectionPoint::new("out", AnchorAddress::Preset { side: Side::Right }),
    )
    .unwrap();

    let port_pos = |d: &Diagram| {
        let node = d.node(&a).unwrap();
        node.port(&PortId::new("out"))
            .unwrap()
            .absolute_position(node.position())
    };
    assert_eq!(port_pos(&d), Point::new(20.0, 0.0));

    d.notify_endpoint_moved(&a, 100.0, 50.0);
    assert_eq!(port_pos(&d), Point::new(120.0, 50.0));

    d.resize_node(&a, square(80.0)).unwrap();
    assert_eq!(port_pos(&d), Point::new(140.0, 50.0));
}

#[test]
fn test_resize_refreshes_touching_edges() {
    let mut d = two_node_diagram();
    let edge = d.default_edge("a-b", EndpointRef::node("a"), EndpointRef::node("b"));
    let id = d.add_edge(edge);
    d.connect_edge(&id).unwrap();

    d.resize_node(&NodeId::new("a"), square(100.0)).unwrap();

    let path = d.edge(&id).unwrap().path();
    assert_eq!(path[0], Point::new(50.0, 0.0));
}

#[test]
fn test_markers_and_label_stay_fresh_after_a_move() {
    let mut d = two_node_diagram();
    let edge = d
        .default_edge("a-b", EndpointRef::node("a"), EndpointRef::node("b"))
        .with_end_marker(MarkerShape::arrow(10.0))
        .with_label(EdgeLabel::at("flow", PathPosition::ratio(0.5)));
    let id = d.add_edge(edge);
    d.connect_edge(&id).unwrap();

    let edge = d.edge(&id).unwrap();
    assert_eq!(edge.end_placement().unwrap().position, Point::new(180.0, 0.0));
    assert_eq!(edge.label_anchor().unwrap().point, Point::new(100.0, 0.0));

    d.notify_endpoint_moved(&NodeId::new("b"), 400.0, 0.0);

    let edge = d.edge(&id).unwrap();
    assert_eq!(edge.end_placement().unwrap().position, Point::new(380.0, 0.0));
    assert_eq!(edge.label_anchor().unwrap().point, Point::new(200.0, 0.0));
    assert!((edge.end_placement().unwrap().angle - 0.0).abs() < 1e-9);
}

#[test]
fn test_orthogonal_edge_recomputes_its_bend() {
    let mut d = two_node_diagram();
    let edge = d
        .default_edge("a-b", EndpointRef::node("a"), EndpointRef::node("b"))
        .with_routing(RoutingMode::Orthogonal);
    let id = d.add_edge(edge);
    d.connect_edge(&id).unwrap();

    d.notify_endpoint_moved(&NodeId::new("b"), 200.0, 100.0);

    let path = d.edge(&id).unwrap().path();
    assert_eq!(path.len(), 4);
    assert_eq!(path[1].x, path[2].x);
    assert_eq!(path[0].y, path[1].y);
    assert_eq!(path[2].y, path[3].y);
}

#[test]
fn test_connect_all_skips_unresolvable_edges() {
    let mut d = two_node_diagram();
    let good = d.add_edge(d.default_edge("good", EndpointRef::node("a"), EndpointRef::node("b")));
    let bad = d.add_edge(d.default_edge("bad", EndpointRef::node("a"), EndpointRef::node("ghost")));
    let bad_port = d.add_edge(d.default_edge(
        "bad-port",
        EndpointRef::port("a", "missing"),
        EndpointRef::node("b"),
    ));

    let failures = d.connect_all();

    assert_eq!(
        failures.iter().map(|(id, _)| id.clone()).collect::<Vec<_>>(),
        vec![bad.clone(), bad_port.clone()]
    );
    assert!(d.edge(&good).unwrap().is_connected());
    assert!(!d.edge(&bad).unwrap().is_connected());
    assert!(!d.edge(&bad_port).unwrap().is_connected());
    assert_eq!(d.permanent_edge_count(), 1);
}

#[test]
fn test_failed_connect_leaves_no_subscriptions() {
    let mut d = two_node_diagram();
    let id = d.add_edge(d.default_edge("bad", EndpointRef::node("a"), EndpointRef::node("ghost")));

    assert!(d.connect_edge(&id).is_err());
    assert!(!d.channel().is_subscribed(&NodeId::new("a"), &id));
}

#[test]
fn test_disconnect_stops_tracking() {
    let mut d = two_node_diagram();
    let id = d.add_edge(d.default_edge("a-b", EndpointRef::node("a"), EndpointRef::node("b")));
    d.connect_edge(&id).unwrap();

    d.disconnect_edge(&id);
    d.notify_endpoint_moved(&NodeId::new("b"), 999.0, 999.0);

    let edge = d.edge(&id).unwrap();
    assert!(!edge.is_connected());
    assert!(edge.path().is_empty());
}

#[test]
fn test_remove_edge_unsubscribes() {
    let mut d = two_node_diagram();
    let id = d.add_edge(d.default_edge("a-b", EndpointRef::node("a"), EndpointRef::node("b")));
    d.connect_edge(&id).unwrap();

    assert!(d.remove_edge(&id).is_some());
    assert!(d.edge(&id).is_none());
    assert!(d.channel().subscribers(&NodeId::new("a")).is_empty());
    assert!(d.channel().subscribers(&NodeId::new("b")).is_empty());
}

#[test]
fn test_unknown_move_notification_is_ignored() {
    let mut d = two_node_diagram();
    let id = d.add_edge(d.default_edge("a-b", EndpointRef::node("a"), EndpointRef::node("b")));
    d.connect_edge(&id).unwrap();
    let before = d.edge(&id).unwrap().path().to_vec();

    d.notify_endpoint_moved(&NodeId::new("nobody"), 1.0, 2.0);

    assert_eq!(d.edge(&id).unwrap().path(), &before[..]);
}

#[test]
fn test_reconnect_after_reregistering_id() {
    let mut d = two_node_diagram();
    let id = d.add_edge(d.default_edge("a-b", EndpointRef::node("a"), EndpointRef::node("b")));
    d.connect_edge(&id).unwrap();

    // Re-registering the same id replaces the definition and drops the old
    // subscriptions until the new edge is connected again.
    let id = d.add_edge(d.default_edge("a-b", EndpointRef::node("b"), EndpointRef::node("a")));
    assert!(!d.edge(&id).unwrap().is_connected());
    assert!(d.channel().subscribers(&NodeId::new("a")).is_empty());

    d.connect_edge(&id).unwrap();
    assert_eq!(d.edge(&id).unwrap().path()[0], Point::new(180.0, 0.0));
}
