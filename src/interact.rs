//! Interactive connection gesture
//!
//! Drives the pointer-down / drag / release cycle that connects two
//! endpoints. The machine is written once against the sync-or-pending pick
//! abstraction from [`crate::scene`]: a hit-test that answers immediately
//! and one that answers through a ticket flow through the same code. All
//! pointer positions are diagram-local; hosts convert from client space
//! before calling in.
//!
//! Cleanup is unconditional: whatever happens while locating the release
//! endpoint, the temporary edge and the virtual endpoint are gone by the
//! time the machine returns to idle. A pick ticket that resolves after the
//! gesture was cancelled or superseded is no longer held and its completion
//! is a no-op.

use tracing::{debug, warn};

use crate::diagram::{Diagram, EdgeId};
use crate::geometry::Point;
use crate::marker::MarkerShape;
use crate::scene::{PickOutcome, PickTarget, PickTicket, SpatialQuery};

/// Observable state of the gesture machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureState {
    Idle,
    /// Waiting for the initial pick to resolve
    Picking,
    /// Temporary edge follows the pointer
    Dragging,
    /// Waiting for the release pick to resolve
    Committing,
}

enum Phase {
    Idle,
    Picking {
        ticket: PickTicket,
        queued_release: Option<Point>,
    },
    Dragging {
        source: PickTarget,
        temp_edge: EdgeId,
    },
    Committing {
        source: PickTarget,
        temp_edge: EdgeId,
        ticket: PickTicket,
    },
}

/// Pointer-driven connect gesture over one diagram
pub struct ConnectGesture {
    phase: Phase,
}

impl Default for ConnectGesture {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectGesture {
    pub fn new() -> Self {
        Self { phase: Phase::Idle }
    }

    pub fn state(&self) -> GestureState {
        match self.phase {
            Phase::Idle => GestureState::Idle,
            Phase::Picking { .. } => GestureState::Picking,
            Phase::Dragging { .. } => GestureState::Dragging,
            Phase::Committing { .. } => GestureState::Committing,
        }
    }

    /// Pointer pressed: pick a start endpoint around the position. A miss
    /// keeps the machine idle; a pending hit-test parks it in `Picking`.
    pub fn on_pointer_down(
        &mut self,
        diagram: &mut Diagram,
        picker: &dyn SpatialQuery,
        position: Point,
    ) {
        if !matches!(self.phase, Phase::Idle) {
            debug!("pointer-down ignored mid-gesture");
            return;
        }
        match picker.pick(diagram, position, diagram.config().pick_radius) {
            PickOutcome::Resolved(Some(target)) => self.begin_drag(diagram, target),
            PickOutcome::Resolved(None) => {}
            PickOutcome::Pending(ticket) => {
                debug!("start pick pending");
                self.phase = Phase::Picking {
                    ticket,
                    queued_release: None,
                };
            }
        }
    }

    /// Pointer moved: while dragging, the virtual endpoint tracks the
    /// pointer and the temporary edge recomputes for the rubber-band visual.
    pub fn on_pointer_move(&mut self, diagram: &mut Diagram, position: Point) {
        if let Phase::Dragging { temp_edge, .. } = &self.phase {
            diagram.move_virtual_endpoint(position);
            let _ = diagram.refresh_edge(temp_edge);
        }
    }

    /// Pointer released: pick an end endpoint and commit or cancel. A
    /// release while the start pick is still pending is queued and replayed
    /// once that pick resolves.
    pub fn on_pointer_up(
        &mut self,
        diagram: &mut Diagram,
        picker: &dyn SpatialQuery,
        position: Point,
    ) {
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Picking { ticket, .. } => {
                self.phase = Phase::Picking {
                    ticket,
                    queued_release: Some(position),
                };
            }
            Phase::Dragging { source, temp_edge } => {
                match picker.pick(diagram, position, diagram.config().pick_radius) {
                    PickOutcome::Resolved(target) => {
                        self.finish(diagram, source, temp_edge, target)
                    }
                    PickOutcome::Pending(ticket) => {
                        debug!("release pick pending");
                        self.phase = Phase::Committing {
                            source,
                            temp_edge,
                            ticket,
                        };
                    }
                }
            }
            other => self.phase = other,
        }
    }

    /// Drain any completed pick ticket. Hosts call this after completing a
    /// ticket their hit-test handed out earlier.
    pub fn poll(&mut self, diagram: &mut Diagram, picker: &dyn SpatialQuery) {
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Picking {
                ticket,
                queued_release,
            } => match ticket.take() {
                None => {
                    self.phase = Phase::Picking {
                        ticket,
                        queued_release,
                    };
                }
                Some(None) => {
                    debug!("start pick resolved to nothing");
                }
                Some(Some(target)) => {
                    self.begin_drag(diagram, target);
                    if let Some(position) = queued_release {
                        self.on_pointer_up(diagram, picker, position);
                    }
                }
            },
            Phase::Committing {
                source,
                temp_edge,
                ticket,
            } => match ticket.take() {
                None => {
                    self.phase = Phase::Committing {
                        source,
                        temp_edge,
                        ticket,
                    };
                }
                Some(target) => self.finish(diagram, source, temp_edge, target),
            },
            other => self.phase = other,
        }
    }

    /// Tear the gesture down from any state: remove a live temporary edge,
    /// discard the virtual endpoint, return to idle. Pending tickets are
    /// dropped, so their late completions go nowhere.
    pub fn uninstall(&mut self, diagram: &mut Diagram) {
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Dragging { temp_edge, .. } | Phase::Committing { temp_edge, .. } => {
                diagram.end_temporary_edge(&temp_edge);
            }
            Phase::Idle | Phase::Picking { .. } => {}
        }
    }

    fn begin_drag(&mut self, diagram: &mut Diagram, source: PickTarget) {
        let endpoint = source.endpoint();
        let Some(anchor) = diagram.endpoint_anchor(&endpoint) else {
            // The picked element disappeared between pick and resolution
            warn!("picked endpoint vanished before drag start");
            self.phase = Phase::Idle;
            return;
        };
        let temp_edge = diagram.begin_temporary_edge(endpoint, source.endpoint_ref(), anchor);
        debug!(edge = %temp_edge, "drag started");
        self.phase = Phase::Dragging { source, temp_edge };
    }

    fn finish(
        &mut self,
        diagram: &mut Diagram,
        source: PickTarget,
        temp_edge: EdgeId,
        target: Option<PickTarget>,
    ) {
        match target {
            Some(target) if target != source => {
                let id = diagram.generate_edge_id();
                let marker = MarkerShape::arrow(diagram.config().marker_size);
                let edge = diagram
                    .default_edge(id.as_str(), source.endpoint_ref(), target.endpoint_ref())
                    .with_end_marker(marker);
                let id = diagram.add_edge(edge);
                if let Err(err) = diagram.connect_edge(&id) {
                    // A failed connect is a normal dropped-connection outcome
                    warn!(edge = %id, error = %err, "connect failed, dropping edge");
                    diagram.remove_edge(&id);
                } else {
                    debug!(edge = %id, "edge committed");
                }
            }
            Some(_) => debug!("release on the start endpoint, cancelling"),
            None => debug!("release found no endpoint, cancelling"),
        }
        diagram.end_temporary_edge(&temp_edge);
        self.phase = Phase::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use crate::config::DiagramConfig;
    use crate::diagram::{ConnectionPoint, Node, NodeId, PortId};
    use crate::geometry::{AnchorAddress, Shape, Side};

    /// Hit-test double fed with scripted outcomes
    struct StubPicker {
        outcomes: RefCell<VecDeque<PickOutcome>>,
    }

    impl StubPicker {
        fn new(outcomes: Vec<PickOutcome>) -> Self {
            Self {
                outcomes: RefCell::new(outcomes.into()),
            }
        }
    }

    impl SpatialQuery for StubPicker {
        fn pick(&self, _diagram: &Diagram, _around: Point, _radius: f64) -> PickOutcome {
            self.outcomes
                .borrow_mut()
                .pop_front()
                .unwrap_or(PickOutcome::Resolved(None))
        }
    }

    fn diagram() -> Diagram {
        let mut d = Diagram::new(DiagramConfig::default());
        d.add_node(
            Node::new(
                "a",
                Shape::Rect {
                    x: 0.0,
                    y: 0.0,
                    width: 40.0,
                    height: 40.0,
                },
            )
            .at(0.0, 0.0)
            .with_port(ConnectionPoint::new(
                "out",
                AnchorAddress::Preset { side: Side::Right },
            )),
        )
        .unwrap();
        d.add_node(
            Node::new(
                "b",
                Shape::Rect {
                    x: 0.0,
                    y: 0.0,
                    width: 40.0,
                    height: 40.0,
                },
            )
            .at(200.0, 0.0),
        )
        .unwrap();
        d
    }

    fn port_a() -> PickTarget {
        PickTarget::Port {
            node: NodeId::new("a"),
            port: PortId::new("out"),
        }
    }

    fn node_b() -> PickTarget {
        PickTarget::Node(NodeId::new("b"))
    }

    #[test]
    fn test_commit_creates_one_permanent_edge() {
        let mut d = diagram();
        let picker = StubPicker::new(vec![
            PickOutcome::Resolved(Some(port_a())),
            PickOutcome::Resolved(Some(node_b())),
        ]);
        let mut gesture = ConnectGesture::new();

        gesture.on_pointer_down(&mut d, &picker, Point::new(20.0, 0.0));
        assert_eq!(gesture.state(), GestureState::Dragging);
        assert!(d.virtual_endpoint().is_some());
        assert_eq!(d.edges().filter(|e| e.is_temporary()).count(), 1);

        gesture.on_pointer_move(&mut d, Point::new(120.0, 0.0));
        gesture.on_pointer_up(&mut d, &picker, Point::new(200.0, 0.0));

        assert_eq!(gesture.state(), GestureState::Idle);
        assert_eq!(d.permanent_edge_count(), 1);
        assert_eq!(d.edges().filter(|e| e.is_temporary()).count(), 0);
        assert!(d.virtual_endpoint().is_none());
        let edge = d.edges().next().unwrap();
        assert_eq!(edge.source_id().as_str(), "a");
        assert_eq!(edge.target_id().as_str(), "b");
    }

    #[test]
    fn test_release_on_empty_space_cancels() {
        let mut d = diagram();
        let picker = StubPicker::new(vec![
            PickOutcome::Resolved(Some(port_a())),
            PickOutcome::Resolved(None),
        ]);
        let mut gesture = ConnectGesture::new();

        gesture.on_pointer_down(&mut d, &picker, Point::new(20.0, 0.0));
        gesture.on_pointer_up(&mut d, &picker, Point::new(500.0, 500.0));

        assert_eq!(gesture.state(), GestureState::Idle);
        assert_eq!(d.permanent_edge_count(), 0);
        assert_eq!(d.edges().count(), 0);
        assert!(d.virtual_endpoint().is_none());
    }

    #[test]
    fn test_release_on_start_endpoint_cancels() {
        let mut d = diagram();
        let picker = StubPicker::new(vec![
            PickOutcome::Resolved(Some(port_a())),
            PickOutcome::Resolved(Some(port_a())),
        ]);
        let mut gesture = ConnectGesture::new();

        gesture.on_pointer_down(&mut d, &picker, Point::new(20.0, 0.0));
        gesture.on_pointer_up(&mut d, &picker, Point::new(20.0, 0.0));

        assert_eq!(d.permanent_edge_count(), 0);
        assert!(d.virtual_endpoint().is_none());
    }

    #[test]
    fn test_rubber_band_follows_pointer() {
        let mut d = diagram();
        let picker = StubPicker::new(vec![PickOutcome::Resolved(Some(port_a()))]);
        let mut gesture = ConnectGesture::new();

        gesture.on_pointer_down(&mut d, &picker, Point::new(20.0, 0.0));
        gesture.on_pointer_move(&mut d, Point::new(77.0, 33.0));

        let temp = d.edges().find(|e| e.is_temporary()).unwrap();
        let last = *temp.path().last().unwrap();
        assert_eq!(last, Point::new(77.0, 33.0));
        // Port anchor: right side of node a at (20, 0)
        assert_eq!(temp.path()[0], Point::new(20.0, 0.0));
    }

    #[test]
    fn test_pending_pick_with_queued_release() {
        let mut d = diagram();
        let ticket = PickTicket::new();
        let picker = StubPicker::new(vec![
            PickOutcome::Pending(ticket.clone()),
            PickOutcome::Resolved(Some(node_b())),
        ]);
        let mut gesture = ConnectGesture::new();

        gesture.on_pointer_down(&mut d, &picker, Point::new(20.0, 0.0));
        assert_eq!(gesture.state(), GestureState::Picking);
        // Release arrives before the initial pick resolves
        gesture.on_pointer_up(&mut d, &picker, Point::new(200.0, 0.0));
        assert_eq!(gesture.state(), GestureState::Picking);

        ticket.complete(Some(port_a()));
        gesture.poll(&mut d, &picker);

        assert_eq!(gesture.state(), GestureState::Idle);
        assert_eq!(d.permanent_edge_count(), 1);
        assert!(d.virtual_endpoint().is_none());
    }

    #[test]
    fn test_stale_resolution_after_uninstall_is_noop() {
        let mut d = diagram();
        let ticket = PickTicket::new();
        let picker = StubPicker::new(vec![PickOutcome::Pending(ticket.clone())]);
        let mut gesture = ConnectGesture::new();

        gesture.on_pointer_down(&mut d, &picker, Point::new(20.0, 0.0));
        gesture.uninstall(&mut d);
        assert_eq!(gesture.state(), GestureState::Idle);

        ticket.complete(Some(port_a()));
        gesture.poll(&mut d, &picker);

        assert_eq!(gesture.state(), GestureState::Idle);
        assert_eq!(d.edges().count(), 0);
        assert!(d.virtual_endpoint().is_none());
    }

    #[test]
    fn test_uninstall_mid_drag_cleans_up() {
        let mut d = diagram();
        let picker = StubPicker::new(vec![PickOutcome::Resolved(Some(port_a()))]);
        let mut gesture = ConnectGesture::new();

        gesture.on_pointer_down(&mut d, &picker, Point::new(20.0, 0.0));
        assert_eq!(d.edges().count(), 1);
        gesture.uninstall(&mut d);

        assert_eq!(gesture.state(), GestureState::Idle);
        assert_eq!(d.edges().count(), 0);
        assert!(d.virtual_endpoint().is_none());
    }

    #[test]
    fn test_pending_release_pick() {
        let mut d = diagram();
        let ticket = PickTicket::new();
        let picker = StubPicker::new(vec![
            PickOutcome::Resolved(Some(port_a())),
            PickOutcome::Pending(ticket.clone()),
        ]);
        let mut gesture = ConnectGesture::new();

        gesture.on_pointer_down(&mut d, &picker, Point::new(20.0, 0.0));
        gesture.on_pointer_up(&mut d, &picker, Point::new(200.0, 0.0));
        assert_eq!(gesture.state(), GestureState::Committing);

        ticket.complete(Some(node_b()));
        gesture.poll(&mut d, &picker);

        assert_eq!(gesture.state(), GestureState::Idle);
        assert_eq!(d.permanent_edge_count(), 1);
        assert_eq!(d.edges().filter(|e| e.is_temporary()).count(), 0);
    }

    #[test]
    fn test_pointer_down_on_empty_space_stays_idle() {
        let mut d = diagram();
        let picker = StubPicker::new(vec![PickOutcome::Resolved(None)]);
        let mut gesture = ConnectGesture::new();
        gesture.on_pointer_down(&mut d, &picker, Point::new(500.0, 500.0));
        assert_eq!(gesture.state(), GestureState::Idle);
        assert_eq!(d.edges().count(), 0);
    }
}
