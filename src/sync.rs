//! Position-synchronization channel
//!
//! A per-diagram registry of which edges care about which endpoints. Every
//! connected edge subscribes for both of its resolved endpoint node ids at
//! connect time and unsubscribes at disconnect time. When an endpoint moves,
//! the diagram asks the channel who is affected and refreshes those edges
//! synchronously, in subscription order, before returning to the caller —
//! no frame ever shows an edge whose path and decorations disagree.
//!
//! All access is single-threaded; the operations are idempotent so repeated
//! subscribe or unsubscribe calls (including double-unsubscribe during
//! teardown) are harmless.

use std::collections::HashMap;

use crate::diagram::{EdgeId, NodeId};

/// Subscription registry keyed by endpoint (node) id
#[derive(Debug, Default)]
pub struct MoveChannel {
    subscribers: HashMap<NodeId, Vec<EdgeId>>,
}

impl MoveChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an edge's interest in an endpoint. Subscribing the same pair
    /// twice keeps a single entry.
    pub fn subscribe(&mut self, endpoint: &NodeId, edge: &EdgeId) {
        let entry = self.subscribers.entry(endpoint.clone()).or_default();
        if !entry.contains(edge) {
            entry.push(edge.clone());
        }
    }

    /// Remove an edge's interest in an endpoint. Unsubscribing a pair that
    /// is not registered is a no-op.
    pub fn unsubscribe(&mut self, endpoint: &NodeId, edge: &EdgeId) {
        if let Some(entry) = self.subscribers.get_mut(endpoint) {
            entry.retain(|e| e != edge);
            if entry.is_empty() {
                self.subscribers.remove(endpoint);
            }
        }
    }

    /// Drop every subscription held by an edge
    pub fn unsubscribe_all(&mut self, edge: &EdgeId) {
        self.subscribers.retain(|_, entry| {
            entry.retain(|e| e != edge);
            !entry.is_empty()
        });
    }

    /// Edges subscribed to an endpoint, in subscription order. Unknown
    /// endpoints yield an empty list: a notification nobody references is
    /// silently ignored, not an error.
    pub fn subscribers(&self, endpoint: &NodeId) -> Vec<EdgeId> {
        self.subscribers.get(endpoint).cloned().unwrap_or_default()
    }

    pub fn is_subscribed(&self, endpoint: &NodeId, edge: &EdgeId) -> bool {
        self.subscribers
            .get(endpoint)
            .is_some_and(|entry| entry.contains(edge))
    }
}
