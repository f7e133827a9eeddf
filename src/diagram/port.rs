//! Connection points (ports)
//!
//! A connection point belongs to exactly one owner node and carries a layout
//! address. Its position is stored as an offset relative to the owner's
//! center and re-resolved against the owner's shape on demand: whenever the
//! owner is resized, and at minimum once before any edge referencing the
//! point is first drawn. The absolute position is owner position plus offset,
//! computed on every query and never stored.

use serde::{Deserialize, Serialize};

use crate::geometry::{resolve_anchor, AnchorAddress, Point, Shape, Vector};

/// Identifier of a connection point, unique within its owner node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortId(pub String);

impl PortId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PortId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named, positioned attachment location on a node's boundary
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionPoint {
    pub id: PortId,
    pub address: AnchorAddress,
    /// Offset from the owner's center, in the owner's local frame. Refreshed
    /// by `update_position`, not valid until the first refresh.
    relative: Vector,
}

impl ConnectionPoint {
    pub fn new(id: impl Into<String>, address: AnchorAddress) -> Self {
        Self {
            id: PortId::new(id),
            address,
            relative: Vector::default(),
        }
    }

    /// Re-resolve the address against the owner's current shape (given in
    /// the owner's local frame) and store the result as the owner-relative
    /// offset. Call after every owner resize.
    pub fn update_position(&mut self, owner_shape: &Shape) {
        let resolved = resolve_anchor(owner_shape, Some(&self.address));
        let center = owner_shape.center();
        self.relative = Vector::between(center, resolved);
    }

    /// Owner-relative offset as of the last `update_position`
    pub fn relative_offset(&self) -> Vector {
        self.relative
    }

    /// Absolute position: owner position plus the stored relative offset
    pub fn absolute_position(&self, owner_position: Point) -> Point {
        owner_position.offset(self.relative)
    }
}
