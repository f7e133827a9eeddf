//! Error types for the diagram model

use thiserror::Error;

/// Errors raised by diagram mutation and edge connection
#[derive(Debug, Error)]
pub enum DiagramError {
    /// An edge references a node or port that does not exist. The owning
    /// collection skips the edge and keeps loading; the definition stays
    /// registered but unconnected.
    #[error("unresolved endpoint '{reference}' on edge '{edge}'")]
    UnresolvedEndpoint { edge: String, reference: String },

    #[error("unknown node '{id}'")]
    UnknownNode { id: String },

    #[error("unknown edge '{id}'")]
    UnknownEdge { id: String },

    #[error("duplicate node id '{id}'")]
    DuplicateNode { id: String },
}

impl DiagramError {
    pub fn unresolved(edge: impl Into<String>, reference: impl Into<String>) -> Self {
        Self::UnresolvedEndpoint {
            edge: edge.into(),
            reference: reference.into(),
        }
    }

    pub fn unknown_node(id: impl Into<String>) -> Self {
        Self::UnknownNode { id: id.into() }
    }

    pub fn unknown_edge(id: impl Into<String>) -> Self {
        Self::UnknownEdge { id: id.into() }
    }
}
