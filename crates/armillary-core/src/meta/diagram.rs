//! Diagram-local placement records and the persisted diagram form.
//!
//! Placements are the diagram half of the two-representation model: they
//! reference registry entities by id and add what only the canvas knows, the
//! geometry. A class carries no position; a placement carries no class data.

use serde::{Deserialize, Serialize};

use crate::{geometry::Rect, identifier::Id};

/// A node placement: one class shown in one diagram at some rectangle.
///
/// Placement ids are unique within their diagram. The same class may be
/// placed in any number of diagrams, each placement with independent
/// geometry; within one diagram a class has at most one placement.
/// Serialization flattens the geometry, so the wire form reads
/// `{id, class, x, y, width, height}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodePlacement {
    id: Id,
    class: Id,
    #[serde(flatten)]
    rect: Rect,
}

impl NodePlacement {
    /// Create a new node placement.
    pub fn new(id: Id, class: Id, rect: Rect) -> Self {
        Self { id, class, rect }
    }

    /// Get the placement identifier, unique within the diagram.
    pub fn id(&self) -> Id {
        self.id
    }

    /// Get the id of the class this placement shows.
    pub fn class(&self) -> Id {
        self.class
    }

    /// Get the placement geometry.
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Overwrite the placement geometry.
    ///
    /// This is the only mutable part of a placement: identity and the class
    /// reference never change after creation.
    pub fn set_rect(&mut self, rect: Rect) {
        self.rect = rect;
    }
}

/// An edge placement: one relation shown in one diagram between two placed nodes.
///
/// Source and target are node placement ids of the same diagram; the relation
/// id resolves in the registry. Styling derives from the relation's kind at
/// projection time rather than being duplicated here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgePlacement {
    id: Id,
    relation: Id,
    source: Id,
    target: Id,
}

impl EdgePlacement {
    /// Create a new edge placement.
    pub fn new(id: Id, relation: Id, source: Id, target: Id) -> Self {
        Self {
            id,
            relation,
            source,
            target,
        }
    }

    /// Get the placement identifier, unique within the diagram.
    pub fn id(&self) -> Id {
        self.id
    }

    /// Get the id of the relation this placement shows.
    pub fn relation(&self) -> Id {
        self.relation
    }

    /// Get the source node placement id.
    pub fn source(&self) -> Id {
        self.source
    }

    /// Get the target node placement id.
    pub fn target(&self) -> Id {
        self.target
    }

    /// Whether this edge is attached to the given node placement on either end.
    pub fn attached_to(&self, node: Id) -> bool {
        self.source == node || self.target == node
    }
}

/// The persisted form of one diagram: identity, name and placement lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramMeta {
    id: Id,
    name: String,
    #[serde(default)]
    nodes: Vec<NodePlacement>,
    #[serde(default)]
    edges: Vec<EdgePlacement>,
}

impl DiagramMeta {
    /// Create a persisted diagram record.
    pub fn new(id: Id, name: impl Into<String>, nodes: Vec<NodePlacement>, edges: Vec<EdgePlacement>) -> Self {
        Self {
            id,
            name: name.into(),
            nodes,
            edges,
        }
    }

    /// Get the diagram identifier.
    pub fn id(&self) -> Id {
        self.id
    }

    /// Get the diagram name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Borrow the node placements in display order.
    pub fn nodes(&self) -> &[NodePlacement] {
        &self.nodes
    }

    /// Borrow the edge placements in display order.
    pub fn edges(&self) -> &[EdgePlacement] {
        &self.edges
    }
}
