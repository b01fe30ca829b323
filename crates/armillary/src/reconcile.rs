//! Pure diffing between projected graph states.
//!
//! The renderer keeps its own scene objects alive across edits. Instead of
//! rebuilding that scene on every change, it captures a [`GraphView`] before
//! and after a mutation and asks [`diff`] for the minimal [`GraphPatch`]
//! between them. Reconciliation is by id, never by position in the
//! projection, and node changes are split per field: a drag produces a
//! geometry-only update and a rename produces a data-only update, so
//! in-progress visual state (selection, animation) survives unrelated edits.
//!
//! Diffing is side-effect-free and safe to run repeatedly between renders.

use std::collections::HashMap;

use log::trace;

use armillary_core::{geometry::Rect, identifier::Id, meta::RelationMeta};

use crate::diagram::{ClassNodeData, Diagram, EdgeView, NodeView};
use crate::registry::Registry;

/// A captured projection of one diagram: the unit reconciliation works on.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GraphView {
    nodes: Vec<NodeView>,
    edges: Vec<EdgeView>,
}

impl GraphView {
    /// Create a view from already projected nodes and edges.
    pub fn new(nodes: Vec<NodeView>, edges: Vec<EdgeView>) -> Self {
        Self { nodes, edges }
    }

    /// Capture the current projection of a diagram.
    pub fn capture(diagram: &Diagram, registry: &Registry) -> Self {
        Self::new(diagram.node_views(registry), diagram.edge_views(registry))
    }

    /// Borrow the projected node views.
    pub fn nodes(&self) -> &[NodeView] {
        &self.nodes
    }

    /// Borrow the projected edge views.
    pub fn edges(&self) -> &[EdgeView] {
        &self.edges
    }
}

/// Field-wise update for a node present on both sides of a diff.
///
/// At least one of the two parts is always set; a node with neither would
/// simply not appear in the patch.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeUpdate {
    id: Id,
    data: Option<ClassNodeData>,
    geometry: Option<Rect>,
}

impl NodeUpdate {
    /// Get the node placement id this update targets.
    pub fn id(&self) -> Id {
        self.id
    }

    /// Get the new display data, if it changed.
    pub fn data(&self) -> Option<&ClassNodeData> {
        self.data.as_ref()
    }

    /// Get the new geometry, if it changed.
    pub fn geometry(&self) -> Option<Rect> {
        self.geometry
    }
}

/// Data update for an edge present on both sides of a diff.
///
/// Edge endpoints are immutable for a given placement id, so the only thing
/// that can change under an edge is its relation record.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeUpdate {
    id: Id,
    relation: RelationMeta,
}

impl EdgeUpdate {
    /// Get the edge placement id this update targets.
    pub fn id(&self) -> Id {
        self.id
    }

    /// Get the new relation record.
    pub fn relation(&self) -> &RelationMeta {
        &self.relation
    }
}

/// The minimal change set between two graph views.
///
/// Creations carry full views, removals carry ids and updates carry only
/// the changed parts. Entry order follows the `next` projection for
/// creations and updates and the `previous` projection for removals.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GraphPatch {
    created_nodes: Vec<NodeView>,
    removed_nodes: Vec<Id>,
    updated_nodes: Vec<NodeUpdate>,
    created_edges: Vec<EdgeView>,
    removed_edges: Vec<Id>,
    updated_edges: Vec<EdgeUpdate>,
}

impl GraphPatch {
    /// Borrow the nodes that exist only in the next view.
    pub fn created_nodes(&self) -> &[NodeView] {
        &self.created_nodes
    }

    /// Borrow the ids of nodes that disappeared from the next view.
    pub fn removed_nodes(&self) -> &[Id] {
        &self.removed_nodes
    }

    /// Borrow the field-wise node updates.
    pub fn updated_nodes(&self) -> &[NodeUpdate] {
        &self.updated_nodes
    }

    /// Borrow the edges that exist only in the next view.
    pub fn created_edges(&self) -> &[EdgeView] {
        &self.created_edges
    }

    /// Borrow the ids of edges that disappeared from the next view.
    pub fn removed_edges(&self) -> &[Id] {
        &self.removed_edges
    }

    /// Borrow the edge data updates.
    pub fn updated_edges(&self) -> &[EdgeUpdate] {
        &self.updated_edges
    }

    /// Whether this patch changes anything at all.
    pub fn is_empty(&self) -> bool {
        self.created_nodes.is_empty()
            && self.removed_nodes.is_empty()
            && self.updated_nodes.is_empty()
            && self.created_edges.is_empty()
            && self.removed_edges.is_empty()
            && self.updated_edges.is_empty()
    }
}

/// Compute the minimal patch turning `previous` into `next`.
///
/// Nodes and edges are matched by placement id. A node present on both
/// sides contributes an update only for the parts that actually differ:
/// display data is compared structurally, geometry exactly. Identical views
/// produce an empty patch.
///
/// # Examples
///
/// ```
/// use armillary::reconcile::{GraphView, diff};
///
/// let empty = GraphView::default();
/// assert!(diff(&empty, &empty).is_empty());
/// ```
pub fn diff(previous: &GraphView, next: &GraphView) -> GraphPatch {
    let previous_nodes: HashMap<Id, &NodeView> =
        previous.nodes.iter().map(|n| (n.id(), n)).collect();
    let next_nodes: HashMap<Id, &NodeView> = next.nodes.iter().map(|n| (n.id(), n)).collect();
    let previous_edges: HashMap<Id, &EdgeView> =
        previous.edges.iter().map(|e| (e.id(), e)).collect();
    let next_edges: HashMap<Id, &EdgeView> = next.edges.iter().map(|e| (e.id(), e)).collect();

    let mut patch = GraphPatch::default();

    for node in &next.nodes {
        match previous_nodes.get(&node.id()) {
            None => patch.created_nodes.push(node.clone()),
            Some(before) => {
                let data = if before.data() != node.data() {
                    Some(node.data().clone())
                } else {
                    None
                };
                let geometry = if before.rect() != node.rect() {
                    Some(node.rect())
                } else {
                    None
                };
                if data.is_some() || geometry.is_some() {
                    patch.updated_nodes.push(NodeUpdate {
                        id: node.id(),
                        data,
                        geometry,
                    });
                }
            }
        }
    }
    for node in &previous.nodes {
        if !next_nodes.contains_key(&node.id()) {
            patch.removed_nodes.push(node.id());
        }
    }

    for edge in &next.edges {
        match previous_edges.get(&edge.id()) {
            None => patch.created_edges.push(edge.clone()),
            Some(before) => {
                if before.relation() != edge.relation() {
                    patch.updated_edges.push(EdgeUpdate {
                        id: edge.id(),
                        relation: edge.relation().clone(),
                    });
                }
            }
        }
    }
    for edge in &previous.edges {
        if !next_edges.contains_key(&edge.id()) {
            patch.removed_edges.push(edge.id());
        }
    }

    trace!(
        created = patch.created_nodes.len() + patch.created_edges.len(),
        removed = patch.removed_nodes.len() + patch.removed_edges.len(),
        updated = patch.updated_nodes.len() + patch.updated_edges.len();
        "Computed graph patch"
    );
    patch
}
