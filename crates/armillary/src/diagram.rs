//! Diagram state and its renderable projections.
//!
//! A [`Diagram`] owns placements only: which classes appear on this canvas
//! and where, plus which relations are drawn between them. All display data
//! lives in the [`Registry`](crate::registry::Registry) and is joined in at
//! projection time through [`Diagram::node_views`] and
//! [`Diagram::edge_views`]. A placement whose entity has disappeared from
//! the registry is tolerated in the store and filtered from the projections,
//! so deletion order between the two stores never corrupts a diagram.
//!
//! Placement iteration follows insertion order, which keeps the persisted
//! form and the projected views stable across runs.

use indexmap::IndexMap;
use log::{debug, trace};

use armillary_core::{
    geometry::Rect,
    identifier::Id,
    meta::{ClassMeta, DiagramMeta, EdgePlacement, NodePlacement, RelationMeta},
};

use crate::{
    error::{ArmillaryError, EntityKind},
    registry::Registry,
};

// =============================================================================
// Projection types
// =============================================================================

/// Display data for one placed class, joined from the registry.
///
/// This is the non-geometric half of a node view. Reconciliation compares it
/// by equality to decide whether a node needs a data refresh, so it carries
/// everything a renderer draws inside the node box.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassNodeData {
    class: ClassMeta,
    package_name: Option<String>,
}

impl ClassNodeData {
    /// Create node display data from a class record and its resolved package name.
    pub fn new(class: ClassMeta, package_name: Option<String>) -> Self {
        Self {
            class,
            package_name,
        }
    }

    /// Get the class record backing this node.
    pub fn class(&self) -> &ClassMeta {
        &self.class
    }

    /// Get the resolved name of the owning package, if any.
    ///
    /// `None` both for classes outside any package and for classes whose
    /// package reference no longer resolves.
    pub fn package_name(&self) -> Option<&str> {
        self.package_name.as_deref()
    }
}

/// One renderable node: placement identity and geometry plus joined class data.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeView {
    id: Id,
    rect: Rect,
    data: ClassNodeData,
}

impl NodeView {
    /// Create a node view.
    pub fn new(id: Id, rect: Rect, data: ClassNodeData) -> Self {
        Self { id, rect, data }
    }

    /// Get the node placement id.
    pub fn id(&self) -> Id {
        self.id
    }

    /// Get the placement geometry.
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Get the joined display data.
    pub fn data(&self) -> &ClassNodeData {
        &self.data
    }
}

/// One renderable edge: placement endpoints plus the joined relation record.
///
/// Edges carry no geometry of their own; renderers route them between the
/// source and target nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeView {
    id: Id,
    source: Id,
    target: Id,
    relation: RelationMeta,
}

impl EdgeView {
    /// Create an edge view.
    pub fn new(id: Id, source: Id, target: Id, relation: RelationMeta) -> Self {
        Self {
            id,
            source,
            target,
            relation,
        }
    }

    /// Get the edge placement id.
    pub fn id(&self) -> Id {
        self.id
    }

    /// Get the source node placement id.
    pub fn source(&self) -> Id {
        self.source
    }

    /// Get the target node placement id.
    pub fn target(&self) -> Id {
        self.target
    }

    /// Get the relation record backing this edge.
    pub fn relation(&self) -> &RelationMeta {
        &self.relation
    }
}

// =============================================================================
// Diagram store
// =============================================================================

/// One diagram: a named set of node and edge placements.
///
/// The diagram never stores class or relation data. It holds entity ids plus
/// geometry, which is what keeps a registry-level rename visible on every
/// canvas without any synchronization step.
#[derive(Debug)]
pub struct Diagram {
    id: Id,
    name: String,
    nodes: IndexMap<Id, NodePlacement>,
    edges: IndexMap<Id, EdgePlacement>,
    next_id: u64,
}

impl Diagram {
    /// Create an empty diagram.
    pub fn new(id: Id, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            nodes: IndexMap::new(),
            edges: IndexMap::new(),
            next_id: 0,
        }
    }

    /// Rebuild a diagram from its persisted form.
    ///
    /// Placement ids are kept as persisted; freshly minted ids skip anything
    /// already taken.
    pub fn from_meta(meta: &DiagramMeta) -> Self {
        let mut diagram = Self::new(meta.id(), meta.name());
        for placement in meta.nodes() {
            diagram.nodes.insert(placement.id(), *placement);
        }
        for placement in meta.edges() {
            diagram.edges.insert(placement.id(), *placement);
        }
        diagram
    }

    /// Capture the persisted form of this diagram.
    pub fn to_meta(&self) -> DiagramMeta {
        DiagramMeta::new(
            self.id,
            self.name.clone(),
            self.nodes.values().copied().collect(),
            self.edges.values().copied().collect(),
        )
    }

    /// Get the diagram identifier.
    pub fn id(&self) -> Id {
        self.id
    }

    /// Get the diagram name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the diagram.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        debug!(diagram:% = self.id; "Renamed diagram");
    }

    /// Mint a fresh node placement id.
    pub fn allocate_node_id(&mut self) -> Id {
        loop {
            let id = Id::generated("node", self.next_id);
            self.next_id += 1;
            if !self.nodes.contains_key(&id) {
                return id;
            }
        }
    }

    /// Mint a fresh edge placement id.
    pub fn allocate_edge_id(&mut self) -> Id {
        loop {
            let id = Id::generated("edge", self.next_id);
            self.next_id += 1;
            if !self.edges.contains_key(&id) {
                return id;
            }
        }
    }

    // =========================================================================
    // Node placements
    // =========================================================================

    /// Add a node placement.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateId` if the placement id is taken and
    /// `ClassAlreadyPlaced` if the class already has a placement here. The
    /// caller-facing no-op treatment of repeated placement lives in the
    /// commands, which look up the class before inserting.
    pub fn add_node(&mut self, placement: NodePlacement) -> Result<Id, ArmillaryError> {
        debug_assert!(
            placement.rect().is_valid(),
            "node placement carries invalid geometry: {:?}",
            placement.rect()
        );
        let id = placement.id();
        if self.nodes.contains_key(&id) {
            return Err(ArmillaryError::duplicate(EntityKind::Node, id));
        }
        if self.placement_of_class(placement.class()).is_some() {
            return Err(ArmillaryError::ClassAlreadyPlaced {
                diagram: self.id,
                class: placement.class(),
            });
        }

        debug!(diagram:% = self.id, node:% = id, class:% = placement.class(); "Placed node");
        self.nodes.insert(id, placement);
        Ok(id)
    }

    /// Overwrite the geometry of a placed node.
    ///
    /// # Errors
    ///
    /// Returns `MissingEntity` if no placement with this id exists.
    pub fn set_node_rect(&mut self, id: Id, rect: Rect) -> Result<(), ArmillaryError> {
        debug_assert!(
            rect.is_valid(),
            "node placement carries invalid geometry: {rect:?}"
        );
        let Some(placement) = self.nodes.get_mut(&id) else {
            return Err(ArmillaryError::missing(EntityKind::Node, id));
        };
        placement.set_rect(rect);
        Ok(())
    }

    /// Remove a node placement, sweeping the edges attached to it.
    ///
    /// Removing an absent id is a soft no-op returning `None`.
    pub fn delete_node(&mut self, id: Id) -> Option<NodePlacement> {
        let removed = self.nodes.shift_remove(&id)?;
        let attached: Vec<Id> = self
            .edges
            .values()
            .filter(|e| e.attached_to(id))
            .map(|e| e.id())
            .collect();
        for edge in &attached {
            self.edges.shift_remove(edge);
        }
        debug!(
            diagram:% = self.id,
            node:% = id,
            swept_edges = attached.len();
            "Removed node placement"
        );
        Some(removed)
    }

    /// Look up a node placement by id.
    pub fn node(&self, id: Id) -> Option<&NodePlacement> {
        self.nodes.get(&id)
    }

    /// Whether a node placement with the given id exists.
    pub fn contains_node(&self, id: Id) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Find the placement showing the given class, if any.
    ///
    /// At most one placement per class exists in a diagram, so the first
    /// match is the only match.
    pub fn placement_of_class(&self, class: Id) -> Option<&NodePlacement> {
        self.nodes.values().find(|p| p.class() == class)
    }

    /// Iterate over all node placements in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &NodePlacement> {
        self.nodes.values()
    }

    // =========================================================================
    // Edge placements
    // =========================================================================

    /// Add an edge placement between two placed nodes.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateId` if the placement id is taken and
    /// `EdgeEndpointMissing` if either endpoint node is not placed here.
    pub fn add_edge(&mut self, placement: EdgePlacement) -> Result<Id, ArmillaryError> {
        let id = placement.id();
        if self.edges.contains_key(&id) {
            return Err(ArmillaryError::duplicate(EntityKind::Edge, id));
        }
        for endpoint in [placement.source(), placement.target()] {
            if !self.nodes.contains_key(&endpoint) {
                return Err(ArmillaryError::EdgeEndpointMissing {
                    diagram: self.id,
                    node: endpoint,
                });
            }
        }

        debug!(diagram:% = self.id, edge:% = id, relation:% = placement.relation(); "Placed edge");
        self.edges.insert(id, placement);
        Ok(id)
    }

    /// Remove an edge placement.
    ///
    /// Removing an absent id is a soft no-op returning `None`.
    pub fn delete_edge(&mut self, id: Id) -> Option<EdgePlacement> {
        let removed = self.edges.shift_remove(&id);
        if removed.is_some() {
            debug!(diagram:% = self.id, edge:% = id; "Removed edge placement");
        }
        removed
    }

    /// Look up an edge placement by id.
    pub fn edge(&self, id: Id) -> Option<&EdgePlacement> {
        self.edges.get(&id)
    }

    /// Iterate over all edge placements in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = &EdgePlacement> {
        self.edges.values()
    }

    // =========================================================================
    // Projections
    // =========================================================================

    /// Project the renderable nodes of this diagram.
    ///
    /// Each view joins the placement geometry with the class record and the
    /// resolved package name. Placements whose class no longer exists in the
    /// registry are filtered out, so every view is guaranteed to resolve.
    pub fn node_views(&self, registry: &Registry) -> Vec<NodeView> {
        let views: Vec<NodeView> = self
            .nodes
            .values()
            .filter_map(|placement| {
                let class = registry.class(placement.class())?;
                let package_name = class
                    .package()
                    .and_then(|id| registry.package_name(id))
                    .map(str::to_owned);
                Some(NodeView::new(
                    placement.id(),
                    placement.rect(),
                    ClassNodeData::new(class.clone(), package_name),
                ))
            })
            .collect();
        trace!(diagram:% = self.id, nodes = views.len(); "Projected node views");
        views
    }

    /// Project the renderable edges of this diagram.
    ///
    /// An edge is visible only while its relation resolves and both endpoint
    /// nodes are themselves visible. Anything dangling is filtered, matching
    /// the node projection.
    pub fn edge_views(&self, registry: &Registry) -> Vec<EdgeView> {
        let views: Vec<EdgeView> = self
            .edges
            .values()
            .filter_map(|placement| {
                let relation = registry.relation(placement.relation())?;
                if !self.node_visible(registry, placement.source())
                    || !self.node_visible(registry, placement.target())
                {
                    return None;
                }
                Some(EdgeView::new(
                    placement.id(),
                    placement.source(),
                    placement.target(),
                    relation.clone(),
                ))
            })
            .collect();
        trace!(diagram:% = self.id, edges = views.len(); "Projected edge views");
        views
    }

    /// Whether the given node placement exists and projects to a view.
    fn node_visible(&self, registry: &Registry, node: Id) -> bool {
        match self.nodes.get(&node) {
            Some(placement) => registry.contains_class(placement.class()),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use armillary_core::meta::{PackageMeta, RelationKind, RelationMeta};

    use super::*;

    /// Registry with package "domain" holding "Order" and a bare "LineItem".
    fn sample_registry() -> (Registry, Id, Id) {
        let mut registry = Registry::new();
        let package = registry.allocate_package_id();
        registry
            .create_package(PackageMeta::new(package, "domain"))
            .expect("create package");
        let order = registry.allocate_class_id();
        registry
            .create_class(ClassMeta::new(order, "Order").with_package(package))
            .expect("create class");
        let item = registry.allocate_class_id();
        registry
            .create_class(ClassMeta::new(item, "LineItem"))
            .expect("create class");
        (registry, order, item)
    }

    fn place(diagram: &mut Diagram, class: Id, rect: Rect) -> Id {
        let node = diagram.allocate_node_id();
        diagram
            .add_node(NodePlacement::new(node, class, rect))
            .expect("place node")
    }

    #[test]
    fn test_add_node_and_lookup() {
        let (_registry, order, _) = sample_registry();
        let mut diagram = Diagram::new(Id::new("diagram-1"), "D1");

        let node = place(&mut diagram, order, Rect::new(100.0, 100.0, 120.0, 60.0));

        assert!(diagram.contains_node(node));
        let placement = diagram.node(node).expect("placement present");
        assert_eq!(placement.class(), order);
        assert_eq!(placement.rect(), Rect::new(100.0, 100.0, 120.0, 60.0));
        assert_eq!(diagram.placement_of_class(order).map(|p| p.id()), Some(node));
    }

    #[test]
    fn test_add_node_rejects_second_placement_of_class() {
        let (_registry, order, _) = sample_registry();
        let mut diagram = Diagram::new(Id::new("diagram-1"), "D1");
        place(&mut diagram, order, Rect::new(0.0, 0.0, 80.0, 40.0));

        let second = diagram.allocate_node_id();
        let err = diagram
            .add_node(NodePlacement::new(
                second,
                order,
                Rect::new(50.0, 50.0, 80.0, 40.0),
            ))
            .expect_err("class already placed");

        assert!(matches!(err, ArmillaryError::ClassAlreadyPlaced { .. }));
        assert_eq!(diagram.nodes().count(), 1);
    }

    #[test]
    fn test_add_node_rejects_taken_id() {
        let (_registry, order, item) = sample_registry();
        let mut diagram = Diagram::new(Id::new("diagram-1"), "D1");
        let node = place(&mut diagram, order, Rect::new(0.0, 0.0, 80.0, 40.0));

        let err = diagram
            .add_node(NodePlacement::new(node, item, Rect::new(0.0, 0.0, 80.0, 40.0)))
            .expect_err("id taken");

        assert!(matches!(err, ArmillaryError::DuplicateId { .. }));
    }

    #[test]
    fn test_set_node_rect() {
        let (_registry, order, _) = sample_registry();
        let mut diagram = Diagram::new(Id::new("diagram-1"), "D1");
        let node = place(&mut diagram, order, Rect::new(0.0, 0.0, 80.0, 40.0));

        diagram
            .set_node_rect(node, Rect::new(-30.0, 12.5, 80.0, 40.0))
            .expect("move node");
        assert_eq!(
            diagram.node(node).map(|p| p.rect()),
            Some(Rect::new(-30.0, 12.5, 80.0, 40.0))
        );

        let err = diagram
            .set_node_rect(Id::new("node-99"), Rect::new(0.0, 0.0, 1.0, 1.0))
            .expect_err("unknown placement");
        assert!(matches!(err, ArmillaryError::MissingEntity { .. }));
    }

    #[test]
    fn test_delete_node_sweeps_attached_edges() {
        let (mut registry, order, item) = sample_registry();
        let relation = registry.allocate_relation_id();
        registry
            .create_relation(RelationMeta::new(
                relation,
                order,
                item,
                RelationKind::Association,
            ))
            .expect("create relation");

        let mut diagram = Diagram::new(Id::new("diagram-1"), "D1");
        let order_node = place(&mut diagram, order, Rect::new(0.0, 0.0, 80.0, 40.0));
        let item_node = place(&mut diagram, item, Rect::new(200.0, 0.0, 80.0, 40.0));
        let edge = diagram.allocate_edge_id();
        diagram
            .add_edge(EdgePlacement::new(edge, relation, order_node, item_node))
            .expect("place edge");

        let removed = diagram.delete_node(order_node).expect("removed placement");
        assert_eq!(removed.class(), order);
        assert_eq!(diagram.edges().count(), 0);
        assert!(diagram.contains_node(item_node));

        // Absent ids delete softly.
        assert!(diagram.delete_node(order_node).is_none());
    }

    #[test]
    fn test_add_edge_requires_placed_endpoints() {
        let (mut registry, order, item) = sample_registry();
        let relation = registry.allocate_relation_id();
        registry
            .create_relation(RelationMeta::new(
                relation,
                order,
                item,
                RelationKind::Association,
            ))
            .expect("create relation");

        let mut diagram = Diagram::new(Id::new("diagram-1"), "D1");
        let order_node = place(&mut diagram, order, Rect::new(0.0, 0.0, 80.0, 40.0));

        let edge = diagram.allocate_edge_id();
        let err = diagram
            .add_edge(EdgePlacement::new(
                edge,
                relation,
                order_node,
                Id::new("node-77"),
            ))
            .expect_err("target not placed");

        assert!(matches!(err, ArmillaryError::EdgeEndpointMissing { .. }));
        assert_eq!(diagram.edges().count(), 0);
    }

    #[test]
    fn test_node_views_join_registry_data() {
        let (registry, order, item) = sample_registry();
        let mut diagram = Diagram::new(Id::new("diagram-1"), "D1");
        place(&mut diagram, order, Rect::new(100.0, 100.0, 120.0, 60.0));
        place(&mut diagram, item, Rect::new(300.0, 100.0, 120.0, 60.0));

        let views = diagram.node_views(&registry);
        assert_eq!(views.len(), 2);

        let order_view = &views[0];
        assert_eq!(order_view.data().class().name(), "Order");
        assert_eq!(order_view.data().package_name(), Some("domain"));
        assert_eq!(order_view.rect(), Rect::new(100.0, 100.0, 120.0, 60.0));

        let item_view = &views[1];
        assert_eq!(item_view.data().class().name(), "LineItem");
        assert_eq!(item_view.data().package_name(), None);
    }

    #[test]
    fn test_node_views_filter_dangling_placements() {
        let (mut registry, order, item) = sample_registry();
        let mut diagram = Diagram::new(Id::new("diagram-1"), "D1");
        place(&mut diagram, order, Rect::new(0.0, 0.0, 80.0, 40.0));
        place(&mut diagram, item, Rect::new(200.0, 0.0, 80.0, 40.0));

        registry.delete_class(order);

        let views = diagram.node_views(&registry);
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].data().class().name(), "LineItem");
        // The dangling placement stays in the store.
        assert_eq!(diagram.nodes().count(), 2);
    }

    #[test]
    fn test_edge_views_filter_dangling_relation_and_endpoints() {
        let (mut registry, order, item) = sample_registry();
        let relation = registry.allocate_relation_id();
        registry
            .create_relation(RelationMeta::new(
                relation,
                order,
                item,
                RelationKind::Inheritance,
            ))
            .expect("create relation");

        let mut diagram = Diagram::new(Id::new("diagram-1"), "D1");
        let order_node = place(&mut diagram, order, Rect::new(0.0, 0.0, 80.0, 40.0));
        let item_node = place(&mut diagram, item, Rect::new(200.0, 0.0, 80.0, 40.0));
        let edge = diagram.allocate_edge_id();
        diagram
            .add_edge(EdgePlacement::new(edge, relation, order_node, item_node))
            .expect("place edge");

        let views = diagram.edge_views(&registry);
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].relation().kind(), RelationKind::Inheritance);
        assert_eq!(views[0].source(), order_node);
        assert_eq!(views[0].target(), item_node);

        // Deleting the source class hides the edge even though relation and
        // placements are still stored.
        registry.delete_class(order);
        assert!(diagram.edge_views(&registry).is_empty());
        assert_eq!(diagram.edges().count(), 1);

        // A registry missing the relation hides it as well.
        let (registry_without_relation, _, _) = sample_registry();
        assert!(diagram.edge_views(&registry_without_relation).is_empty());
    }

    #[test]
    fn test_meta_round_trip() {
        let (mut registry, order, item) = sample_registry();
        let relation = registry.allocate_relation_id();
        registry
            .create_relation(RelationMeta::new(
                relation,
                order,
                item,
                RelationKind::Association,
            ))
            .expect("create relation");

        let mut diagram = Diagram::new(Id::new("diagram-1"), "D1");
        let order_node = place(&mut diagram, order, Rect::new(10.0, 20.0, 120.0, 60.0));
        let item_node = place(&mut diagram, item, Rect::new(300.0, 20.0, 120.0, 60.0));
        let edge = diagram.allocate_edge_id();
        diagram
            .add_edge(EdgePlacement::new(edge, relation, order_node, item_node))
            .expect("place edge");

        let meta = diagram.to_meta();
        assert_eq!(meta.name(), "D1");
        assert_eq!(meta.nodes().len(), 2);
        assert_eq!(meta.edges().len(), 1);

        let restored = Diagram::from_meta(&meta);
        assert_eq!(restored.to_meta(), meta);
        assert_eq!(restored.node(order_node).map(|p| p.class()), Some(order));
    }

    #[test]
    fn test_allocate_node_id_skips_taken() {
        let (_registry, order, item) = sample_registry();
        let mut diagram = Diagram::new(Id::new("diagram-1"), "D1");
        diagram
            .add_node(NodePlacement::new(
                Id::new("node-0"),
                order,
                Rect::new(0.0, 0.0, 80.0, 40.0),
            ))
            .expect("place node");

        let id = diagram.allocate_node_id();
        assert_ne!(id, Id::new("node-0"));
        diagram
            .add_node(NodePlacement::new(id, item, Rect::new(100.0, 0.0, 80.0, 40.0)))
            .expect("minted id is free");
    }
}
