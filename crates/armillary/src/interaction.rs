//! Translation of canvas gestures into commands and direct edits.
//!
//! The bridge is the single entry point for everything the renderer reports:
//! palette drops, drops of existing classes, node drags and resizes, and
//! link drawing. Drop and drag gestures become [`Command`]s routed through
//! the [`CommandExecutor`]; link drawing commits the relation and its edge
//! placement directly, outside the undo history.
//!
//! Geometry arriving from the canvas is validated here, before any command
//! exists, so a malformed rect is rejected without touching the model.
//!
//! # Link drawing
//!
//! Link drawing is an explicit state machine rather than a stream of loose
//! events:
//!
//! ```text
//! Idle --link_started--> Drawing --link_completed(Some)--> Committed --> Idle
//!                           |    \--link_completed(None)-> Cancelled --> Idle
//!                           `--link_moved--> Drawing (updated preview point)
//! ```
//!
//! While `Drawing`, [`LinkSession::preview`] exposes the source node and the
//! current pointer position for the renderer's temporary edge.

use log::{debug, info};

use armillary_core::{
    geometry::{Point, Rect, Size},
    identifier::Id,
    meta::{ClassKind, ClassMeta, EdgePlacement, RelationKind, RelationMeta},
};

use crate::{
    command::Command,
    config::EditorConfig,
    error::{ArmillaryError, EntityKind},
    executor::CommandExecutor,
    project::Project,
};

/// State of the link-drawing gesture.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum LinkSession {
    /// No link gesture in progress.
    #[default]
    Idle,
    /// A link is being drawn from `source` toward the pointer at `current`.
    Drawing {
        /// Diagram the gesture started in.
        diagram: Id,
        /// Source node placement.
        source: Id,
        /// Latest pointer position.
        current: Point,
    },
}

impl LinkSession {
    /// Whether a link gesture is in progress.
    pub fn is_drawing(&self) -> bool {
        matches!(self, Self::Drawing { .. })
    }

    /// Source node and pointer position of the temporary edge, while drawing.
    pub fn preview(&self) -> Option<(Id, Point)> {
        match self {
            Self::Idle => None,
            Self::Drawing {
                source, current, ..
            } => Some((*source, *current)),
        }
    }
}

/// How a link gesture ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    /// A relation and its edge placement were created.
    Committed {
        /// The new relation's id.
        relation: Id,
        /// The new edge placement's id.
        edge: Id,
    },
    /// The gesture ended without creating anything.
    Cancelled,
}

/// Turns renderer gestures into commands and link commits.
#[derive(Debug, Default)]
pub struct InteractionBridge {
    config: EditorConfig,
    link: LinkSession,
}

impl InteractionBridge {
    /// Create a bridge using the given configuration.
    pub fn new(config: EditorConfig) -> Self {
        Self {
            config,
            link: LinkSession::Idle,
        }
    }

    /// Borrow the bridge configuration.
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Borrow the current link-drawing state.
    pub fn link(&self) -> &LinkSession {
        &self.link
    }

    // =========================================================================
    // Drop gestures
    // =========================================================================

    /// Handle a palette drop: create a new class and place it.
    ///
    /// The class id is minted here and returned so the host can open a
    /// property form for it. A missing `size` falls back to the configured
    /// default node size.
    ///
    /// # Errors
    ///
    /// `InvalidGeometry` when the drop rect is malformed, `MissingEntity`
    /// when the diagram is unknown.
    pub fn class_dropped(
        &self,
        project: &mut Project,
        executor: &mut CommandExecutor,
        diagram: Id,
        name: &str,
        kind: ClassKind,
        at: Point,
        size: Option<Size>,
    ) -> Result<Id, ArmillaryError> {
        let rect = self.drop_rect(at, size)?;
        let class = project.registry_mut().allocate_class_id();
        let meta = ClassMeta::new(class, name).with_kind(kind);
        let command = Command::create_class(project, diagram, meta, rect)?;
        executor.execute(project, command)?;
        Ok(class)
    }

    /// Handle a drop of a class that already exists in the registry.
    ///
    /// When the diagram already shows the class the drop is ignored and
    /// `Ok(false)` is returned; no command enters history. Otherwise an
    /// `AddExisting` command is executed and `Ok(true)` is returned.
    ///
    /// # Errors
    ///
    /// `InvalidGeometry` when the drop rect is malformed, `MissingEntity`
    /// when the class or diagram is unknown.
    pub fn existing_class_dropped(
        &self,
        project: &mut Project,
        executor: &mut CommandExecutor,
        diagram: Id,
        class: Id,
        at: Point,
        size: Option<Size>,
    ) -> Result<bool, ArmillaryError> {
        let rect = self.drop_rect(at, size)?;
        if let Some(target) = project.diagram(diagram) {
            if target.placement_of_class(class).is_some() {
                debug!(diagram:% = diagram, class:% = class; "Class already placed, ignoring drop");
                return Ok(false);
            }
        }
        let command = Command::add_existing(project, diagram, class, rect)?;
        executor.execute(project, command)?;
        Ok(true)
    }

    // =========================================================================
    // Move/resize gestures
    // =========================================================================

    /// Handle an intermediate frame of a node move or resize.
    ///
    /// The first frame for a node starts a live command capturing the
    /// pre-gesture geometry; later frames retarget that command. The model
    /// updates immediately on every frame, but history sees nothing until
    /// [`InteractionBridge::gesture_finished`]. A frame for a different node
    /// commits the previous gesture first.
    ///
    /// # Errors
    ///
    /// `InvalidGeometry` when the rect is malformed, `MissingEntity` when
    /// the diagram or node is unknown.
    pub fn node_geometry_changed(
        &self,
        project: &mut Project,
        executor: &mut CommandExecutor,
        diagram: Id,
        node: Id,
        rect: Rect,
    ) -> Result<(), ArmillaryError> {
        if !rect.is_valid() {
            return Err(ArmillaryError::InvalidGeometry { rect });
        }
        let continuing = executor
            .live_command()
            .is_some_and(|live| live.diagram() == diagram && live.node() == node);
        if continuing {
            executor.update_live(project, rect)?;
        } else {
            let command = Command::change_node_geometry(project, diagram, node, rect)?;
            executor.begin_live(project, command)?;
        }
        Ok(())
    }

    /// Handle the end of a move/resize gesture, committing the live command.
    ///
    /// Returns `false` when no gesture was in progress.
    pub fn gesture_finished(&self, executor: &mut CommandExecutor) -> bool {
        executor.commit_live()
    }

    /// Handle gesture cancellation (escape, pointer capture loss).
    ///
    /// Reverts any pending live geometry command and abandons a link gesture
    /// in progress. Returns `false` when there was nothing to cancel.
    pub fn gesture_cancelled(
        &mut self,
        project: &mut Project,
        executor: &mut CommandExecutor,
    ) -> bool {
        let cancelled_live = executor.cancel_live(project);
        let cancelled_link = self.link.is_drawing();
        if cancelled_link {
            self.link = LinkSession::Idle;
            debug!("Link drawing cancelled");
        }
        cancelled_live || cancelled_link
    }

    // =========================================================================
    // Link drawing
    // =========================================================================

    /// Begin drawing a link from a node.
    ///
    /// Starting while already drawing restarts from the new source.
    ///
    /// # Errors
    ///
    /// `MissingEntity` when the diagram or source node is unknown; the
    /// session stays idle in that case.
    pub fn link_started(
        &mut self,
        project: &Project,
        diagram: Id,
        source: Id,
        at: Point,
    ) -> Result<(), ArmillaryError> {
        let Some(target) = project.diagram(diagram) else {
            return Err(ArmillaryError::missing(EntityKind::Diagram, diagram));
        };
        if !target.contains_node(source) {
            return Err(ArmillaryError::missing(EntityKind::Node, source));
        }
        self.link = LinkSession::Drawing {
            diagram,
            source,
            current: at,
        };
        debug!(diagram:% = diagram, source:% = source; "Link drawing started");
        Ok(())
    }

    /// Update the temporary-edge endpoint while drawing.
    ///
    /// Returns `false` when no link gesture is in progress.
    pub fn link_moved(&mut self, at: Point) -> bool {
        let LinkSession::Drawing { current, .. } = &mut self.link else {
            return false;
        };
        *current = at;
        true
    }

    /// Finish the link gesture.
    ///
    /// On a valid `target` node this creates the relation in the registry
    /// and an edge placement in the diagram, directly and outside the undo
    /// history, and reports [`LinkOutcome::Committed`]. A `None` target
    /// (pointer released over empty canvas) reports
    /// [`LinkOutcome::Cancelled`]. The session returns to idle either way,
    /// including on error.
    ///
    /// # Errors
    ///
    /// `MissingEntity` when the diagram or either node has disappeared since
    /// the gesture started, `SelfInheritance` for an inheritance link from a
    /// class to itself. Nothing is created in those cases.
    pub fn link_completed(
        &mut self,
        project: &mut Project,
        target: Option<Id>,
        kind: RelationKind,
    ) -> Result<LinkOutcome, ArmillaryError> {
        let session = std::mem::take(&mut self.link);
        let LinkSession::Drawing {
            diagram, source, ..
        } = session
        else {
            return Ok(LinkOutcome::Cancelled);
        };
        let Some(target) = target else {
            debug!(diagram:% = diagram, source:% = source; "Link released over empty canvas");
            return Ok(LinkOutcome::Cancelled);
        };

        let Some(shown) = project.diagram(diagram) else {
            return Err(ArmillaryError::missing(EntityKind::Diagram, diagram));
        };
        let Some(source_placement) = shown.node(source) else {
            return Err(ArmillaryError::missing(EntityKind::Node, source));
        };
        let Some(target_placement) = shown.node(target) else {
            return Err(ArmillaryError::missing(EntityKind::Node, target));
        };
        let source_class = source_placement.class();
        let target_class = target_placement.class();

        let relation = project.registry_mut().allocate_relation_id();
        let meta = RelationMeta::new(relation, source_class, target_class, kind);
        project.registry_mut().create_relation(meta)?;

        let shown = project
            .diagram_mut(diagram)
            .expect("diagram presence checked above");
        let edge = shown.allocate_edge_id();
        shown.add_edge(EdgePlacement::new(edge, relation, source, target))?;
        info!(relation:% = relation, edge:% = edge, diagram:% = diagram; "Link committed");
        Ok(LinkOutcome::Committed { relation, edge })
    }

    fn drop_rect(&self, at: Point, size: Option<Size>) -> Result<Rect, ArmillaryError> {
        let size = size.unwrap_or_else(|| self.config.node().default_size());
        let rect = Rect::from_origin_size(at, size);
        if !rect.is_valid() {
            return Err(ArmillaryError::InvalidGeometry { rect });
        }
        Ok(rect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Project, CommandExecutor, InteractionBridge, Id) {
        let mut project = Project::new();
        let diagram = project.create_diagram("Main");
        (
            project,
            CommandExecutor::default(),
            InteractionBridge::default(),
            diagram,
        )
    }

    /// Places a registry class on the diagram without going through history.
    fn place_class(project: &mut Project, diagram: Id, name: &str, rect: Rect) -> (Id, Id) {
        let class = project.registry_mut().allocate_class_id();
        project
            .registry_mut()
            .create_class(ClassMeta::new(class, name))
            .expect("create class");
        let mut command =
            Command::add_existing(project, diagram, class, rect).expect("construct add");
        command.apply(project).expect("apply add");
        (class, command.node())
    }

    fn node_rect(project: &Project, diagram: Id, node: Id) -> Rect {
        project
            .diagram(diagram)
            .expect("diagram present")
            .node(node)
            .expect("node present")
            .rect()
    }

    #[test]
    fn test_class_dropped_uses_default_size() {
        let (mut project, mut executor, bridge, diagram) = setup();

        let class = bridge
            .class_dropped(
                &mut project,
                &mut executor,
                diagram,
                "Order",
                ClassKind::Concrete,
                Point::new(100.0, 100.0),
                None,
            )
            .expect("drop");

        let meta = project.registry().class(class).expect("class present");
        assert_eq!(meta.name(), "Order");
        let views = project
            .diagram(diagram)
            .expect("diagram present")
            .node_views(project.registry());
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].rect(), Rect::new(100.0, 100.0, 120.0, 60.0));
        assert!(executor.can_undo());
    }

    #[test]
    fn test_class_dropped_rejects_malformed_geometry() {
        let (mut project, mut executor, bridge, diagram) = setup();

        let err = bridge
            .class_dropped(
                &mut project,
                &mut executor,
                diagram,
                "Order",
                ClassKind::Concrete,
                Point::new(f32::NAN, 0.0),
                None,
            )
            .expect_err("non-finite position");
        assert!(matches!(err, ArmillaryError::InvalidGeometry { .. }));

        let err = bridge
            .class_dropped(
                &mut project,
                &mut executor,
                diagram,
                "Order",
                ClassKind::Concrete,
                Point::new(0.0, 0.0),
                Some(Size::new(-10.0, 5.0)),
            )
            .expect_err("negative width");
        assert!(matches!(err, ArmillaryError::InvalidGeometry { .. }));

        assert_eq!(project.registry().classes().count(), 0);
        assert!(!executor.can_undo());
    }

    #[test]
    fn test_existing_class_dropped_skips_duplicate() {
        let (mut project, mut executor, bridge, diagram) = setup();
        let class = project.registry_mut().allocate_class_id();
        project
            .registry_mut()
            .create_class(ClassMeta::new(class, "C7"))
            .expect("create class");

        let first = bridge
            .existing_class_dropped(
                &mut project,
                &mut executor,
                diagram,
                class,
                Point::new(0.0, 0.0),
                Some(Size::new(80.0, 40.0)),
            )
            .expect("first drop");
        assert!(first);

        let second = bridge
            .existing_class_dropped(
                &mut project,
                &mut executor,
                diagram,
                class,
                Point::new(50.0, 50.0),
                Some(Size::new(80.0, 40.0)),
            )
            .expect("second drop");
        assert!(!second);

        let views = project
            .diagram(diagram)
            .expect("diagram present")
            .node_views(project.registry());
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].rect(), Rect::new(0.0, 0.0, 80.0, 40.0));

        // The skipped drop left no history entry behind.
        assert!(executor.undo(&mut project));
        assert!(!executor.can_undo());
        assert!(project
            .diagram(diagram)
            .expect("diagram present")
            .placement_of_class(class)
            .is_none());
    }

    #[test]
    fn test_drag_commits_as_single_entry() {
        let (mut project, mut executor, bridge, diagram) = setup();
        let (_, node) = place_class(&mut project, diagram, "Order", Rect::new(0.0, 0.0, 80.0, 40.0));

        for i in 1..=10 {
            bridge
                .node_geometry_changed(
                    &mut project,
                    &mut executor,
                    diagram,
                    node,
                    Rect::new(i as f32 * 4.0, 0.0, 80.0, 40.0),
                )
                .expect("frame");
        }
        assert_eq!(node_rect(&project, diagram, node), Rect::new(40.0, 0.0, 80.0, 40.0));

        assert!(bridge.gesture_finished(&mut executor));
        assert!(executor.undo(&mut project));
        assert_eq!(node_rect(&project, diagram, node), Rect::new(0.0, 0.0, 80.0, 40.0));
        assert!(!executor.can_undo());
    }

    #[test]
    fn test_switching_node_mid_drag_commits_previous_gesture() {
        let (mut project, mut executor, bridge, diagram) = setup();
        let (_, first) =
            place_class(&mut project, diagram, "Order", Rect::new(0.0, 0.0, 80.0, 40.0));
        let (_, second) =
            place_class(&mut project, diagram, "LineItem", Rect::new(200.0, 0.0, 80.0, 40.0));

        bridge
            .node_geometry_changed(
                &mut project,
                &mut executor,
                diagram,
                first,
                Rect::new(10.0, 0.0, 80.0, 40.0),
            )
            .expect("frame");
        bridge
            .node_geometry_changed(
                &mut project,
                &mut executor,
                diagram,
                second,
                Rect::new(210.0, 0.0, 80.0, 40.0),
            )
            .expect("frame");
        assert!(bridge.gesture_finished(&mut executor));

        // Two gestures, two entries, undone in reverse order.
        assert!(executor.undo(&mut project));
        assert_eq!(node_rect(&project, diagram, second), Rect::new(200.0, 0.0, 80.0, 40.0));
        assert!(executor.undo(&mut project));
        assert_eq!(node_rect(&project, diagram, first), Rect::new(0.0, 0.0, 80.0, 40.0));
    }

    #[test]
    fn test_gesture_cancelled_restores_geometry() {
        let (mut project, mut executor, mut bridge, diagram) = setup();
        let (_, node) = place_class(&mut project, diagram, "Order", Rect::new(0.0, 0.0, 80.0, 40.0));

        bridge
            .node_geometry_changed(
                &mut project,
                &mut executor,
                diagram,
                node,
                Rect::new(60.0, 60.0, 80.0, 40.0),
            )
            .expect("frame");
        assert!(bridge.gesture_cancelled(&mut project, &mut executor));

        assert_eq!(node_rect(&project, diagram, node), Rect::new(0.0, 0.0, 80.0, 40.0));
        assert!(!executor.can_undo());
        assert!(!bridge.gesture_cancelled(&mut project, &mut executor));
    }

    #[test]
    fn test_geometry_change_rejects_malformed_rect() {
        let (mut project, mut executor, bridge, diagram) = setup();
        let (_, node) = place_class(&mut project, diagram, "Order", Rect::new(0.0, 0.0, 80.0, 40.0));

        let err = bridge
            .node_geometry_changed(
                &mut project,
                &mut executor,
                diagram,
                node,
                Rect::new(0.0, 0.0, f32::INFINITY, 40.0),
            )
            .expect_err("infinite width");
        assert!(matches!(err, ArmillaryError::InvalidGeometry { .. }));
        assert_eq!(node_rect(&project, diagram, node), Rect::new(0.0, 0.0, 80.0, 40.0));
    }

    #[test]
    fn test_link_flow_commits_relation_and_edge() {
        let (mut project, mut executor, mut bridge, diagram) = setup();
        let (source_class, source) =
            place_class(&mut project, diagram, "Order", Rect::new(0.0, 0.0, 80.0, 40.0));
        let (target_class, target) =
            place_class(&mut project, diagram, "LineItem", Rect::new(200.0, 0.0, 80.0, 40.0));

        bridge
            .link_started(&project, diagram, source, Point::new(40.0, 20.0))
            .expect("start");
        assert!(bridge.link_moved(Point::new(120.0, 20.0)));
        assert_eq!(
            bridge.link().preview(),
            Some((source, Point::new(120.0, 20.0)))
        );

        let outcome = bridge
            .link_completed(&mut project, Some(target), RelationKind::Association)
            .expect("complete");
        let LinkOutcome::Committed { relation, edge } = outcome else {
            panic!("expected committed link");
        };

        let meta = project
            .registry()
            .relation(relation)
            .expect("relation present");
        assert_eq!(meta.source(), source_class);
        assert_eq!(meta.target(), target_class);
        assert_eq!(meta.kind(), RelationKind::Association);

        let shown = project.diagram(diagram).expect("diagram present");
        assert!(shown.edge(edge).is_some());
        let edge_views = shown.edge_views(project.registry());
        assert_eq!(edge_views.len(), 1);

        assert_eq!(*bridge.link(), LinkSession::Idle);
        // Link commits bypass history.
        assert!(!executor.can_undo());
    }

    #[test]
    fn test_link_released_over_canvas_cancels() {
        let (mut project, _, mut bridge, diagram) = setup();
        let (_, source) =
            place_class(&mut project, diagram, "Order", Rect::new(0.0, 0.0, 80.0, 40.0));

        bridge
            .link_started(&project, diagram, source, Point::new(0.0, 0.0))
            .expect("start");
        let outcome = bridge
            .link_completed(&mut project, None, RelationKind::Association)
            .expect("complete");

        assert_eq!(outcome, LinkOutcome::Cancelled);
        assert_eq!(project.registry().relations().count(), 0);
        assert_eq!(*bridge.link(), LinkSession::Idle);
    }

    #[test]
    fn test_link_completed_while_idle_reports_cancelled() {
        let (mut project, _, mut bridge, diagram) = setup();
        let (_, node) = place_class(&mut project, diagram, "Order", Rect::new(0.0, 0.0, 80.0, 40.0));

        let outcome = bridge
            .link_completed(&mut project, Some(node), RelationKind::Association)
            .expect("complete");
        assert_eq!(outcome, LinkOutcome::Cancelled);
        assert_eq!(project.registry().relations().count(), 0);
    }

    #[test]
    fn test_link_started_requires_present_source() {
        let (mut project, _, mut bridge, diagram) = setup();
        place_class(&mut project, diagram, "Order", Rect::new(0.0, 0.0, 80.0, 40.0));

        let err = bridge
            .link_started(&project, diagram, Id::new("node-99"), Point::new(0.0, 0.0))
            .expect_err("unknown source");
        assert!(matches!(err, ArmillaryError::MissingEntity { .. }));
        assert!(!bridge.link().is_drawing());
    }

    #[test]
    fn test_link_self_inheritance_rejected() {
        let (mut project, _, mut bridge, diagram) = setup();
        let (_, node) = place_class(&mut project, diagram, "Order", Rect::new(0.0, 0.0, 80.0, 40.0));

        bridge
            .link_started(&project, diagram, node, Point::new(0.0, 0.0))
            .expect("start");
        let err = bridge
            .link_completed(&mut project, Some(node), RelationKind::Inheritance)
            .expect_err("self inheritance");
        assert!(matches!(err, ArmillaryError::SelfInheritance { .. }));

        assert_eq!(project.registry().relations().count(), 0);
        assert!(project
            .diagram(diagram)
            .expect("diagram present")
            .edge_views(project.registry())
            .is_empty());
        assert_eq!(*bridge.link(), LinkSession::Idle);
    }

    #[test]
    fn test_link_self_association_allowed() {
        let (mut project, _, mut bridge, diagram) = setup();
        let (class, node) =
            place_class(&mut project, diagram, "Employee", Rect::new(0.0, 0.0, 80.0, 40.0));

        bridge
            .link_started(&project, diagram, node, Point::new(0.0, 0.0))
            .expect("start");
        let outcome = bridge
            .link_completed(&mut project, Some(node), RelationKind::Association)
            .expect("complete");

        let LinkOutcome::Committed { relation, .. } = outcome else {
            panic!("expected committed link");
        };
        let meta = project
            .registry()
            .relation(relation)
            .expect("relation present");
        assert_eq!(meta.source(), class);
        assert_eq!(meta.target(), class);
    }

    #[test]
    fn test_gesture_cancelled_abandons_link_drawing() {
        let (mut project, mut executor, mut bridge, diagram) = setup();
        let (_, node) = place_class(&mut project, diagram, "Order", Rect::new(0.0, 0.0, 80.0, 40.0));

        bridge
            .link_started(&project, diagram, node, Point::new(0.0, 0.0))
            .expect("start");
        assert!(bridge.gesture_cancelled(&mut project, &mut executor));
        assert!(!bridge.link().is_drawing());
        assert!(!bridge.link_moved(Point::new(10.0, 10.0)));
    }
}
