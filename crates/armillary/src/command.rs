//! Undoable editing commands.
//!
//! A [`Command`] is one user-visible editing step. Every variant carries the
//! state its inverse needs, captured at construction or at first apply,
//! never re-derived from later model state; commands in the history stay
//! correct even after other commands have run.
//!
//! Construction validates all entity references up front and fails without
//! touching the model. `apply` re-checks its preconditions before the first
//! mutation, so a failed apply leaves the project exactly as it was.

use log::debug;

use armillary_core::{
    geometry::Rect,
    identifier::Id,
    meta::{ClassMeta, NodePlacement},
};

use crate::{
    error::{ArmillaryError, EntityKind},
    project::Project,
};

/// One undoable editing step.
#[derive(Debug, Clone)]
pub enum Command {
    /// Create a class and place it on a diagram in one step.
    ///
    /// Undo removes the placement, then deletes the class unless some other
    /// diagram still shows it.
    CreateClass {
        diagram: Id,
        class: ClassMeta,
        node: Id,
        rect: Rect,
    },
    /// Place an already existing class on a diagram.
    ///
    /// Applying while the class is already placed is a recorded no-op, so
    /// undo never removes a placement this command did not insert.
    AddExisting {
        diagram: Id,
        class: Id,
        node: Id,
        rect: Rect,
        inserted: bool,
    },
    /// Overwrite the geometry of a placed node.
    ///
    /// The prior rectangle is captured at construction, before any of the
    /// gesture's mutations, so undo restores the pre-gesture state exactly.
    ChangeNodeGeometry {
        diagram: Id,
        node: Id,
        old_rect: Rect,
        new_rect: Rect,
    },
}

impl Command {
    /// Build a `CreateClass` command.
    ///
    /// The class record must carry a freshly allocated id (see
    /// `Registry::allocate_class_id`); the placement id is minted here.
    ///
    /// # Errors
    ///
    /// Returns `MissingEntity` if the diagram or the class's package is
    /// unknown and `DuplicateId` if the class id is already taken. Nothing
    /// is mutated on failure.
    pub fn create_class(
        project: &mut Project,
        diagram: Id,
        class: ClassMeta,
        rect: Rect,
    ) -> Result<Self, ArmillaryError> {
        debug_assert!(rect.is_valid(), "command built with invalid rect: {rect:?}");
        if project.registry().contains_class(class.id()) {
            return Err(ArmillaryError::duplicate(EntityKind::Class, class.id()));
        }
        if let Some(package) = class.package() {
            if project.registry().package(package).is_none() {
                return Err(ArmillaryError::missing(EntityKind::Package, package));
            }
        }
        let Some(target) = project.diagram_mut(diagram) else {
            return Err(ArmillaryError::missing(EntityKind::Diagram, diagram));
        };
        let node = target.allocate_node_id();

        Ok(Self::CreateClass {
            diagram,
            class,
            node,
            rect,
        })
    }

    /// Build an `AddExisting` command.
    ///
    /// # Errors
    ///
    /// Returns `MissingEntity` if the class or the diagram is unknown.
    pub fn add_existing(
        project: &mut Project,
        diagram: Id,
        class: Id,
        rect: Rect,
    ) -> Result<Self, ArmillaryError> {
        debug_assert!(rect.is_valid(), "command built with invalid rect: {rect:?}");
        if !project.registry().contains_class(class) {
            return Err(ArmillaryError::missing(EntityKind::Class, class));
        }
        let Some(target) = project.diagram_mut(diagram) else {
            return Err(ArmillaryError::missing(EntityKind::Diagram, diagram));
        };
        let node = target.allocate_node_id();

        Ok(Self::AddExisting {
            diagram,
            class,
            node,
            rect,
            inserted: false,
        })
    }

    /// Build a `ChangeNodeGeometry` command, capturing the current geometry.
    ///
    /// # Errors
    ///
    /// Returns `MissingEntity` if the diagram or the node placement is
    /// unknown.
    pub fn change_node_geometry(
        project: &Project,
        diagram: Id,
        node: Id,
        rect: Rect,
    ) -> Result<Self, ArmillaryError> {
        debug_assert!(rect.is_valid(), "command built with invalid rect: {rect:?}");
        let Some(target) = project.diagram(diagram) else {
            return Err(ArmillaryError::missing(EntityKind::Diagram, diagram));
        };
        let Some(placement) = target.node(node) else {
            return Err(ArmillaryError::missing(EntityKind::Node, node));
        };

        Ok(Self::ChangeNodeGeometry {
            diagram,
            node,
            old_rect: placement.rect(),
            new_rect: rect,
        })
    }

    /// Retarget the final geometry of a `ChangeNodeGeometry` mid-gesture.
    ///
    /// The captured prior geometry is left alone; only the rectangle the
    /// command will apply changes. No effect on other variants.
    pub fn set_target_rect(&mut self, rect: Rect) {
        match self {
            Self::ChangeNodeGeometry { new_rect, .. } => *new_rect = rect,
            _ => debug_assert!(false, "set_target_rect on a non-geometry command"),
        }
    }

    /// Get the id of the diagram this command targets.
    pub fn diagram(&self) -> Id {
        match self {
            Self::CreateClass { diagram, .. }
            | Self::AddExisting { diagram, .. }
            | Self::ChangeNodeGeometry { diagram, .. } => *diagram,
        }
    }

    /// Get the id of the node placement this command creates or mutates.
    pub fn node(&self) -> Id {
        match self {
            Self::CreateClass { node, .. }
            | Self::AddExisting { node, .. }
            | Self::ChangeNodeGeometry { node, .. } => *node,
        }
    }

    /// Short name for log output.
    pub fn label(&self) -> &'static str {
        match self {
            Self::CreateClass { .. } => "create_class",
            Self::AddExisting { .. } => "add_existing",
            Self::ChangeNodeGeometry { .. } => "change_node_geometry",
        }
    }

    /// Apply this command to the project.
    ///
    /// All preconditions are checked before the first mutation: a failed
    /// apply never leaves a half-done edit behind.
    ///
    /// # Errors
    ///
    /// Returns `MissingEntity` if a referenced entity has disappeared since
    /// construction, and the store-level duplicate errors if an id raced.
    pub fn apply(&mut self, project: &mut Project) -> Result<(), ArmillaryError> {
        match self {
            Self::CreateClass {
                diagram,
                class,
                node,
                rect,
            } => {
                let Some(target) = project.diagram(*diagram) else {
                    return Err(ArmillaryError::missing(EntityKind::Diagram, *diagram));
                };
                if target.contains_node(*node) {
                    return Err(ArmillaryError::duplicate(EntityKind::Node, *node));
                }
                if target.placement_of_class(class.id()).is_some() {
                    return Err(ArmillaryError::ClassAlreadyPlaced {
                        diagram: *diagram,
                        class: class.id(),
                    });
                }
                // Re-applying after an undo that kept the class (because
                // another diagram still showed it) only restores the
                // placement.
                if !project.registry().contains_class(class.id()) {
                    project.registry_mut().create_class(class.clone())?;
                }
                let target = project
                    .diagram_mut(*diagram)
                    .expect("diagram presence checked above");
                target.add_node(NodePlacement::new(*node, class.id(), *rect))?;
                Ok(())
            }
            Self::AddExisting {
                diagram,
                class,
                node,
                rect,
                inserted,
            } => {
                if !project.registry().contains_class(*class) {
                    return Err(ArmillaryError::missing(EntityKind::Class, *class));
                }
                let Some(target) = project.diagram_mut(*diagram) else {
                    return Err(ArmillaryError::missing(EntityKind::Diagram, *diagram));
                };
                if target.placement_of_class(*class).is_some() {
                    debug!(class:% = *class, diagram:% = *diagram; "Class already placed, skipping");
                    *inserted = false;
                    return Ok(());
                }
                target.add_node(NodePlacement::new(*node, *class, *rect))?;
                *inserted = true;
                Ok(())
            }
            Self::ChangeNodeGeometry {
                diagram,
                node,
                new_rect,
                ..
            } => {
                let Some(target) = project.diagram_mut(*diagram) else {
                    return Err(ArmillaryError::missing(EntityKind::Diagram, *diagram));
                };
                target.set_node_rect(*node, *new_rect)
            }
        }
    }

    /// Reverse this command.
    ///
    /// Undo is tolerant of entities that were deleted through direct
    /// operations after the apply; anything already gone is simply skipped.
    pub fn undo(&self, project: &mut Project) {
        match self {
            Self::CreateClass {
                diagram,
                class,
                node,
                ..
            } => {
                if let Some(target) = project.diagram_mut(*diagram) {
                    target.delete_node(*node);
                }
                if !project.class_in_use(class.id()) {
                    project.delete_class(class.id());
                }
            }
            Self::AddExisting {
                diagram,
                node,
                inserted,
                ..
            } => {
                if *inserted {
                    if let Some(target) = project.diagram_mut(*diagram) {
                        target.delete_node(*node);
                    }
                }
            }
            Self::ChangeNodeGeometry {
                diagram,
                node,
                old_rect,
                ..
            } => {
                if let Some(target) = project.diagram_mut(*diagram) {
                    if target.contains_node(*node) {
                        target
                            .set_node_rect(*node, *old_rect)
                            .expect("node presence checked above");
                    }
                }
            }
        }
    }
}
