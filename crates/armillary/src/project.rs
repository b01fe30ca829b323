//! The project facade: one registry plus any number of diagrams.
//!
//! [`Project`] is the editing root that commands and gestures mutate. It
//! owns the [`Registry`] and the [`Diagram`] collection and implements the
//! operations that span both, most importantly the class-deletion cascade:
//! deleting a class also sweeps its relations and every placement of it on
//! every canvas, so no diagram is left pointing at a tombstone.
//!
//! Persistence goes through [`Project::to_persisted`] and
//! [`Project::from_persisted`]; the snapshot carries plain metadata records
//! and no editor state (history, live gestures and link sessions are not
//! part of a saved project).

use indexmap::IndexMap;
use log::{debug, info};

use armillary_core::{
    identifier::Id,
    meta::{ClassMeta, ProjectSnapshot},
};

use crate::{
    diagram::Diagram,
    error::{ArmillaryError, EntityKind},
    registry::Registry,
};

/// The editing root: domain registry plus diagram collection.
#[derive(Debug, Default)]
pub struct Project {
    registry: Registry,
    diagrams: IndexMap<Id, Diagram>,
    next_id: u64,
}

impl Project {
    /// Create an empty project.
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrow the domain registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Borrow the domain registry mutably.
    ///
    /// This is the documented direct-edit entry point for property forms:
    /// attribute edits bypass the command history and are atomic on their
    /// own.
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    // =========================================================================
    // Diagrams
    // =========================================================================

    /// Create an empty diagram with a freshly minted id.
    pub fn create_diagram(&mut self, name: impl Into<String>) -> Id {
        let id = loop {
            let id = Id::generated("diagram", self.next_id);
            self.next_id += 1;
            if !self.diagrams.contains_key(&id) {
                break id;
            }
        };
        let name = name.into();
        debug!(diagram:% = id, name:% = name; "Created diagram");
        self.diagrams.insert(id, Diagram::new(id, name));
        id
    }

    /// Add a diagram rebuilt from persisted state.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateId` if a diagram with this id already exists.
    pub fn add_diagram(&mut self, diagram: Diagram) -> Result<Id, ArmillaryError> {
        let id = diagram.id();
        if self.diagrams.contains_key(&id) {
            return Err(ArmillaryError::duplicate(EntityKind::Diagram, id));
        }
        self.diagrams.insert(id, diagram);
        Ok(id)
    }

    /// Look up a diagram by id.
    pub fn diagram(&self, id: Id) -> Option<&Diagram> {
        self.diagrams.get(&id)
    }

    /// Look up a diagram by id, mutably.
    pub fn diagram_mut(&mut self, id: Id) -> Option<&mut Diagram> {
        self.diagrams.get_mut(&id)
    }

    /// Iterate over all diagrams in creation order.
    pub fn diagrams(&self) -> impl Iterator<Item = &Diagram> {
        self.diagrams.values()
    }

    /// Delete a diagram with everything placed on it.
    ///
    /// Registry entities are untouched; only their placements go. Deleting
    /// an absent id is a soft no-op returning `None`.
    pub fn delete_diagram(&mut self, id: Id) -> Option<Diagram> {
        let removed = self.diagrams.shift_remove(&id);
        if removed.is_some() {
            debug!(diagram:% = id; "Deleted diagram");
        }
        removed
    }

    // =========================================================================
    // Cross-store operations
    // =========================================================================

    /// Whether any diagram currently shows the given class.
    pub fn class_in_use(&self, class: Id) -> bool {
        self.diagrams
            .values()
            .any(|d| d.placement_of_class(class).is_some())
    }

    /// Delete a class and cascade the cleanup.
    ///
    /// Sweeps every relation touching the class, the class's node placement
    /// in every diagram and, through the node removal, every edge placement
    /// attached to those nodes. A class placed in zero diagrams makes this a
    /// pure registry operation. Deleting an absent id is a soft no-op
    /// returning `None`.
    pub fn delete_class(&mut self, class: Id) -> Option<ClassMeta> {
        let removed = self.registry.delete_class(class)?;

        let doomed_relations: Vec<Id> = self
            .registry
            .relations_touching(class)
            .map(|r| r.id())
            .collect();
        for relation in &doomed_relations {
            self.registry.delete_relation(*relation);
        }

        let mut swept_placements = 0usize;
        for diagram in self.diagrams.values_mut() {
            if let Some(node) = diagram.placement_of_class(class).map(|p| p.id()) {
                diagram.delete_node(node);
                swept_placements += 1;
            }
        }

        info!(
            class:% = class,
            relations = doomed_relations.len(),
            placements = swept_placements;
            "Deleted class with cascade"
        );
        Some(removed)
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Assemble the serializable snapshot of the whole project.
    ///
    /// Records appear in insertion order, so saving an untouched project
    /// twice yields identical snapshots.
    pub fn to_persisted(&self) -> ProjectSnapshot {
        ProjectSnapshot::new(
            self.registry.packages().cloned().collect(),
            self.registry.classes().cloned().collect(),
            self.registry.relations().cloned().collect(),
            self.diagrams.values().map(|d| d.to_meta()).collect(),
        )
    }

    /// Rebuild a project from a snapshot.
    ///
    /// Records are loaded in snapshot order, which for snapshots produced by
    /// [`Project::to_persisted`] always satisfies the reference checks
    /// (parents precede children, endpoint classes precede relations).
    ///
    /// # Errors
    ///
    /// Returns the first referential or duplicate-id error found in the
    /// snapshot; the partially built project is discarded.
    pub fn from_persisted(snapshot: &ProjectSnapshot) -> Result<Self, ArmillaryError> {
        let mut project = Self::new();
        for package in snapshot.packages() {
            project.registry.create_package(package.clone())?;
        }
        for class in snapshot.classes() {
            project.registry.create_class(class.clone())?;
        }
        for relation in snapshot.relations() {
            project.registry.create_relation(relation.clone())?;
        }
        for meta in snapshot.diagrams() {
            project.add_diagram(Diagram::from_meta(meta))?;
        }
        info!(
            classes = snapshot.classes().len(),
            diagrams = snapshot.diagrams().len();
            "Loaded project snapshot"
        );
        Ok(project)
    }
}
