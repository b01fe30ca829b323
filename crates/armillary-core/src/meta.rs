//! Serializable metadata records for the class model.
//!
//! This module contains the vocabulary shared by every store and command:
//! - [`ClassMeta`] / [`ClassKind`] - A class of the domain model
//! - [`PackageMeta`] - A package grouping classes into a tree
//! - [`RelationMeta`] / [`RelationKind`] - A relation between two classes
//! - [`NodePlacement`] / [`EdgePlacement`] - Diagram-local placement records
//! - [`DiagramMeta`] - The persisted form of one diagram
//! - [`ProjectSnapshot`] - The persisted form of a whole project
//!
//! All records serialize with serde; identifiers appear as plain strings and
//! placement geometry flattens into `x`/`y`/`width`/`height` fields.

pub mod class;
pub mod diagram;
pub mod package;
pub mod relation;

pub use class::{ClassKind, ClassMeta};
pub use diagram::{DiagramMeta, EdgePlacement, NodePlacement};
pub use package::PackageMeta;
pub use relation::{RelationKind, RelationMeta};

use serde::{Deserialize, Serialize};

/// The persisted form of a whole project: registry contents plus every diagram.
///
/// Snapshots are plain data. Two snapshots compare equal exactly when the
/// models they were taken from are structurally identical, which is what the
/// undo round-trip guarantees are stated against.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    #[serde(default)]
    packages: Vec<PackageMeta>,
    #[serde(default)]
    classes: Vec<ClassMeta>,
    #[serde(default)]
    relations: Vec<RelationMeta>,
    #[serde(default)]
    diagrams: Vec<DiagramMeta>,
}

impl ProjectSnapshot {
    /// Create a snapshot from its four record collections.
    pub fn new(
        packages: Vec<PackageMeta>,
        classes: Vec<ClassMeta>,
        relations: Vec<RelationMeta>,
        diagrams: Vec<DiagramMeta>,
    ) -> Self {
        Self {
            packages,
            classes,
            relations,
            diagrams,
        }
    }

    /// Borrow the package records.
    pub fn packages(&self) -> &[PackageMeta] {
        &self.packages
    }

    /// Borrow the class records.
    pub fn classes(&self) -> &[ClassMeta] {
        &self.classes
    }

    /// Borrow the relation records.
    pub fn relations(&self) -> &[RelationMeta] {
        &self.relations
    }

    /// Borrow the diagram records.
    pub fn diagrams(&self) -> &[DiagramMeta] {
        &self.diagrams
    }
}
