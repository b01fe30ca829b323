//! Error types for Armillary operations.
//!
//! This module provides the main error type [`ArmillaryError`]. Every failure
//! here means a rejected edit: commands validate their references before any
//! mutation, so an error never leaves a partially applied change behind.

use thiserror::Error;

use armillary_core::{geometry::Rect, identifier::Id};

/// The kind of record an identifier failed to resolve against.
///
/// Used in error messages to say what a missing or duplicated id was
/// expected to name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// A class in the registry
    Class,
    /// A package in the registry
    Package,
    /// A relation in the registry
    Relation,
    /// A diagram in the project
    Diagram,
    /// A node placement in a diagram
    Node,
    /// An edge placement in a diagram
    Edge,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EntityKind::Class => "class",
            EntityKind::Package => "package",
            EntityKind::Relation => "relation",
            EntityKind::Diagram => "diagram",
            EntityKind::Node => "node",
            EntityKind::Edge => "edge",
        };
        write!(f, "{s}")
    }
}

/// The main error type for Armillary operations.
///
/// # Referential Variants
///
/// `MissingEntity` is the referential failure: an operation named an id that
/// does not resolve. It is raised at command construction time, before any
/// store is touched.
#[derive(Debug, Error)]
pub enum ArmillaryError {
    #[error("unknown {kind} id: {id}")]
    MissingEntity { kind: EntityKind, id: Id },

    #[error("duplicate {kind} id: {id}")]
    DuplicateId { kind: EntityKind, id: Id },

    #[error("invalid geometry: {rect:?}")]
    InvalidGeometry { rect: Rect },

    #[error("package {id} still contains classes or packages")]
    PackageNotEmpty { id: Id },

    #[error("package {id} cannot become its own descendant")]
    PackageCycle { id: Id },

    #[error("class {class} is already placed in diagram {diagram}")]
    ClassAlreadyPlaced { diagram: Id, class: Id },

    #[error("edge endpoint {node} is not placed in diagram {diagram}")]
    EdgeEndpointMissing { diagram: Id, node: Id },

    #[error("class {class} cannot inherit from itself")]
    SelfInheritance { class: Id },
}

impl ArmillaryError {
    /// Create a `MissingEntity` error for the given kind and id.
    pub fn missing(kind: EntityKind, id: Id) -> Self {
        Self::MissingEntity { kind, id }
    }

    /// Create a `DuplicateId` error for the given kind and id.
    pub fn duplicate(kind: EntityKind, id: Id) -> Self {
        Self::DuplicateId { kind, id }
    }
}
