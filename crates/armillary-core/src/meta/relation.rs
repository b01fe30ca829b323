//! Relation metadata records.

use std::{
    fmt::{self, Display},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::identifier::Id;

/// The kind of a relation between two classes.
///
/// The names match external configuration strings (snake_case).
///
/// # Variants
///
/// - `Association` - A plain association, optionally carrying cardinalities (default)
/// - `Inheritance` - Source class inherits from target class
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    /// Plain association (default)
    #[default]
    Association,
    /// Source inherits from target
    Inheritance,
}

impl FromStr for RelationKind {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "association" => Ok(Self::Association),
            "inheritance" => Ok(Self::Inheritance),
            _ => Err("Unsupported relation kind"),
        }
    }
}

impl From<RelationKind> for &'static str {
    fn from(val: RelationKind) -> Self {
        match val {
            RelationKind::Association => "association",
            RelationKind::Inheritance => "inheritance",
        }
    }
}

impl Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: &'static str = (*self).into();
        write!(f, "{s}")
    }
}

/// The metadata record of a relation.
///
/// Source and target are class ids that must resolve in the same registry.
/// Relations are registry-owned and independent of diagrams; a diagram shows a
/// relation through an edge placement referencing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationMeta {
    id: Id,
    source: Id,
    target: Id,
    #[serde(default)]
    kind: RelationKind,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    source_cardinality: Option<String>,
    #[serde(default)]
    target_cardinality: Option<String>,
}

impl RelationMeta {
    /// Create a new relation between two classes.
    pub fn new(id: Id, source: Id, target: Id, kind: RelationKind) -> Self {
        Self {
            id,
            source,
            target,
            kind,
            label: None,
            source_cardinality: None,
            target_cardinality: None,
        }
    }

    /// Set the relation label (builder style).
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set both cardinality annotations (builder style).
    pub fn with_cardinalities(
        mut self,
        source_cardinality: impl Into<String>,
        target_cardinality: impl Into<String>,
    ) -> Self {
        self.source_cardinality = Some(source_cardinality.into());
        self.target_cardinality = Some(target_cardinality.into());
        self
    }

    /// Get the stable identifier of this relation.
    pub fn id(&self) -> Id {
        self.id
    }

    /// Get the source class id.
    pub fn source(&self) -> Id {
        self.source
    }

    /// Get the target class id.
    pub fn target(&self) -> Id {
        self.target
    }

    /// Get the relation kind.
    pub fn kind(&self) -> RelationKind {
        self.kind
    }

    /// Get the label, if any.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Get the source-end cardinality annotation, if any.
    pub fn source_cardinality(&self) -> Option<&str> {
        self.source_cardinality.as_deref()
    }

    /// Get the target-end cardinality annotation, if any.
    pub fn target_cardinality(&self) -> Option<&str> {
        self.target_cardinality.as_deref()
    }

    /// Whether this relation touches the given class on either end.
    pub fn touches(&self, class: Id) -> bool {
        self.source == class || self.target == class
    }

    /// Change the relation kind.
    ///
    /// Endpoints stay fixed; stores asserting kind-specific rules (such as
    /// rejecting self-inheritance) must check before calling this.
    pub fn set_kind(&mut self, kind: RelationKind) {
        self.kind = kind;
    }

    /// Change or clear the label.
    pub fn set_label(&mut self, label: Option<String>) {
        self.label = label;
    }

    /// Change or clear the source-end cardinality annotation.
    pub fn set_source_cardinality(&mut self, cardinality: Option<String>) {
        self.source_cardinality = cardinality;
    }

    /// Change or clear the target-end cardinality annotation.
    pub fn set_target_cardinality(&mut self, cardinality: Option<String>) {
        self.target_cardinality = cardinality;
    }
}
