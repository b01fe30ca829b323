//! Class metadata records.
//!
//! A class is the central entity of the domain model. Its record carries the
//! attributes edited through property forms: name, kind, owning package,
//! persistence table name, root marker, enum members and a free description.

use std::{
    fmt::{self, Display},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::identifier::Id;

/// The kind of a class, controlling which attributes are meaningful.
///
/// The names match external configuration strings (snake_case).
///
/// # Variants
///
/// - `Concrete` - An ordinary class backed by a table (default)
/// - `Enum` - An enumeration whose members are listed in `enum_values`
/// - `Interface` - An abstract interface with no storage of its own
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassKind {
    /// Ordinary class (default)
    #[default]
    Concrete,
    /// Enumeration class
    Enum,
    /// Interface class
    Interface,
}

impl FromStr for ClassKind {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "concrete" => Ok(Self::Concrete),
            "enum" => Ok(Self::Enum),
            "interface" => Ok(Self::Interface),
            _ => Err("Unsupported class kind"),
        }
    }
}

impl From<ClassKind> for &'static str {
    fn from(val: ClassKind) -> Self {
        match val {
            ClassKind::Concrete => "concrete",
            ClassKind::Enum => "enum",
            ClassKind::Interface => "interface",
        }
    }
}

impl Display for ClassKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: &'static str = (*self).into();
        write!(f, "{s}")
    }
}

/// The metadata record of a class.
///
/// The id is stable and immutable once assigned; every other attribute can be
/// edited. Classes are owned by the registry and referenced, never duplicated,
/// by any number of diagrams.
///
/// # Examples
///
/// ```
/// use armillary_core::{
///     identifier::Id,
///     meta::{ClassKind, ClassMeta},
/// };
///
/// let order = ClassMeta::new(Id::new("class-1"), "Order")
///     .with_table_name("orders")
///     .with_root(true);
///
/// assert_eq!(order.name(), "Order");
/// assert_eq!(order.kind(), ClassKind::Concrete);
/// assert_eq!(order.table_name(), Some("orders"));
/// assert!(order.root());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMeta {
    id: Id,
    name: String,
    #[serde(default)]
    kind: ClassKind,
    #[serde(default)]
    package: Option<Id>,
    #[serde(default)]
    table_name: Option<String>,
    #[serde(default)]
    root: bool,
    #[serde(default)]
    enum_values: Vec<String>,
    #[serde(default)]
    description: Option<String>,
}

impl ClassMeta {
    /// Create a new concrete class with the given id and name.
    pub fn new(id: Id, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            kind: ClassKind::default(),
            package: None,
            table_name: None,
            root: false,
            enum_values: Vec::new(),
            description: None,
        }
    }

    /// Set the class kind (builder style).
    pub fn with_kind(mut self, kind: ClassKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the owning package reference (builder style).
    pub fn with_package(mut self, package: Id) -> Self {
        self.package = Some(package);
        self
    }

    /// Set the persistence table name (builder style).
    pub fn with_table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = Some(table_name.into());
        self
    }

    /// Set the root marker (builder style).
    pub fn with_root(mut self, root: bool) -> Self {
        self.root = root;
        self
    }

    /// Set the enum member list (builder style).
    pub fn with_enum_values(mut self, enum_values: Vec<String>) -> Self {
        self.enum_values = enum_values;
        self
    }

    /// Set the free-form description (builder style).
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Get the stable identifier of this class.
    pub fn id(&self) -> Id {
        self.id
    }

    /// Get the class name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the class kind.
    pub fn kind(&self) -> ClassKind {
        self.kind
    }

    /// Get the owning package reference, if any.
    pub fn package(&self) -> Option<Id> {
        self.package
    }

    /// Get the persistence table name, if any.
    pub fn table_name(&self) -> Option<&str> {
        self.table_name.as_deref()
    }

    /// Whether this class is marked as an aggregate root.
    pub fn root(&self) -> bool {
        self.root
    }

    /// Borrow the enum member list.
    pub fn enum_values(&self) -> &[String] {
        &self.enum_values
    }

    /// Get the description, if any.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Rename the class.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Change the class kind.
    pub fn set_kind(&mut self, kind: ClassKind) {
        self.kind = kind;
    }

    /// Move the class to another package, or clear the reference with `None`.
    pub fn set_package(&mut self, package: Option<Id>) {
        self.package = package;
    }

    /// Change or clear the persistence table name.
    pub fn set_table_name(&mut self, table_name: Option<String>) {
        self.table_name = table_name;
    }

    /// Change the root marker.
    pub fn set_root(&mut self, root: bool) {
        self.root = root;
    }

    /// Replace the enum member list.
    pub fn set_enum_values(&mut self, enum_values: Vec<String>) {
        self.enum_values = enum_values;
    }

    /// Change or clear the description.
    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
    }
}
