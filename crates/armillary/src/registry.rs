//! The domain registry: canonical store of classes, packages and relations.
//!
//! The registry owns every domain entity independently of any diagram.
//! Diagrams reference these entities by id and never copy them, which is what
//! keeps a rename visible in every diagram at once. The registry holds no
//! diagram references in return; cascading cleanup after a class deletion is
//! the caller's job (see `Project::delete_class`), avoiding circular
//! ownership between the two stores.
//!
//! All lookups are O(1) by id. Iteration follows insertion order, so
//! persisted snapshots are stable across runs.

use indexmap::IndexMap;
use log::debug;

use armillary_core::{
    identifier::Id,
    meta::{ClassKind, ClassMeta, PackageMeta, RelationKind, RelationMeta},
};

use crate::error::{ArmillaryError, EntityKind};

/// Canonical store of classes, packages and relations.
///
/// Entities are created with explicit metadata records, updated through
/// field-wise patches and deleted softly (deleting an absent id is a no-op).
/// Fresh identifiers are minted from a registry-owned counter via the
/// `allocate_*_id` methods, skipping ids already taken by caller-supplied
/// records.
#[derive(Debug, Default)]
pub struct Registry {
    classes: IndexMap<Id, ClassMeta>,
    packages: IndexMap<Id, PackageMeta>,
    relations: IndexMap<Id, RelationMeta>,
    next_id: u64,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a fresh class id.
    pub fn allocate_class_id(&mut self) -> Id {
        loop {
            let id = Id::generated("class", self.next_id);
            self.next_id += 1;
            if !self.classes.contains_key(&id) {
                return id;
            }
        }
    }

    /// Mint a fresh package id.
    pub fn allocate_package_id(&mut self) -> Id {
        loop {
            let id = Id::generated("package", self.next_id);
            self.next_id += 1;
            if !self.packages.contains_key(&id) {
                return id;
            }
        }
    }

    /// Mint a fresh relation id.
    pub fn allocate_relation_id(&mut self) -> Id {
        loop {
            let id = Id::generated("relation", self.next_id);
            self.next_id += 1;
            if !self.relations.contains_key(&id) {
                return id;
            }
        }
    }

    // =========================================================================
    // Classes
    // =========================================================================

    /// Create a class from its metadata record.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateId` if the id is already taken and `MissingEntity`
    /// if the owning package reference does not resolve. Nothing is stored
    /// on failure.
    pub fn create_class(&mut self, meta: ClassMeta) -> Result<Id, ArmillaryError> {
        let id = meta.id();
        if self.classes.contains_key(&id) {
            return Err(ArmillaryError::duplicate(EntityKind::Class, id));
        }
        if let Some(package) = meta.package() {
            if !self.packages.contains_key(&package) {
                return Err(ArmillaryError::missing(EntityKind::Package, package));
            }
        }

        debug!(class:% = id, name:% = meta.name(); "Created class");
        self.classes.insert(id, meta);
        Ok(id)
    }

    /// Apply a field-wise patch to a class.
    ///
    /// Property forms call this directly; the edit is atomic and not
    /// undoable through the command history.
    ///
    /// # Errors
    ///
    /// Returns `MissingEntity` if the class is unknown or if the patch moves
    /// the class into an unknown package. The class is untouched on failure.
    pub fn update_class(&mut self, id: Id, patch: ClassPatch) -> Result<(), ArmillaryError> {
        if !self.classes.contains_key(&id) {
            return Err(ArmillaryError::missing(EntityKind::Class, id));
        }
        if let Some(Some(package)) = patch.package {
            if !self.packages.contains_key(&package) {
                return Err(ArmillaryError::missing(EntityKind::Package, package));
            }
        }

        let meta = self
            .classes
            .get_mut(&id)
            .expect("class presence checked above");
        patch.apply_to(meta);
        debug!(class:% = id; "Updated class");
        Ok(())
    }

    /// Delete a class, returning its record.
    ///
    /// Deleting an absent id is a soft no-op returning `None`. This is a
    /// pure registry operation: placements and relations referencing the
    /// class are left for the caller to sweep.
    pub fn delete_class(&mut self, id: Id) -> Option<ClassMeta> {
        let removed = self.classes.shift_remove(&id);
        if removed.is_some() {
            debug!(class:% = id; "Deleted class");
        }
        removed
    }

    /// Look up a class by id.
    pub fn class(&self, id: Id) -> Option<&ClassMeta> {
        self.classes.get(&id)
    }

    /// Whether a class with the given id exists.
    pub fn contains_class(&self, id: Id) -> bool {
        self.classes.contains_key(&id)
    }

    /// Iterate over all classes in insertion order.
    pub fn classes(&self) -> impl Iterator<Item = &ClassMeta> {
        self.classes.values()
    }

    // =========================================================================
    // Packages
    // =========================================================================

    /// Create a package from its metadata record.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateId` if the id is already taken and `MissingEntity`
    /// if the parent reference does not resolve.
    pub fn create_package(&mut self, meta: PackageMeta) -> Result<Id, ArmillaryError> {
        let id = meta.id();
        if self.packages.contains_key(&id) {
            return Err(ArmillaryError::duplicate(EntityKind::Package, id));
        }
        if let Some(parent) = meta.parent() {
            if !self.packages.contains_key(&parent) {
                return Err(ArmillaryError::missing(EntityKind::Package, parent));
            }
        }

        debug!(package:% = id, name:% = meta.name(); "Created package");
        self.packages.insert(id, meta);
        Ok(id)
    }

    /// Apply a field-wise patch to a package.
    ///
    /// # Errors
    ///
    /// Returns `MissingEntity` for an unknown package or parent, and
    /// `PackageCycle` if the new parent chain would run back through the
    /// package itself. The package is untouched on failure.
    pub fn update_package(&mut self, id: Id, patch: PackagePatch) -> Result<(), ArmillaryError> {
        if !self.packages.contains_key(&id) {
            return Err(ArmillaryError::missing(EntityKind::Package, id));
        }
        if let Some(Some(parent)) = patch.parent {
            if !self.packages.contains_key(&parent) {
                return Err(ArmillaryError::missing(EntityKind::Package, parent));
            }
            if parent == id || self.is_descendant(parent, id) {
                return Err(ArmillaryError::PackageCycle { id });
            }
        }

        let meta = self
            .packages
            .get_mut(&id)
            .expect("package presence checked above");
        patch.apply_to(meta);
        debug!(package:% = id; "Updated package");
        Ok(())
    }

    /// Delete a package, returning its record.
    ///
    /// Deleting an absent id is a soft no-op returning `None`.
    ///
    /// # Errors
    ///
    /// Returns `PackageNotEmpty` while classes or child packages still
    /// reference the package. Move them out first.
    pub fn delete_package(&mut self, id: Id) -> Result<Option<PackageMeta>, ArmillaryError> {
        if !self.packages.contains_key(&id) {
            return Ok(None);
        }
        let occupied = self.classes.values().any(|c| c.package() == Some(id))
            || self.packages.values().any(|p| p.parent() == Some(id));
        if occupied {
            return Err(ArmillaryError::PackageNotEmpty { id });
        }

        debug!(package:% = id; "Deleted package");
        Ok(self.packages.shift_remove(&id))
    }

    /// Look up a package by id.
    pub fn package(&self, id: Id) -> Option<&PackageMeta> {
        self.packages.get(&id)
    }

    /// Look up a package name by id, for joining into node projections.
    pub fn package_name(&self, id: Id) -> Option<&str> {
        self.packages.get(&id).map(|p| p.name())
    }

    /// Iterate over all packages in insertion order.
    pub fn packages(&self) -> impl Iterator<Item = &PackageMeta> {
        self.packages.values()
    }

    /// Whether `candidate` sits somewhere below `ancestor` in the package tree.
    fn is_descendant(&self, candidate: Id, ancestor: Id) -> bool {
        let mut current = self.packages.get(&candidate).and_then(|p| p.parent());
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.packages.get(&parent).and_then(|p| p.parent());
        }
        false
    }

    // =========================================================================
    // Relations
    // =========================================================================

    /// Create a relation from its metadata record.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateId` if the id is already taken, `MissingEntity` if
    /// either endpoint class does not resolve, and `SelfInheritance` for an
    /// inheritance relation from a class to itself.
    pub fn create_relation(&mut self, meta: RelationMeta) -> Result<Id, ArmillaryError> {
        let id = meta.id();
        if self.relations.contains_key(&id) {
            return Err(ArmillaryError::duplicate(EntityKind::Relation, id));
        }
        for endpoint in [meta.source(), meta.target()] {
            if !self.classes.contains_key(&endpoint) {
                return Err(ArmillaryError::missing(EntityKind::Class, endpoint));
            }
        }
        if meta.kind() == RelationKind::Inheritance && meta.source() == meta.target() {
            return Err(ArmillaryError::SelfInheritance {
                class: meta.source(),
            });
        }

        debug!(relation:% = id, kind:% = meta.kind(); "Created relation");
        self.relations.insert(id, meta);
        Ok(id)
    }

    /// Apply a field-wise patch to a relation.
    ///
    /// # Errors
    ///
    /// Returns `MissingEntity` if the relation is unknown, and
    /// `SelfInheritance` if the patch would turn a self-association into an
    /// inheritance.
    pub fn update_relation(&mut self, id: Id, patch: RelationPatch) -> Result<(), ArmillaryError> {
        let Some(meta) = self.relations.get(&id) else {
            return Err(ArmillaryError::missing(EntityKind::Relation, id));
        };
        if patch.kind == Some(RelationKind::Inheritance) && meta.source() == meta.target() {
            return Err(ArmillaryError::SelfInheritance {
                class: meta.source(),
            });
        }

        let meta = self
            .relations
            .get_mut(&id)
            .expect("relation presence checked above");
        patch.apply_to(meta);
        debug!(relation:% = id; "Updated relation");
        Ok(())
    }

    /// Delete a relation, returning its record.
    ///
    /// Deleting an absent id is a soft no-op returning `None`.
    pub fn delete_relation(&mut self, id: Id) -> Option<RelationMeta> {
        let removed = self.relations.shift_remove(&id);
        if removed.is_some() {
            debug!(relation:% = id; "Deleted relation");
        }
        removed
    }

    /// Look up a relation by id.
    pub fn relation(&self, id: Id) -> Option<&RelationMeta> {
        self.relations.get(&id)
    }

    /// Iterate over all relations in insertion order.
    pub fn relations(&self) -> impl Iterator<Item = &RelationMeta> {
        self.relations.values()
    }

    /// Iterate over the relations touching the given class on either end.
    pub fn relations_touching(&self, class: Id) -> impl Iterator<Item = &RelationMeta> {
        self.relations.values().filter(move |r| r.touches(class))
    }
}

/// A field-wise patch for [`ClassMeta`].
///
/// Unset fields leave the class unchanged. Optional attributes use a nested
/// `Option` so a patch can distinguish "leave as is" from "clear".
#[derive(Debug, Clone, Default)]
pub struct ClassPatch {
    name: Option<String>,
    kind: Option<ClassKind>,
    package: Option<Option<Id>>,
    table_name: Option<Option<String>>,
    root: Option<bool>,
    enum_values: Option<Vec<String>>,
    description: Option<Option<String>>,
}

impl ClassPatch {
    /// Create an empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rename the class.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Change the class kind.
    pub fn with_kind(mut self, kind: ClassKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Move the class to another package, or clear the reference with `None`.
    pub fn with_package(mut self, package: Option<Id>) -> Self {
        self.package = Some(package);
        self
    }

    /// Change or clear the persistence table name.
    pub fn with_table_name(mut self, table_name: Option<String>) -> Self {
        self.table_name = Some(table_name);
        self
    }

    /// Change the root marker.
    pub fn with_root(mut self, root: bool) -> Self {
        self.root = Some(root);
        self
    }

    /// Replace the enum member list.
    pub fn with_enum_values(mut self, enum_values: Vec<String>) -> Self {
        self.enum_values = Some(enum_values);
        self
    }

    /// Change or clear the description.
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = Some(description);
        self
    }

    fn apply_to(self, meta: &mut ClassMeta) {
        if let Some(name) = self.name {
            meta.set_name(name);
        }
        if let Some(kind) = self.kind {
            meta.set_kind(kind);
        }
        if let Some(package) = self.package {
            meta.set_package(package);
        }
        if let Some(table_name) = self.table_name {
            meta.set_table_name(table_name);
        }
        if let Some(root) = self.root {
            meta.set_root(root);
        }
        if let Some(enum_values) = self.enum_values {
            meta.set_enum_values(enum_values);
        }
        if let Some(description) = self.description {
            meta.set_description(description);
        }
    }
}

/// A field-wise patch for [`PackageMeta`].
#[derive(Debug, Clone, Default)]
pub struct PackagePatch {
    name: Option<String>,
    parent: Option<Option<Id>>,
}

impl PackagePatch {
    /// Create an empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rename the package.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Re-parent the package, or make it top-level with `None`.
    pub fn with_parent(mut self, parent: Option<Id>) -> Self {
        self.parent = Some(parent);
        self
    }

    fn apply_to(self, meta: &mut PackageMeta) {
        if let Some(name) = self.name {
            meta.set_name(name);
        }
        if let Some(parent) = self.parent {
            meta.set_parent(parent);
        }
    }
}

/// A field-wise patch for [`RelationMeta`].
///
/// Endpoints are not patchable: a relation between different classes is a
/// different relation.
#[derive(Debug, Clone, Default)]
pub struct RelationPatch {
    kind: Option<RelationKind>,
    label: Option<Option<String>>,
    source_cardinality: Option<Option<String>>,
    target_cardinality: Option<Option<String>>,
}

impl RelationPatch {
    /// Create an empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Change the relation kind.
    pub fn with_kind(mut self, kind: RelationKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Change or clear the label.
    pub fn with_label(mut self, label: Option<String>) -> Self {
        self.label = Some(label);
        self
    }

    /// Change or clear the source-end cardinality annotation.
    pub fn with_source_cardinality(mut self, cardinality: Option<String>) -> Self {
        self.source_cardinality = Some(cardinality);
        self
    }

    /// Change or clear the target-end cardinality annotation.
    pub fn with_target_cardinality(mut self, cardinality: Option<String>) -> Self {
        self.target_cardinality = Some(cardinality);
        self
    }

    fn apply_to(self, meta: &mut RelationMeta) {
        if let Some(kind) = self.kind {
            meta.set_kind(kind);
        }
        if let Some(label) = self.label {
            meta.set_label(label);
        }
        if let Some(cardinality) = self.source_cardinality {
            meta.set_source_cardinality(cardinality);
        }
        if let Some(cardinality) = self.target_cardinality {
            meta.set_target_cardinality(cardinality);
        }
    }
}
