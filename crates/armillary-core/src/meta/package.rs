//! Package metadata records.

use serde::{Deserialize, Serialize};

use crate::identifier::Id;

/// The metadata record of a package.
///
/// Packages group classes and nest through the `parent` reference, forming a
/// tree. The registry rejects re-parenting that would introduce a cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageMeta {
    id: Id,
    name: String,
    #[serde(default)]
    parent: Option<Id>,
}

impl PackageMeta {
    /// Create a new top-level package with the given id and name.
    pub fn new(id: Id, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            parent: None,
        }
    }

    /// Set the parent package reference (builder style).
    pub fn with_parent(mut self, parent: Id) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Get the stable identifier of this package.
    pub fn id(&self) -> Id {
        self.id
    }

    /// Get the package name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the parent package reference, if any.
    pub fn parent(&self) -> Option<Id> {
        self.parent
    }

    /// Rename the package.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Move the package under another parent, or make it top-level with `None`.
    pub fn set_parent(&mut self, parent: Option<Id>) {
        self.parent = parent;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_meta_new() {
        let pkg = PackageMeta::new(Id::new("package-1"), "domain");

        assert_eq!(pkg.id(), "package-1");
        assert_eq!(pkg.name(), "domain");
        assert_eq!(pkg.parent(), None);
    }

    #[test]
    fn test_package_meta_with_parent() {
        let pkg = PackageMeta::new(Id::new("package-2"), "billing").with_parent(Id::new("package-1"));

        assert_eq!(pkg.parent(), Some(Id::new("package-1")));
    }

    #[test]
    fn test_package_meta_setters() {
        let mut pkg = PackageMeta::new(Id::new("package-3"), "temp");

        pkg.set_name("shipping");
        pkg.set_parent(Some(Id::new("package-1")));
        assert_eq!(pkg.name(), "shipping");
        assert_eq!(pkg.parent(), Some(Id::new("package-1")));

        pkg.set_parent(None);
        assert_eq!(pkg.parent(), None);
    }

    #[test]
    fn test_package_meta_serde_round_trip() {
        let pkg = PackageMeta::new(Id::new("package-4"), "core").with_parent(Id::new("package-1"));

        let json = serde_json::to_string(&pkg).expect("serialize package");
        let back: PackageMeta = serde_json::from_str(&json).expect("deserialize package");

        assert_eq!(back, pkg);
    }
}
