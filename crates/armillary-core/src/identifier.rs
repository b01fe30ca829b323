//! Identifier management using string interning for efficient storage and comparison
//!
//! This module provides the [`Id`] type with an efficient string-interner based approach.
//! Identifiers name every addressable record in a model: classes, packages, relations,
//! diagrams and the placements inside them.

use std::{
    fmt,
    sync::{Mutex, OnceLock},
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Global string interner for efficient identifier storage.
///
/// # Thread Safety
///
/// This uses `Mutex` for thread-safe access to the string interner.
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

/// Efficient identifier type using string interning
///
/// This type provides efficient storage and comparison of string identifiers through
/// string interning. Identifiers are copyable and compare in O(1); the underlying
/// string is recovered through `Display`. Serde support serializes the plain string,
/// so persisted snapshots stay readable.
///
/// # Examples
///
/// ```
/// use armillary_core::identifier::Id;
///
/// // Create identifiers from names
/// let class_id = Id::new("Order");
/// let diagram_id = Id::new("D1");
///
/// // Mint generated identifiers from a counter
/// let minted = Id::generated("class", 7);
/// assert_eq!(minted, "class-7");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(DefaultSymbol);

impl Id {
    /// Creates an `Id` from &str.
    ///
    /// # Arguments
    ///
    /// * `name` - The string representation of the identifier
    ///
    /// # Examples
    ///
    /// ```
    /// use armillary_core::identifier::Id;
    ///
    /// let class_id = Id::new("Customer");
    /// let relation_id = Id::new("relation-3");
    /// ```
    pub fn new(name: &str) -> Self {
        let mut interner = INTERNER
            .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
            .lock()
            .expect("Failed to acquire interner lock");
        let symbol = interner.get_or_intern(name);
        Self(symbol)
    }

    /// Creates a generated `Id` from a kind prefix and a counter value.
    ///
    /// Stores mint fresh identifiers by combining a per-kind prefix with a
    /// monotonic counter, so generated ids read as `class-1` or `node-12`
    /// and stay stable across undo/redo.
    ///
    /// # Arguments
    ///
    /// * `prefix` - The kind prefix, e.g. `"class"` or `"node"`.
    /// * `counter` - A unique counter value for that prefix.
    ///
    /// # Examples
    ///
    /// ```
    /// use armillary_core::identifier::Id;
    ///
    /// let id = Id::generated("node", 12);
    /// assert_eq!(id, "node-12");
    /// ```
    pub fn generated(prefix: &str, counter: u64) -> Self {
        let name = format!("{prefix}-{counter}");
        Self::new(&name)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let interner = INTERNER
            .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
            .lock()
            .expect("Failed to acquire interner lock");
        let str_value = interner
            .resolve(self.0)
            .expect("Symbol should exist in interner");
        write!(f, "{}", str_value)
    }
}

impl std::str::FromStr for Id {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut interner = INTERNER
            .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
            .lock()
            .expect("Failed to acquire interner lock");
        let symbol = interner.get_or_intern(s);
        Ok(Self(symbol))
    }
}

impl From<&str> for Id {
    /// Creates an `Id` from a string slice
    ///
    /// This is a convenience implementation that calls `Id::new`.
    ///
    /// # Examples
    ///
    /// ```
    /// use armillary_core::identifier::Id;
    ///
    /// let id: Id = "Order".into();
    /// assert_eq!(id, "Order");
    /// ```
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for Id {
    /// Allows direct comparison with string slices: `id == "string"`
    ///
    /// # Examples
    ///
    /// ```
    /// use armillary_core::identifier::Id;
    ///
    /// let id = Id::new("Order");
    /// assert!(id == "Order");
    /// ```
    fn eq(&self, other: &str) -> bool {
        let interner = INTERNER
            .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
            .lock()
            .expect("Failed to acquire interner lock");
        let self_str = interner
            .resolve(self.0)
            .expect("Symbol should exist in interner");
        self_str == other
    }
}

impl PartialEq<&str> for Id {
    /// Allows direct comparison with string references: `id == &string`
    ///
    /// # Examples
    ///
    /// ```
    /// use armillary_core::identifier::Id;
    ///
    /// let id = Id::new("Order");
    /// let name = "Order";
    /// assert!(id == name);
    /// ```
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl Serialize for Id {
    /// Serializes the identifier as its plain string form.
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Id {
    /// Deserializes an identifier from a string, interning it on the way in.
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Ok(Self::new(&name))
    }
}
