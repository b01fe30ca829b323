//! Armillary Core Types and Definitions
//!
//! This crate provides the foundational types and definitions for Armillary
//! class models. It includes:
//!
//! - **Identifiers**: Efficient string-interned identifiers ([`identifier::Id`])
//! - **Geometry**: Canvas placement primitives ([`geometry`] module)
//! - **Meta**: Serializable metadata records for classes, packages, relations,
//!   placements and snapshots ([`meta`] module)

pub mod geometry;
pub mod identifier;
pub mod meta;
