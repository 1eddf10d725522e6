//! Scalar attribute definitions for entities.

use super::types::ScalarType;
use rkyv::{Archive, Deserialize, Serialize};

/// A scalar attribute within an entity descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize)]
pub struct AttributeDef {
    /// Attribute name.
    pub name: String,
    /// Scalar data type.
    pub scalar: ScalarType,
    /// Whether the attribute admits null.
    pub nullable: bool,
    /// Whether the persistence backend should enforce uniqueness.
    pub unique: bool,
}

impl AttributeDef {
    /// Create a non-nullable attribute.
    pub fn new(name: impl Into<String>, scalar: ScalarType) -> Self {
        Self {
            name: name.into(),
            scalar,
            nullable: false,
            unique: false,
        }
    }

    /// Create a nullable attribute.
    pub fn optional(name: impl Into<String>, scalar: ScalarType) -> Self {
        Self {
            name: name.into(),
            scalar,
            nullable: true,
            unique: false,
        }
    }

    /// Mark the attribute as unique.
    pub fn with_unique(mut self) -> Self {
        self.unique = true;
        self
    }
}
