//! Navigation slot definitions and relationship vocabulary.

use rkyv::{Archive, Deserialize, Serialize};

/// Multiplicity of a navigation slot.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Archive, Serialize, Deserialize,
)]
pub enum Multiplicity {
    /// References at most one counterpart.
    Single,
    /// References any number of counterparts.
    Collection,
}

/// Cardinality of a resolved relationship.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Archive,
    Serialize,
    Deserialize,
    serde::Serialize,
    serde::Deserialize,
)]
pub enum Cardinality {
    /// One-to-one relationship (unique foreign key).
    OneToOne,
    /// One-to-many relationship (foreign key on the many side).
    OneToMany,
    /// Many-to-many relationship (synthesized join association).
    ManyToMany,
}

/// Behavior applied to dependents when their principal is deleted.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Archive,
    Serialize,
    Deserialize,
    serde::Serialize,
    serde::Deserialize,
)]
pub enum DeleteBehavior {
    /// Delete dependents recursively.
    Cascade,
    /// Prevent deletion while dependents exist.
    Restrict,
    /// Set the dependents' foreign key to null.
    SetNull,
}

/// A navigation slot within an entity descriptor.
///
/// Slots model in-memory references between entity types; discovery pairs
/// them into relationships and decides foreign-key placement.
#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize)]
pub struct NavigationDef {
    /// Slot name.
    pub name: String,
    /// Target entity type name.
    pub target: String,
    /// Single reference or collection.
    pub multiplicity: Multiplicity,
    /// Explicit foreign-key attribute name, overriding the convention.
    pub foreign_key: Option<String>,
    /// Explicit inverse slot name on the target type.
    pub inverse: Option<String>,
    /// Whether the relationship is required from this side.
    pub required: bool,
    /// Explicit delete-behavior override for the relationship.
    pub on_delete: Option<DeleteBehavior>,
}

impl NavigationDef {
    /// Create a single-valued navigation slot.
    pub fn single(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            multiplicity: Multiplicity::Single,
            foreign_key: None,
            inverse: None,
            required: false,
            on_delete: None,
        }
    }

    /// Create a collection navigation slot.
    pub fn collection(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            multiplicity: Multiplicity::Collection,
            foreign_key: None,
            inverse: None,
            required: false,
            on_delete: None,
        }
    }

    /// Override the conventional foreign-key attribute name.
    pub fn with_foreign_key(mut self, attribute: impl Into<String>) -> Self {
        self.foreign_key = Some(attribute.into());
        self
    }

    /// Name the inverse slot on the target type.
    pub fn with_inverse(mut self, slot: impl Into<String>) -> Self {
        self.inverse = Some(slot.into());
        self
    }

    /// Mark the relationship as required from this side.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Override the delete behavior for the resolved relationship.
    pub fn with_on_delete(mut self, behavior: DeleteBehavior) -> Self {
        self.on_delete = Some(behavior);
        self
    }

    /// Check whether this is a collection slot.
    pub fn is_collection(&self) -> bool {
        self.multiplicity == Multiplicity::Collection
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_builder_chain() {
        let slot = NavigationDef::single("department", "Department")
            .with_foreign_key("DeptRef")
            .with_inverse("employees")
            .required()
            .with_on_delete(DeleteBehavior::Restrict);

        assert_eq!(slot.name, "department");
        assert_eq!(slot.target, "Department");
        assert_eq!(slot.multiplicity, Multiplicity::Single);
        assert_eq!(slot.foreign_key.as_deref(), Some("DeptRef"));
        assert_eq!(slot.inverse.as_deref(), Some("employees"));
        assert!(slot.required);
        assert_eq!(slot.on_delete, Some(DeleteBehavior::Restrict));
    }

    #[test]
    fn test_collection_slot() {
        let slot = NavigationDef::collection("employees", "Employee");

        assert!(slot.is_collection());
        assert!(!slot.required);
        assert!(slot.foreign_key.is_none());
    }
}
