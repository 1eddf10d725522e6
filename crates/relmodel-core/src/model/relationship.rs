//! Resolved relationship definitions.

use crate::catalog::{Cardinality, DeleteBehavior};
use rkyv::{Archive, Deserialize, Serialize};

/// Which side of a relationship a navigation slot sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotSide {
    /// The referenced side; holds no foreign key.
    Principal,
    /// The side holding the foreign-key attribute.
    Dependent,
}

/// The synthesized join association backing a many-to-many relationship.
///
/// Carries one foreign key per endpoint; the persistence backend turns it
/// into a join table.
#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize)]
pub struct JoinAssociation {
    /// Association name, synthesized from the two endpoint type names.
    pub name: String,
    /// Foreign-key attribute referencing the principal-side endpoint.
    pub principal_foreign_key: String,
    /// Foreign-key attribute referencing the dependent-side endpoint.
    pub dependent_foreign_key: String,
}

/// A fully resolved relationship between two entity types.
#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize)]
pub struct Relationship {
    /// Deterministic identifier, unique within the model.
    pub id: String,
    /// Principal entity type (referenced side).
    pub principal: String,
    /// Dependent entity type (foreign-key holder; the "left" endpoint for
    /// many-to-many).
    pub dependent: String,
    /// Relationship cardinality.
    pub cardinality: Cardinality,
    /// Resolved foreign-key attribute name on the dependent.
    /// Absent for many-to-many.
    pub foreign_key: Option<String>,
    /// Whether the foreign-key attribute admits null.
    pub foreign_key_nullable: bool,
    /// Navigation slot on the principal, if any.
    pub principal_slot: Option<String>,
    /// Navigation slot on the dependent, if any.
    pub dependent_slot: Option<String>,
    /// Whether a dependent must always have a principal.
    pub required: bool,
    /// Delete behavior applied to dependents.
    pub on_delete: DeleteBehavior,
    /// Join association for many-to-many relationships.
    pub join: Option<JoinAssociation>,
}

impl Relationship {
    /// Check if this is a many-to-many relationship.
    pub fn is_many_to_many(&self) -> bool {
        self.cardinality == Cardinality::ManyToMany
    }

    /// The slot on the given side, if one exists.
    pub fn slot(&self, side: SlotSide) -> Option<&str> {
        match side {
            SlotSide::Principal => self.principal_slot.as_deref(),
            SlotSide::Dependent => self.dependent_slot.as_deref(),
        }
    }

    /// The entity type on the given side.
    pub fn endpoint(&self, side: SlotSide) -> &str {
        match side {
            SlotSide::Principal => &self.principal,
            SlotSide::Dependent => &self.dependent,
        }
    }
}

/// Synthesize the deterministic relationship identifier.
///
/// The hint is the dependent-side slot name when present, otherwise the
/// principal-side slot, otherwise the foreign-key attribute.
pub(crate) fn relationship_id(principal: &str, dependent: &str, hint: &str) -> String {
    format!(
        "{}_{}_{}",
        principal.to_lowercase(),
        hint.to_lowercase(),
        dependent.to_lowercase()
    )
}
