//! The immutable relationship model.

use std::collections::HashMap;

use super::relationship::{Relationship, SlotSide};
use crate::catalog::{DescriptorRegistry, EntityDescriptor};
use crate::error::Error;
use rkyv::{Archive, Deserialize, Serialize};

/// The complete resolved model: sealed registry plus relationships.
///
/// Built once by [`super::ModelBuilder`], then read-only; it can be shared
/// across threads behind an `Arc` without further synchronization.
#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
pub struct RelationshipModel {
    /// The sealed entity descriptor registry.
    pub registry: DescriptorRegistry,
    /// Resolved relationships keyed by identifier.
    pub relationships: HashMap<String, Relationship>,
    /// Upper bound on cascade-delete recursion depth.
    pub max_cascade_depth: u32,
}

impl RelationshipModel {
    pub(crate) fn new(
        registry: DescriptorRegistry,
        relationships: Vec<Relationship>,
        max_cascade_depth: u32,
    ) -> Self {
        Self {
            registry,
            relationships: relationships
                .into_iter()
                .map(|r| (r.id.clone(), r))
                .collect(),
            max_cascade_depth,
        }
    }

    /// Get a relationship by identifier.
    pub fn relationship(&self, id: &str) -> Option<&Relationship> {
        self.relationships.get(id)
    }

    /// Iterate all relationships.
    pub fn relationships(&self) -> impl Iterator<Item = &Relationship> {
        self.relationships.values()
    }

    /// All relationships touching the given entity type, on either side.
    pub fn relationships_for(&self, entity: &str) -> Vec<&Relationship> {
        self.relationships
            .values()
            .filter(|r| r.principal == entity || r.dependent == entity)
            .collect()
    }

    /// Relationships where the given entity type is the principal.
    pub fn relationships_where_principal(&self, entity: &str) -> Vec<&Relationship> {
        self.relationships
            .values()
            .filter(|r| r.principal == entity)
            .collect()
    }

    /// Relationships where the given entity type is the dependent.
    pub fn relationships_where_dependent(&self, entity: &str) -> Vec<&Relationship> {
        self.relationships
            .values()
            .filter(|r| r.dependent == entity)
            .collect()
    }

    /// Resolve a navigation slot to its relationship and side.
    pub fn relationship_for_slot(
        &self,
        entity: &str,
        slot: &str,
    ) -> Option<(&Relationship, SlotSide)> {
        self.relationships.values().find_map(|r| {
            if r.principal == entity && r.principal_slot.as_deref() == Some(slot) {
                Some((r, SlotSide::Principal))
            } else if r.dependent == entity && r.dependent_slot.as_deref() == Some(slot) {
                Some((r, SlotSide::Dependent))
            } else {
                None
            }
        })
    }

    /// Get an entity descriptor by type name.
    pub fn descriptor(&self, entity: &str) -> Option<&EntityDescriptor> {
        self.registry.get(entity)
    }

    /// Serialize the model to bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        rkyv::to_bytes::<rkyv::rancor::Error>(self)
            .map(|v| v.to_vec())
            .map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserialize a model from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        rkyv::from_bytes::<Self, rkyv::rancor::Error>(bytes)
            .map_err(|e| Error::Deserialization(e.to_string()))
    }

    /// Content fingerprint of the model, hex encoded.
    ///
    /// Persistence backends use this to detect that the model they derived
    /// schema from has changed.
    pub fn fingerprint(&self) -> Result<String, Error> {
        let bytes = self.to_bytes()?;
        Ok(blake3::hash(&bytes).to_hex().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AttributeDef, Cardinality, NavigationDef, ScalarType};
    use crate::model::ModelBuilder;

    fn sample_model() -> RelationshipModel {
        ModelBuilder::new()
            .with_entity(
                EntityDescriptor::new("Department", "DeptId")
                    .with_attribute(AttributeDef::new("DeptId", ScalarType::Uuid))
                    .with_navigation(NavigationDef::collection("employees", "Employee")),
            )
            .with_entity(
                EntityDescriptor::new("Employee", "Id")
                    .with_attribute(AttributeDef::new("Id", ScalarType::Uuid))
                    .with_navigation(NavigationDef::single("department", "Department")),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn test_lookup_surface() {
        let model = sample_model();

        assert_eq!(model.relationships.len(), 1);
        let rel = model.relationships().next().unwrap();
        assert_eq!(rel.cardinality, Cardinality::OneToMany);
        assert!(model.relationship(&rel.id).is_some());
        assert_eq!(model.relationships_for("Department").len(), 1);
        assert_eq!(model.relationships_where_principal("Department").len(), 1);
        assert_eq!(model.relationships_where_dependent("Employee").len(), 1);
        assert!(model.descriptor("Department").is_some());
        assert!(model.descriptor("Ghost").is_none());
    }

    #[test]
    fn test_relationship_for_slot_resolves_both_sides() {
        let model = sample_model();

        let (rel, side) = model.relationship_for_slot("Department", "employees").unwrap();
        assert_eq!(rel.principal, "Department");
        assert_eq!(side, SlotSide::Principal);

        let (_, side) = model.relationship_for_slot("Employee", "department").unwrap();
        assert_eq!(side, SlotSide::Dependent);

        assert!(model.relationship_for_slot("Employee", "nope").is_none());
    }

    #[test]
    fn test_snapshot_roundtrip_and_fingerprint() {
        let model = sample_model();

        let bytes = model.to_bytes().unwrap();
        let decoded = RelationshipModel::from_bytes(&bytes).unwrap();
        assert_eq!(model, decoded);

        let fp = model.fingerprint().unwrap();
        assert_eq!(fp.len(), 64);
        assert_eq!(fp, decoded.fingerprint().unwrap());
    }
}
