//! Model builder: the one-shot pipeline from descriptors to a sealed model.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::discovery::{self, RelationshipSeed};
use super::foreign_key;
use super::model::RelationshipModel;
use super::{delete, relationship::Relationship};
use crate::catalog::{Cardinality, DeleteBehavior, DescriptorRegistry, EntityDescriptor};
use crate::error::BuildError;

/// Configuration for model building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuilderConfig {
    /// Cardinality assigned to relationships declared without navigation
    /// slots on either side. The documented convention is `OneToOne`;
    /// `OneToMany` is accepted, `ManyToMany` is rejected.
    pub navigationless_cardinality: Cardinality,
    /// Upper bound on cascade-delete recursion depth.
    pub max_cascade_depth: u32,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            navigationless_cardinality: Cardinality::OneToOne,
            max_cascade_depth: 100,
        }
    }
}

/// An explicitly declared relationship with no navigation slot on either
/// side, identified only by its foreign-key attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationlessRelationship {
    /// Principal entity type.
    pub principal: String,
    /// Dependent entity type (foreign-key holder).
    pub dependent: String,
    /// Foreign-key attribute name on the dependent.
    pub foreign_key: String,
    /// Whether a dependent must always have a principal.
    pub required: bool,
    /// Explicit delete-behavior override.
    pub on_delete: Option<DeleteBehavior>,
}

impl NavigationlessRelationship {
    /// Declare a navigationless relationship.
    pub fn new(
        principal: impl Into<String>,
        dependent: impl Into<String>,
        foreign_key: impl Into<String>,
    ) -> Self {
        Self {
            principal: principal.into(),
            dependent: dependent.into(),
            foreign_key: foreign_key.into(),
            required: false,
            on_delete: None,
        }
    }

    /// Mark the relationship as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Override the delete behavior.
    pub fn with_on_delete(mut self, behavior: DeleteBehavior) -> Self {
        self.on_delete = Some(behavior);
        self
    }
}

/// Builder for the relationship model.
///
/// Collects descriptors and explicit declarations, then `build` runs the
/// full pipeline: registration, sealing, discovery, foreign-key
/// resolution, and delete-behavior evaluation.
#[derive(Debug, Default)]
pub struct ModelBuilder {
    entities: Vec<EntityDescriptor>,
    navigationless: Vec<NavigationlessRelationship>,
    config: BuilderConfig,
}

impl ModelBuilder {
    /// Create an empty builder with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity descriptor.
    pub fn with_entity(mut self, descriptor: EntityDescriptor) -> Self {
        self.entities.push(descriptor);
        self
    }

    /// Add multiple entity descriptors.
    pub fn with_entities(
        mut self,
        descriptors: impl IntoIterator<Item = EntityDescriptor>,
    ) -> Self {
        self.entities.extend(descriptors);
        self
    }

    /// Declare a relationship with no navigation slots.
    pub fn with_navigationless(mut self, declaration: NavigationlessRelationship) -> Self {
        self.navigationless.push(declaration);
        self
    }

    /// Replace the builder configuration.
    pub fn with_config(mut self, config: BuilderConfig) -> Self {
        self.config = config;
        self
    }

    /// Run the build pipeline and produce the immutable model.
    pub fn build(self) -> Result<RelationshipModel, BuildError> {
        self.validate_config()?;

        let mut registry = DescriptorRegistry::new();
        for entity in self.entities {
            registry.register(entity)?;
        }
        registry.seal();

        let mut seeds = discovery::discover(&registry)?;
        for declaration in &self.navigationless {
            seeds.push(navigationless_seed(
                &registry,
                declaration,
                self.config.navigationless_cardinality,
            )?);
        }

        let mut relationships: Vec<Relationship> = foreign_key::resolve(&registry, &seeds)?;
        delete::evaluate(&mut relationships, &seeds)?;

        info!(
            entities = registry.len(),
            relationships = relationships.len(),
            "relationship model built"
        );
        Ok(RelationshipModel::new(
            registry,
            relationships,
            self.config.max_cascade_depth,
        ))
    }

    fn validate_config(&self) -> Result<(), BuildError> {
        if self.config.navigationless_cardinality == Cardinality::ManyToMany {
            return Err(BuildError::InvalidConfig {
                reason: "navigationless relationships cannot be many-to-many".into(),
            });
        }
        if self.config.max_cascade_depth == 0 {
            return Err(BuildError::InvalidConfig {
                reason: "max_cascade_depth must be at least 1".into(),
            });
        }
        Ok(())
    }
}

fn navigationless_seed(
    registry: &DescriptorRegistry,
    declaration: &NavigationlessRelationship,
    cardinality: Cardinality,
) -> Result<RelationshipSeed, BuildError> {
    registry.lookup(&declaration.principal)?;
    registry.lookup(&declaration.dependent)?;
    Ok(RelationshipSeed {
        principal: declaration.principal.clone(),
        dependent: declaration.dependent.clone(),
        cardinality,
        principal_slot: None,
        dependent_slot: None,
        required: declaration.required,
        foreign_key: Some(declaration.foreign_key.clone()),
        principal_on_delete: None,
        dependent_on_delete: declaration.on_delete,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AttributeDef, NavigationDef, ScalarType};

    fn department() -> EntityDescriptor {
        EntityDescriptor::new("Department", "DeptId")
            .with_attribute(AttributeDef::new("DeptId", ScalarType::Uuid))
    }

    fn employee() -> EntityDescriptor {
        EntityDescriptor::new("Employee", "Id")
            .with_attribute(AttributeDef::new("Id", ScalarType::Uuid))
    }

    #[test]
    fn test_build_produces_sealed_registry() {
        let model = ModelBuilder::new()
            .with_entities([
                department().with_navigation(NavigationDef::collection("employees", "Employee")),
                employee(),
            ])
            .build()
            .unwrap();

        assert!(model.registry.is_sealed());
        assert_eq!(model.relationships.len(), 1);
        assert_eq!(model.max_cascade_depth, 100);
    }

    #[test]
    fn test_navigationless_defaults_to_one_to_one() {
        let model = ModelBuilder::new()
            .with_entity(department())
            .with_entity(employee())
            .with_navigationless(NavigationlessRelationship::new(
                "Department",
                "Employee",
                "DeptRef",
            ))
            .build()
            .unwrap();

        let rel = model.relationships().next().unwrap();
        assert_eq!(rel.cardinality, Cardinality::OneToOne);
        assert_eq!(rel.foreign_key.as_deref(), Some("DeptRef"));
        assert!(rel.principal_slot.is_none());
        assert!(rel.dependent_slot.is_none());
    }

    #[test]
    fn test_navigationless_cardinality_is_configurable() {
        let model = ModelBuilder::new()
            .with_entity(department())
            .with_entity(employee())
            .with_navigationless(NavigationlessRelationship::new(
                "Department",
                "Employee",
                "DeptRef",
            ))
            .with_config(BuilderConfig {
                navigationless_cardinality: Cardinality::OneToMany,
                ..BuilderConfig::default()
            })
            .build()
            .unwrap();

        let rel = model.relationships().next().unwrap();
        assert_eq!(rel.cardinality, Cardinality::OneToMany);
    }

    #[test]
    fn test_many_to_many_navigationless_config_rejected() {
        let err = ModelBuilder::new()
            .with_entity(department())
            .with_config(BuilderConfig {
                navigationless_cardinality: Cardinality::ManyToMany,
                ..BuilderConfig::default()
            })
            .build()
            .unwrap_err();

        assert!(matches!(err, BuildError::InvalidConfig { .. }));
    }

    #[test]
    fn test_navigationless_unknown_endpoint_fails() {
        let err = ModelBuilder::new()
            .with_entity(department())
            .with_navigationless(NavigationlessRelationship::new(
                "Department",
                "Ghost",
                "DeptRef",
            ))
            .build()
            .unwrap_err();

        assert_eq!(
            err,
            BuildError::UnknownEntity {
                entity: "Ghost".into(),
            }
        );
    }

    #[test]
    fn test_duplicate_entities_fail_at_build() {
        let err = ModelBuilder::new()
            .with_entity(department())
            .with_entity(department())
            .build()
            .unwrap_err();

        assert!(matches!(err, BuildError::DuplicateEntity { .. }));
    }

    #[test]
    fn test_config_deserializes() {
        let config: BuilderConfig =
            serde_json::from_str(r#"{"navigationless_cardinality":"OneToMany","max_cascade_depth":16}"#)
                .unwrap();

        assert_eq!(config.navigationless_cardinality, Cardinality::OneToMany);
        assert_eq!(config.max_cascade_depth, 16);
    }
}
