//! Foreign-key placement and naming.
//!
//! The convention: the foreign-key attribute on the dependent is named
//! after the principal type concatenated with the principal's key
//! attribute (`Department` + `DeptId` -> `DepartmentDeptId`). Explicit slot
//! overrides replace the convention; collisions on one dependent type are
//! build errors.

use std::collections::HashMap;

use super::discovery::RelationshipSeed;
use super::relationship::{relationship_id, JoinAssociation, Relationship};
use crate::catalog::{Cardinality, DeleteBehavior, DescriptorRegistry, EntityDescriptor};
use crate::error::BuildError;
use tracing::debug;

/// Resolve seeds into relationships with foreign keys placed and named.
///
/// Delete behavior is filled with a placeholder; the evaluator assigns the
/// final policy. Output order matches seed order.
pub(crate) fn resolve(
    registry: &DescriptorRegistry,
    seeds: &[RelationshipSeed],
) -> Result<Vec<Relationship>, BuildError> {
    let mut relationships = Vec::with_capacity(seeds.len());
    // (dependent type, FK attribute) -> relationship id
    let mut claimed: HashMap<(String, String), String> = HashMap::new();

    for seed in seeds {
        let principal = registry.lookup(&seed.principal)?;
        let dependent = registry.lookup(&seed.dependent)?;

        let relationship = if seed.cardinality == Cardinality::ManyToMany {
            resolve_many_to_many(seed, principal, dependent)
        } else {
            resolve_with_foreign_key(seed, principal, dependent, &mut claimed)?
        };
        debug!(
            id = %relationship.id,
            foreign_key = ?relationship.foreign_key,
            "resolved relationship"
        );
        relationships.push(relationship);
    }
    Ok(relationships)
}

/// Conventional foreign-key attribute name for a principal type.
fn default_foreign_key(principal: &EntityDescriptor) -> String {
    format!("{}{}", principal.name, principal.key_attribute)
}

fn resolve_many_to_many(
    seed: &RelationshipSeed,
    principal: &EntityDescriptor,
    dependent: &EntityDescriptor,
) -> Relationship {
    let hint = seed
        .dependent_slot
        .as_deref()
        .or(seed.principal_slot.as_deref())
        .unwrap_or("join");
    Relationship {
        id: relationship_id(&principal.name, &dependent.name, hint),
        principal: principal.name.clone(),
        dependent: dependent.name.clone(),
        cardinality: Cardinality::ManyToMany,
        foreign_key: None,
        foreign_key_nullable: false,
        principal_slot: seed.principal_slot.clone(),
        dependent_slot: seed.dependent_slot.clone(),
        required: false,
        on_delete: DeleteBehavior::Cascade,
        join: Some(JoinAssociation {
            name: format!("{}{}", principal.name, dependent.name),
            principal_foreign_key: default_foreign_key(principal),
            dependent_foreign_key: default_foreign_key(dependent),
        }),
    }
}

fn resolve_with_foreign_key(
    seed: &RelationshipSeed,
    principal: &EntityDescriptor,
    dependent: &EntityDescriptor,
    claimed: &mut HashMap<(String, String), String>,
) -> Result<Relationship, BuildError> {
    let foreign_key = seed
        .foreign_key
        .clone()
        .unwrap_or_else(|| default_foreign_key(principal));

    // A declared attribute fixes nullability and must match the principal
    // key type; an undeclared one is synthesized as a shadow attribute.
    let declared = dependent.attribute(&foreign_key);
    if let Some(attr) = declared {
        let principal_key = principal
            .key()
            .expect("registered descriptors always declare their key");
        if attr.scalar != principal_key.scalar {
            return Err(BuildError::ForeignKeyTypeMismatch {
                dependent: dependent.name.clone(),
                attribute: foreign_key,
                expected: principal_key.scalar.name().to_string(),
                found: attr.scalar.name().to_string(),
            });
        }
    }
    let foreign_key_nullable = !seed.required && declared.map_or(true, |a| a.nullable);

    let hint = seed
        .dependent_slot
        .as_deref()
        .or(seed.principal_slot.as_deref())
        .unwrap_or(&foreign_key);
    let id = relationship_id(&principal.name, &dependent.name, hint);

    let claim = (dependent.name.clone(), foreign_key.clone());
    if let Some(first) = claimed.get(&claim) {
        return Err(BuildError::ForeignKeyConflict {
            dependent: dependent.name.clone(),
            attribute: foreign_key,
            first: first.clone(),
            second: id,
        });
    }
    claimed.insert(claim, id.clone());

    Ok(Relationship {
        id,
        principal: principal.name.clone(),
        dependent: dependent.name.clone(),
        cardinality: seed.cardinality,
        foreign_key: Some(foreign_key),
        foreign_key_nullable,
        principal_slot: seed.principal_slot.clone(),
        dependent_slot: seed.dependent_slot.clone(),
        required: seed.required,
        on_delete: DeleteBehavior::SetNull,
        join: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AttributeDef, NavigationDef, ScalarType};
    use crate::model::discovery::discover;

    fn registry_with(entities: Vec<EntityDescriptor>) -> DescriptorRegistry {
        let mut registry = DescriptorRegistry::new();
        for e in entities {
            registry.register(e).unwrap();
        }
        registry.seal();
        registry
    }

    fn department() -> EntityDescriptor {
        EntityDescriptor::new("Department", "DeptId")
            .with_attribute(AttributeDef::new("DeptId", ScalarType::Uuid))
            .with_navigation(NavigationDef::collection("employees", "Employee"))
    }

    #[test]
    fn test_default_foreign_key_name() {
        let registry = registry_with(vec![
            department(),
            EntityDescriptor::new("Employee", "Id")
                .with_attribute(AttributeDef::new("Id", ScalarType::Uuid))
                .with_navigation(NavigationDef::single("department", "Department")),
        ]);

        let seeds = discover(&registry).unwrap();
        let rels = resolve(&registry, &seeds).unwrap();

        assert_eq!(rels.len(), 1);
        assert_eq!(rels[0].foreign_key.as_deref(), Some("DepartmentDeptId"));
        assert!(rels[0].foreign_key_nullable);
    }

    #[test]
    fn test_explicit_override_replaces_default() {
        let registry = registry_with(vec![
            department(),
            EntityDescriptor::new("Employee", "Id")
                .with_attribute(AttributeDef::new("Id", ScalarType::Uuid))
                .with_navigation(
                    NavigationDef::single("department", "Department").with_foreign_key("DeptRef"),
                ),
        ]);

        let seeds = discover(&registry).unwrap();
        let rels = resolve(&registry, &seeds).unwrap();

        assert_eq!(rels[0].foreign_key.as_deref(), Some("DeptRef"));
    }

    #[test]
    fn test_required_relationship_has_non_nullable_key() {
        let registry = registry_with(vec![
            department(),
            EntityDescriptor::new("Employee", "Id")
                .with_attribute(AttributeDef::new("Id", ScalarType::Uuid))
                .with_navigation(NavigationDef::single("department", "Department").required()),
        ]);

        let seeds = discover(&registry).unwrap();
        let rels = resolve(&registry, &seeds).unwrap();

        assert!(!rels[0].foreign_key_nullable);
    }

    #[test]
    fn test_declared_attribute_fixes_nullability() {
        let registry = registry_with(vec![
            department(),
            EntityDescriptor::new("Employee", "Id")
                .with_attribute(AttributeDef::new("Id", ScalarType::Uuid))
                .with_attribute(AttributeDef::new("DepartmentDeptId", ScalarType::Uuid))
                .with_navigation(NavigationDef::single("department", "Department")),
        ]);

        let seeds = discover(&registry).unwrap();
        let rels = resolve(&registry, &seeds).unwrap();

        // Declared non-nullable even though the relationship is optional.
        assert!(!rels[0].foreign_key_nullable);
    }

    #[test]
    fn test_declared_attribute_type_mismatch_fails() {
        let registry = registry_with(vec![
            department(),
            EntityDescriptor::new("Employee", "Id")
                .with_attribute(AttributeDef::new("Id", ScalarType::Uuid))
                .with_attribute(AttributeDef::new("DepartmentDeptId", ScalarType::Int64))
                .with_navigation(NavigationDef::single("department", "Department")),
        ]);

        let seeds = discover(&registry).unwrap();
        let err = resolve(&registry, &seeds).unwrap_err();

        assert!(matches!(
            err,
            BuildError::ForeignKeyTypeMismatch { expected, found, .. }
                if expected == "Uuid" && found == "Int64"
        ));
    }

    #[test]
    fn test_conflicting_foreign_keys_fail() {
        // Two unpaired collections on Department both target Employee and
        // both default to DepartmentDeptId.
        let registry = registry_with(vec![
            EntityDescriptor::new("Department", "DeptId")
                .with_attribute(AttributeDef::new("DeptId", ScalarType::Uuid))
                .with_navigation(
                    NavigationDef::collection("staff", "Employee").with_inverse("workplace"),
                )
                .with_navigation(NavigationDef::collection("alumni", "Employee")),
            EntityDescriptor::new("Employee", "Id")
                .with_attribute(AttributeDef::new("Id", ScalarType::Uuid))
                .with_navigation(
                    NavigationDef::single("workplace", "Department").with_inverse("staff"),
                ),
        ]);

        let seeds = discover(&registry).unwrap();
        let err = resolve(&registry, &seeds).unwrap_err();

        assert!(matches!(
            err,
            BuildError::ForeignKeyConflict { dependent, attribute, .. }
                if dependent == "Employee" && attribute == "DepartmentDeptId"
        ));
    }

    #[test]
    fn test_many_to_many_synthesizes_join() {
        let registry = registry_with(vec![
            department().with_navigation(NavigationDef::collection("projects", "Project")),
            EntityDescriptor::new("Employee", "Id")
                .with_attribute(AttributeDef::new("Id", ScalarType::Uuid))
                .with_navigation(NavigationDef::single("department", "Department")),
            EntityDescriptor::new("Project", "ProjId")
                .with_attribute(AttributeDef::new("ProjId", ScalarType::Uuid))
                .with_navigation(NavigationDef::collection("departments", "Department")),
        ]);

        let seeds = discover(&registry).unwrap();
        let rels = resolve(&registry, &seeds).unwrap();

        let m2m = rels.iter().find(|r| r.is_many_to_many()).unwrap();
        assert!(m2m.foreign_key.is_none());
        let join = m2m.join.as_ref().unwrap();
        assert_eq!(join.name, "DepartmentProject");
        assert_eq!(join.principal_foreign_key, "DepartmentDeptId");
        assert_eq!(join.dependent_foreign_key, "ProjectProjId");
    }
}
