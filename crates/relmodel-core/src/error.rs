//! Core error types.

use thiserror::Error;

/// Errors raised while assembling the relationship model.
///
/// These are fatal to model build: each one indicates a structurally
/// inconsistent model with no recovery path.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// An entity type name was registered twice.
    #[error("entity '{entity}' is already registered")]
    DuplicateEntity {
        /// The duplicated entity type name.
        entity: String,
    },

    /// A lookup or navigation target referenced an unregistered entity type.
    #[error("unknown entity '{entity}'")]
    UnknownEntity {
        /// The missing entity type name.
        entity: String,
    },

    /// An explicit inverse annotation named a slot that does not exist.
    #[error("entity '{entity}' has no navigation slot '{slot}'")]
    UnknownNavigation {
        /// The entity that was expected to own the slot.
        entity: String,
        /// The missing slot name.
        slot: String,
    },

    /// Two slots disagree about being each other's inverse.
    #[error(
        "navigation '{entity}.{slot}' names inverse '{inverse}', which points back elsewhere"
    )]
    InverseMismatch {
        /// The entity owning the annotated slot.
        entity: String,
        /// The annotated slot name.
        slot: String,
        /// The inverse slot it named.
        inverse: String,
    },

    /// A navigation slot targets its own entity type.
    #[error("navigation '{entity}.{slot}' targets its own entity type")]
    SelfReferencingNavigation {
        /// The entity owning the slot.
        entity: String,
        /// The self-targeting slot name.
        slot: String,
    },

    /// More than one pairing between two types would satisfy the same
    /// classification without explicit inverse annotations.
    #[error(
        "ambiguous relationship between '{left}' and '{right}': conflicting slots {slots:?} \
         require explicit inverse annotations"
    )]
    AmbiguousRelationship {
        /// First entity type of the pair.
        left: String,
        /// Second entity type of the pair.
        right: String,
        /// The slots that could not be paired, as `Type.slot` strings.
        slots: Vec<String>,
    },

    /// Two relationships resolved to the same foreign-key attribute on one
    /// dependent type.
    #[error(
        "foreign key '{attribute}' on '{dependent}' is claimed by both '{first}' and '{second}'"
    )]
    ForeignKeyConflict {
        /// The dependent entity type.
        dependent: String,
        /// The contested foreign-key attribute name.
        attribute: String,
        /// Identifier of the relationship that claimed the attribute first.
        first: String,
        /// Identifier of the conflicting relationship.
        second: String,
    },

    /// A declared foreign-key attribute does not match the principal key type.
    #[error(
        "foreign key '{attribute}' on '{dependent}' is {found}, but the principal key is {expected}"
    )]
    ForeignKeyTypeMismatch {
        /// The dependent entity type.
        dependent: String,
        /// The foreign-key attribute name.
        attribute: String,
        /// Scalar type of the principal key attribute.
        expected: String,
        /// Scalar type declared on the dependent.
        found: String,
    },

    /// A delete behavior cannot be applied to the relationship it was set on.
    #[error("invalid delete behavior on relationship '{relationship}': {reason}")]
    InvalidDeleteBehavior {
        /// The offending relationship identifier.
        relationship: String,
        /// Why the behavior is invalid.
        reason: String,
    },

    /// The registry was mutated after sealing.
    #[error("descriptor registry is sealed")]
    RegistrySealed,

    /// A descriptor names a key attribute it does not declare.
    #[error("entity '{entity}' does not declare its key attribute '{attribute}'")]
    MissingKeyAttribute {
        /// The entity type name.
        entity: String,
        /// The undeclared key attribute name.
        attribute: String,
    },

    /// A descriptor declares a nullable key attribute.
    #[error("key attribute '{attribute}' on '{entity}' must not be nullable")]
    NullableKeyAttribute {
        /// The entity type name.
        entity: String,
        /// The nullable key attribute name.
        attribute: String,
    },

    /// A descriptor declares the same attribute name twice.
    #[error("entity '{entity}' declares attribute '{attribute}' twice")]
    DuplicateAttribute {
        /// The entity type name.
        entity: String,
        /// The duplicated attribute name.
        attribute: String,
    },

    /// A descriptor declares the same navigation slot name twice.
    #[error("entity '{entity}' declares navigation slot '{slot}' twice")]
    DuplicateNavigation {
        /// The entity type name.
        entity: String,
        /// The duplicated slot name.
        slot: String,
    },

    /// The builder configuration is unusable.
    #[error("invalid builder configuration: {reason}")]
    InvalidConfig {
        /// Why the configuration was rejected.
        reason: String,
    },
}

/// Errors returned by individual synchronizer operations.
///
/// The failed operation is rolled back in full; the instance graph is left
/// exactly as it was before the call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// Detaching the only link of a required relationship.
    #[error(
        "relationship '{relationship}' is required; dependent {dependent} cannot be detached"
    )]
    RequiredRelationshipViolation {
        /// The required relationship identifier.
        relationship: String,
        /// Hex identifier of the dependent instance.
        dependent: String,
    },

    /// A principal with `Restrict` delete behavior still has dependents.
    #[error(
        "cannot delete {principal}: {count} dependent(s) exist via restricted relationship '{relationship}'"
    )]
    DeleteRestricted {
        /// The restricted relationship identifier.
        relationship: String,
        /// Hex identifier of the principal instance.
        principal: String,
        /// Number of dependents currently linked.
        count: usize,
    },

    /// Cascade traversal re-entered an entity already being deleted.
    #[error("cascade cycle detected at {entity}")]
    CascadeCycle {
        /// Hex identifier of the instance where the cycle closed.
        entity: String,
    },

    /// Cascade traversal exceeded the configured depth bound.
    #[error("cascade depth {depth} exceeds the configured maximum")]
    MaxCascadeDepth {
        /// The depth at which traversal stopped.
        depth: usize,
    },

    /// An operation referenced an instance that is not in the graph.
    #[error("instance {id} is not attached to the graph")]
    UnknownInstance {
        /// Hex identifier of the missing instance.
        id: String,
    },

    /// An instance with this identifier is already attached.
    #[error("instance {id} is already attached to the graph")]
    AlreadyAttached {
        /// Hex identifier of the duplicate instance.
        id: String,
    },

    /// An attached instance has an entity type the model does not describe.
    #[error("entity type '{entity}' is not part of the relationship model")]
    UnknownEntityType {
        /// The undescribed entity type name.
        entity: String,
    },

    /// An operation named a navigation slot the owning type does not have.
    #[error("entity '{entity}' has no navigation slot '{slot}'")]
    UnknownSlot {
        /// The entity type name.
        entity: String,
        /// The missing slot name.
        slot: String,
    },

    /// A single-valued operation was applied to a collection slot or vice versa.
    #[error("navigation '{entity}.{slot}' is not a {expected} slot")]
    MultiplicityMismatch {
        /// The entity type name.
        entity: String,
        /// The slot name.
        slot: String,
        /// The multiplicity the operation expected.
        expected: String,
    },

    /// A counterpart instance has the wrong entity type for the relationship.
    #[error("relationship '{relationship}' expects '{expected}', found '{found}'")]
    WrongEntityType {
        /// The relationship identifier.
        relationship: String,
        /// The entity type the relationship side requires.
        expected: String,
        /// The entity type actually supplied.
        found: String,
    },
}

/// Top-level errors for the relationship engine.
#[derive(Debug, Error)]
pub enum Error {
    /// Model build failure.
    #[error("model build failed: {0}")]
    Build(#[from] BuildError),

    /// Navigation synchronization failure.
    #[error("synchronization failed: {0}")]
    Sync(#[from] SyncError),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Deserialization error.
    #[error("deserialization error: {0}")]
    Deserialization(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_error_display() {
        let err = BuildError::ForeignKeyConflict {
            dependent: "Employee".into(),
            attribute: "DepartmentDeptId".into(),
            first: "department_employees_employee".into(),
            second: "department_staff_employee".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("DepartmentDeptId"));
        assert!(msg.contains("Employee"));
    }

    #[test]
    fn test_sync_error_reports_relationship_and_entity() {
        let err = SyncError::DeleteRestricted {
            relationship: "department_employees_employee".into(),
            principal: "00000000000000000000000000000001".into(),
            count: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("department_employees_employee"));
        assert!(msg.contains("3 dependent(s)"));
    }

    #[test]
    fn test_error_from_conversions() {
        let build: Error = BuildError::RegistrySealed.into();
        assert!(matches!(build, Error::Build(BuildError::RegistrySealed)));

        let sync: Error = SyncError::MaxCascadeDepth { depth: 101 }.into();
        assert!(matches!(sync, Error::Sync(SyncError::MaxCascadeDepth { .. })));
    }
}
