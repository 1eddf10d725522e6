//! Delete-behavior assignment and validation.

use super::discovery::RelationshipSeed;
use super::relationship::Relationship;
use crate::catalog::{Cardinality, DeleteBehavior};
use crate::error::BuildError;
use tracing::debug;

/// Assign the final delete behavior to each resolved relationship.
///
/// Defaults: `Cascade` for required relationships, `SetNull` for optional
/// ones. Explicit slot overrides win; many-to-many relationships always
/// cascade, scoped to the join association.
pub(crate) fn evaluate(
    relationships: &mut [Relationship],
    seeds: &[RelationshipSeed],
) -> Result<(), BuildError> {
    for (relationship, seed) in relationships.iter_mut().zip(seeds) {
        let explicit = merge_overrides(relationship, seed)?;

        let behavior = if relationship.cardinality == Cardinality::ManyToMany {
            match explicit {
                Some(DeleteBehavior::Cascade) | None => DeleteBehavior::Cascade,
                Some(other) => {
                    return Err(BuildError::InvalidDeleteBehavior {
                        relationship: relationship.id.clone(),
                        reason: format!(
                            "many-to-many relationships always cascade on the join association, \
                             got {other:?}"
                        ),
                    });
                }
            }
        } else {
            let default = if relationship.required {
                DeleteBehavior::Cascade
            } else {
                DeleteBehavior::SetNull
            };
            explicit.unwrap_or(default)
        };

        if behavior == DeleteBehavior::SetNull && !relationship.foreign_key_nullable {
            return Err(BuildError::InvalidDeleteBehavior {
                relationship: relationship.id.clone(),
                reason: format!(
                    "SetNull requires a nullable foreign key, but '{}' is non-nullable",
                    relationship.foreign_key.as_deref().unwrap_or("<join>")
                ),
            });
        }

        relationship.on_delete = behavior;
        debug!(id = %relationship.id, behavior = ?behavior, "delete behavior assigned");
    }
    Ok(())
}

/// Merge the per-slot overrides, rejecting a disagreeing pair.
fn merge_overrides(
    relationship: &Relationship,
    seed: &RelationshipSeed,
) -> Result<Option<DeleteBehavior>, BuildError> {
    match (seed.principal_on_delete, seed.dependent_on_delete) {
        (Some(p), Some(d)) if p != d => Err(BuildError::InvalidDeleteBehavior {
            relationship: relationship.id.clone(),
            reason: format!("slot overrides disagree: {p:?} vs {d:?}"),
        }),
        (p, d) => Ok(p.or(d)),
    }
}
