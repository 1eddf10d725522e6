//! Relationship discovery: slot pairing and cardinality classification.
//!
//! For every pair of distinct registered types, the slots referencing the
//! other type are paired (explicit inverse annotations first, then the
//! unique unambiguous match) and classified into a relationship seed. The
//! foreign-key resolver and delete evaluator finish the job.

use crate::catalog::{
    Cardinality, DeleteBehavior, DescriptorRegistry, EntityDescriptor, Multiplicity, NavigationDef,
};
use crate::error::BuildError;
use tracing::debug;

/// A discovered relationship before foreign-key resolution.
#[derive(Debug, Clone)]
pub(crate) struct RelationshipSeed {
    pub principal: String,
    pub dependent: String,
    pub cardinality: Cardinality,
    pub principal_slot: Option<String>,
    pub dependent_slot: Option<String>,
    pub required: bool,
    /// Explicit foreign-key attribute override, if any slot carried one.
    pub foreign_key: Option<String>,
    /// Delete-behavior override from the principal-side slot.
    pub principal_on_delete: Option<DeleteBehavior>,
    /// Delete-behavior override from the dependent-side slot.
    pub dependent_on_delete: Option<DeleteBehavior>,
}

/// Discover relationship seeds across the sealed registry.
pub(crate) fn discover(registry: &DescriptorRegistry) -> Result<Vec<RelationshipSeed>, BuildError> {
    for entity in registry.iter() {
        for nav in &entity.navigations {
            registry.lookup(&nav.target)?;
        }
    }

    let entities: Vec<&EntityDescriptor> = registry.iter().collect();
    let mut seeds = Vec::new();
    for i in 0..entities.len() {
        for j in (i + 1)..entities.len() {
            discover_pair(entities[i], entities[j], &mut seeds)?;
        }
    }
    Ok(seeds)
}

/// Pair and classify the slots between one pair of types.
///
/// `a` is the earlier-registered type; that order is the deterministic
/// tie-break for one-to-one and many-to-many side assignment.
fn discover_pair(
    a: &EntityDescriptor,
    b: &EntityDescriptor,
    seeds: &mut Vec<RelationshipSeed>,
) -> Result<(), BuildError> {
    let slots_a: Vec<&NavigationDef> = a.navigations_to(&b.name).collect();
    let slots_b: Vec<&NavigationDef> = b.navigations_to(&a.name).collect();
    if slots_a.is_empty() && slots_b.is_empty() {
        return Ok(());
    }

    let mut used_a = vec![false; slots_a.len()];
    let mut used_b = vec![false; slots_b.len()];
    let mut pairs: Vec<(usize, usize)> = Vec::new();

    // Priority 1: explicit inverse annotations, checked from both sides.
    for (ia, sa) in slots_a.iter().enumerate() {
        let Some(inverse) = &sa.inverse else { continue };
        let ib = slots_b
            .iter()
            .position(|s| &s.name == inverse)
            .ok_or_else(|| BuildError::UnknownNavigation {
                entity: b.name.clone(),
                slot: inverse.clone(),
            })?;
        if let Some(back) = &slots_b[ib].inverse {
            if back != &sa.name {
                return Err(BuildError::InverseMismatch {
                    entity: a.name.clone(),
                    slot: sa.name.clone(),
                    inverse: inverse.clone(),
                });
            }
        }
        if used_b[ib] {
            return Err(BuildError::AmbiguousRelationship {
                left: a.name.clone(),
                right: b.name.clone(),
                slots: slot_names(a, &slots_a, |_| true)
                    .chain(slot_names(b, &slots_b, |_| true))
                    .collect(),
            });
        }
        used_a[ia] = true;
        used_b[ib] = true;
        pairs.push((ia, ib));
    }
    for (ib, sb) in slots_b.iter().enumerate() {
        if used_b[ib] {
            continue;
        }
        let Some(inverse) = &sb.inverse else { continue };
        let ia = slots_a
            .iter()
            .position(|s| &s.name == inverse)
            .ok_or_else(|| BuildError::UnknownNavigation {
                entity: a.name.clone(),
                slot: inverse.clone(),
            })?;
        // A consistent mutual annotation was already paired above, so a
        // used slot here means its own annotation pointed elsewhere.
        if used_a[ia] {
            return Err(BuildError::InverseMismatch {
                entity: b.name.clone(),
                slot: sb.name.clone(),
                inverse: inverse.clone(),
            });
        }
        used_a[ia] = true;
        used_b[ib] = true;
        pairs.push((ia, ib));
    }

    // Priority 2: the unique unambiguous match. Anything denser on both
    // sides needs explicit inverse annotations.
    let rem_a: Vec<usize> = (0..slots_a.len()).filter(|i| !used_a[*i]).collect();
    let rem_b: Vec<usize> = (0..slots_b.len()).filter(|i| !used_b[*i]).collect();
    if !rem_a.is_empty() && !rem_b.is_empty() {
        if rem_a.len() == 1 && rem_b.len() == 1 {
            used_a[rem_a[0]] = true;
            used_b[rem_b[0]] = true;
            pairs.push((rem_a[0], rem_b[0]));
        } else {
            return Err(BuildError::AmbiguousRelationship {
                left: a.name.clone(),
                right: b.name.clone(),
                slots: slot_names(a, &slots_a, |i| !used_a[i])
                    .chain(slot_names(b, &slots_b, |i| !used_b[i]))
                    .collect(),
            });
        }
    }

    for (ia, ib) in pairs {
        seeds.push(classify_pair(a, slots_a[ia], b, slots_b[ib]));
    }
    for (ia, sa) in slots_a.iter().enumerate() {
        if !used_a[ia] {
            seeds.push(classify_unpaired(a, sa, b));
        }
    }
    for (ib, sb) in slots_b.iter().enumerate() {
        if !used_b[ib] {
            seeds.push(classify_unpaired(b, sb, a));
        }
    }
    Ok(())
}

/// Names of the selected slots as `Type.slot`, for error reports.
fn slot_names<'a>(
    entity: &'a EntityDescriptor,
    slots: &'a [&'a NavigationDef],
    keep: impl Fn(usize) -> bool + 'a,
) -> impl Iterator<Item = String> + 'a {
    slots
        .iter()
        .enumerate()
        .filter(move |(i, _)| keep(*i))
        .map(move |(_, s)| format!("{}.{}", entity.name, s.name))
}

/// Classify one paired slot configuration.
fn classify_pair(
    a: &EntityDescriptor,
    sa: &NavigationDef,
    b: &EntityDescriptor,
    sb: &NavigationDef,
) -> RelationshipSeed {
    let seed = match (sa.multiplicity, sb.multiplicity) {
        (Multiplicity::Collection, Multiplicity::Collection) => RelationshipSeed {
            principal: a.name.clone(),
            dependent: b.name.clone(),
            cardinality: Cardinality::ManyToMany,
            principal_slot: Some(sa.name.clone()),
            dependent_slot: Some(sb.name.clone()),
            required: false,
            foreign_key: None,
            principal_on_delete: sa.on_delete,
            dependent_on_delete: sb.on_delete,
        },
        (Multiplicity::Single, Multiplicity::Collection) => {
            seed_one_to_many(b, sb, a, sa)
        }
        (Multiplicity::Collection, Multiplicity::Single) => {
            seed_one_to_many(a, sa, b, sb)
        }
        (Multiplicity::Single, Multiplicity::Single) => {
            // The required side cannot exist without its counterpart, so it
            // is the foreign-key holder; otherwise registration order
            // decides.
            let a_is_dependent = sa.required || !sb.required;
            if a_is_dependent {
                seed_one_to_one(b, sb, a, sa)
            } else {
                seed_one_to_one(a, sa, b, sb)
            }
        }
    };
    debug!(
        principal = %seed.principal,
        dependent = %seed.dependent,
        cardinality = ?seed.cardinality,
        "discovered paired relationship"
    );
    seed
}

fn seed_one_to_many(
    principal: &EntityDescriptor,
    principal_slot: &NavigationDef,
    dependent: &EntityDescriptor,
    dependent_slot: &NavigationDef,
) -> RelationshipSeed {
    RelationshipSeed {
        principal: principal.name.clone(),
        dependent: dependent.name.clone(),
        cardinality: Cardinality::OneToMany,
        principal_slot: Some(principal_slot.name.clone()),
        dependent_slot: Some(dependent_slot.name.clone()),
        required: dependent_slot.required || principal_slot.required,
        foreign_key: dependent_slot
            .foreign_key
            .clone()
            .or_else(|| principal_slot.foreign_key.clone()),
        principal_on_delete: principal_slot.on_delete,
        dependent_on_delete: dependent_slot.on_delete,
    }
}

fn seed_one_to_one(
    principal: &EntityDescriptor,
    principal_slot: &NavigationDef,
    dependent: &EntityDescriptor,
    dependent_slot: &NavigationDef,
) -> RelationshipSeed {
    RelationshipSeed {
        principal: principal.name.clone(),
        dependent: dependent.name.clone(),
        cardinality: Cardinality::OneToOne,
        principal_slot: Some(principal_slot.name.clone()),
        dependent_slot: Some(dependent_slot.name.clone()),
        required: dependent_slot.required || principal_slot.required,
        foreign_key: dependent_slot
            .foreign_key
            .clone()
            .or_else(|| principal_slot.foreign_key.clone()),
        principal_on_delete: principal_slot.on_delete,
        dependent_on_delete: dependent_slot.on_delete,
    }
}

/// Classify a slot with no counterpart on the other side.
fn classify_unpaired(
    owner: &EntityDescriptor,
    slot: &NavigationDef,
    other: &EntityDescriptor,
) -> RelationshipSeed {
    let seed = match slot.multiplicity {
        // Collection with no inverse: the target carries a synthesized
        // foreign key.
        Multiplicity::Collection => RelationshipSeed {
            principal: owner.name.clone(),
            dependent: other.name.clone(),
            cardinality: Cardinality::OneToMany,
            principal_slot: Some(slot.name.clone()),
            dependent_slot: None,
            required: slot.required,
            foreign_key: slot.foreign_key.clone(),
            principal_on_delete: slot.on_delete,
            dependent_on_delete: None,
        },
        // Lone single reference: the owner is the foreign-key holder.
        Multiplicity::Single => RelationshipSeed {
            principal: other.name.clone(),
            dependent: owner.name.clone(),
            cardinality: Cardinality::OneToOne,
            principal_slot: None,
            dependent_slot: Some(slot.name.clone()),
            required: slot.required,
            foreign_key: slot.foreign_key.clone(),
            principal_on_delete: None,
            dependent_on_delete: slot.on_delete,
        },
    };
    debug!(
        principal = %seed.principal,
        dependent = %seed.dependent,
        cardinality = ?seed.cardinality,
        slot = %slot.name,
        "discovered unpaired relationship"
    );
    seed
}
