//! The navigation synchronizer.
//!
//! Every operation is transactional: it reads the graph, collects the full
//! mutation set, validates it, and only then applies it. A failed
//! validation returns an error and leaves the graph exactly as it was.

use std::sync::Arc;

use super::graph::InstanceGraph;
use super::hooks::ChangeHooks;
use super::instance::{EntityId, EntityInstance};
use super::mutation::{Mutation, MutationSet};
use super::value::Value;
use crate::catalog::{Cardinality, DeleteBehavior};
use crate::error::SyncError;
use crate::model::{Relationship, RelationshipModel, SlotSide};
use tracing::debug;

/// Keeps paired navigation references consistent and executes delete
/// behavior against an instance graph.
///
/// The synchronizer itself is stateless apart from the shared model and
/// registered hooks; callers serialize access to each graph.
pub struct Synchronizer {
    model: Arc<RelationshipModel>,
    hooks: Vec<Box<dyn ChangeHooks>>,
}

impl Synchronizer {
    /// Create a synchronizer over the given model.
    pub fn new(model: Arc<RelationshipModel>) -> Self {
        Self {
            model,
            hooks: Vec::new(),
        }
    }

    /// The relationship model this synchronizer enforces.
    pub fn model(&self) -> &RelationshipModel {
        &self.model
    }

    /// Register a change-tracking hook.
    pub fn register_hooks(&mut self, hooks: Box<dyn ChangeHooks>) {
        self.hooks.push(hooks);
    }

    /// Attach an instance to the graph.
    pub fn attach(
        &self,
        graph: &mut InstanceGraph,
        instance: EntityInstance,
    ) -> Result<EntityId, SyncError> {
        if self.model.descriptor(&instance.entity_type).is_none() {
            return Err(SyncError::UnknownEntityType {
                entity: instance.entity_type.clone(),
            });
        }
        if graph.contains(instance.id) {
            return Err(SyncError::AlreadyAttached {
                id: instance.id.to_string(),
            });
        }
        let id = instance.id;
        for hooks in &self.hooks {
            hooks.on_attach(&instance);
        }
        graph.insert(instance);
        Ok(id)
    }

    /// Set or clear a single-valued navigation reference.
    ///
    /// Linking steals the dependent from any previous principal; clearing
    /// a required relationship's only link fails unless it happens inside
    /// a delete of the dependent itself.
    pub fn set_single(
        &self,
        graph: &mut InstanceGraph,
        entity: EntityId,
        slot: &str,
        target: Option<EntityId>,
    ) -> Result<(), SyncError> {
        let (relationship, side) = self.resolve_slot(graph, entity, slot)?;
        let single_slot = match (relationship.cardinality, side) {
            (Cardinality::OneToOne, _) => true,
            (Cardinality::OneToMany, SlotSide::Dependent) => true,
            _ => false,
        };
        if !single_slot {
            return Err(SyncError::MultiplicityMismatch {
                entity: self.entity_type(graph, entity)?,
                slot: slot.to_string(),
                expected: "single".to_string(),
            });
        }

        let mut set = MutationSet::new();
        match (side, target) {
            (SlotSide::Dependent, Some(principal)) => {
                self.collect_link_single(graph, relationship, principal, entity, &mut set)?;
            }
            (SlotSide::Dependent, None) => {
                self.collect_detach(graph, relationship, entity, &mut set)?;
            }
            (SlotSide::Principal, Some(dependent)) => {
                self.collect_link_single(graph, relationship, entity, dependent, &mut set)?;
            }
            (SlotSide::Principal, None) => {
                let current = graph.collection(&relationship.id, entity).first().copied();
                if let Some(dependent) = current {
                    self.collect_detach(graph, relationship, dependent, &mut set)?;
                }
            }
        }
        self.apply(graph, set);
        Ok(())
    }

    /// Add a member to a collection navigation.
    pub fn add_to_collection(
        &self,
        graph: &mut InstanceGraph,
        owner: EntityId,
        slot: &str,
        member: EntityId,
    ) -> Result<(), SyncError> {
        let (relationship, side) = self.resolve_slot(graph, owner, slot)?;
        let mut set = MutationSet::new();
        match (relationship.cardinality, side) {
            (Cardinality::OneToMany, SlotSide::Principal) => {
                self.collect_link_single(graph, relationship, owner, member, &mut set)?;
            }
            (Cardinality::ManyToMany, SlotSide::Principal) => {
                self.collect_link_pair(graph, relationship, owner, member, &mut set)?;
            }
            (Cardinality::ManyToMany, SlotSide::Dependent) => {
                self.collect_link_pair(graph, relationship, member, owner, &mut set)?;
            }
            _ => {
                return Err(SyncError::MultiplicityMismatch {
                    entity: self.entity_type(graph, owner)?,
                    slot: slot.to_string(),
                    expected: "collection".to_string(),
                });
            }
        }
        self.apply(graph, set);
        Ok(())
    }

    /// Remove a member from a collection navigation.
    ///
    /// Removing an absent member is a no-op; removing the only link of a
    /// required relationship fails.
    pub fn remove_from_collection(
        &self,
        graph: &mut InstanceGraph,
        owner: EntityId,
        slot: &str,
        member: EntityId,
    ) -> Result<(), SyncError> {
        let (relationship, side) = self.resolve_slot(graph, owner, slot)?;
        if !graph.contains(member) {
            return Err(SyncError::UnknownInstance {
                id: member.to_string(),
            });
        }
        let mut set = MutationSet::new();
        match (relationship.cardinality, side) {
            (Cardinality::OneToMany, SlotSide::Principal) => {
                if graph.single_reference(&relationship.id, member) == Some(owner) {
                    self.collect_detach(graph, relationship, member, &mut set)?;
                }
            }
            (Cardinality::ManyToMany, SlotSide::Principal) => {
                if graph.collection(&relationship.id, owner).contains(&member) {
                    set.unlink(&relationship.id, owner, member);
                }
            }
            (Cardinality::ManyToMany, SlotSide::Dependent) => {
                if graph.inverse_collection(&relationship.id, owner).contains(&member) {
                    set.unlink(&relationship.id, member, owner);
                }
            }
            _ => {
                return Err(SyncError::MultiplicityMismatch {
                    entity: self.entity_type(graph, owner)?,
                    slot: slot.to_string(),
                    expected: "collection".to_string(),
                });
            }
        }
        self.apply(graph, set);
        Ok(())
    }

    /// Delete an instance, applying each relationship's delete behavior to
    /// its linked dependents.
    pub fn delete(&self, graph: &mut InstanceGraph, entity: EntityId) -> Result<(), SyncError> {
        if !graph.contains(entity) {
            return Err(SyncError::UnknownInstance {
                id: entity.to_string(),
            });
        }
        let mut set = MutationSet::new();
        let mut stack = Vec::new();
        self.collect_delete(graph, entity, &mut set, &mut stack, 0)?;
        debug!(entity = %entity, mutations = set.len(), "delete collected");
        self.apply(graph, set);
        Ok(())
    }

    /// The single-valued navigation view of an entity.
    pub fn single_view(
        &self,
        graph: &InstanceGraph,
        entity: EntityId,
        slot: &str,
    ) -> Result<Option<EntityId>, SyncError> {
        let (relationship, side) = self.resolve_slot(graph, entity, slot)?;
        match (relationship.cardinality, side) {
            (Cardinality::OneToOne, SlotSide::Dependent)
            | (Cardinality::OneToMany, SlotSide::Dependent) => {
                Ok(graph.single_reference(&relationship.id, entity))
            }
            (Cardinality::OneToOne, SlotSide::Principal) => {
                Ok(graph.collection(&relationship.id, entity).first().copied())
            }
            _ => Err(SyncError::MultiplicityMismatch {
                entity: self.entity_type(graph, entity)?,
                slot: slot.to_string(),
                expected: "single".to_string(),
            }),
        }
    }

    /// The collection navigation view of an entity.
    pub fn collection_view(
        &self,
        graph: &InstanceGraph,
        entity: EntityId,
        slot: &str,
    ) -> Result<Vec<EntityId>, SyncError> {
        let (relationship, side) = self.resolve_slot(graph, entity, slot)?;
        match (relationship.cardinality, side) {
            (Cardinality::OneToMany, SlotSide::Principal)
            | (Cardinality::ManyToMany, SlotSide::Principal) => {
                Ok(graph.collection(&relationship.id, entity).to_vec())
            }
            (Cardinality::ManyToMany, SlotSide::Dependent) => {
                Ok(graph.inverse_collection(&relationship.id, entity).to_vec())
            }
            _ => Err(SyncError::MultiplicityMismatch {
                entity: self.entity_type(graph, entity)?,
                slot: slot.to_string(),
                expected: "collection".to_string(),
            }),
        }
    }

    fn entity_type(&self, graph: &InstanceGraph, entity: EntityId) -> Result<String, SyncError> {
        graph
            .get(entity)
            .map(|i| i.entity_type.clone())
            .ok_or_else(|| SyncError::UnknownInstance {
                id: entity.to_string(),
            })
    }

    fn resolve_slot(
        &self,
        graph: &InstanceGraph,
        entity: EntityId,
        slot: &str,
    ) -> Result<(&Relationship, SlotSide), SyncError> {
        let entity_type = self.entity_type(graph, entity)?;
        self.model
            .relationship_for_slot(&entity_type, slot)
            .ok_or_else(|| SyncError::UnknownSlot {
                entity: entity_type,
                slot: slot.to_string(),
            })
    }

    fn expect_type(
        &self,
        graph: &InstanceGraph,
        relationship: &Relationship,
        entity: EntityId,
        side: SlotSide,
    ) -> Result<(), SyncError> {
        let found = self.entity_type(graph, entity)?;
        let expected = relationship.endpoint(side);
        if found != expected {
            return Err(SyncError::WrongEntityType {
                relationship: relationship.id.clone(),
                expected: expected.to_string(),
                found,
            });
        }
        Ok(())
    }

    /// Collect the mutations for linking a dependent to a principal,
    /// enforcing the single-owner invariant on both sides.
    fn collect_link_single(
        &self,
        graph: &InstanceGraph,
        relationship: &Relationship,
        principal: EntityId,
        dependent: EntityId,
        set: &mut MutationSet,
    ) -> Result<(), SyncError> {
        self.expect_type(graph, relationship, principal, SlotSide::Principal)?;
        self.expect_type(graph, relationship, dependent, SlotSide::Dependent)?;

        let current = graph.single_reference(&relationship.id, dependent);
        if current == Some(principal) {
            return Ok(());
        }
        if let Some(previous) = current {
            set.unlink(&relationship.id, previous, dependent);
        }
        if relationship.cardinality == Cardinality::OneToOne {
            // The principal side also holds at most one dependent; the
            // displaced dependent ends up unlinked, which a required
            // relationship forbids.
            let displaced = graph.collection(&relationship.id, principal).first().copied();
            if let Some(displaced) = displaced {
                if displaced != dependent {
                    if relationship.required {
                        return Err(SyncError::RequiredRelationshipViolation {
                            relationship: relationship.id.clone(),
                            dependent: displaced.to_string(),
                        });
                    }
                    set.unlink(&relationship.id, principal, displaced);
                }
            }
        }
        set.link(&relationship.id, principal, dependent);
        Ok(())
    }

    fn collect_link_pair(
        &self,
        graph: &InstanceGraph,
        relationship: &Relationship,
        principal: EntityId,
        dependent: EntityId,
        set: &mut MutationSet,
    ) -> Result<(), SyncError> {
        self.expect_type(graph, relationship, principal, SlotSide::Principal)?;
        self.expect_type(graph, relationship, dependent, SlotSide::Dependent)?;
        if !graph.collection(&relationship.id, principal).contains(&dependent) {
            set.link(&relationship.id, principal, dependent);
        }
        Ok(())
    }

    /// Collect the detach of a dependent from its current principal.
    ///
    /// Deletes bypass this and record their unlinks directly, which is why
    /// the required-relationship check does not fire for them.
    fn collect_detach(
        &self,
        graph: &InstanceGraph,
        relationship: &Relationship,
        dependent: EntityId,
        set: &mut MutationSet,
    ) -> Result<(), SyncError> {
        let Some(principal) = graph.single_reference(&relationship.id, dependent) else {
            return Ok(());
        };
        if relationship.required {
            return Err(SyncError::RequiredRelationshipViolation {
                relationship: relationship.id.clone(),
                dependent: dependent.to_string(),
            });
        }
        set.unlink(&relationship.id, principal, dependent);
        Ok(())
    }

    /// Depth-first collection of a delete, honoring each relationship's
    /// delete behavior. `stack` holds the entities currently being
    /// expanded; re-entering one of them is a genuine cascade cycle.
    fn collect_delete(
        &self,
        graph: &InstanceGraph,
        entity: EntityId,
        set: &mut MutationSet,
        stack: &mut Vec<EntityId>,
        depth: u32,
    ) -> Result<(), SyncError> {
        if set.is_removed(entity) {
            return Ok(());
        }
        if stack.contains(&entity) {
            return Err(SyncError::CascadeCycle {
                entity: entity.to_string(),
            });
        }
        if depth > self.model.max_cascade_depth {
            return Err(SyncError::MaxCascadeDepth {
                depth: depth as usize,
            });
        }
        stack.push(entity);

        let entity_type = self.entity_type(graph, entity)?;
        for relationship in self.model.relationships_for(&entity_type) {
            if relationship.cardinality == Cardinality::ManyToMany {
                // Join rows cascade; the other endpoint is never touched.
                if relationship.principal == entity_type {
                    for partner in graph.collection(&relationship.id, entity).to_vec() {
                        set.unlink(&relationship.id, entity, partner);
                    }
                } else {
                    for partner in graph.inverse_collection(&relationship.id, entity).to_vec() {
                        set.unlink(&relationship.id, partner, entity);
                    }
                }
                continue;
            }

            if relationship.principal == entity_type {
                let dependents: Vec<EntityId> = graph
                    .collection(&relationship.id, entity)
                    .iter()
                    .copied()
                    .filter(|d| !set.is_removed(*d))
                    .collect();
                match relationship.on_delete {
                    DeleteBehavior::Restrict => {
                        if !dependents.is_empty() {
                            return Err(SyncError::DeleteRestricted {
                                relationship: relationship.id.clone(),
                                principal: entity.to_string(),
                                count: dependents.len(),
                            });
                        }
                    }
                    DeleteBehavior::Cascade => {
                        // On-stack dependents are deliberately not skipped;
                        // re-entering one is how a cycle surfaces.
                        for dependent in dependents {
                            self.collect_delete(graph, dependent, set, stack, depth + 1)?;
                        }
                    }
                    DeleteBehavior::SetNull => {
                        for dependent in dependents {
                            if !stack.contains(&dependent) {
                                set.unlink(&relationship.id, entity, dependent);
                            }
                        }
                    }
                }
            }

            if relationship.dependent == entity_type {
                // The entity's own reference detaches normally; the
                // required-relationship check does not apply to a delete
                // of the dependent itself.
                if let Some(principal) = graph.single_reference(&relationship.id, entity) {
                    if !set.is_removed(principal) && !stack.contains(&principal) {
                        set.unlink(&relationship.id, principal, entity);
                    }
                }
            }
        }

        stack.pop();
        set.remove(entity);
        Ok(())
    }

    /// Apply a validated mutation set, firing hooks in apply order.
    fn apply(&self, graph: &mut InstanceGraph, set: MutationSet) {
        for op in set.into_ops() {
            match op {
                Mutation::Link {
                    relationship,
                    principal,
                    dependent,
                } => {
                    let Some(rel) = self.model.relationship(&relationship) else {
                        continue;
                    };
                    if rel.cardinality == Cardinality::ManyToMany {
                        graph.link_pair(&relationship, principal, dependent);
                    } else {
                        graph.link_single(&relationship, principal, dependent);
                        self.write_foreign_key(graph, rel, principal, dependent);
                    }
                    for hooks in &self.hooks {
                        hooks.on_link(&relationship, principal, dependent);
                    }
                }
                Mutation::Unlink {
                    relationship,
                    principal,
                    dependent,
                } => {
                    let Some(rel) = self.model.relationship(&relationship) else {
                        continue;
                    };
                    if rel.cardinality == Cardinality::ManyToMany {
                        graph.unlink_pair(&relationship, principal, dependent);
                    } else {
                        graph.unlink_single(&relationship, principal, dependent);
                        if let Some(fk) = &rel.foreign_key {
                            graph.set_attribute(dependent, fk, Value::Null);
                        }
                    }
                    for hooks in &self.hooks {
                        hooks.on_unlink(&relationship, principal, dependent);
                    }
                }
                Mutation::Remove { entity } => {
                    if let Some(instance) = graph.remove_instance(entity) {
                        for hooks in &self.hooks {
                            hooks.on_delete(&instance);
                        }
                    }
                }
            }
        }
    }

    /// Mirror the principal's key value into the dependent's foreign-key
    /// attribute.
    fn write_foreign_key(
        &self,
        graph: &mut InstanceGraph,
        relationship: &Relationship,
        principal: EntityId,
        dependent: EntityId,
    ) {
        let Some(fk) = &relationship.foreign_key else {
            return;
        };
        let Some(descriptor) = self.model.descriptor(&relationship.principal) else {
            return;
        };
        let key_value = graph
            .get(principal)
            .and_then(|i| i.attribute(&descriptor.key_attribute).cloned());
        if let Some(value) = key_value {
            graph.set_attribute(dependent, fk, value);
        }
    }
}
