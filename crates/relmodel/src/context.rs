//! The context: one relationship model plus one instance graph.

use std::sync::Arc;

use parking_lot::Mutex;
use relmodel_core::{
    ChangeHooks, EntityId, EntityInstance, Error, InstanceGraph, NavigationCell,
    RelationshipModel, Synchronizer,
};
use tracing::debug;

/// A unit-of-work boundary over one instance graph.
///
/// The model is immutable and shared; the graph is guarded by a mutex so
/// that each synchronizer operation observes and mutates a consistent
/// connected component. Clone the `Arc<RelationshipModel>` into more
/// contexts for independent graphs.
pub struct Context {
    sync: Synchronizer,
    graph: Mutex<InstanceGraph>,
}

impl Context {
    /// Create a context over a freshly built model.
    pub fn new(model: RelationshipModel) -> Self {
        Self::from_arc(Arc::new(model))
    }

    /// Create a context over a shared model.
    pub fn from_arc(model: Arc<RelationshipModel>) -> Self {
        Self {
            sync: Synchronizer::new(model),
            graph: Mutex::new(InstanceGraph::new()),
        }
    }

    /// The relationship model backing this context.
    pub fn model(&self) -> &RelationshipModel {
        self.sync.model()
    }

    /// Register a change-tracking hook.
    ///
    /// Hooks must be registered before the context is shared.
    pub fn register_hooks(&mut self, hooks: Box<dyn ChangeHooks>) {
        self.sync.register_hooks(hooks);
    }

    /// Attach an entity instance.
    pub fn attach(&self, instance: EntityInstance) -> Result<EntityId, Error> {
        debug!(entity_type = %instance.entity_type, id = %instance.id, "attaching instance");
        let mut graph = self.graph.lock();
        Ok(self.sync.attach(&mut graph, instance)?)
    }

    /// A snapshot of an attached instance.
    pub fn get(&self, id: EntityId) -> Option<EntityInstance> {
        self.graph.lock().get(id).cloned()
    }

    /// Whether an instance is attached.
    pub fn contains(&self, id: EntityId) -> bool {
        self.graph.lock().contains(id)
    }

    /// Number of attached instances.
    pub fn len(&self) -> usize {
        self.graph.lock().len()
    }

    /// Whether the graph holds no instances.
    pub fn is_empty(&self) -> bool {
        self.graph.lock().is_empty()
    }

    /// Set or clear a single-valued navigation reference.
    pub fn set_single(
        &self,
        entity: EntityId,
        slot: &str,
        target: Option<EntityId>,
    ) -> Result<(), Error> {
        let mut graph = self.graph.lock();
        Ok(self.sync.set_single(&mut graph, entity, slot, target)?)
    }

    /// Add a member to a collection navigation.
    pub fn add_to_collection(
        &self,
        owner: EntityId,
        slot: &str,
        member: EntityId,
    ) -> Result<(), Error> {
        let mut graph = self.graph.lock();
        Ok(self.sync.add_to_collection(&mut graph, owner, slot, member)?)
    }

    /// Remove a member from a collection navigation.
    pub fn remove_from_collection(
        &self,
        owner: EntityId,
        slot: &str,
        member: EntityId,
    ) -> Result<(), Error> {
        let mut graph = self.graph.lock();
        Ok(self
            .sync
            .remove_from_collection(&mut graph, owner, slot, member)?)
    }

    /// Delete an instance, applying delete behavior to its dependents.
    pub fn delete(&self, entity: EntityId) -> Result<(), Error> {
        debug!(id = %entity, "deleting instance");
        let mut graph = self.graph.lock();
        Ok(self.sync.delete(&mut graph, entity)?)
    }

    /// The single-valued navigation view of an entity.
    pub fn single(&self, entity: EntityId, slot: &str) -> Result<Option<EntityId>, Error> {
        let graph = self.graph.lock();
        Ok(self.sync.single_view(&graph, entity, slot)?)
    }

    /// The collection navigation view of an entity.
    pub fn collection(&self, entity: EntityId, slot: &str) -> Result<Vec<EntityId>, Error> {
        let graph = self.graph.lock();
        Ok(self.sync.collection_view(&graph, entity, slot)?)
    }

    /// Resolve a collection navigation through an explicit lazy cell.
    ///
    /// The cell stays `Unloaded` until this call runs the loader; there is
    /// no implicit on-access loading.
    pub fn load_collection<'c>(
        &self,
        cell: &'c mut NavigationCell<Vec<EntityId>>,
        entity: EntityId,
        slot: &str,
    ) -> Result<&'c [EntityId], Error> {
        let members = cell.load_with(|| self.collection(entity, slot))?;
        Ok(members.as_slice())
    }
}
