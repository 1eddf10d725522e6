//! Sealed registry of entity descriptors.

use super::descriptor::EntityDescriptor;
use crate::error::BuildError;
use rkyv::{Archive, Deserialize, Serialize};
use std::collections::HashMap;

/// The catalog of registered entity descriptors.
///
/// Registration happens during the single-threaded model-build phase;
/// `seal` makes the registry permanently read-only before discovery runs.
/// Registration order is preserved and drives the one-to-one tie-break.
#[derive(Debug, Clone, PartialEq, Eq, Default, Archive, Serialize, Deserialize)]
pub struct DescriptorRegistry {
    /// Descriptors in registration order.
    entities: Vec<EntityDescriptor>,
    /// Name to registration-order index.
    index: HashMap<String, usize>,
    /// Whether the registry has been sealed.
    sealed: bool,
}

impl DescriptorRegistry {
    /// Create an empty, unsealed registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity descriptor.
    ///
    /// Fails if the registry is sealed, the type name is already taken, or
    /// the descriptor is internally inconsistent.
    pub fn register(&mut self, descriptor: EntityDescriptor) -> Result<(), BuildError> {
        if self.sealed {
            return Err(BuildError::RegistrySealed);
        }
        if self.index.contains_key(&descriptor.name) {
            return Err(BuildError::DuplicateEntity {
                entity: descriptor.name.clone(),
            });
        }
        descriptor.validate()?;

        self.index
            .insert(descriptor.name.clone(), self.entities.len());
        self.entities.push(descriptor);
        Ok(())
    }

    /// Look up a descriptor, failing if the type is unknown.
    pub fn lookup(&self, name: &str) -> Result<&EntityDescriptor, BuildError> {
        self.get(name).ok_or_else(|| BuildError::UnknownEntity {
            entity: name.to_string(),
        })
    }

    /// Get a descriptor by name.
    pub fn get(&self, name: &str) -> Option<&EntityDescriptor> {
        self.index.get(name).map(|i| &self.entities[*i])
    }

    /// Registration-order position of a type.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Seal the registry; no registration is permitted afterwards.
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    /// Whether the registry has been sealed.
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Iterate descriptors in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &EntityDescriptor> {
        self.entities.iter()
    }

    /// Number of registered descriptors.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
