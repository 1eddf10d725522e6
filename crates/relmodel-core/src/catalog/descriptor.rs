//! Entity descriptors.

use super::attribute::AttributeDef;
use super::navigation::NavigationDef;
use crate::error::BuildError;
use rkyv::{Archive, Deserialize, Serialize};

/// An entity type descriptor: scalar attributes plus navigation slots.
///
/// Immutable once registered.
#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize)]
pub struct EntityDescriptor {
    /// Entity type name (unique within the registry).
    pub name: String,
    /// Name of the primary-key attribute.
    pub key_attribute: String,
    /// Scalar attribute definitions, in declaration order.
    pub attributes: Vec<AttributeDef>,
    /// Navigation slot definitions.
    pub navigations: Vec<NavigationDef>,
}

impl EntityDescriptor {
    /// Create a new descriptor.
    pub fn new(name: impl Into<String>, key_attribute: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key_attribute: key_attribute.into(),
            attributes: Vec::new(),
            navigations: Vec::new(),
        }
    }

    /// Add an attribute.
    pub fn with_attribute(mut self, attribute: AttributeDef) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Add multiple attributes.
    pub fn with_attributes(mut self, attributes: impl IntoIterator<Item = AttributeDef>) -> Self {
        self.attributes.extend(attributes);
        self
    }

    /// Add a navigation slot.
    pub fn with_navigation(mut self, navigation: NavigationDef) -> Self {
        self.navigations.push(navigation);
        self
    }

    /// Get an attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&AttributeDef> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Get a navigation slot by name.
    pub fn navigation(&self, name: &str) -> Option<&NavigationDef> {
        self.navigations.iter().find(|n| n.name == name)
    }

    /// Get the key attribute definition.
    pub fn key(&self) -> Option<&AttributeDef> {
        self.attribute(&self.key_attribute)
    }

    /// Navigation slots targeting the given entity type.
    pub fn navigations_to<'a>(
        &'a self,
        target: &'a str,
    ) -> impl Iterator<Item = &'a NavigationDef> {
        self.navigations.iter().filter(move |n| n.target == target)
    }

    /// Check structural consistency of the descriptor itself.
    ///
    /// The registry calls this on registration; cross-entity checks happen
    /// during discovery.
    pub(crate) fn validate(&self) -> Result<(), BuildError> {
        let key = self
            .attribute(&self.key_attribute)
            .ok_or_else(|| BuildError::MissingKeyAttribute {
                entity: self.name.clone(),
                attribute: self.key_attribute.clone(),
            })?;
        if key.nullable {
            return Err(BuildError::NullableKeyAttribute {
                entity: self.name.clone(),
                attribute: self.key_attribute.clone(),
            });
        }

        for (i, attr) in self.attributes.iter().enumerate() {
            if self.attributes[..i].iter().any(|a| a.name == attr.name) {
                return Err(BuildError::DuplicateAttribute {
                    entity: self.name.clone(),
                    attribute: attr.name.clone(),
                });
            }
        }

        for (i, nav) in self.navigations.iter().enumerate() {
            if self.navigations[..i].iter().any(|n| n.name == nav.name) {
                return Err(BuildError::DuplicateNavigation {
                    entity: self.name.clone(),
                    slot: nav.name.clone(),
                });
            }
            if nav.target == self.name {
                return Err(BuildError::SelfReferencingNavigation {
                    entity: self.name.clone(),
                    slot: nav.name.clone(),
                });
            }
        }

        Ok(())
    }
}
