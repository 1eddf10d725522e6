//! Entity instances and their identifiers.

use std::collections::HashMap;
use std::fmt;

use super::value::Value;
use serde::{Deserialize, Serialize};

/// Stable 128-bit identifier for an entity instance.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct EntityId([u8; 16]);

impl EntityId {
    /// Generate a fresh identifier from the current time plus a counter.
    pub fn generate() -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        use std::time::{SystemTime, UNIX_EPOCH};

        // Counter to ensure uniqueness even with same timestamp
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before Unix epoch")
            .as_nanos() as u64;
        let count = COUNTER.fetch_add(1, Ordering::SeqCst);

        let mut bytes = [0u8; 16];
        bytes[..8].copy_from_slice(&now.to_be_bytes());
        bytes[8..].copy_from_slice(&count.to_be_bytes());
        Self(bytes)
    }

    /// Wrap raw identifier bytes.
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// The raw identifier bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// A live entity instance: type, identity, and scalar attribute values.
///
/// Navigation state is not stored here; the instance graph keeps it in
/// adjacency tables and the synchronizer maintains the foreign-key
/// attribute values on link and detach.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityInstance {
    /// Entity type name, matching a registered descriptor.
    pub entity_type: String,
    /// Instance identifier.
    pub id: EntityId,
    /// Scalar attribute values by attribute name.
    attributes: HashMap<String, Value>,
}

impl EntityInstance {
    /// Create an instance of the given type.
    pub fn new(entity_type: impl Into<String>, id: EntityId) -> Self {
        Self {
            entity_type: entity_type.into(),
            id,
            attributes: HashMap::new(),
        }
    }

    /// Set an attribute value, builder style.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Get an attribute value.
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Set an attribute value.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Iterate attribute name/value pairs.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }
}
