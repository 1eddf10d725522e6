//! Entity descriptor catalog.
//!
//! The catalog holds the metadata the engine consumes: entity descriptors
//! with scalar attributes and navigation slots, collected into a registry
//! that is sealed before relationship discovery runs.

mod attribute;
mod descriptor;
mod navigation;
mod registry;
mod types;

pub use attribute::AttributeDef;
pub use descriptor::EntityDescriptor;
pub use navigation::{Cardinality, DeleteBehavior, Multiplicity, NavigationDef};
pub use registry::DescriptorRegistry;
pub use types::ScalarType;
