//! Relmodel Core - Relationship discovery, foreign-key resolution, and
//! navigation synchronization.
//!
//! The engine has two halves. At model-build time, entity descriptors are
//! registered, sealed, and run through discovery, foreign-key resolution,
//! and delete-behavior evaluation to produce the immutable
//! [`RelationshipModel`]. At runtime, the [`Synchronizer`] consumes that
//! model to keep live entity instances' navigation references mutually
//! consistent and to execute cascading deletes.
//!
//! Schema generation, query translation, and storage I/O are consumers of
//! the model, not part of this crate.

pub mod catalog;
pub mod error;
pub mod model;
pub mod sync;

pub use catalog::{
    AttributeDef, Cardinality, DeleteBehavior, DescriptorRegistry, EntityDescriptor, Multiplicity,
    NavigationDef, ScalarType,
};
pub use error::{BuildError, Error, SyncError};
pub use model::{
    BuilderConfig, JoinAssociation, ModelBuilder, NavigationlessRelationship, Relationship,
    RelationshipModel, SlotSide,
};
pub use sync::{
    ChangeHooks, EntityId, EntityInstance, InstanceGraph, LoadState, NavigationCell, Synchronizer,
    Value,
};
