//! Relationship model: discovery, foreign-key resolution, delete policy.
//!
//! `ModelBuilder` runs the one-time pipeline over a sealed descriptor
//! registry and produces the immutable [`RelationshipModel`] consumed by
//! the navigation synchronizer and by persistence backends.

mod builder;
mod delete;
mod discovery;
mod foreign_key;
mod model;
mod relationship;

pub use builder::{BuilderConfig, ModelBuilder, NavigationlessRelationship};
pub use model::RelationshipModel;
pub use relationship::{JoinAssociation, Relationship, SlotSide};
