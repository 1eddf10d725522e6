//! Relmodel - relationship convention resolution and navigation
//! synchronization for graph-shaped object models.
//!
//! Build a [`RelationshipModel`] once from entity descriptors, then work
//! with live instances through a [`Context`]:
//!
//! ```
//! use relmodel::{
//!     AttributeDef, Context, EntityDescriptor, EntityId, EntityInstance, ModelBuilder,
//!     NavigationDef, ScalarType,
//! };
//!
//! let model = ModelBuilder::new()
//!     .with_entity(
//!         EntityDescriptor::new("Department", "DeptId")
//!             .with_attribute(AttributeDef::new("DeptId", ScalarType::String))
//!             .with_navigation(NavigationDef::collection("employees", "Employee")),
//!     )
//!     .with_entity(
//!         EntityDescriptor::new("Employee", "Id")
//!             .with_attribute(AttributeDef::new("Id", ScalarType::String))
//!             .with_navigation(NavigationDef::single("department", "Department")),
//!     )
//!     .build()?;
//!
//! let ctx = Context::new(model);
//! let dept = ctx.attach(
//!     EntityInstance::new("Department", EntityId::generate()).with_attribute("DeptId", "D1"),
//! )?;
//! let emp = ctx.attach(
//!     EntityInstance::new("Employee", EntityId::generate()).with_attribute("Id", "E1"),
//! )?;
//!
//! ctx.add_to_collection(dept, "employees", emp)?;
//! assert_eq!(ctx.single(emp, "department")?, Some(dept));
//! # Ok::<(), relmodel::Error>(())
//! ```
//!
//! Schema generation, query translation, and storage are external
//! collaborators; they consume the read-only model this crate produces.

mod context;

pub use context::Context;

pub use relmodel_core::{
    AttributeDef, BuildError, BuilderConfig, Cardinality, ChangeHooks, DeleteBehavior,
    DescriptorRegistry, EntityDescriptor, EntityId, EntityInstance, Error, InstanceGraph,
    JoinAssociation, LoadState, ModelBuilder, Multiplicity, NavigationCell, NavigationDef,
    NavigationlessRelationship, Relationship, RelationshipModel, ScalarType, SlotSide, SyncError,
    Synchronizer, Value,
};
