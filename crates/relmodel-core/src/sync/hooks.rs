//! Change-tracking hooks.

use super::instance::{EntityId, EntityInstance};

/// Callbacks the synchronizer fires as graph mutations are applied.
///
/// Hooks run after an operation's mutation set has been validated, in
/// apply order, so a change tracker observing them stays consistent with
/// the navigation graph. All methods default to no-ops.
pub trait ChangeHooks: Send + Sync {
    /// An instance was attached to the graph.
    fn on_attach(&self, _entity: &EntityInstance) {}

    /// A dependent was linked to a principal.
    fn on_link(&self, _relationship: &str, _principal: EntityId, _dependent: EntityId) {}

    /// A link was removed.
    fn on_unlink(&self, _relationship: &str, _principal: EntityId, _dependent: EntityId) {}

    /// An instance was removed from the graph.
    fn on_delete(&self, _entity: &EntityInstance) {}
}
