//! Capability traits for the two sides of a dependency edge.

use crate::AlreadyBound;
use std::sync::Arc;
use trellis_types::ServiceValue;

/// The dependency side of a graph edge.
///
/// A dependency accepts exactly one registered dependent for its lifetime
/// and receives the dependent's activity signals: demand (the dependent
/// currently needs the dependency active) and start/stop (the dependent
/// began or finished running against it).
///
/// All methods are synchronous and must not block; implementations that
/// need to notify their dependent do so by calling back into the
/// registered [`Dependent`] *after* releasing any internal lock, since the
/// callee may synchronously re-enter the dependency from the same call
/// stack.
pub trait Dependency: Send + Sync {
    /// Register the single dependent of this dependency.
    ///
    /// Fails with [`AlreadyBound`] if the dependent slot is already
    /// consumed.
    fn register_dependent(&self, dependent: Arc<dyn Dependent>) -> Result<(), AlreadyBound>;

    /// Remove the registered dependent.
    fn unregister_dependent(&self);

    /// The dependent now holds an active demand on this dependency.
    fn add_demand(&self);

    /// The dependent released its demand.
    fn remove_demand(&self);

    /// The dependent started running against this dependency.
    fn dependent_started(&self);

    /// The dependent stopped running against this dependency.
    fn dependent_stopped(&self);

    /// The value this dependency currently produces, or `None` if it has
    /// none to offer.
    fn value(&self) -> Option<ServiceValue>;
}

/// The dependent side of a graph edge: a consumer of lifecycle notices.
///
/// The notice vocabulary is closed; every receiver must be total over it.
/// See [`Notice`](crate::Notice) for the corresponding data
/// representation.
pub trait Dependent: Send + Sync {
    /// The dependency is now installed in the container.
    fn on_installed(&self);

    /// The dependency was removed from the container.
    fn on_uninstalled(&self);

    /// The dependency came up.
    fn on_up(&self);

    /// The dependency went down.
    fn on_down(&self);

    /// The dependency's start attempt failed.
    fn on_failed(&self);

    /// The dependency left its failed state and will be started again.
    fn on_retrying(&self);

    /// A transitive dependency of the dependency is missing.
    fn on_transitive_missing(&self);

    /// The missing transitive dependency was installed.
    fn on_transitive_restored(&self);
}
