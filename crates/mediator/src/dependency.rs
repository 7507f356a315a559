//! The dependency face: what the outer dependent sees.

use crate::cell::{Attachment, Shared};
use crate::snapshot::MediatorSnapshot;
use crate::upstream::UpstreamListener;
use std::sync::Arc;
use tracing::{info, warn};
use trellis_core::{AlreadyBound, Dependency, Dependent};
use trellis_types::ServiceValue;

/// An optional dependency, as presented to its dependent.
///
/// Wraps a real dependency and keeps the dependent's view of it consistent
/// with "optional" semantics: absent means trivially satisfied, and a
/// dependency that appears while the dependent holds a demand stays hidden
/// until the demand is released. See the crate docs for the full contract.
///
/// One mediator is created per optional edge in the dependency graph via
/// [`attach`](OptionalDependency::attach), which also registers the
/// mediator as the real dependency's dependent.
pub struct OptionalDependency {
    shared: Arc<Shared>,
}

impl OptionalDependency {
    /// Wrap `real` and register the mediator as its single dependent.
    ///
    /// Fails with [`AlreadyBound`] if `real` already has a dependent.
    pub fn attach(real: Arc<dyn Dependency>) -> Result<Arc<Self>, AlreadyBound> {
        let shared = Arc::new(Shared::new(Arc::clone(&real)));
        let listener: Arc<dyn Dependent> =
            Arc::new(UpstreamListener::new(Arc::clone(&shared)));
        real.register_dependent(listener)?;
        info!("optional dependency mediator attached");
        Ok(Arc::new(Self { shared }))
    }

    /// Point-in-time diagnostic view, read atomically under the lock.
    pub fn snapshot(&self) -> MediatorSnapshot {
        self.shared.snapshot()
    }
}

impl Dependency for OptionalDependency {
    fn register_dependent(&self, dependent: Arc<dyn Dependent>) -> Result<(), AlreadyBound> {
        self.shared.transition(|inner| {
            if !matches!(inner.attachment, Attachment::Unbound) {
                warn!("rejecting dependent registration, slot already consumed");
                return (Err(AlreadyBound), Vec::new());
            }
            inner.attachment = Attachment::Bound(dependent);
            (Ok(()), inner.state.bind())
        })
    }

    fn unregister_dependent(&self) {
        info!("dependent removed, retiring mediator");
        self.shared.transition(|inner| {
            inner.attachment = Attachment::Retired;
            ((), inner.state.unbind())
        })
    }

    fn add_demand(&self) {
        self.shared.transition(|inner| ((), inner.state.add_demand()))
    }

    fn remove_demand(&self) {
        self.shared
            .transition(|inner| ((), inner.state.remove_demand()))
    }

    fn dependent_started(&self) {
        self.shared
            .transition(|inner| ((), inner.state.dependent_started()))
    }

    fn dependent_stopped(&self) {
        self.shared
            .transition(|inner| ((), inner.state.dependent_stopped()))
    }

    /// While shielding, the dependency is presented as trivially satisfied
    /// rather than actually queried, so the value is absent. The real
    /// dependency is queried outside the lock.
    fn value(&self) -> Option<ServiceValue> {
        let forwarding = self.shared.read(|inner| inner.state.is_forwarding());
        if forwarding {
            self.shared.real.value()
        } else {
            None
        }
    }
}
