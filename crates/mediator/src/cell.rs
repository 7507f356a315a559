//! Guarded state cell shared by the mediator's two faces.
//!
//! The cell enforces the mediator's one concurrency rule: state is mutated
//! and relay decisions are captured under the mutex, and every relay call
//! executes after the mutex is released. A relay callee (the dependent or
//! the real dependency) may therefore synchronously call back into the
//! mediator from the same stack without deadlocking.

use crate::reentry::ReentryGuard;
use crate::snapshot::MediatorSnapshot;
use crate::state::MediatorState;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;
use trellis_core::{Dependency, Dependent, Relay};

/// Whether an outer dependent is attached, and which one.
pub(crate) enum Attachment {
    /// No dependent has registered yet.
    Unbound,

    /// The single registered dependent.
    Bound(Arc<dyn Dependent>),

    /// The dependent was removed. Terminal: the slot is consumed and the
    /// mediator has unregistered from the real dependency.
    Retired,
}

/// Everything guarded by the cell mutex.
pub(crate) struct Inner {
    pub(crate) state: MediatorState,
    pub(crate) attachment: Attachment,
}

/// State cell shared by the dependency face and the upstream listener.
pub(crate) struct Shared {
    /// The wrapped real dependency. Set at construction, immutable.
    pub(crate) real: Arc<dyn Dependency>,
    inner: Mutex<Inner>,
}

impl Shared {
    pub(crate) fn new(real: Arc<dyn Dependency>) -> Self {
        Self {
            real,
            inner: Mutex::new(Inner {
                state: MediatorState::new(),
                attachment: Attachment::Unbound,
            }),
        }
    }

    /// Run one state transition and perform the relays it decides on.
    ///
    /// The mutex is held only around `f`. Relays execute afterwards in the
    /// order the transition returned them: notices go to the dependent that
    /// was attached when the transition committed, forwards go to the real
    /// dependency. Notices with no attached dependent are dropped.
    pub(crate) fn transition<R>(&self, f: impl FnOnce(&mut Inner) -> (R, Vec<Relay>)) -> R {
        let (result, relays, dependent) = {
            let _reentry = ReentryGuard::enter(self as *const Self as usize);
            let mut inner = self.lock_inner();
            let (result, relays) = f(&mut inner);
            let dependent = match &inner.attachment {
                Attachment::Bound(dependent) => Some(Arc::clone(dependent)),
                Attachment::Unbound | Attachment::Retired => None,
            };
            (result, relays, dependent)
        };

        for relay in relays {
            match relay {
                Relay::Notify(notice) => match &dependent {
                    Some(dependent) => notice.deliver_to(dependent.as_ref()),
                    None => {
                        debug!(notice = notice.type_name(), "dropping notice, no dependent");
                    }
                },
                Relay::Forward(call) => call.apply_to(self.real.as_ref()),
            }
        }
        result
    }

    /// Read a value under the lock, with no relays.
    pub(crate) fn read<R>(&self, f: impl FnOnce(&Inner) -> R) -> R {
        let _reentry = ReentryGuard::enter(self as *const Self as usize);
        let inner = self.lock_inner();
        f(&inner)
    }

    pub(crate) fn snapshot(&self) -> MediatorSnapshot {
        self.read(|inner| MediatorSnapshot {
            perceived: inner.state.perceived(),
            transitive_missing: inner.state.is_transitive_missing(),
            forwarding: inner.state.is_forwarding(),
            demanded: inner.state.is_demanded(),
            attached: matches!(inner.attachment, Attachment::Bound(_)),
            retired: matches!(inner.attachment, Attachment::Retired),
        })
    }

    /// No user code runs under the lock, so a poisoned mutex cannot hold a
    /// torn transition state; recover the data and keep relaying.
    fn lock_inner(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
