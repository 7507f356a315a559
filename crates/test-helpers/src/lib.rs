//! Recording fakes for both sides of a dependency edge.
//!
//! [`RecordingDependent`] captures the notice sequence a dependent
//! receives; [`StubDependency`] captures the calls forwarded to a
//! dependency and can emit notices into its registered dependent the way a
//! real dependency's notifier thread would. Together they let tests drive
//! a mediator from both sides and assert on exactly what crossed it.

use std::sync::{Arc, Mutex};
use trellis_core::{AlreadyBound, Call, Dependency, Dependent, Notice};
use trellis_types::ServiceValue;

/// A dependent that records every notice it receives, in order.
#[derive(Default)]
pub struct RecordingDependent {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingDependent {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// All notices received so far, in delivery order.
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }

    /// Drain the recorded notices, leaving the log empty.
    pub fn take_notices(&self) -> Vec<Notice> {
        std::mem::take(&mut self.notices.lock().unwrap())
    }

    fn record(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}

impl Dependent for RecordingDependent {
    fn on_installed(&self) {
        self.record(Notice::Installed)
    }

    fn on_uninstalled(&self) {
        self.record(Notice::Uninstalled)
    }

    fn on_up(&self) {
        self.record(Notice::Up)
    }

    fn on_down(&self) {
        self.record(Notice::Down)
    }

    fn on_failed(&self) {
        self.record(Notice::Failed)
    }

    fn on_retrying(&self) {
        self.record(Notice::Retrying)
    }

    fn on_transitive_missing(&self) {
        self.record(Notice::TransitiveMissing)
    }

    fn on_transitive_restored(&self) {
        self.record(Notice::TransitiveRestored)
    }
}

/// A dependency that records the calls forwarded to it.
///
/// Holds a configurable produced value and the single registered
/// dependent; [`emit`](StubDependency::emit) plays a notice into that
/// dependent, which is how tests drive the upstream side of a mediator.
#[derive(Default)]
pub struct StubDependency {
    calls: Mutex<Vec<Call>>,
    value: Mutex<Option<ServiceValue>>,
    dependent: Mutex<Option<Arc<dyn Dependent>>>,
}

impl StubDependency {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A stub that produces `value` when queried.
    pub fn with_value(value: ServiceValue) -> Arc<Self> {
        let stub = Self::default();
        *stub.value.lock().unwrap() = Some(value);
        Arc::new(stub)
    }

    /// Replace the produced value.
    pub fn set_value(&self, value: Option<ServiceValue>) {
        *self.value.lock().unwrap() = value;
    }

    /// All calls received so far, in arrival order.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Drain the recorded calls, leaving the log empty.
    pub fn take_calls(&self) -> Vec<Call> {
        std::mem::take(&mut self.calls.lock().unwrap())
    }

    /// Whether a dependent is currently registered.
    pub fn has_dependent(&self) -> bool {
        self.dependent.lock().unwrap().is_some()
    }

    /// Deliver a notice to the registered dependent, as the real
    /// dependency's notifier thread would. A missing dependent makes this
    /// a no-op.
    ///
    /// The dependent slot lock is released before the callback so the
    /// callee may re-enter this stub.
    pub fn emit(&self, notice: Notice) {
        let dependent = self.dependent.lock().unwrap().clone();
        if let Some(dependent) = dependent {
            notice.deliver_to(dependent.as_ref());
        }
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Dependency for StubDependency {
    fn register_dependent(&self, dependent: Arc<dyn Dependent>) -> Result<(), AlreadyBound> {
        let mut slot = self.dependent.lock().unwrap();
        if slot.is_some() {
            return Err(AlreadyBound);
        }
        *slot = Some(dependent);
        Ok(())
    }

    fn unregister_dependent(&self) {
        self.dependent.lock().unwrap().take();
        self.record(Call::Unregister);
    }

    fn add_demand(&self) {
        self.record(Call::AddDemand)
    }

    fn remove_demand(&self) {
        self.record(Call::RemoveDemand)
    }

    fn dependent_started(&self) {
        self.record(Call::DependentStarted)
    }

    fn dependent_stopped(&self) {
        self.record(Call::DependentStopped)
    }

    fn value(&self) -> Option<ServiceValue> {
        self.value.lock().unwrap().clone()
    }
}
