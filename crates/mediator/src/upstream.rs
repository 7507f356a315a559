//! The dependent face: registered with the real dependency.

use crate::cell::Shared;
use std::sync::Arc;
use trellis_core::Dependent;

/// Listener registered as the real dependency's single dependent.
///
/// Each notice maps to the matching transition; whether anything reaches
/// the outer dependent is the transition's decision alone.
pub(crate) struct UpstreamListener {
    shared: Arc<Shared>,
}

impl UpstreamListener {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        Self { shared }
    }
}

impl Dependent for UpstreamListener {
    fn on_installed(&self) {
        self.shared.transition(|inner| ((), inner.state.on_installed()))
    }

    fn on_uninstalled(&self) {
        self.shared
            .transition(|inner| ((), inner.state.on_uninstalled()))
    }

    fn on_up(&self) {
        self.shared.transition(|inner| ((), inner.state.on_up()))
    }

    fn on_down(&self) {
        self.shared.transition(|inner| ((), inner.state.on_down()))
    }

    fn on_failed(&self) {
        self.shared.transition(|inner| ((), inner.state.on_failed()))
    }

    fn on_retrying(&self) {
        self.shared.transition(|inner| ((), inner.state.on_retrying()))
    }

    fn on_transitive_missing(&self) {
        self.shared
            .transition(|inner| ((), inner.state.on_transitive_missing()))
    }

    fn on_transitive_restored(&self) {
        self.shared
            .transition(|inner| ((), inner.state.on_transitive_restored()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Attachment;
    use trellis_core::Notice;
    use trellis_test_helpers::{RecordingDependent, StubDependency};
    use trellis_types::PerceivedState;

    #[test]
    fn test_listener_tracks_perceived_state_without_a_dependent() {
        let shared = Arc::new(Shared::new(StubDependency::new()));
        let listener = UpstreamListener::new(Arc::clone(&shared));

        // Notices arriving before any dependent binds still update the
        // perceived state; there is just no audience yet.
        listener.on_up();
        assert_eq!(
            shared.read(|inner| inner.state.perceived()),
            PerceivedState::Up
        );
        listener.on_uninstalled();
        assert_eq!(
            shared.read(|inner| inner.state.perceived()),
            PerceivedState::Missing
        );
    }

    #[test]
    fn test_listener_relays_to_bound_dependent() {
        let shared = Arc::new(Shared::new(StubDependency::new()));
        let dependent = RecordingDependent::new();
        shared.transition(|inner| {
            inner.attachment = Attachment::Bound(dependent.clone());
            ((), inner.state.bind())
        });
        dependent.take_notices();

        let listener = UpstreamListener::new(Arc::clone(&shared));
        listener.on_up();
        assert_eq!(dependent.notices(), vec![Notice::Up]);
    }
}
