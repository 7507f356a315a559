//! Pure transition core of the mediator.
//!
//! Every mediator entry point maps to one handler here. Handlers mutate the
//! state and return the ordered list of relays to perform; they never call
//! out themselves. The shell in `cell.rs` runs a handler under the cell
//! mutex, releases it, then executes the relays, so this module can be
//! tested exhaustively without any concurrency in play.

use tracing::{debug, info};
use trellis_core::{Call, Notice, Relay};
use trellis_types::PerceivedState;

/// Link mode between the outer dependent and the real dependency.
///
/// The demand flag is carried in both modes: a demand added while
/// forwarding must still shield a reinstall after the dependency goes away,
/// so it cannot live in the `Shielded` variant alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Link {
    /// The dependent sees the synthetic "up" view of an absent or hidden
    /// dependency; calls bound for the real dependency are suppressed.
    Shielded {
        /// The dependent currently holds a demand.
        demanded: bool,
    },

    /// Every notice passes through, in both directions.
    Forwarding {
        /// The dependent currently holds a demand.
        demanded: bool,
    },
}

impl Link {
    pub(crate) fn is_forwarding(self) -> bool {
        matches!(self, Link::Forwarding { .. })
    }

    pub(crate) fn demanded(self) -> bool {
        match self {
            Link::Shielded { demanded } | Link::Forwarding { demanded } => demanded,
        }
    }
}

/// Mediator transition state.
///
/// `perceived` and `transitive_missing` track the real dependency from its
/// notices alone; `link` is re-derived on every transition that can affect
/// it, never assumed stale.
#[derive(Debug)]
pub(crate) struct MediatorState {
    /// Real dependency lifecycle, as last reported by its notices.
    perceived: PerceivedState,

    /// A transitive dependency of the real dependency is currently missing.
    /// Survives an uninstall of the dependency itself, so it can be
    /// replayed when forwarding resumes.
    transitive_missing: bool,

    /// Current link mode toward the outer dependent.
    link: Link,
}

impl MediatorState {
    /// Create the initial state: dependency perceived as installed, no
    /// demand, shielded until a dependent binds.
    pub(crate) fn new() -> Self {
        Self {
            perceived: PerceivedState::Installed,
            transitive_missing: false,
            link: Link::Shielded { demanded: false },
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Accessors
    // ═══════════════════════════════════════════════════════════════════════════

    pub(crate) fn perceived(&self) -> PerceivedState {
        self.perceived
    }

    pub(crate) fn is_transitive_missing(&self) -> bool {
        self.transitive_missing
    }

    pub(crate) fn is_forwarding(&self) -> bool {
        self.link.is_forwarding()
    }

    pub(crate) fn is_demanded(&self) -> bool {
        self.link.demanded()
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Dependent-side commands
    // ═══════════════════════════════════════════════════════════════════════════

    /// A dependent was just bound. Recompute the link mode and produce the
    /// registration replay.
    ///
    /// The mediator is the perpetual stand-in for the dependency's
    /// existence, so a fresh dependent always learns "installed" first,
    /// followed by either the current terminal fact (forwarding) or the
    /// shielded "up" default (dependency absent).
    pub(crate) fn bind(&mut self) -> Vec<Relay> {
        let demanded = self.link.demanded();
        let forwarding = self.perceived.is_at_least_installed();
        self.link = if forwarding {
            Link::Forwarding { demanded }
        } else {
            Link::Shielded { demanded }
        };

        let mut relays = vec![Relay::Notify(Notice::Installed)];
        if forwarding {
            match self.perceived {
                PerceivedState::Failed => relays.push(Relay::Notify(Notice::Failed)),
                PerceivedState::Up => relays.push(Relay::Notify(Notice::Up)),
                // Installed is the default view; nothing to replay.
                _ => {}
            }
            if self.transitive_missing {
                relays.push(Relay::Notify(Notice::TransitiveMissing));
            }
        } else {
            relays.push(Relay::Notify(Notice::Up));
        }

        debug!(perceived = %self.perceived, forwarding, "dependent bound");
        relays
    }

    /// The dependent was removed. Terminal: the shell retires the
    /// attachment and the mediator unregisters from the real dependency.
    pub(crate) fn unbind(&mut self) -> Vec<Relay> {
        self.link = Link::Shielded {
            demanded: self.link.demanded(),
        };
        vec![Relay::Forward(Call::Unregister)]
    }

    /// The dependent placed a demand. Relayed downstream only while
    /// forwarding; while shielded the demand is recorded and the dependency
    /// must not learn of it.
    pub(crate) fn add_demand(&mut self) -> Vec<Relay> {
        match self.link {
            Link::Forwarding { .. } => {
                self.link = Link::Forwarding { demanded: true };
                vec![Relay::Forward(Call::AddDemand)]
            }
            Link::Shielded { .. } => {
                self.link = Link::Shielded { demanded: true };
                debug!("demand recorded while shielded");
                vec![]
            }
        }
    }

    /// The dependent released its demand.
    ///
    /// If already forwarding this is a transparent pass-through. If
    /// shielded, the shield lifts now when the dependency is present, and
    /// the dependent is told the true facts it missed; a still-missing
    /// dependency keeps the shield (the "up" view is already correct).
    pub(crate) fn remove_demand(&mut self) -> Vec<Relay> {
        match self.link {
            Link::Forwarding { .. } => {
                self.link = Link::Forwarding { demanded: false };
                vec![Relay::Forward(Call::RemoveDemand)]
            }
            Link::Shielded { .. } if self.perceived.is_at_least_installed() => {
                self.link = Link::Forwarding { demanded: false };
                let mut relays = Vec::new();
                match self.perceived {
                    PerceivedState::Installed => relays.push(Relay::Notify(Notice::Down)),
                    PerceivedState::Failed => relays.push(Relay::Notify(Notice::Failed)),
                    // Up matches the shielded view; nothing to correct.
                    _ => {}
                }
                if self.transitive_missing {
                    relays.push(Relay::Notify(Notice::TransitiveMissing));
                }
                info!(perceived = %self.perceived, "demand released, shield lifted");
                relays
            }
            Link::Shielded { .. } => {
                self.link = Link::Shielded { demanded: false };
                vec![]
            }
        }
    }

    /// The dependent started. Forwarded iff the link is transparent.
    pub(crate) fn dependent_started(&self) -> Vec<Relay> {
        self.forward_if_transparent(Call::DependentStarted)
    }

    /// The dependent stopped. Forwarded iff the link is transparent.
    pub(crate) fn dependent_stopped(&self) -> Vec<Relay> {
        self.forward_if_transparent(Call::DependentStopped)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Notices from the real dependency
    // ═══════════════════════════════════════════════════════════════════════════

    /// The real dependency was installed.
    ///
    /// The shield persists exactly as long as the demand is held: a
    /// dependent that demanded the dependency while it was absent must not
    /// learn it appeared until the demand is released.
    pub(crate) fn on_installed(&mut self) -> Vec<Relay> {
        self.perceived = PerceivedState::Installed;
        let demanded = self.link.demanded();
        if demanded {
            self.link = Link::Shielded { demanded: true };
            debug!("dependency installed while demanded, shield persists");
            return vec![];
        }

        self.link = Link::Forwarding { demanded: false };
        // Freshly installed means not yet up.
        let mut relays = vec![Relay::Notify(Notice::Down)];
        if self.transitive_missing {
            relays.push(Relay::Notify(Notice::TransitiveMissing));
        }
        debug!("dependency installed, forwarding");
        relays
    }

    /// The real dependency was removed.
    ///
    /// If the dependent was seeing the true state, it is walked back to the
    /// shielded "up" baseline: any non-default fact it has been told is
    /// cancelled first, then "up" is asserted. The resulting notice
    /// sequence is well formed from the dependent's point of view.
    pub(crate) fn on_uninstalled(&mut self) -> Vec<Relay> {
        let was_forwarding = self.link.is_forwarding();
        let prior = self.perceived;
        self.perceived = PerceivedState::Missing;
        self.link = Link::Shielded {
            demanded: self.link.demanded(),
        };

        if !was_forwarding {
            return vec![];
        }

        let mut relays = Vec::new();
        if self.transitive_missing {
            relays.push(Relay::Notify(Notice::TransitiveRestored));
        }
        if prior == PerceivedState::Failed {
            relays.push(Relay::Notify(Notice::Retrying));
        }
        relays.push(Relay::Notify(Notice::Up));
        debug!(prior = %prior, "dependency uninstalled, dependent returned to shielded view");
        relays
    }

    /// The real dependency came up.
    pub(crate) fn on_up(&mut self) -> Vec<Relay> {
        self.perceived = PerceivedState::Up;
        self.notify_if_forwarding(Notice::Up)
    }

    /// The real dependency went down.
    pub(crate) fn on_down(&mut self) -> Vec<Relay> {
        self.perceived = PerceivedState::Installed;
        self.notify_if_forwarding(Notice::Down)
    }

    /// The real dependency's start attempt failed.
    pub(crate) fn on_failed(&mut self) -> Vec<Relay> {
        self.perceived = PerceivedState::Failed;
        self.notify_if_forwarding(Notice::Failed)
    }

    /// The real dependency left its failed state.
    pub(crate) fn on_retrying(&mut self) -> Vec<Relay> {
        self.perceived = PerceivedState::Installed;
        self.notify_if_forwarding(Notice::Retrying)
    }

    /// A transitive dependency of the real dependency went missing.
    pub(crate) fn on_transitive_missing(&mut self) -> Vec<Relay> {
        self.transitive_missing = true;
        self.notify_if_forwarding(Notice::TransitiveMissing)
    }

    /// The missing transitive dependency was installed.
    pub(crate) fn on_transitive_restored(&mut self) -> Vec<Relay> {
        self.transitive_missing = false;
        self.notify_if_forwarding(Notice::TransitiveRestored)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Helpers
    // ═══════════════════════════════════════════════════════════════════════════

    fn notify_if_forwarding(&self, notice: Notice) -> Vec<Relay> {
        if self.link.is_forwarding() {
            vec![Relay::Notify(notice)]
        } else {
            vec![]
        }
    }

    fn forward_if_transparent(&self, call: Call) -> Vec<Relay> {
        if self.link.is_forwarding() {
            vec![Relay::Forward(call)]
        } else {
            vec![]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    fn notify(notice: Notice) -> Relay {
        Relay::Notify(notice)
    }

    fn forward(call: Call) -> Relay {
        Relay::Forward(call)
    }

    /// A state with a dependent bound, discarding the registration replay.
    fn make_bound_state() -> MediatorState {
        let mut state = MediatorState::new();
        state.bind();
        state
    }

    #[test]
    fn test_bind_at_initial_state_replays_installed_only() {
        let mut state = MediatorState::new();
        let relays = state.bind();
        assert_eq!(relays, vec![notify(Notice::Installed)]);
        assert!(state.is_forwarding());
    }

    #[test]
    fn test_bind_while_missing_replays_shielded_default() {
        let mut state = MediatorState::new();
        state.on_uninstalled();
        let relays = state.bind();
        assert_eq!(relays, vec![notify(Notice::Installed), notify(Notice::Up)]);
        assert!(!state.is_forwarding());
    }

    #[test]
    fn test_bind_replays_terminal_failed_fact() {
        let mut state = MediatorState::new();
        state.on_failed();
        let relays = state.bind();
        assert_eq!(
            relays,
            vec![notify(Notice::Installed), notify(Notice::Failed)]
        );
    }

    #[test]
    fn test_bind_replays_up_and_transitive_missing() {
        let mut state = MediatorState::new();
        state.on_up();
        state.on_transitive_missing();
        let relays = state.bind();
        assert_eq!(
            relays,
            vec![
                notify(Notice::Installed),
                notify(Notice::Up),
                notify(Notice::TransitiveMissing),
            ]
        );
    }

    #[test]
    fn test_demand_is_relayed_while_forwarding() {
        let mut state = make_bound_state();
        assert_eq!(state.add_demand(), vec![forward(Call::AddDemand)]);
        assert_eq!(state.remove_demand(), vec![forward(Call::RemoveDemand)]);
    }

    #[test]
    fn test_demand_is_suppressed_while_shielded() {
        let mut state = MediatorState::new();
        state.on_uninstalled();
        state.bind();

        assert_eq!(state.add_demand(), vec![]);
        assert!(state.is_demanded());
        // Dependency still missing: releasing the demand changes nothing
        // the dependent can see.
        assert_eq!(state.remove_demand(), vec![]);
        assert!(!state.is_forwarding());
    }

    #[traced_test]
    #[test]
    fn test_shield_persists_while_demand_held() {
        let mut state = MediatorState::new();
        state.on_uninstalled();
        state.bind();
        state.add_demand();

        // The dependency appears and churns; the dependent must see none
        // of it while the demand is held.
        assert_eq!(state.on_installed(), vec![]);
        assert_eq!(state.on_up(), vec![]);
        assert_eq!(state.on_down(), vec![]);
        assert!(!state.is_forwarding());
        assert_eq!(state.perceived(), PerceivedState::Installed);
    }

    #[test]
    fn test_shield_lift_replays_down_for_installed() {
        let mut state = MediatorState::new();
        state.on_uninstalled();
        state.bind();
        state.add_demand();
        state.on_installed();

        let relays = state.remove_demand();
        assert_eq!(relays, vec![notify(Notice::Down)]);
        assert!(state.is_forwarding());
    }

    #[test]
    fn test_shield_lift_replays_failed() {
        let mut state = MediatorState::new();
        state.on_uninstalled();
        state.bind();
        state.add_demand();
        state.on_installed();
        state.on_failed();

        let relays = state.remove_demand();
        assert_eq!(relays, vec![notify(Notice::Failed)]);
    }

    #[test]
    fn test_shield_lift_is_silent_for_up() {
        let mut state = MediatorState::new();
        state.on_uninstalled();
        state.bind();
        state.add_demand();
        state.on_installed();
        state.on_up();

        // The shielded view was "up" and the truth is "up": no correction.
        assert_eq!(state.remove_demand(), vec![]);
        assert!(state.is_forwarding());
    }

    #[test]
    fn test_shield_lift_appends_transitive_missing() {
        let mut state = MediatorState::new();
        state.on_uninstalled();
        state.bind();
        state.add_demand();
        state.on_installed();
        state.on_transitive_missing();

        let relays = state.remove_demand();
        assert_eq!(
            relays,
            vec![notify(Notice::Down), notify(Notice::TransitiveMissing)]
        );
    }

    #[traced_test]
    #[test]
    fn test_uninstall_undo_sequence() {
        let mut state = make_bound_state();
        state.on_transitive_missing();
        state.on_failed();

        let relays = state.on_uninstalled();
        assert_eq!(
            relays,
            vec![
                notify(Notice::TransitiveRestored),
                notify(Notice::Retrying),
                notify(Notice::Up),
            ]
        );
        assert_eq!(state.perceived(), PerceivedState::Missing);
        assert!(!state.is_forwarding());
    }

    #[test]
    fn test_uninstall_without_outstanding_facts_asserts_up_only() {
        let mut state = make_bound_state();
        assert_eq!(state.on_uninstalled(), vec![notify(Notice::Up)]);
    }

    #[test]
    fn test_uninstall_while_shielded_is_silent() {
        let mut state = MediatorState::new();
        state.on_uninstalled();
        state.bind();
        state.add_demand();
        state.on_installed();

        assert_eq!(state.on_uninstalled(), vec![]);
        assert_eq!(state.perceived(), PerceivedState::Missing);
    }

    #[test]
    fn test_transitive_flag_survives_uninstall() {
        let mut state = make_bound_state();
        state.on_transitive_missing();
        state.on_uninstalled();
        assert!(state.is_transitive_missing());

        // Reinstall with no demand: forwarding resumes and the still-missing
        // transitive dependency is replayed.
        let relays = state.on_installed();
        assert_eq!(
            relays,
            vec![notify(Notice::Down), notify(Notice::TransitiveMissing)]
        );
    }

    #[test]
    fn test_demand_added_while_forwarding_shields_reinstall() {
        let mut state = make_bound_state();
        state.add_demand();
        state.on_uninstalled();

        // The demand predates the reinstall, so the dependent must not
        // learn the dependency came back.
        assert_eq!(state.on_installed(), vec![]);
        assert!(!state.is_forwarding());
        assert!(state.is_demanded());
    }

    #[test]
    fn test_lifecycle_notices_pass_through_while_forwarding() {
        let mut state = make_bound_state();
        assert_eq!(state.on_up(), vec![notify(Notice::Up)]);
        assert_eq!(state.on_down(), vec![notify(Notice::Down)]);
        assert_eq!(state.on_failed(), vec![notify(Notice::Failed)]);
        assert_eq!(state.on_retrying(), vec![notify(Notice::Retrying)]);
        assert_eq!(
            state.on_transitive_missing(),
            vec![notify(Notice::TransitiveMissing)]
        );
        assert_eq!(
            state.on_transitive_restored(),
            vec![notify(Notice::TransitiveRestored)]
        );
    }

    #[test]
    fn test_start_stop_forwarded_only_while_transparent() {
        let mut state = make_bound_state();
        assert_eq!(
            state.dependent_started(),
            vec![forward(Call::DependentStarted)]
        );
        assert_eq!(
            state.dependent_stopped(),
            vec![forward(Call::DependentStopped)]
        );

        state.on_uninstalled();
        assert_eq!(state.dependent_started(), vec![]);
        assert_eq!(state.dependent_stopped(), vec![]);
    }

    #[test]
    fn test_unbind_unregisters_and_stops_forwarding() {
        let mut state = make_bound_state();
        assert_eq!(state.unbind(), vec![forward(Call::Unregister)]);
        assert!(!state.is_forwarding());
    }

    #[test]
    fn test_perceived_state_transitions() {
        let mut state = make_bound_state();
        assert_eq!(state.perceived(), PerceivedState::Installed);
        state.on_up();
        assert_eq!(state.perceived(), PerceivedState::Up);
        state.on_retrying();
        assert_eq!(state.perceived(), PerceivedState::Installed);
        state.on_failed();
        assert_eq!(state.perceived(), PerceivedState::Failed);
        state.on_uninstalled();
        assert_eq!(state.perceived(), PerceivedState::Missing);
        state.on_installed();
        assert_eq!(state.perceived(), PerceivedState::Installed);
    }
}
