//! Serializable diagnostic view of a mediator.

use serde::{Deserialize, Serialize};
use trellis_types::PerceivedState;

/// Point-in-time view of a mediator's state, read atomically under its
/// lock.
///
/// Intended for the surrounding container's diagnostics surface; nothing
/// in the mediator itself consumes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediatorSnapshot {
    /// Real dependency lifecycle as last reported by its notices.
    pub perceived: PerceivedState,

    /// A transitive dependency of the real dependency is known missing.
    pub transitive_missing: bool,

    /// Notices currently pass through in both directions.
    pub forwarding: bool,

    /// The dependent currently holds a demand.
    pub demanded: bool,

    /// An outer dependent is currently bound.
    pub attached: bool,

    /// The dependent was removed; the mediator is permanently detached.
    pub retired: bool,
}
