//! Perceived lifecycle state of a dependency.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a dependency from its dependent's point of view,
/// i.e. based solely on the notices the dependency has delivered.
///
/// The ordering is total and is used as a cheap "does the dependency
/// currently exist" test: `state >= PerceivedState::Installed` separates
/// [`Missing`](PerceivedState::Missing) from the three states in which the
/// dependency is known to be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PerceivedState {
    /// The last notice received was "uninstalled": as far as the dependent
    /// can know, the dependency does not exist right now.
    Missing,

    /// The dependency is installed but not running. This is the initial
    /// value before any notice arrives, and the result of a "down" or
    /// "retrying" notice.
    Installed,

    /// The dependency's most recent start attempt failed.
    Failed,

    /// The dependency is up and running.
    Up,
}

impl PerceivedState {
    /// Whether the dependency is currently known to exist.
    pub fn is_at_least_installed(self) -> bool {
        self >= PerceivedState::Installed
    }

    /// Lowercase name, for logs and diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            PerceivedState::Missing => "missing",
            PerceivedState::Installed => "installed",
            PerceivedState::Failed => "failed",
            PerceivedState::Up => "up",
        }
    }
}

impl std::fmt::Display for PerceivedState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
