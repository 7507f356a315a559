//! Outbound relay vocabulary.
//!
//! A state transition in a mediating component decides *what* must be
//! relayed and returns it as data; the shell around the transition performs
//! the relays once no lock is held. [`Notice`] and [`Call`] carry the two
//! directions, [`Relay`] is the tagged union the transitions return.

use crate::{Dependency, Dependent};
use serde::{Deserialize, Serialize};

/// A lifecycle notice delivered to a [`Dependent`].
///
/// One variant per callback of the dependent capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Notice {
    /// The dependency is now installed.
    Installed,

    /// The dependency was removed.
    Uninstalled,

    /// The dependency came up.
    Up,

    /// The dependency went down.
    Down,

    /// The dependency's start attempt failed.
    Failed,

    /// The dependency left its failed state.
    Retrying,

    /// A transitive dependency is missing.
    TransitiveMissing,

    /// The missing transitive dependency was installed.
    TransitiveRestored,
}

impl Notice {
    /// Get a human-readable name for this notice.
    pub fn type_name(&self) -> &'static str {
        match self {
            Notice::Installed => "Installed",
            Notice::Uninstalled => "Uninstalled",
            Notice::Up => "Up",
            Notice::Down => "Down",
            Notice::Failed => "Failed",
            Notice::Retrying => "Retrying",
            Notice::TransitiveMissing => "TransitiveMissing",
            Notice::TransitiveRestored => "TransitiveRestored",
        }
    }

    /// Invoke the matching callback on a dependent.
    pub fn deliver_to(self, dependent: &dyn Dependent) {
        match self {
            Notice::Installed => dependent.on_installed(),
            Notice::Uninstalled => dependent.on_uninstalled(),
            Notice::Up => dependent.on_up(),
            Notice::Down => dependent.on_down(),
            Notice::Failed => dependent.on_failed(),
            Notice::Retrying => dependent.on_retrying(),
            Notice::TransitiveMissing => dependent.on_transitive_missing(),
            Notice::TransitiveRestored => dependent.on_transitive_restored(),
        }
    }
}

/// A call forwarded to a [`Dependency`].
///
/// Only the calls that take no arguments and return nothing appear here;
/// registration and value queries need their inputs and outputs threaded
/// through the caller and are never relayed fire-and-forget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Call {
    /// Place a demand on the dependency.
    AddDemand,

    /// Release the demand on the dependency.
    RemoveDemand,

    /// Report that the dependent started.
    DependentStarted,

    /// Report that the dependent stopped.
    DependentStopped,

    /// Remove the registered dependent from the dependency.
    Unregister,
}

impl Call {
    /// Get a human-readable name for this call.
    pub fn type_name(&self) -> &'static str {
        match self {
            Call::AddDemand => "AddDemand",
            Call::RemoveDemand => "RemoveDemand",
            Call::DependentStarted => "DependentStarted",
            Call::DependentStopped => "DependentStopped",
            Call::Unregister => "Unregister",
        }
    }

    /// Invoke the matching method on a dependency.
    pub fn apply_to(self, dependency: &dyn Dependency) {
        match self {
            Call::AddDemand => dependency.add_demand(),
            Call::RemoveDemand => dependency.remove_demand(),
            Call::DependentStarted => dependency.dependent_started(),
            Call::DependentStopped => dependency.dependent_stopped(),
            Call::Unregister => dependency.unregister_dependent(),
        }
    }
}

/// One outbound effect decided by a state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Relay {
    /// Deliver a notice to the attached dependent.
    Notify(Notice),

    /// Forward a call downstream to the real dependency.
    Forward(Call),
}

impl Relay {
    /// Get a human-readable name for this relay.
    pub fn type_name(&self) -> &'static str {
        match self {
            Relay::Notify(notice) => notice.type_name(),
            Relay::Forward(call) => call.type_name(),
        }
    }

    /// Check if this relay targets the dependent side.
    pub fn is_notify(&self) -> bool {
        matches!(self, Relay::Notify(_))
    }

    /// Check if this relay targets the dependency side.
    pub fn is_forward(&self) -> bool {
        matches!(self, Relay::Forward(_))
    }
}
