//! Optional-dependency mediator for the trellis service container.
//!
//! When a dependent declares a dependency *optional*, the container inserts
//! a mediator between the two instead of wiring them directly. The mediator
//! plays both roles at once: it is the dependency as seen by the dependent,
//! and the dependent as seen by the real dependency. Neither side knows it
//! exists.
//!
//! # Shielding and forwarding
//!
//! The mediator is always in one of two link modes:
//!
//! - **Shielded**: the dependent is told the dependency is trivially
//!   satisfied ("up"), no matter what the real dependency is doing. This is
//!   the view while the dependency is absent, and it persists for as long
//!   as the dependent holds a demand that predates the dependency's
//!   appearance.
//! - **Forwarding**: every notice passes through transparently, in both
//!   directions.
//!
//! Mode changes replay the facts the dependent missed: lifting the shield
//! delivers the dependency's *true* current state, and an uninstall while
//! forwarding walks the dependent back to the shielded "up" baseline with a
//! well-formed undo sequence.
//!
//! # Architecture
//!
//! The decision logic is a synchronous state machine
//! ([`state::MediatorState`]): each entry point mutates the state and
//! returns an ordered list of `Relay`s. The shell around it
//! ([`cell::Shared`]) acquires the cell mutex only for the transition and
//! performs the relays after release, so a callee may synchronously
//! re-enter the mediator without deadlocking. The two capability faces,
//! [`OptionalDependency`] toward the outer dependent and the upstream
//! listener registered with the real dependency, are thin wrappers that
//! share one cell.

mod cell;
mod dependency;
mod reentry;
mod snapshot;
mod state;
mod upstream;

pub use dependency::OptionalDependency;
pub use snapshot::MediatorSnapshot;
