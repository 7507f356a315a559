//! Capability traits and relay vocabulary for the trellis dependency graph.
//!
//! Every edge in the dependency graph connects two capabilities:
//!
//! - a [`Dependency`], which can be demanded, started and stopped against,
//!   and queried for a produced value, and which accepts a single registered
//!   dependent;
//! - a [`Dependent`], which receives the dependency's lifecycle notices.
//!
//! Components that mediate between the two sides (such as the
//! optional-dependency mediator) decide their behavior as a pure state
//! transition returning an ordered list of [`Relay`]s; the shell around the
//! transition performs the relays with no lock held. The vocabulary of
//! possible relays lives here so that it can be shared between the mediator
//! and test fixtures.

mod error;
mod relay;
mod traits;

pub use error::AlreadyBound;
pub use relay::{Call, Notice, Relay};
pub use traits::{Dependency, Dependent};
