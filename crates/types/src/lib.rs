//! Core vocabulary types for the trellis service container.
//!
//! This crate holds the types shared by every layer of the container:
//! the perceived lifecycle state of a dependency and the type-erased
//! value a dependency produces for its dependents.

mod state;
mod value;

pub use state::PerceivedState;
pub use value::ServiceValue;
