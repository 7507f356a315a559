//! Error types for the capability contract.

use thiserror::Error;

/// Registration was attempted on a dependency whose single dependent slot
/// is already consumed.
///
/// This signals a wiring error in the surrounding container, not a
/// transient condition: it is never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("a dependent is already registered with this dependency")]
pub struct AlreadyBound;
