//! Type-erased values produced by dependencies.

use std::any::Any;
use std::sync::Arc;

/// A value produced by a dependency for its dependents.
///
/// Dependencies in the graph produce values of arbitrary types; the
/// container passes them around type-erased and dependents downcast at the
/// point of use.
#[derive(Clone)]
pub struct ServiceValue(Arc<dyn Any + Send + Sync>);

impl ServiceValue {
    /// Wrap a concrete value.
    pub fn new<T: Send + Sync + 'static>(value: T) -> Self {
        Self(Arc::new(value))
    }

    /// Downcast to a concrete type. Returns `None` on a type mismatch.
    pub fn downcast<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.0).downcast::<T>().ok()
    }

    /// Whether the wrapped value is of type `T`.
    pub fn is<T: 'static>(&self) -> bool {
        self.0.is::<T>()
    }
}

impl std::fmt::Debug for ServiceValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ServiceValue(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downcast_roundtrip() {
        let value = ServiceValue::new(42u32);
        assert!(value.is::<u32>());
        assert_eq!(*value.downcast::<u32>().unwrap(), 42);
        assert!(value.downcast::<String>().is_none());
    }
}
