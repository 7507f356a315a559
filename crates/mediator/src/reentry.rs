//! Debug-only reentrancy assertions.
//!
//! Callers must not invoke a mediator operation while the same thread is
//! inside that mediator's locked section; the cell mutex is not reentrant
//! and the call would deadlock. Relays are performed after the lock is
//! released precisely so that callees may re-enter, and this guard turns a
//! violation of the calling convention into an assertion failure instead
//! of a silent hang. Release builds compile the checks away.

#[cfg(debug_assertions)]
use std::cell::RefCell;
#[cfg(debug_assertions)]
use std::collections::HashSet;

#[cfg(debug_assertions)]
thread_local! {
    /// Addresses of cells whose locked section is active on this thread.
    static ACTIVE_CELLS: RefCell<HashSet<usize>> = RefCell::new(HashSet::new());
}

/// Marks a cell's locked section as active on the current thread for the
/// guard's lifetime.
pub(crate) struct ReentryGuard {
    #[cfg(debug_assertions)]
    cell: usize,
}

impl ReentryGuard {
    #[cfg_attr(not(debug_assertions), allow(unused_variables))]
    pub(crate) fn enter(cell: usize) -> Self {
        #[cfg(debug_assertions)]
        ACTIVE_CELLS.with(|active| {
            let inserted = active.borrow_mut().insert(cell);
            debug_assert!(
                inserted,
                "mediator operation invoked while the calling thread holds the mediator's lock"
            );
        });
        Self {
            #[cfg(debug_assertions)]
            cell,
        }
    }
}

#[cfg(debug_assertions)]
impl Drop for ReentryGuard {
    fn drop(&mut self) {
        ACTIVE_CELLS.with(|active| {
            active.borrow_mut().remove(&self.cell);
        });
    }
}
