//! Debug-only reentrancy guard.
//!
//! Lock-protected structure that runs user predicates while holding its lock.
//! A predicate that calls back into the same structure on the same thread
//! would deadlock on the lock; in debug builds the guard turns that into a
//! panic instead. Entries are tracked per thread, so distinct threads may
//! hold the guard of one instance at the same time. In release builds this
//! compiles to a zero-cost no-op.

use core::marker::PhantomData;

#[cfg(debug_assertions)]
use core::sync::atomic::{AtomicUsize, Ordering};
#[cfg(debug_assertions)]
use std::cell::RefCell;

#[cfg(debug_assertions)]
static NEXT_ID: AtomicUsize = AtomicUsize::new(0);

#[cfg(debug_assertions)]
thread_local! {
    // Ids of the instances this thread is currently inside.
    static ENTERED: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };
}

/// Per-instance reentrancy tracker. Embed this in structs to guard public
/// entry-points with `let _g = self.reentrancy.enter();` taken before the
/// lock is acquired.
#[derive(Debug)]
pub(crate) struct DebugReentrancy {
    #[cfg(debug_assertions)]
    id: usize,
}

impl DebugReentrancy {
    pub(crate) fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Enter a guarded section. In debug builds, panics if the current thread
    /// is already inside this instance.
    #[inline]
    pub(crate) fn enter(&self) -> ReentrancyGuard<'_> {
        #[cfg(debug_assertions)]
        {
            ENTERED.with(|entered| {
                let mut entered = entered.borrow_mut();
                assert!(
                    !entered.contains(&self.id),
                    "reentrancy detected: nested entry into data structure"
                );
                entered.push(self.id);
            });
            return ReentrancyGuard {
                owner: self,
                _nosend: PhantomData,
            };
        }

        #[cfg(not(debug_assertions))]
        {
            return ReentrancyGuard {
                _z: PhantomData,
                _nosend: PhantomData,
            };
        }
    }
}

impl Default for DebugReentrancy {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII guard returned by `DebugReentrancy::enter`. Bound to the entering
/// thread.
pub(crate) struct ReentrancyGuard<'a> {
    #[cfg(debug_assertions)]
    owner: &'a DebugReentrancy,
    #[cfg(not(debug_assertions))]
    _z: PhantomData<&'a ()>,
    _nosend: PhantomData<*const ()>,
}

impl<'a> Drop for ReentrancyGuard<'a> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        {
            let id = self.owner.id;
            // try_with: the thread-local may already be gone during thread teardown.
            let _ = ENTERED.try_with(|entered| {
                let mut entered = entered.borrow_mut();
                let found = entered.iter().rposition(|&e| e == id);
                debug_assert!(found.is_some());
                if let Some(i) = found {
                    entered.swap_remove(i);
                }
            });
        }
    }
}
