//! Debug-only reentrancy guard.
//!
//! Detects a thread re-entering a map it already holds locked, which
//! can only happen from user `Hash`/`Eq`/`Clone`/`PartialEq` code running
//! inside an operation. Without the guard that would deadlock on the
//! map's mutex; in debug builds it panics instead. In release builds
//! this compiles to a zero-cost no-op.
//!
//! The record is per thread, so distinct threads contending for the same
//! map are unaffected.

use core::marker::PhantomData;

#[cfg(debug_assertions)]
use std::cell::RefCell;

#[cfg(debug_assertions)]
thread_local! {
    // Addresses of the maps this thread is currently inside.
    static HELD: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };
}

/// RAII guard returned by [`ReentrancyGuard::enter`]. Stays on the thread
/// that created it.
pub struct ReentrancyGuard<'a> {
    #[cfg(debug_assertions)]
    owner: usize,
    _pd: PhantomData<(&'a (), *mut ())>,
}

impl<'a> ReentrancyGuard<'a> {
    /// Enter the guarded section owned by `owner`. In debug builds, panics
    /// if this thread is already inside it.
    #[inline]
    pub fn enter<T>(owner: &'a T) -> Self {
        #[cfg(debug_assertions)]
        {
            let addr = owner as *const T as usize;
            HELD.with(|held| {
                let mut held = held.borrow_mut();
                assert!(
                    !held.contains(&addr),
                    "reentrancy detected: nested entry into a locked map"
                );
                held.push(addr);
            });
            return ReentrancyGuard {
                owner: addr,
                _pd: PhantomData,
            };
        }

        #[cfg(not(debug_assertions))]
        {
            let _ = owner;
            return ReentrancyGuard { _pd: PhantomData };
        }
    }
}

impl<'a> Drop for ReentrancyGuard<'a> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        HELD.with(|held| {
            let mut held = held.borrow_mut();
            let pos = held.iter().rposition(|&a| a == self.owner);
            debug_assert!(pos.is_some());
            if let Some(pos) = pos {
                held.swap_remove(pos);
            }
        });
    }
}
