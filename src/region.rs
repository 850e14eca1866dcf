use std::cell::Cell;
use std::marker::PhantomData;

thread_local! {
    // Depth of nested protected regions on this thread. Lazily zero, only
    // ever touched by the owning thread, gone when the thread ends.
    static DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Whether the current thread is executing inside a protected region.
///
/// True exactly while a [`protect`](crate::protect) call is on the current
/// thread's call chain. [`Recursive`](crate::Recursive) accessors consult
/// this in strict mode.
#[inline]
pub fn is_protected() -> bool {
    DEPTH.with(|d| d.get()) > 0
}

/// Forcibly mark the current thread as outside any protected region.
///
/// Only meant for test isolation: a test that panicked out of a protected
/// region on a pooled test thread could otherwise leak protection into the
/// next test on that thread. Never call this from inside a protected
/// region in real code.
pub fn reset_protection() {
    DEPTH.with(|d| d.set(0));
}

/// Marks the current thread as protected until dropped. Reentrant: nesting
/// is a counter bump, not new state.
pub(crate) fn enter() -> RegionGuard {
    DEPTH.with(|d| d.set(d.get() + 1));
    RegionGuard {
        _not_send: PhantomData,
    }
}

pub(crate) struct RegionGuard {
    // Region state belongs to one thread; the guard must not migrate.
    _not_send: PhantomData<*const ()>,
}

impl Drop for RegionGuard {
    fn drop(&mut self) {
        DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
    }
}
