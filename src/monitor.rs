use std::cell::Cell;

use crate::config::Config;

thread_local! {
    // Floor of the segment the thread is currently executing on, if any.
    // `None` means we are on the OS-provided stack and `stacker` knows its
    // bounds better than we do.
    static SEGMENT_FLOOR: Cell<Option<usize>> = const { Cell::new(None) };
}

/// Estimate of the free stack space, in bytes, below the current stack
/// pointer.
///
/// While executing on a segment allocated by this crate, this is the exact
/// distance to the segment's guard page. Otherwise it is `stacker`'s
/// estimate for the OS-provided stack, and `None` when the platform cannot
/// report its stack bounds.
pub fn remaining_stack() -> Option<usize> {
    match SEGMENT_FLOOR.with(|f| f.get()) {
        Some(floor) => Some((psm::stack_pointer() as usize).saturating_sub(floor)),
        None => stacker::remaining_stack(),
    }
}

/// Whether the next protected call should run on a fresh segment.
///
/// A thread-local read, a stack-pointer read and a compare; this runs on
/// every `protect` call, almost all of which are nowhere near exhaustion.
/// An unknown bound counts as exhausted: paying for an unnecessary segment
/// beats silently running unprotected.
#[inline]
pub(crate) fn needs_growth(config: &Config) -> bool {
    match remaining_stack() {
        Some(remaining) => remaining <= config.red_zone_bytes,
        None => true,
    }
}

/// Publishes a segment's floor as the current one for the duration of the
/// switched call, restoring the previous floor (the caller's segment, or
/// none) on drop.
pub(crate) struct FloorGuard {
    previous: Option<usize>,
}

impl FloorGuard {
    pub(crate) fn publish(floor: usize) -> FloorGuard {
        let previous = SEGMENT_FLOOR.with(|f| f.replace(Some(floor)));
        FloorGuard { previous }
    }
}

impl Drop for FloorGuard {
    fn drop(&mut self) {
        SEGMENT_FLOOR.with(|f| f.set(self.previous));
    }
}
