use std::cell::Cell;

use tracing::trace;

use crate::error::Error;

thread_local! {
    static STATS: Cell<SegmentStats> = const {
        Cell::new(SegmentStats {
            allocated: 0,
            released: 0,
        })
    };
}

/// A stack segment on which a protected call runs.
///
/// Owns one guard-paged memory region. Created immediately before a switch,
/// exclusively owned by the creating thread, and released as soon as the
/// switched call returns or unwinds. It never outlives the call that
/// created it and never crosses threads.
pub(crate) struct StackSegment {
    s: context::stack::ProtectedFixedSizeStack,
}

impl StackSegment {
    /// Allocate a segment with at least `size` usable bytes.
    pub(crate) fn new(size: usize) -> Result<StackSegment, Error> {
        let s = context::stack::ProtectedFixedSizeStack::new(size)
            .map_err(|source| Error::SegmentAllocation { size, source })?;
        STATS.with(|c| {
            let mut stats = c.get();
            stats.allocated += 1;
            c.set(stats);
        });
        Ok(StackSegment { s })
    }

    pub(crate) fn stack(&self) -> &context::stack::ProtectedFixedSizeStack {
        &self.s
    }

    /// Lowest usable address, just above the guard page. Stack pointers on
    /// this segment stay at or above it.
    pub(crate) fn floor(&self) -> usize {
        self.s.bottom() as usize
    }

    pub(crate) fn len(&self) -> usize {
        self.s.len()
    }
}

impl Drop for StackSegment {
    fn drop(&mut self) {
        STATS.with(|c| {
            let mut stats = c.get();
            stats.released += 1;
            c.set(stats);
        });
        trace!(size = self.s.len(), "released stack segment");
    }
}

/// Running segment counters for the current thread.
///
/// Counts only ever increase; a segment currently in use shows up in
/// `allocated` but not yet in `released`. Segments are thread-owned, so the
/// counters are per thread too: one thread's recursion never shows up in
/// another's numbers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SegmentStats {
    /// Segments allocated on this thread so far.
    pub allocated: u64,
    /// Segments released on this thread so far.
    pub released: u64,
}

/// Snapshot of the current thread's segment counters.
///
/// Useful for asserting that a piece of code did, or did not, trigger a
/// stack switch:
///
/// ```
/// let before = restack::segment_stats();
/// restack::protect(|| 2 + 2);
/// assert_eq!(restack::segment_stats(), before); // shallow, no switch
/// ```
pub fn segment_stats() -> SegmentStats {
    STATS.with(|c| c.get())
}
