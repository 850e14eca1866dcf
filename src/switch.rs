use std::panic::{self, AssertUnwindSafe};
use std::ptr;
use std::thread;

use tracing::{error, trace};

use crate::config::Config;
use crate::monitor::{self, FloorGuard};
use crate::region;
use crate::segment::StackSegment;

/// Run `op` with stack-overflow protection.
///
/// When the current thread still has stack to spare, `op` runs in place and
/// the only cost is the remaining-stack check. When the red zone is
/// breached, `op` runs on a freshly allocated stack segment instead, and
/// the segment is released as soon as `op` returns or unwinds. Either way
/// the current thread counts as inside a protected region
/// ([`is_protected`](crate::is_protected) returns true) for the duration of
/// the call, so [`Recursive`](crate::Recursive) accessors inside `op` are
/// allowed.
///
/// A recursive algorithm re-entering `protect` re-checks the remaining
/// stack of the segment it is now on, so arbitrarily deep recursion turns
/// into a chain of segments, torn down in reverse order as the recursion
/// unwinds:
///
/// ```
/// fn depth(n: u64) -> u64 {
///     restack::protect(|| if n == 0 { 0 } else { 1 + depth(n - 1) })
/// }
/// assert_eq!(depth(100_000), 100_000);
/// ```
///
/// A panic from `op` crosses every intervening switch unchanged and
/// resurfaces at the original caller, releasing each segment on the way
/// out, exactly as if no switch had occurred.
///
/// # Panics
///
/// Panics if a needed stack segment cannot be allocated; see
/// [`Error::SegmentAllocation`](crate::Error::SegmentAllocation). Such a
/// thread cannot run the requested call at all, so there is nothing to
/// recover.
pub fn protect<R>(op: impl FnOnce() -> R) -> R {
    let config = Config::current();
    let _region = region::enter();
    if monitor::needs_growth(&config) {
        grow_and_run(op, &config)
    } else {
        op()
    }
}

/// The switched path: allocate a segment, run `op` on it, bring the result
/// (or the panic payload) back, release the segment.
#[cold]
#[inline(never)]
fn grow_and_run<F, R>(op: F, config: &Config) -> R
where
    F: FnOnce() -> R,
{
    extern "C" fn segment_entry<F, R>(transfer: context::Transfer) -> !
    where
        F: FnOnce() -> R,
    {
        let slot = transfer.data;
        let res: thread::Result<R> = panic::catch_unwind(AssertUnwindSafe(|| {
            // This is safe thanks to the `resume` just below this
            // function's definition: `slot` points at the caller's slot,
            // and the caller's frame stays suspended until we resume it.
            let op = unsafe { (*(slot as *mut Option<F>)).take() };
            // The slot is always filled; the caller resumes us exactly once.
            op.unwrap()()
        }));
        unsafe { transfer.context.resume(&res as *const _ as usize) };
        // The caller never resumes a finished segment, so this point is
        // unreachable; we are not allowed to unwind out of here anyway.
        unsafe { std::hint::unreachable_unchecked() }
    }

    let segment = match StackSegment::new(config.segment_bytes) {
        Ok(segment) => segment,
        Err(err) => {
            error!(size = config.segment_bytes, "stack segment allocation failed");
            panic!("{err}");
        }
    };
    trace!(size = segment.len(), "switching to fresh stack segment");
    let mut slot = Some(op);
    let res = {
        let _floor = FloorGuard::publish(segment.floor());
        // The segment outlives the context: it is dropped only after the
        // switched call has resumed us with its result.
        let ctx = unsafe { context::Context::new(segment.stack(), segment_entry::<F, R>) };
        let transfer = unsafe { ctx.resume(&mut slot as *mut Option<F> as usize) };
        // Move the result off the segment before it is released.
        unsafe { ptr::read(transfer.data as *const thread::Result<R>) }
    };
    drop(segment);
    match res {
        Ok(value) => value,
        Err(payload) => panic::resume_unwind(payload),
    }
}
