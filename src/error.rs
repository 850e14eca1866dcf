use thiserror::Error;

/// The errors this crate can raise on its own behalf.
///
/// Failures raised by the protected operation itself are never wrapped in
/// this type: a panic from inside [`protect`](crate::protect) crosses every
/// stack switch unchanged, and an `Err` return value is simply the
/// operation's return value.
#[derive(Error, Debug)]
pub enum Error {
    /// A [`Recursive`](crate::Recursive) value was accessed outside any
    /// protected region while strict checks were enabled.
    ///
    /// This signals a missing [`protect`](crate::protect) call around a
    /// recursive code path. It is a usage defect, not a runtime condition:
    /// the offending access would eventually crash the process under
    /// sufficiently deep input, so it fails immediately instead.
    #[error("recursive value accessed outside a protected region; wrap the access in `protect`")]
    ContextViolation,

    /// Allocating a new stack segment failed.
    ///
    /// There is no safe way to keep executing a call that needs more stack
    /// than can be provided, so this is fatal for the current thread:
    /// [`protect`](crate::protect) panics with this error's message.
    #[error("failed to allocate a {size}-byte stack segment")]
    SegmentAllocation {
        /// The requested usable segment size, in bytes.
        size: usize,
        /// The underlying allocation failure.
        #[source]
        source: context::stack::StackError,
    },
}
