//! # restack
//!
//! This crate makes deep recursion safe without rewriting algorithms into
//! explicit-stack iterative form. A protected call checks how much call
//! stack the current thread has left and, when it gets close to the edge,
//! transparently continues execution on a freshly allocated stack segment.
//! Results, panics and destructors all behave exactly as they would have
//! without the switch; the segment is released as soon as the call is
//! done. Note however that this is a per-thread mechanism: each thread
//! manages its own stack state independently, and nothing here makes
//! recursion that spans threads safe.
//!
//! The common case pays almost nothing. A protected call that is nowhere
//! near exhausting its stack is a remaining-stack check (a thread-local
//! read, a stack-pointer read, a compare) followed by a direct call; only
//! calls inside the red zone allocate and switch.
//!
//! # Usage
//!
//! This crate provides two main elements:
//! - The [`protect`] function, that runs a closure with stack-overflow
//!   protection and marks the current thread as inside a protected region
//!   while it runs
//! - The [`Recursive`] struct, that wraps a self-referential field, checks
//!   on access that a protected region is active, and routes its own
//!   recursive operations (cloning, comparison, formatting, hashing,
//!   destruction) through [`protect`]
//!
//! ## [`protect`]
//!
//! Wrap each self-call of a recursive function in [`protect`] and the
//! recursion survives any depth, growing through a chain of segments that
//! is torn down in reverse order as the recursion returns:
//!
//! ```
//! fn depth(n: u64) -> u64 {
//!     restack::protect(|| if n == 0 { 0 } else { 1 + depth(n - 1) })
//! }
//! assert_eq!(depth(200_000), 200_000);
//! ```
//!
//! ## [`Recursive`]
//!
//! [`Recursive`] sits at the data layer. Declaring a recursive field as
//! `Recursive<Box<Node>>` makes the bulk operations over the whole
//! structure stack-safe for free, and (in strict mode) turns any
//! unprotected hand-written traversal into an immediate
//! [`Error::ContextViolation`] instead of a latent stack overflow:
//!
//! ```
//! use restack::{protect, Recursive};
//!
//! struct Node {
//!     value: u32,
//!     next: Option<Recursive<Box<Node>>>,
//! }
//!
//! fn last(node: &Node) -> u32 {
//!     protect(|| match &node.next {
//!         Some(next) => last(next.get()),
//!         None => node.value,
//!     })
//! }
//!
//! let list = Node { value: 1, next: Some(Recursive::new(Box::new(Node { value: 2, next: None }))) };
//! assert_eq!(last(&list), 2);
//! ```
//!
//! ## Configuration
//!
//! The red-zone threshold, the segment size and the strictness of access
//! checks are process-wide and installed once, before first use:
//!
//! ```
//! use restack::Config;
//!
//! let _ = Config {
//!     red_zone_bytes: 128 * 1024,
//!     ..Config::default()
//! }
//! .install();
//! ```

mod config;
mod error;
mod monitor;
mod region;
mod segment;
mod switch;
mod wrapper;

pub use config::{Config, InstallError};
pub use error::Error;
pub use monitor::remaining_stack;
pub use region::{is_protected, reset_protection};
pub use segment::{segment_stats, SegmentStats};
pub use switch::protect;
pub use wrapper::Recursive;

/// A “prelude” for users of the `restack` crate.
pub mod prelude {
    pub use super::{protect, Recursive};
}
