use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::mem::{self, ManuallyDrop};

use tracing::error;

use crate::config::Config;
use crate::error::Error;
use crate::region;
use crate::switch::protect;

/// A transparent holder for a recursively-typed field.
///
/// Put `Recursive<T>` in the self-referential (or mutually-recursive) field
/// position of a data structure and two things follow:
///
/// - Accessing the contained value ([`get`](Recursive::get) /
///   [`get_mut`](Recursive::get_mut)) asserts, in strict mode, that the
///   access happens inside a protected region, so a recursive walk missing
///   its [`protect`](crate::protect) call fails immediately instead of
///   overflowing the stack on the first deep-enough input.
/// - The bulk operations that recurse through the whole structure on their
///   own — cloning, equality, ordering, hashing, formatting, dropping, and
///   (with the `serde` feature) serialization — are each routed through
///   [`protect`](crate::protect), so they are stack-safe at any depth
///   without the caller doing anything.
///
/// A wrapper around a leaf value is pure pass-through: at shallow depth the
/// monitor reports no growth needed and no segment is ever allocated.
///
/// ```
/// use restack::{protect, Recursive};
///
/// enum List {
///     Cons(u64, Recursive<Box<List>>),
///     Nil,
/// }
///
/// fn sum(list: &List) -> u64 {
///     protect(|| match list {
///         List::Cons(v, rest) => v + sum(rest.get()),
///         List::Nil => 0,
///     })
/// }
///
/// let list = List::Cons(1, Recursive::new(Box::new(List::Cons(2, Recursive::new(Box::new(List::Nil))))));
/// assert_eq!(sum(&list), 3);
/// ```
#[repr(transparent)]
pub struct Recursive<T> {
    // ManuallyDrop so destruction can be routed through `protect` too: a
    // deeply nested chain of owned values being released is itself a
    // recursive operation.
    value: ManuallyDrop<T>,
}

impl<T> Recursive<T> {
    /// Wrap a value. Moving a value in does not recurse, so no check or
    /// protection applies.
    pub fn new(value: T) -> Recursive<T> {
        Recursive {
            value: ManuallyDrop::new(value),
        }
    }

    /// Unwrap the value. Moving it out does not recurse either.
    pub fn into_inner(mut self) -> T {
        // Skip our Drop: ownership moves to the caller.
        let value = unsafe { ManuallyDrop::take(&mut self.value) };
        mem::forget(self);
        value
    }

    /// Borrow the contained value.
    ///
    /// # Panics
    ///
    /// In strict mode, panics with the
    /// [`Error::ContextViolation`](crate::Error::ContextViolation) message
    /// when called outside a protected region. In lenient mode the check is
    /// skipped entirely.
    pub fn get(&self) -> &T {
        check_region();
        &self.value
    }

    /// Mutably borrow the contained value.
    ///
    /// # Panics
    ///
    /// Same contract as [`get`](Recursive::get).
    pub fn get_mut(&mut self) -> &mut T {
        check_region();
        &mut self.value
    }

    /// Borrow the contained value, reporting a strict-mode violation as a
    /// value instead of panicking.
    pub fn try_get(&self) -> Result<&T, Error> {
        try_check_region()?;
        Ok(&self.value)
    }

    /// Mutable counterpart of [`try_get`](Recursive::try_get).
    pub fn try_get_mut(&mut self) -> Result<&mut T, Error> {
        try_check_region()?;
        Ok(&mut self.value)
    }
}

#[inline]
fn check_region() {
    if let Err(err) = try_check_region() {
        error!("recursive value accessed outside a protected region");
        panic!("{err}");
    }
}

#[inline]
fn try_check_region() -> Result<(), Error> {
    if Config::current().strict_checks && !region::is_protected() {
        return Err(Error::ContextViolation);
    }
    Ok(())
}

impl<T> From<T> for Recursive<T> {
    fn from(value: T) -> Recursive<T> {
        Recursive::new(value)
    }
}

impl<T: Default> Default for Recursive<T> {
    fn default() -> Recursive<T> {
        Recursive::new(T::default())
    }
}

// The trait impls below intentionally bypass `get`: they enter `protect`
// themselves, which both marks the region and keeps the recursion through
// nested wrappers stack-safe.

impl<T: Clone> Clone for Recursive<T> {
    fn clone(&self) -> Recursive<T> {
        protect(|| Recursive::new(T::clone(&self.value)))
    }
}

impl<T: PartialEq> PartialEq for Recursive<T> {
    fn eq(&self, other: &Recursive<T>) -> bool {
        protect(|| *self.value == *other.value)
    }
}

impl<T: Eq> Eq for Recursive<T> {}

impl<T: PartialOrd> PartialOrd for Recursive<T> {
    fn partial_cmp(&self, other: &Recursive<T>) -> Option<Ordering> {
        protect(|| (*self.value).partial_cmp(&other.value))
    }
}

impl<T: Ord> Ord for Recursive<T> {
    fn cmp(&self, other: &Recursive<T>) -> Ordering {
        protect(|| (*self.value).cmp(&other.value))
    }
}

impl<T: Hash> Hash for Recursive<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        protect(|| (*self.value).hash(state))
    }
}

// Formatting is transparent: a wrapped value prints as the value does.

impl<T: fmt::Debug> fmt::Debug for Recursive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        protect(|| (*self.value).fmt(f))
    }
}

impl<T: fmt::Display> fmt::Display for Recursive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        protect(|| (*self.value).fmt(f))
    }
}

impl<T> Drop for Recursive<T> {
    fn drop(&mut self) {
        if mem::needs_drop::<T>() {
            let value = unsafe { ManuallyDrop::take(&mut self.value) };
            protect(move || drop(value));
        }
    }
}

#[cfg(feature = "serde")]
impl<T: serde::Serialize> serde::Serialize for Recursive<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        protect(|| (*self.value).serialize(serializer))
    }
}

#[cfg(feature = "serde")]
impl<'de, T: serde::Deserialize<'de>> serde::Deserialize<'de> for Recursive<T> {
    fn deserialize<D>(deserializer: D) -> Result<Recursive<T>, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        protect(|| T::deserialize(deserializer).map(Recursive::new))
    }
}
