//! [`NativeCell`] delegates ordering to the platform atomic word.

use super::cell::PointerCell;
use super::sync::AtomicPtr;
use std::fmt::{self, Debug};
use std::ptr::null_mut;
use std::sync::atomic::Ordering::{Acquire, Relaxed, Release};

/// [`NativeCell`] is an [`AtomicPtr`](std::sync::atomic::AtomicPtr) accessed with `Relaxed`,
/// `Acquire`, and `Release` orderings.
///
/// It behaves exactly like [`FenceCell`](crate::FenceCell); the compiler may use dedicated
/// load-acquire and store-release instructions instead of standalone barriers.
pub struct NativeCell<T> {
    word: AtomicPtr<T>,
}

impl<T> NativeCell<T> {
    /// Creates a new [`NativeCell`] holding `ptr`.
    ///
    /// # Examples
    ///
    /// ```
    /// use atomic_pointer::{NativeCell, PointerCell};
    ///
    /// let mut value = 5;
    /// let cell = NativeCell::new(&mut value as *mut i32);
    /// assert_eq!(unsafe { *cell.acquire_load() }, 5);
    /// ```
    #[cfg(not(feature = "loom"))]
    #[inline]
    #[must_use]
    pub const fn new(ptr: *mut T) -> Self {
        Self {
            word: AtomicPtr::new(ptr),
        }
    }

    /// Creates a new [`NativeCell`] holding `ptr`.
    #[cfg(feature = "loom")]
    #[inline]
    #[must_use]
    pub fn new(ptr: *mut T) -> Self {
        Self {
            word: AtomicPtr::new(ptr),
        }
    }

    /// Creates a new [`NativeCell`] holding null.
    #[cfg(not(feature = "loom"))]
    #[inline]
    #[must_use]
    pub const fn null() -> Self {
        Self::new(null_mut())
    }

    /// Creates a new [`NativeCell`] holding null.
    #[cfg(feature = "loom")]
    #[inline]
    #[must_use]
    pub fn null() -> Self {
        Self::new(null_mut())
    }

    /// Returns a mutable reference to the stored pointer.
    #[cfg(not(feature = "loom"))]
    #[inline]
    pub fn get_mut(&mut self) -> &mut *mut T {
        self.word.get_mut()
    }

    /// Consumes the cell and returns the stored pointer.
    #[cfg(not(feature = "loom"))]
    #[inline]
    #[must_use]
    pub fn into_inner(self) -> *mut T {
        self.word.into_inner()
    }
}

impl<T> PointerCell<T> for NativeCell<T> {
    #[inline]
    fn new(ptr: *mut T) -> Self {
        NativeCell::new(ptr)
    }

    #[inline]
    fn no_barrier_load(&self) -> *mut T {
        self.word.load(Relaxed)
    }

    #[inline]
    fn no_barrier_store(&self, ptr: *mut T) {
        self.word.store(ptr, Relaxed);
    }

    #[inline]
    fn acquire_load(&self) -> *mut T {
        self.word.load(Acquire)
    }

    #[inline]
    fn release_store(&self, ptr: *mut T) {
        self.word.store(ptr, Release);
    }
}

impl<T> Debug for NativeCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NativeCell")
            .field(&self.word.load(Relaxed))
            .finish()
    }
}

impl<T> Default for NativeCell<T> {
    #[inline]
    fn default() -> Self {
        Self::null()
    }
}
