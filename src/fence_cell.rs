//! [`FenceCell`] orders relaxed word accesses with explicit barriers.

use super::cell::PointerCell;
use super::fence::Fence;
use super::sync::AtomicPtr;
use std::fmt::{self, Debug};
use std::marker::PhantomData;
use std::ptr::null_mut;
use std::sync::atomic::Ordering::Relaxed;

/// [`FenceCell`] stores a pointer in a relaxed atomic word and issues `F::barrier()` around it.
///
/// An acquire load reads the word and then issues the barrier; a release store issues the
/// barrier and then writes the word. The barrier must come after the read and before the write:
/// the other way around, nothing stops accesses that follow the load from being satisfied before
/// it, or accesses that precede the store from becoming visible after it.
pub struct FenceCell<T, F: Fence> {
    word: AtomicPtr<T>,
    _fence: PhantomData<fn() -> F>,
}

impl<T, F: Fence> FenceCell<T, F> {
    /// Creates a new [`FenceCell`] holding `ptr`.
    ///
    /// # Examples
    ///
    /// ```
    /// use atomic_pointer::{CompilerFence, FenceCell, PointerCell};
    ///
    /// let mut value = 3_usize;
    /// let cell: FenceCell<usize, CompilerFence> = FenceCell::new(&mut value as *mut usize);
    /// assert_eq!(cell.acquire_load(), &mut value as *mut usize);
    /// ```
    #[cfg(not(feature = "loom"))]
    #[inline]
    #[must_use]
    pub const fn new(ptr: *mut T) -> Self {
        Self {
            word: AtomicPtr::new(ptr),
            _fence: PhantomData,
        }
    }

    /// Creates a new [`FenceCell`] holding `ptr`.
    #[cfg(feature = "loom")]
    #[inline]
    #[must_use]
    pub fn new(ptr: *mut T) -> Self {
        Self {
            word: AtomicPtr::new(ptr),
            _fence: PhantomData,
        }
    }

    /// Creates a new [`FenceCell`] holding null.
    ///
    /// # Examples
    ///
    /// ```
    /// use atomic_pointer::{FenceCell, HardwareFence, PointerCell};
    ///
    /// let cell: FenceCell<usize, HardwareFence> = FenceCell::null();
    /// assert!(cell.no_barrier_load().is_null());
    /// ```
    #[cfg(not(feature = "loom"))]
    #[inline]
    #[must_use]
    pub const fn null() -> Self {
        Self::new(null_mut())
    }

    /// Creates a new [`FenceCell`] holding null.
    #[cfg(feature = "loom")]
    #[inline]
    #[must_use]
    pub fn null() -> Self {
        Self::new(null_mut())
    }

    /// Returns a mutable reference to the stored pointer.
    ///
    /// Exclusive access needs no barrier.
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

impl<T, F: Fence> PointerCell<T> for FenceCell<T, F> {
    #[inline]
    fn new(ptr: *mut T) -> Self {
        FenceCell::new(ptr)
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
        let ptr = self.word.load(Relaxed);
        F::barrier();
        ptr
    }

    #[inline]
    fn release_store(&self, ptr: *mut T) {
        F::barrier();
        self.word.store(ptr, Relaxed);
    }
}

impl<T, F: Fence> Debug for FenceCell<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FenceCell")
            .field(&self.word.load(Relaxed))
            .finish()
    }
}

impl<T, F: Fence> Default for FenceCell<T, F> {
    #[inline]
    fn default() -> Self {
        Self::null()
    }
}
