//! [`AtomicPointer`] is the backend chosen for the target behind one stable type.

use super::cell::PointerCell;
use super::select::Backend;
use std::fmt::{self, Debug};
use std::ptr::null_mut;

#[cfg(atomic_pointer_backend = "fence")]
use super::fence_cell::FenceCell;
#[cfg(atomic_pointer_fence = "compiler")]
use super::fence::CompilerFence;
#[cfg(atomic_pointer_fence = "hardware")]
use super::fence::HardwareFence;
#[cfg(atomic_pointer_backend = "native")]
use super::native_cell::NativeCell;

#[cfg(all(atomic_pointer_backend = "fence", atomic_pointer_fence = "compiler"))]
type Selected<T> = FenceCell<T, CompilerFence>;

#[cfg(all(atomic_pointer_backend = "fence", atomic_pointer_fence = "hardware"))]
type Selected<T> = FenceCell<T, HardwareFence>;

#[cfg(atomic_pointer_backend = "native")]
type Selected<T> = NativeCell<T>;

/// The backend selected for the target when the crate was built.
#[cfg(all(atomic_pointer_backend = "fence", atomic_pointer_fence = "compiler"))]
pub const BACKEND: Backend = Backend::Fence(super::select::FenceKind::Compiler);

/// The backend selected for the target when the crate was built.
#[cfg(all(atomic_pointer_backend = "fence", atomic_pointer_fence = "hardware"))]
pub const BACKEND: Backend = Backend::Fence(super::select::FenceKind::Hardware);

/// The backend selected for the target when the crate was built.
#[cfg(atomic_pointer_backend = "native")]
pub const BACKEND: Backend = Backend::Native;

/// [`AtomicPointer`] holds a pointer that can be published from one thread to others.
///
/// The implementation is fixed at build time; see [`BACKEND`]. All backends honor the same
/// [`PointerCell`] contract, so callers never need to know which one is in use.
///
/// # Examples
///
/// ```
/// use atomic_pointer::{AtomicPointer, PointerCell};
///
/// let mut first = 1_u64;
/// let mut second = 2_u64;
///
/// let ptr: AtomicPointer<u64> = AtomicPointer::new(&mut first);
/// assert_eq!(unsafe { *ptr.acquire_load() }, 1);
///
/// ptr.release_store(&mut second);
/// assert_eq!(unsafe { *ptr.acquire_load() }, 2);
///
/// ptr.no_barrier_store(std::ptr::null_mut());
/// assert!(ptr.no_barrier_load().is_null());
/// ```
pub struct AtomicPointer<T> {
    cell: Selected<T>,
}

impl<T> AtomicPointer<T> {
    /// The backend behind every [`AtomicPointer`].
    ///
    /// # Examples
    ///
    /// ```
    /// use atomic_pointer::{AtomicPointer, BACKEND};
    ///
    /// assert_eq!(AtomicPointer::<u8>::BACKEND, BACKEND);
    /// ```
    pub const BACKEND: Backend = BACKEND;

    /// Creates a new [`AtomicPointer`] holding `ptr`.
    ///
    /// # Examples
    ///
    /// ```
    /// use atomic_pointer::{AtomicPointer, PointerCell};
    ///
    /// static PTR: AtomicPointer<usize> = AtomicPointer::new(std::ptr::null_mut());
    ///
    /// let slot = Box::into_raw(Box::new(17_usize));
    /// PTR.release_store(slot);
    /// assert_eq!(unsafe { *PTR.acquire_load() }, 17);
    /// drop(unsafe { Box::from_raw(slot) });
    /// ```
    #[cfg(not(feature = "loom"))]
    #[inline]
    #[must_use]
    pub const fn new(ptr: *mut T) -> Self {
        Self {
            cell: Selected::new(ptr),
        }
    }

    /// Creates a new [`AtomicPointer`] holding `ptr`.
    #[cfg(feature = "loom")]
    #[inline]
    #[must_use]
    pub fn new(ptr: *mut T) -> Self {
        Self {
            cell: Selected::new(ptr),
        }
    }

    /// Creates a new [`AtomicPointer`] holding null.
    ///
    /// # Examples
    ///
    /// ```
    /// use atomic_pointer::{AtomicPointer, PointerCell};
    ///
    /// let ptr: AtomicPointer<String> = AtomicPointer::null();
    /// assert!(ptr.acquire_load().is_null());
    /// ```
    #[cfg(not(feature = "loom"))]
    #[inline]
    #[must_use]
    pub const fn null() -> Self {
        Self::new(null_mut())
    }

    /// Creates a new [`AtomicPointer`] holding null.
    #[cfg(feature = "loom")]
    #[inline]
    #[must_use]
    pub fn null() -> Self {
        Self::new(null_mut())
    }

    /// Returns a mutable reference to the stored pointer.
    ///
    /// # Examples
    ///
    /// ```
    /// use atomic_pointer::{AtomicPointer, PointerCell};
    ///
    /// let mut value = 'a';
    /// let mut ptr: AtomicPointer<char> = AtomicPointer::null();
    /// *ptr.get_mut() = &mut value;
    /// assert_eq!(unsafe { *ptr.no_barrier_load() }, 'a');
    /// ```
    #[cfg(not(feature = "loom"))]
    #[inline]
    pub fn get_mut(&mut self) -> &mut *mut T {
        self.cell.get_mut()
    }

    /// Consumes the [`AtomicPointer`] and returns the stored pointer.
    ///
    /// # Examples
    ///
    /// ```
    /// use atomic_pointer::AtomicPointer;
    ///
    /// let ptr: AtomicPointer<u32> = AtomicPointer::null();
    /// assert!(ptr.into_inner().is_null());
    /// ```
    #[cfg(not(feature = "loom"))]
    #[inline]
    #[must_use]
    pub fn into_inner(self) -> *mut T {
        self.cell.into_inner()
    }
}

impl<T> PointerCell<T> for AtomicPointer<T> {
    #[inline]
    fn new(ptr: *mut T) -> Self {
        AtomicPointer::new(ptr)
    }

    #[inline]
    fn no_barrier_load(&self) -> *mut T {
        self.cell.no_barrier_load()
    }

    #[inline]
    fn no_barrier_store(&self, ptr: *mut T) {
        self.cell.no_barrier_store(ptr);
    }

    #[inline]
    fn acquire_load(&self) -> *mut T {
        self.cell.acquire_load()
    }

    #[inline]
    fn release_store(&self, ptr: *mut T) {
        self.cell.release_store(ptr);
    }
}

impl<T> Debug for AtomicPointer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AtomicPointer")
            .field("ptr", &self.cell.no_barrier_load())
            .field("backend", &BACKEND.name())
            .finish()
    }
}

impl<T> Default for AtomicPointer<T> {
    #[inline]
    fn default() -> Self {
        Self::null()
    }
}

impl<T> From<*mut T> for AtomicPointer<T> {
    #[inline]
    fn from(ptr: *mut T) -> Self {
        Self::new(ptr)
    }
}
