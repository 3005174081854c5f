//! The contract shared by every backend.

/// A pointer-sized cell with unordered and acquire/release access.
///
/// The cell stores an address and nothing else: it never reads, owns, or drops what the address
/// points to, and null is a valid value for every operation.
///
/// If an [`acquire_load`](PointerCell::acquire_load) returns a value written by a
/// [`release_store`](PointerCell::release_store), every memory write the storing thread made
/// before the store is visible to the loading thread once the load returns. This is what makes
/// it safe to publish an object by building it privately and then storing its address:
///
/// ```
/// use atomic_pointer::{AtomicPointer, PointerCell};
/// use std::thread;
///
/// struct Node {
///     key: u64,
///     value: String,
/// }
///
/// let head: AtomicPointer<Node> = AtomicPointer::null();
///
/// thread::scope(|s| {
///     s.spawn(|| {
///         let node = Box::new(Node { key: 7, value: String::from("seven") });
///         head.release_store(Box::into_raw(node));
///     });
///     s.spawn(|| {
///         let node = head.acquire_load();
///         if let Some(node) = unsafe { node.as_ref() } {
///             assert_eq!(node.key, 7);
///             assert_eq!(node.value, "seven");
///         }
///     });
/// });
///
/// let node = head.no_barrier_load();
/// assert!(!node.is_null());
/// drop(unsafe { Box::from_raw(node) });
/// ```
///
/// [`no_barrier_load`](PointerCell::no_barrier_load) and
/// [`no_barrier_store`](PointerCell::no_barrier_store) only guarantee that the word itself is
/// never torn. They are for accesses already ordered by something else, such as a lock held by
/// both sides or exclusive access during initialization.
pub trait PointerCell<T>: Sized {
    /// Creates a cell holding `ptr`.
    fn new(ptr: *mut T) -> Self;

    /// Reads the stored value without ordering any other memory access.
    fn no_barrier_load(&self) -> *mut T;

    /// Writes `ptr` without ordering any other memory access.
    fn no_barrier_store(&self, ptr: *mut T);

    /// Reads the stored value; no later memory access of the calling thread is reordered before
    /// the read.
    fn acquire_load(&self) -> *mut T;

    /// Writes `ptr`; no earlier memory access of the calling thread is reordered after the
    /// write.
    fn release_store(&self, ptr: *mut T);
}
