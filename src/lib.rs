//! A pointer-sized cell for publishing objects between threads.
//!
//! # atomic_pointer::AtomicPointer
//! A word holding a raw pointer with four access modes: unordered load and store for accesses
//! synchronized by other means, and acquire load and release store for handing a fully built
//! object over to other threads.
//!
//! # Backends
//! The build script picks one implementation for the target and [`AtomicPointer`] is bound to
//! it statically.
//! * [`FenceCell`]: relaxed word accesses ordered by a [`Fence`], either [`CompilerFence`] on
//!   store-ordered hardware or [`HardwareFence`] on weakly ordered hardware.
//! * [`NativeCell`]: the platform atomic word with acquire and release orderings.
//!
//! The fence-based backend is preferred wherever a fence provider is known. Enabling the
//! `native` feature, or setting `ATOMIC_POINTER_BACKEND=native` at build time, selects the
//! native backend instead; `ATOMIC_POINTER_BACKEND=fence` insists on the fence-based one. A
//! target that cannot be served fails to build.

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

#[cfg(not(any(
    atomic_pointer_backend = "fence",
    atomic_pointer_backend = "native"
)))]
compile_error!(
    "no AtomicPointer backend was selected for this target; build the crate with Cargo so that \
     its build script can pick one, or read the build script output for why none is available"
);

mod atomic_pointer;
pub use atomic_pointer::{AtomicPointer, BACKEND};

mod cell;
pub use cell::PointerCell;

mod fence;
pub use fence::{CompilerFence, Fence, HardwareFence};

mod fence_cell;
pub use fence_cell::FenceCell;

mod native_cell;
pub use native_cell::NativeCell;

pub mod select;
pub use select::{Backend, FenceKind};

mod sync;
