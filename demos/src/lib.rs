//! Data structures demonstrating the publication pattern with [`atomic_pointer::AtomicPointer`].

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

mod skip_list;
pub use skip_list::{Iter, SkipList};
