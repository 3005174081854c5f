//! Atomic primitives, swapped for model-checked ones under the `loom` feature.

#[cfg(not(feature = "loom"))]
pub(crate) use std::sync::atomic::{fence, AtomicPtr};

#[cfg(feature = "loom")]
pub(crate) use loom::sync::atomic::{fence, AtomicPtr};
