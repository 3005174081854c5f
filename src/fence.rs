//! Fence providers for [`FenceCell`](crate::FenceCell).
//!
//! Fences compose with relaxed atomic accesses: a release fence followed by a relaxed store
//! synchronizes with a relaxed load followed by an acquire fence when the load reads the value
//! written by the store.

use crate::sync::fence;
use std::sync::atomic::Ordering::{AcqRel, SeqCst};

/// Issues the memory barrier blessed for an architecture family.
///
/// Implementors must order every memory access before the barrier against every memory access
/// after it, at least to the extent of an acquire-release fence.
pub trait Fence {
    /// Issues the barrier.
    fn barrier();
}

/// A barrier for hardware that keeps loads and stores in program order relative to each other.
///
/// On `x86` and `x86_64` this compiles to no instruction at all and only stops the compiler from
/// moving memory accesses across it; on other architectures the compiler emits whatever the
/// acquire-release fence requires, so the type is correct, if not optimal, everywhere.
#[derive(Clone, Copy, Debug, Default)]
pub struct CompilerFence;

/// A full hardware memory barrier.
///
/// The compiler lowers it to the architecture's barrier instruction (`dmb ish` on ARMv7 and
/// `AArch64`, `sync` on POWER, `fence rw,rw` on RISC-V), or, on ARM Linux targets predating
/// ARMv7, to the kernel-provided memory barrier helper.
#[derive(Clone, Copy, Debug, Default)]
pub struct HardwareFence;

impl Fence for CompilerFence {
    #[inline]
    fn barrier() {
        fence(AcqRel);
    }
}

impl Fence for HardwareFence {
    #[inline]
    fn barrier() {
        fence(SeqCst);
    }
}
