use std::hint::black_box;
use std::ptr::null_mut;

use atomic_pointer::{
    AtomicPointer, CompilerFence, FenceCell, HardwareFence, NativeCell, PointerCell,
};
use criterion::{criterion_group, criterion_main, Criterion};

fn operations<C: PointerCell<u64>>(c: &mut Criterion, name: &str) {
    let mut value = 0_u64;
    let cell = C::new(null_mut());
    c.bench_function(&format!("{name}: no-barrier load"), |b| {
        b.iter(|| black_box(cell.no_barrier_load()))
    });
    c.bench_function(&format!("{name}: no-barrier store"), |b| {
        b.iter(|| cell.no_barrier_store(black_box(&mut value)))
    });
    c.bench_function(&format!("{name}: acquire load"), |b| {
        b.iter(|| black_box(cell.acquire_load()))
    });
    c.bench_function(&format!("{name}: release store"), |b| {
        b.iter(|| cell.release_store(black_box(&mut value)))
    });
}

fn atomic_pointer(c: &mut Criterion) {
    operations::<AtomicPointer<u64>>(c, "AtomicPointer");
}

fn fence_cell(c: &mut Criterion) {
    operations::<FenceCell<u64, CompilerFence>>(c, "FenceCell<CompilerFence>");
    operations::<FenceCell<u64, HardwareFence>>(c, "FenceCell<HardwareFence>");
}

fn native_cell(c: &mut Criterion) {
    operations::<NativeCell<u64>>(c, "NativeCell");
}

criterion_group!(cell, atomic_pointer, fence_cell, native_cell);
criterion_main!(cell);
