// SPDX-License-Identifier: Apache-2.0 OR MIT

#![allow(clippy::missing_panics_doc)]
#![allow(clippy::unreadable_literal)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use slabpool::{delete_element, new_element, PoolRouter, Slab};

// ============================================================================
// Slab benchmarks (single size class, no router indirection)
// ============================================================================

fn bench_slab_allocate_deallocate_16b(c: &mut Criterion) {
    let slab = Slab::new(16, 4096).unwrap();
    c.bench_function("slab_allocate_deallocate_16b", |b| {
        b.iter(|| {
            let p = slab.allocate().unwrap();
            slab.deallocate(black_box(p));
        })
    });
}

fn bench_slab_allocate_deallocate_256b(c: &mut Criterion) {
    let slab = Slab::new(256, 4096).unwrap();
    c.bench_function("slab_allocate_deallocate_256b", |b| {
        b.iter(|| {
            let p = slab.allocate().unwrap();
            slab.deallocate(black_box(p));
        })
    });
}

fn bench_slab_free_list_pop_only(c: &mut Criterion) {
    // Pre-warm the free-list so every iteration hits the lock-free fast path.
    let slab = Slab::new(16, 4096).unwrap();
    let warm = slab.allocate().unwrap();
    slab.deallocate(warm);

    c.bench_function("slab_free_list_pop_push", |b| {
        b.iter(|| {
            let p = slab.allocate().unwrap();
            slab.deallocate(black_box(p));
        })
    });
}

// ============================================================================
// PoolRouter benchmarks (size-class dispatch overhead)
// ============================================================================

fn bench_router_use_free_small(c: &mut Criterion) {
    let router = PoolRouter::new().unwrap();
    c.bench_function("router_use_free_16b", |b| {
        b.iter(|| {
            let p = router.use_memory(black_box(16)).unwrap();
            router.free_memory(p, 16);
        })
    });
}

fn bench_router_use_free_oversized(c: &mut Criterion) {
    let router = PoolRouter::new().unwrap();
    c.bench_function("router_use_free_oversized_4kb", |b| {
        b.iter(|| {
            let p = router.use_memory(black_box(4096)).unwrap();
            router.free_memory(p, 4096);
        })
    });
}

// ============================================================================
// Typed facade benchmarks
// ============================================================================

struct Payload {
    data: [u64; 4],
}

fn bench_typed_new_delete_element(c: &mut Criterion) {
    let router = PoolRouter::new().unwrap();
    c.bench_function("typed_new_delete_element", |b| {
        b.iter(|| {
            let p = new_element(&router, Payload { data: [0; 4] }).unwrap();
            delete_element(&router, black_box(p));
        })
    });
}

// ============================================================================
// Comparison against the global allocator (mirrors the reference design's
// own benchmark, which pits pooled new/delete against plain new/delete).
// ============================================================================

fn bench_global_allocator_box_16b(c: &mut Criterion) {
    c.bench_function("global_allocator_box_16b", |b| {
        b.iter(|| {
            let boxed: Box<[u8; 16]> = black_box(Box::new([0u8; 16]));
            drop(boxed);
        })
    });
}

criterion_group!(
    slab_benches,
    bench_slab_allocate_deallocate_16b,
    bench_slab_allocate_deallocate_256b,
    bench_slab_free_list_pop_only
);

criterion_group!(
    router_benches,
    bench_router_use_free_small,
    bench_router_use_free_oversized
);

criterion_group!(typed_benches, bench_typed_new_delete_element);

criterion_group!(comparison_benches, bench_global_allocator_box_16b);

criterion_main!(slab_benches, router_benches, typed_benches, comparison_benches);
