// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Concrete scenario tests mirroring the documented testable properties: size-class routing,
//! round-trips across the router, oversized escalation, and teardown accounting.

use slabpool::{delete_element, new_element, PoolConfig, PoolRouter};

#[test]
fn ten_byte_request_lands_in_the_sixteen_byte_pool_and_round_trips() {
    let router = PoolRouter::new().unwrap();

    let p = router.use_memory(10).unwrap().unwrap();
    router.free_memory(Some(p), 10);

    // Free-list was empty before the deallocate, so the next same-size request must be the
    // exact same address.
    let p2 = router.use_memory(9).unwrap().unwrap();
    assert_eq!(p, p2);
    router.free_memory(Some(p2), 9);
}

#[test]
fn two_hundred_fifty_seven_sixteen_byte_allocations_trigger_exactly_two_blocks() {
    // blockSize=4096, slotSize=16: floor((4096 - 8) / 16) = 255 slots fit in the first block
    // after the 8-byte block header and alignment padding, so the 256th and 257th allocations
    // must come from a second block.
    let config = PoolConfig {
        pool_count: 4,
        slot_base_size: 16,
        block_size: 4096,
        ..PoolConfig::default()
    };
    let router = PoolRouter::with_config(config).unwrap();
    assert_eq!(router.block_count_for(16), 0);

    let mut handles = Vec::new();
    for _ in 0..257 {
        handles.push(router.use_memory(16).unwrap().unwrap());
    }
    assert_eq!(router.block_count_for(16), 2);

    for h in handles {
        router.free_memory(Some(h), 16);
    }
}

#[test]
fn four_threads_ten_thousand_iterations_of_allocate_deallocate_never_crash() {
    use std::sync::Arc;
    use std::thread;

    let router = Arc::new(PoolRouter::new().unwrap());
    let mut threads = Vec::new();
    for _ in 0..4 {
        let router = Arc::clone(&router);
        threads.push(thread::spawn(move || {
            for _ in 0..10_000 {
                let p = router.use_memory(16).unwrap();
                router.free_memory(p, 16);
            }
        }));
    }
    for t in threads {
        t.join().unwrap();
    }
}

#[test]
fn six_hundred_byte_request_escalates_and_frees_through_the_platform_allocator() {
    let router = PoolRouter::new().unwrap();
    assert_eq!(router.max_slot_size(), 512);

    let p = router.use_memory(600).unwrap().unwrap();
    unsafe { p.as_ptr().write_bytes(0, 600) };
    router.free_memory(Some(p), 600);
}

#[test]
fn new_element_and_delete_element_each_run_constructor_and_destructor_once_over_many_iterations() {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Tracked {
        ctor_count: Arc<AtomicUsize>,
        dtor_count: Arc<AtomicUsize>,
    }
    impl Drop for Tracked {
        fn drop(&mut self) {
            self.dtor_count.fetch_add(1, Ordering::Relaxed);
        }
    }

    let router = PoolRouter::new().unwrap();
    let ctor_count = Arc::new(AtomicUsize::new(0));
    let dtor_count = Arc::new(AtomicUsize::new(0));

    for _ in 0..10_000 {
        ctor_count.fetch_add(1, Ordering::Relaxed);
        let value = Tracked {
            ctor_count: ctor_count.clone(),
            dtor_count: dtor_count.clone(),
        };
        let p = new_element(&router, value).unwrap();
        delete_element(&router, p);
    }

    assert_eq!(ctor_count.load(Ordering::Relaxed), 10_000);
    assert_eq!(dtor_count.load(Ordering::Relaxed), 10_000);
}

#[test]
fn fresh_router_tears_down_without_ever_allocating_a_block() {
    let config = PoolConfig {
        pool_count: 1,
        slot_base_size: 16,
        block_size: 4096,
        ..PoolConfig::default()
    };
    let router = PoolRouter::with_config(config).unwrap();
    assert_eq!(router.block_count_for(16), 0);
    drop(router);
}
