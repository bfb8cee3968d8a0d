// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Multi-threaded comparison of pooled `new_element`/`delete_element` against the global
//! allocator, across a handful of differently-sized demo payload types.
//!
//! This binary is not part of the library's public surface; it exists to reproduce the kind of
//! measurement the reference design's own benchmark driver took (N threads, each looping
//! construct/destruct a batch of small structs R rounds, once through the pool and once through
//! the platform allocator).

use std::thread;
use std::time::Instant;

use slabpool::{delete_element, new_element, PoolRouter};

struct P1 {
    _id: i32,
}

struct P2 {
    _id: [i32; 5],
}

struct P3 {
    _id: [i32; 10],
}

struct P4 {
    _id: [i32; 20],
}

const NTIMES: usize = 100;
const NWORKS: usize = 4;
const ROUNDS: usize = 10;

fn benchmark_memory_pool(ntimes: usize, nworks: usize, rounds: usize) {
    let router = PoolRouter::new().expect("default pool configuration is always valid");
    let total_cost = std::sync::Mutex::new(std::time::Duration::ZERO);

    thread::scope(|scope| {
        for _ in 0..nworks {
            let router = &router;
            let total_cost = &total_cost;
            scope.spawn(move || {
                for _ in 0..rounds {
                    let start = Instant::now();
                    for _ in 0..ntimes {
                        let p1 = new_element(router, P1 { _id: 0 }).unwrap();
                        delete_element(router, p1);
                        let p2 = new_element(router, P2 { _id: [0; 5] }).unwrap();
                        delete_element(router, p2);
                        let p3 = new_element(router, P3 { _id: [0; 10] }).unwrap();
                        delete_element(router, p3);
                        let p4 = new_element(router, P4 { _id: [0; 20] }).unwrap();
                        delete_element(router, p4);
                    }
                    *total_cost.lock().unwrap() += start.elapsed();
                }
            });
        }
    });

    println!(
        "{nworks} threads execute {rounds} rounds concurrently, new_element & delete_element {ntimes} per round, total cost: {:?}",
        *total_cost.lock().unwrap()
    );
}

fn benchmark_global_allocator(ntimes: usize, nworks: usize, rounds: usize) {
    let total_cost = std::sync::Mutex::new(std::time::Duration::ZERO);

    thread::scope(|scope| {
        for _ in 0..nworks {
            let total_cost = &total_cost;
            scope.spawn(move || {
                for _ in 0..rounds {
                    let start = Instant::now();
                    for _ in 0..ntimes {
                        let p1 = Box::new(P1 { _id: 0 });
                        drop(p1);
                        let p2 = Box::new(P2 { _id: [0; 5] });
                        drop(p2);
                        let p3 = Box::new(P3 { _id: [0; 10] });
                        drop(p3);
                        let p4 = Box::new(P4 { _id: [0; 20] });
                        drop(p4);
                    }
                    *total_cost.lock().unwrap() += start.elapsed();
                }
            });
        }
    });

    println!(
        "{nworks} threads execute {rounds} rounds concurrently, new & drop {ntimes} per round, total cost: {:?}",
        *total_cost.lock().unwrap()
    );
}

fn main() {
    benchmark_memory_pool(NTIMES, NWORKS, ROUNDS);
    println!("===========================================================================");
    println!("===========================================================================");
    benchmark_global_allocator(NTIMES, NWORKS, ROUNDS);
}
