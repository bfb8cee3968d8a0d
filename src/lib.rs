// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # slabpool - fixed-size slab allocator
//!
//! A size-class slab allocator: an array of per-size-class pools, each carving fixed-size slots
//! out of bump-allocated blocks and recycling freed slots through a lock-free Treiber-stack
//! free-list.
//!
//! ## Quick Start
//!
//! ```rust
//! use slabpool::{new_element, delete_element, PoolRouter};
//!
//! let router = PoolRouter::new().unwrap();
//!
//! let p = new_element(&router, 42u64).unwrap();
//! assert_eq!(unsafe { *p.unwrap().as_ptr() }, 42);
//! delete_element(&router, p);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +------------------------------------------------------------+
//! |                        PoolRouter                          |
//! |   size -> pool index = ceil(size / slot_base_size) - 1     |
//! +------------------------------------------------------------+
//!        |                  |                  |
//!        v                  v                  v
//! +-----------+      +-----------+      +-----------+
//! |  Slab(8)  |      | Slab(16)  | ...  | Slab(512) |
//! |           |      |           |      |           |
//! | free_list | (Treiber stack, lock-free push/pop)  |
//! | bump block| (Mutex-guarded cur_slot/last_slot)   |
//! +-----------+      +-----------+      +-----------+
//! ```
//!
//! Requests larger than the router's largest size class escalate directly to the global
//! allocator, bypassing the slabs entirely.
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Slab`] | A single size class: bump-pointer blocks plus a Treiber-stack free-list |
//! | [`PoolRouter`] | Routes a request size to the matching [`Slab`], or the global allocator |
//! | [`PoolConfig`] | Runtime override for pool count / granularity / block size |
//! | [`PoolError`] | Error type shared across this crate's fallible operations |
//!
//! [`new_element`] and [`delete_element`] are a typed convenience layer on top of
//! [`PoolRouter::use_memory`] / [`PoolRouter::free_memory`] for callers that want to move a `T`
//! in and out of pooled memory without handling raw bytes themselves.
//!
//! ## Features
//!
//! - `logging` -- enable the [`logging`] module's `debug!`/`info!`/`warn!`/`error!` macros.
//!   Disabled by default; without it the macros expand to nothing.

mod config;
mod error;
pub mod logging;
mod router;
mod slab;
mod typed;

pub use config::{PoolConfig, DEFAULT_BLOCK_SIZE, DEFAULT_MAX_SLOT_SIZE, DEFAULT_POOL_COUNT, DEFAULT_SLOT_BASE_SIZE};
pub use error::{PoolError, PoolResult};
pub use router::PoolRouter;
pub use slab::Slab;
pub use typed::{delete_element, new_element};
