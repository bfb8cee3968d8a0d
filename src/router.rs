// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Size-class routing across an array of [`Slab`] pools.
//!
//! A [`PoolRouter`] owns one [`Slab`] per size class. A request for `size` bytes is routed to
//! the smallest size class that fits it; requests larger than the router's largest size class
//! escalate straight to the global allocator, bypassing the slabs entirely.

use crate::config::PoolConfig;
use crate::error::{PoolError, PoolResult};
use crate::slab::Slab;
use std::alloc::{alloc, dealloc, Layout};
use std::ptr::NonNull;

/// Routes allocation requests to the size-class pool that fits them.
///
/// Construct with [`PoolRouter::new`] for the reference design's defaults (64 pools, 8-byte
/// granularity, 4 KiB blocks), or [`PoolRouter::with_config`] for custom size classes.
pub struct PoolRouter {
    pools: Vec<Slab>,
    slot_base_size: usize,
    max_slot_size: usize,
}

impl PoolRouter {
    /// Build a router with the reference design's default configuration.
    pub fn new() -> PoolResult<Self> {
        Self::with_config(PoolConfig::default())
    }

    /// Build a router from an explicit [`PoolConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidConfig`] if the configuration is internally inconsistent, or
    /// whatever error the first undersized [`Slab::new`] call produces.
    pub fn with_config(config: PoolConfig) -> PoolResult<Self> {
        config.validate()?;
        crate::logging::init_with_level(config.log_level);

        let mut pools = Vec::with_capacity(config.pool_count);
        for i in 0..config.pool_count {
            let slot_size = (i + 1) * config.slot_base_size;
            pools.push(Slab::new(slot_size, config.block_size)?);
        }

        Ok(Self {
            pools,
            slot_base_size: config.slot_base_size,
            max_slot_size: config.max_slot_size(),
        })
    }

    /// Largest request size served from an internal pool before escalating to the global
    /// allocator.
    pub fn max_slot_size(&self) -> usize {
        self.max_slot_size
    }

    /// Number of blocks the size-class pool serving `size` has acquired from the global
    /// allocator so far. Exposed so integration tests can verify the block-exhaustion trigger
    /// (SPEC_FULL.md §8) through the router's own surface instead of reaching into a [`Slab`]
    /// directly.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero or exceeds [`Self::max_slot_size`] — both route outside any
    /// individual pool, so there is no block count to report.
    pub fn block_count_for(&self, size: usize) -> usize {
        assert!(
            size > 0 && size <= self.max_slot_size,
            "block_count_for: size {size} is not served by an internal pool (valid range is 1..={})",
            self.max_slot_size
        );
        self.pools[self.pool_index(size)].block_count()
    }

    /// Map a requested size to the index of the pool that serves it.
    ///
    /// Pool *i* serves slots up to `(i + 1) * slot_base_size` bytes, so the smallest index that
    /// fits `size` is `ceil(size / slot_base_size) - 1`.
    fn pool_index(&self, size: usize) -> usize {
        (size + self.slot_base_size - 1) / self.slot_base_size - 1
    }

    /// Request `size` bytes.
    ///
    /// Requests that fit within [`Self::max_slot_size`] are served from the matching size-class
    /// pool. Larger requests escalate directly to the global allocator via [`std::alloc::alloc`].
    /// A `size` of zero returns `Ok(None)`: there is nothing to hand out.
    ///
    /// # Errors
    ///
    /// Propagates [`PoolError::OutOfMemory`] from either the pool or the global allocator.
    pub fn use_memory(&self, size: usize) -> PoolResult<Option<NonNull<u8>>> {
        if size == 0 {
            return Ok(None);
        }

        if size > self.max_slot_size {
            let layout = oversized_layout(size)?;
            // SAFETY: layout has nonzero size.
            let raw = unsafe { alloc(layout) };
            return NonNull::new(raw)
                .map(Some)
                .ok_or(PoolError::OutOfMemory { layout });
        }

        let idx = self.pool_index(size);
        self.pools[idx].allocate().map(Some)
    }

    /// Return memory previously obtained from [`Self::use_memory`] for the same `size`.
    ///
    /// `ptr` must be `None` iff `size` was zero, and otherwise must be a pointer this router
    /// handed out for this exact `size` that has not already been freed.
    pub fn free_memory(&self, ptr: Option<NonNull<u8>>, size: usize) {
        let Some(ptr) = ptr else { return };

        if size > self.max_slot_size {
            let layout = oversized_layout(size).expect("size was already validated by a prior use_memory call");
            // SAFETY: ptr was allocated from the global allocator with this same layout.
            unsafe { dealloc(ptr.as_ptr(), layout) };
            return;
        }

        let idx = self.pool_index(size);
        self.pools[idx].deallocate(ptr);
    }
}

impl Default for PoolRouter {
    /// Builds the reference design's default configuration.
    ///
    /// # Panics
    ///
    /// Panics if the default configuration fails validation, which cannot happen with the
    /// built-in constants.
    fn default() -> Self {
        Self::new().expect("default PoolConfig is always valid")
    }
}

fn oversized_layout(size: usize) -> PoolResult<Layout> {
    Layout::from_size_align(size, std::mem::align_of::<usize>())
        .map_err(|_| PoolError::InvalidConfig(format!("oversized request of {size} bytes overflows Layout")))
}
