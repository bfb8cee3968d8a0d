// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types for the slab allocator.

use std::alloc::Layout;
use std::fmt;

/// Result type for pool operations.
pub type PoolResult<T> = Result<T, PoolError>;

/// Errors returned by [`crate::Slab`] and [`crate::PoolRouter`] operations.
///
/// # Example
///
/// ```
/// use slabpool::{PoolError, Slab};
///
/// let result = Slab::new(0, 4096);
/// match result {
///     Err(PoolError::InvalidSlotSize(0)) => println!("slot size must be nonzero"),
///     Err(e) => println!("other error: {e}"),
///     Ok(_) => unreachable!(),
/// }
/// ```
#[derive(Debug)]
pub enum PoolError {
    /// `slot_size` was zero or smaller than a pointer, so no free-list node fits.
    InvalidSlotSize(usize),

    /// A `PoolConfig` was internally inconsistent (e.g. `pool_count == 0`,
    /// `slot_base_size == 0`, or `block_size` too small to hold one slot of the
    /// largest configured size class).
    InvalidConfig(String),

    /// The global allocator failed to satisfy a block (or oversized) allocation.
    OutOfMemory {
        /// The layout that could not be satisfied.
        layout: Layout,
    },
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSlotSize(size) => {
                write!(f, "invalid slot size {size}: must be >= size_of::<*mut ()>() and nonzero")
            }
            Self::InvalidConfig(msg) => write!(f, "invalid pool configuration: {msg}"),
            Self::OutOfMemory { layout } => {
                write!(
                    f,
                    "allocator failed to satisfy layout (size={}, align={})",
                    layout.size(),
                    layout.align()
                )
            }
        }
    }
}

impl std::error::Error for PoolError {}
