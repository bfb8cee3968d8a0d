// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pool configuration: compile-time defaults plus a runtime override.
//!
//! # Architecture
//!
//! - **Level 1 (static)**: `pub const` defaults matching the reference design.
//! - **Level 2 (dynamic)**: [`PoolConfig`] for callers that need non-default size classes,
//!   block sizes, or log levels (e.g. a test harness that wants a tiny `block_size` to exercise
//!   block-exhaustion cheaply).

use crate::error::PoolError;
use crate::logging::LogLevel;
use std::mem::size_of;

/// Number of size-class pools in the default configuration.
pub const DEFAULT_POOL_COUNT: usize = 64;

/// Slot-size granularity: pool *i* serves slots of size `(i + 1) * SLOT_BASE_SIZE`.
pub const DEFAULT_SLOT_BASE_SIZE: usize = 8;

/// Bytes requested from the global allocator per block.
pub const DEFAULT_BLOCK_SIZE: usize = 4096;

/// Largest request size the default router serves before escalating to the global allocator.
pub const DEFAULT_MAX_SLOT_SIZE: usize = DEFAULT_POOL_COUNT * DEFAULT_SLOT_BASE_SIZE;

/// Runtime configuration for a [`crate::PoolRouter`].
///
/// `Default` reproduces the reference design's compile-time constants
/// (`POOL_COUNT = 64`, `SLOT_BASE_SIZE = 8`, `BLOCK_SIZE = 4096`).
#[derive(Debug, Clone, Copy)]
pub struct PoolConfig {
    /// Number of size-class pools.
    pub pool_count: usize,
    /// Granularity between adjacent size classes.
    pub slot_base_size: usize,
    /// Bytes requested from the global allocator per block.
    pub block_size: usize,
    /// Minimum level the logging subsystem emits at. Wired into the global sink by
    /// [`crate::PoolRouter::with_config`]; has no effect unless the crate is built with the
    /// `logging` feature.
    pub log_level: LogLevel,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            pool_count: DEFAULT_POOL_COUNT,
            slot_base_size: DEFAULT_SLOT_BASE_SIZE,
            block_size: DEFAULT_BLOCK_SIZE,
            log_level: LogLevel::Info,
        }
    }
}

impl PoolConfig {
    /// Largest size this configuration's router serves from its own pools.
    pub fn max_slot_size(&self) -> usize {
        self.pool_count * self.slot_base_size
    }

    /// Validate internal consistency.
    ///
    /// Checked once by [`crate::PoolRouter::with_config`] rather than on every allocation.
    pub(crate) fn validate(&self) -> Result<(), PoolError> {
        if self.pool_count == 0 {
            return Err(PoolError::InvalidConfig(
                "pool_count must be nonzero".to_string(),
            ));
        }
        if self.slot_base_size == 0 {
            return Err(PoolError::InvalidConfig(
                "slot_base_size must be nonzero".to_string(),
            ));
        }
        let largest_slot = self.max_slot_size();
        let min_block = size_of::<*mut ()>() + largest_slot;
        if self.block_size < min_block {
            return Err(PoolError::InvalidConfig(format!(
                "block_size {} too small to hold one slot of the largest size class ({largest_slot} bytes, needs at least {min_block})",
                self.block_size
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_reference_constants() {
        let cfg = PoolConfig::default();
        assert_eq!(cfg.pool_count, 64);
        assert_eq!(cfg.slot_base_size, 8);
        assert_eq!(cfg.block_size, 4096);
        assert_eq!(cfg.max_slot_size(), 512);
        assert_eq!(cfg.log_level, LogLevel::Info);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn rejects_zero_pool_count() {
        let cfg = PoolConfig {
            pool_count: 0,
            ..PoolConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(PoolError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_zero_slot_base_size() {
        let cfg = PoolConfig {
            slot_base_size: 0,
            ..PoolConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(PoolError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_block_too_small_for_largest_class() {
        let cfg = PoolConfig {
            pool_count: 4,
            slot_base_size: 1024,
            block_size: 128,
            ..PoolConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(PoolError::InvalidConfig(_))));
    }
}
