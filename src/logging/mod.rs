// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compile-time configurable logging system.
//!
//! This module provides zero-cost abstractions for logging with four severity levels:
//! - `debug!()` - Development/debugging information
//! - `info!()` - General operational information
//! - `warn!()` - Warning conditions
//! - `error!()` - Error conditions
//!
//! ## Features
//!
//! - **Zero-cost when disabled**: Logging macros expand to no-op when the `logging` feature
//!   is off.
//! - **Compile-time configurable**: Enable/disable via the `logging` Cargo feature.
//! - **Thread-safe**: All operations are safe across multiple threads.
//! - **Flexible output**: Support for console and file outputs.
//! - **Level filtering**: Configure minimum log level at runtime.
//!
//! ## Example
//!
//! ```ignore
//! use slabpool::logging::{init_logger, ConsoleOutput, LogLevel};
//! use std::sync::Arc;
//!
//! // Initialize early in main()
//! let console = Arc::new(ConsoleOutput::new(LogLevel::Debug));
//! init_logger(console, LogLevel::Debug);
//!
//! // Use anywhere in your code
//! debug!("Detailed info: {}", value);
//! info!("Normal operation");
//! warn!("Suspicious activity: {}", reason);
//! error!("Critical failure: {}", cause);
//! ```
//!
//! The sole user of these macros within this crate is [`crate::Slab`]'s block-acquisition path,
//! which emits a debug-level diagnostic each time it asks the global allocator for a new block.

#[cfg(feature = "logging")]
pub mod logger;
mod output;

// `LogLevel` is always available: `PoolConfig::log_level` (config.rs) needs a concrete type to
// carry a desired verbosity regardless of whether the `logging` feature is actually compiled in.
pub use output::LogLevel;

#[cfg(feature = "logging")]
pub use output::{ConsoleOutput, FileOutput, Output};

#[cfg(feature = "logging")]
pub use logger::{flush_logger, init_logger};

/// Initialize the global logging sink at `level`, routing to stderr via [`ConsoleOutput`], if
/// no sink has been installed yet. Called from [`crate::PoolRouter::with_config`] so a caller's
/// `PoolConfig::log_level` actually reaches the logging subsystem (see SPEC_FULL.md §6/§10.1)
/// without every construction site having to remember to call [`init_logger`] itself.
///
/// A no-op when the `logging` feature is disabled, or when a sink was already installed by an
/// earlier call (matching [`init_logger`]'s own "first call wins" semantics).
#[cfg(feature = "logging")]
pub fn init_with_level(level: LogLevel) {
    init_logger(std::sync::Arc::new(ConsoleOutput::new(level)), level);
}

/// No-op when the `logging` feature is disabled; see the gated definition above.
#[cfg(not(feature = "logging"))]
pub fn init_with_level(_level: LogLevel) {}

/// Debug-level log message.
///
/// Formatted the same as `println!()`.
/// Only emitted if compiled with the `logging` feature and level >= Debug.
#[macro_export]
#[cfg(feature = "logging")]
macro_rules! debug {
    ($($arg:tt)*) => {
        let _ = $crate::logging::logger::log_message(
            $crate::logging::LogLevel::Debug,
            &format!($($arg)*),
        );
    };
}

/// Info-level log message.
#[macro_export]
#[cfg(feature = "logging")]
macro_rules! info {
    ($($arg:tt)*) => {
        let _ = $crate::logging::logger::log_message(
            $crate::logging::LogLevel::Info,
            &format!($($arg)*),
        );
    };
}

/// Warning-level log message.
#[macro_export]
#[cfg(feature = "logging")]
macro_rules! warn {
    ($($arg:tt)*) => {
        let _ = $crate::logging::logger::log_message(
            $crate::logging::LogLevel::Warning,
            &format!($($arg)*),
        );
    };
}

/// Error-level log message.
#[macro_export]
#[cfg(feature = "logging")]
macro_rules! error {
    ($($arg:tt)*) => {
        let _ = $crate::logging::logger::log_message(
            $crate::logging::LogLevel::Error,
            &format!($($arg)*),
        );
    };
}

/// No-op debug macro (when the `logging` feature is disabled).
#[macro_export]
#[cfg(not(feature = "logging"))]
macro_rules! debug {
    ($($arg:tt)*) => {};
}

/// No-op info macro (when the `logging` feature is disabled).
#[macro_export]
#[cfg(not(feature = "logging"))]
macro_rules! info {
    ($($arg:tt)*) => {};
}

/// No-op warn macro (when the `logging` feature is disabled).
#[macro_export]
#[cfg(not(feature = "logging"))]
macro_rules! warn {
    ($($arg:tt)*) => {};
}

/// No-op error macro (when the `logging` feature is disabled).
#[macro_export]
#[cfg(not(feature = "logging"))]
macro_rules! error {
    ($($arg:tt)*) => {};
}
