//! Error type for counter construction.
//!
//! Recording and reading a sliding window never fails, so the only fallible
//! operation in the core is deriving a window geometry from a requested
//! duration.

use std::time::Duration;
use thiserror::Error;

/// Errors raised while building a sliding window.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The requested window cannot be split into time slots.
    #[error("invalid configuration for window {window:?}: {reason}")]
    InvalidConfiguration {
        /// The window duration that was requested.
        window: Duration,
        /// Why the window was rejected.
        reason: &'static str,
    },
}

/// Result type for counter construction.
pub type Result<T> = std::result::Result<T, Error>;
