//! # Endstop Utilities
//!
//! Shared logging setup for the Endstop workspace, built on `tracing`.
//!
//! The fault diagnostics written by the failsafe handler itself go straight
//! to standard error and are not affected by anything here; this crate only
//! configures the ambient, filterable logging the library and its binaries
//! emit about their own decisions.

pub mod logging;

// Re-export commonly used logging functions for convenience
pub use logging::{LogFormat, LogLevel, LoggingError, init_logging, init_logging_with_level};
pub use tracing::{debug, error, info, trace, warn};
