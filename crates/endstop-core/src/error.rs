//! # Fault Type
//!
//! The error value delivered to fault handlers.
//!
//! We use `thiserror` to generate the `Error` trait implementation, so a
//! [`Fault`] can travel anywhere a `Box<dyn Error>` is expected.

use std::backtrace::Backtrace;

use thiserror::Error;

/// An error that escaped all handling and reached the top of the call stack.
///
/// A fault carries the message that describes what went wrong plus the
/// stack-trace text captured where it happened. Both are plain text: by the
/// time a fault reaches the last-resort handler there is nothing left to
/// inspect programmatically, only something to report.
///
/// ## Example
///
/// ```rust
/// use endstop_core::Fault;
///
/// let fault = Fault::with_trace("connection pool exhausted", "at pool.rs:42");
/// assert_eq!(fault.message(), "connection pool exhausted");
/// assert_eq!(fault.trace(), "at pool.rs:42");
/// assert_eq!(fault.to_string(), "connection pool exhausted");
/// ```
#[derive(Debug, Error)]
#[error("{message}")]
pub struct Fault
{
    message: String,
    trace: String,
}

impl Fault
{
    /// Create a fault from a message, capturing a backtrace at the call site.
    ///
    /// The backtrace is captured unconditionally (it does not depend on
    /// `RUST_BACKTRACE`), since the whole point of a last-resort handler is
    /// to leave a usable record behind.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self
    {
        Fault {
            message: message.into(),
            trace: Backtrace::force_capture().to_string(),
        }
    }

    /// Create a fault from a message and an already-rendered trace.
    ///
    /// Use this when the trace was captured elsewhere, e.g. inside a panic
    /// hook where the interesting frames are the panicking ones.
    #[must_use]
    pub fn with_trace(message: impl Into<String>, trace: impl Into<String>) -> Self
    {
        Fault {
            message: message.into(),
            trace: trace.into(),
        }
    }

    /// The message describing the fault.
    #[must_use]
    pub fn message(&self) -> &str
    {
        &self.message
    }

    /// The stack-trace text captured for the fault.
    #[must_use]
    pub fn trace(&self) -> &str
    {
        &self.trace
    }
}
