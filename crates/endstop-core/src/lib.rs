//! # endstop-core
//!
//! Fault registry and last-resort handler machinery for Endstop.
//!
//! This crate provides the building blocks behind the `endstop` facade:
//!
//! - An event registry abstraction with opaque listener handles
//! - The failsafe manager that installs a fatal fallback handler and
//!   yields to any handler registered after it
//! - Host capabilities (diagnostic stream, process termination) behind a
//!   trait so the fatal path is testable
//! - A panic hook that routes uncaught panics into the registry
//!
//! ## Who handles a fault
//!
//! At most one fallback handler is ever active, and only in processes that
//! had zero fault listeners when it was installed. As soon as any other
//! listener subscribes to the fault event, the fallback removes itself and
//! the newcomer governs fault handling entirely.

pub mod error;
pub mod failsafe;
pub mod hook;
pub mod host;
pub mod registry;

// Re-export commonly used types
pub use error::Fault;
pub use failsafe::{Failsafe, UndoToken, FAULT_EVENT};
pub use hook::route_panics;
pub use host::{process_host, Host, ProcessHost};
pub use registry::{
    process_registry, EventRegistry, FaultListener, ListenerId, ListenerWatcher, ProcessRegistry, WatcherId,
};
