//! # Host Capabilities
//!
//! The two process-level side effects the fallback handler needs: writing a
//! diagnostic line and terminating the process. Both sit behind a trait so
//! tests can observe the fatal path without actually ending the test
//! process.

use std::sync::Arc;

/// Side-effect boundary for the last-resort handler.
///
/// The default fault handler only ever does two things to the process it
/// runs in, and both go through here.
pub trait Host: Send + Sync
{
    /// Write one line to the diagnostic stream.
    fn write_diagnostic(&self, line: &str);

    /// Terminate the process with the given status code.
    ///
    /// The real implementation does not return. Test implementations
    /// record the code and do return, so a test can assert on it.
    fn terminate(&self, code: i32);
}

/// The real process host: standard error and process exit.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessHost;

impl Host for ProcessHost
{
    fn write_diagnostic(&self, line: &str)
    {
        eprintln!("{line}");
    }

    fn terminate(&self, code: i32)
    {
        std::process::exit(code);
    }
}

/// Get a handle to the real process host.
#[must_use]
pub fn process_host() -> Arc<dyn Host>
{
    Arc::new(ProcessHost)
}
