//! Measured subprocess execution.
//!
//! The engine only depends on the [`MeasuredExec`] trait so phase sequencing
//! and success policy can be tested with canned measurements, independent of
//! real OS process control.

pub mod posix;

use std::path::Path;
use std::time::Duration;

pub use posix::PosixExec;

/// How a measured child process came to an end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitKind {
    /// Normal exit with the given status code.
    Exited(i32),
    /// Terminated by a signal (e.g. SIGKILL from the OOM killer).
    Signaled(i32),
    /// Killed by us after exceeding the phase deadline.
    TimedOut,
}

impl ExitKind {
    pub fn success(&self) -> bool {
        matches!(self, ExitKind::Exited(0))
    }
}

/// Outcome of one measured child process.
#[derive(Debug, Clone, Copy)]
pub struct Measurement {
    pub exit: ExitKind,
    /// Wall-clock time from spawn to reap, not CPU time.
    pub elapsed: Duration,
    /// Maximum instantaneous resident set size over the child's lifetime,
    /// in bytes.
    pub peak_rss: u64,
}

pub trait MeasuredExec: Send + Sync {
    /// Run `cmd args` with stdin redirected from `stdin` and stdout to
    /// `stdout`, blocking until the child exits, is killed, or exceeds
    /// `timeout`.
    ///
    /// Errors are reserved for the child being unspawnable or unreapable;
    /// non-zero exits, signals and timeouts are reported in the
    /// [`Measurement`].
    fn run_measured(
        &self,
        cmd: &str,
        args: &[String],
        stdin: &Path,
        stdout: &Path,
        timeout: Duration,
    ) -> anyhow::Result<Measurement>;
}
