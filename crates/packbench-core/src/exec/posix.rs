//! Production [`MeasuredExec`] backed by `wait4(2)`.
//!
//! `wait4` is the only portable way to get the child's `ru_maxrss` at reap
//! time, which is exactly the peak-RSS figure the benchmark records. The
//! child is polled with `WNOHANG` so a hung compressor can be killed at the
//! deadline and still be reaped for its partial rusage.

use anyhow::Context;
use std::fs::File;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use super::{ExitKind, Measurement, MeasuredExec};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

#[derive(Debug, Clone, Copy, Default)]
pub struct PosixExec;

impl MeasuredExec for PosixExec {
    fn run_measured(
        &self,
        cmd: &str,
        args: &[String],
        stdin: &Path,
        stdout: &Path,
        timeout: Duration,
    ) -> anyhow::Result<Measurement> {
        let input = File::open(stdin)
            .with_context(|| format!("failed to open input {}", stdin.display()))?;
        let output = File::create(stdout)
            .with_context(|| format!("failed to create output {}", stdout.display()))?;

        let started = Instant::now();
        let child = Command::new(cmd)
            .args(args)
            .stdin(Stdio::from(input))
            .stdout(Stdio::from(output))
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("failed to spawn {cmd}"))?;
        let pid = child.id() as libc::pid_t;

        let deadline = started + timeout;
        let mut status: libc::c_int = 0;
        let mut usage: libc::rusage = unsafe { std::mem::zeroed() };
        let mut timed_out = false;

        loop {
            let rc = unsafe { libc::wait4(pid, &mut status, libc::WNOHANG, &mut usage) };
            if rc == pid {
                break;
            }
            if rc == -1 {
                return Err(std::io::Error::last_os_error())
                    .with_context(|| format!("wait4 failed for {cmd}"));
            }
            if Instant::now() >= deadline {
                timed_out = true;
                unsafe { libc::kill(pid, libc::SIGKILL) };
                let rc = unsafe { libc::wait4(pid, &mut status, 0, &mut usage) };
                if rc == -1 {
                    return Err(std::io::Error::last_os_error())
                        .with_context(|| format!("wait4 failed reaping killed {cmd}"));
                }
                break;
            }
            std::thread::sleep(POLL_INTERVAL);
        }
        let elapsed = started.elapsed();

        let exit = if timed_out {
            ExitKind::TimedOut
        } else if libc::WIFEXITED(status) {
            ExitKind::Exited(libc::WEXITSTATUS(status))
        } else if libc::WIFSIGNALED(status) {
            ExitKind::Signaled(libc::WTERMSIG(status))
        } else {
            // Stopped/continued never escape a WNOHANG reap loop; treat
            // anything else as an abnormal exit.
            ExitKind::Exited(-1)
        };

        Ok(Measurement {
            exit,
            elapsed,
            peak_rss: maxrss_bytes(usage.ru_maxrss),
        })
    }
}

// Linux reports ru_maxrss in KiB, macOS in bytes.
#[cfg(not(target_os = "macos"))]
fn maxrss_bytes(maxrss: libc::c_long) -> u64 {
    (maxrss.max(0) as u64) * 1024
}

#[cfg(target_os = "macos")]
fn maxrss_bytes(maxrss: libc::c_long) -> u64 {
    maxrss.max(0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn scratch_pair(dir: &tempfile::TempDir, payload: &[u8]) -> (std::path::PathBuf, std::path::PathBuf) {
        let input = dir.path().join("input");
        let output = dir.path().join("output");
        let mut f = File::create(&input).unwrap();
        f.write_all(payload).unwrap();
        (input, output)
    }

    #[test]
    fn measures_successful_child() {
        let dir = tempfile::tempdir().unwrap();
        let (input, output) = scratch_pair(&dir, b"hello packbench\n");

        let m = PosixExec
            .run_measured("cat", &[], &input, &output, Duration::from_secs(10))
            .unwrap();

        assert_eq!(m.exit, ExitKind::Exited(0));
        assert!(m.exit.success());
        assert_eq!(std::fs::read(&output).unwrap(), b"hello packbench\n");
    }

    #[test]
    fn reports_nonzero_exit() {
        let dir = tempfile::tempdir().unwrap();
        let (input, output) = scratch_pair(&dir, b"");

        let m = PosixExec
            .run_measured(
                "sh",
                &["-c".into(), "exit 3".into()],
                &input,
                &output,
                Duration::from_secs(10),
            )
            .unwrap();

        assert_eq!(m.exit, ExitKind::Exited(3));
        assert!(!m.exit.success());
    }

    #[test]
    fn kills_child_at_deadline() {
        let dir = tempfile::tempdir().unwrap();
        let (input, output) = scratch_pair(&dir, b"");

        let m = PosixExec
            .run_measured(
                "sleep",
                &["30".into()],
                &input,
                &output,
                Duration::from_millis(100),
            )
            .unwrap();

        assert_eq!(m.exit, ExitKind::TimedOut);
        assert!(m.elapsed < Duration::from_secs(5));
    }

    #[test]
    fn unspawnable_command_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let (input, output) = scratch_pair(&dir, b"");

        let err = PosixExec.run_measured(
            "packbench-no-such-tool",
            &[],
            &input,
            &output,
            Duration::from_secs(1),
        );
        assert!(err.is_err());
    }
}
