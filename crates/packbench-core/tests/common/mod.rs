#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use packbench_core::exec::{ExitKind, Measurement, MeasuredExec};
use packbench_core::model::{MachineContext, TestSpec};

/// Canned-measurement executor. The compress phase writes
/// `compressed_size` bytes to the output artifact, the decompress phase
/// (recognized by the lone `-d` argument) writes `restored_size` bytes.
#[derive(Default)]
pub struct FakeExec {
    pub calls: AtomicUsize,
    pub compressed_size: u64,
    pub restored_size: u64,
    /// Compressor whose compress phase exits non-zero.
    pub fail_compress: Option<String>,
    /// Compressor whose decompress phase exits non-zero.
    pub fail_decompress: Option<String>,
}

impl FakeExec {
    pub fn ok(compressed_size: u64, restored_size: u64) -> Self {
        Self {
            compressed_size,
            restored_size,
            ..Default::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl MeasuredExec for FakeExec {
    fn run_measured(
        &self,
        cmd: &str,
        args: &[String],
        _stdin: &Path,
        stdout: &Path,
        _timeout: Duration,
    ) -> anyhow::Result<Measurement> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let decompress = args == ["-d"];

        let failed = if decompress {
            self.fail_decompress.as_deref() == Some(cmd)
        } else {
            self.fail_compress.as_deref() == Some(cmd)
        };
        if failed {
            return Ok(Measurement {
                exit: ExitKind::Exited(1),
                elapsed: Duration::from_millis(5),
                peak_rss: 0,
            });
        }

        let size = if decompress {
            self.restored_size
        } else {
            self.compressed_size
        };
        std::fs::write(stdout, vec![0u8; size as usize])?;

        Ok(Measurement {
            exit: ExitKind::Exited(0),
            elapsed: Duration::from_millis(25),
            peak_rss: 8 * 1024 * 1024,
        })
    }
}

pub fn machine() -> MachineContext {
    MachineContext {
        label: "test-box".into(),
        arch: "amd64".into(),
    }
}

pub fn small_catalog() -> Vec<TestSpec> {
    vec![
        TestSpec::new("gzip", &[], "-1"),
        TestSpec::new("gzip", &[], "-9"),
        TestSpec::new("lz4", &[], "-1"),
    ]
}

pub fn write_archive(dir: &Path, size: usize) -> PathBuf {
    let path = dir.join("ref.cpio");
    std::fs::write(&path, vec![0u8; size]).unwrap();
    path
}
