//! Benchmark driver: iterates the catalog strictly sequentially, skipping
//! entries already recorded for this machine label and committing each new
//! result before the next entry starts. Sequential execution is load-bearing
//! twice over: concurrent tests would compete for RAM/CPU and invalidate the
//! measurements, and with one test in flight a crash loses at most one
//! unrecorded result.

use anyhow::Context;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::exec::MeasuredExec;
use crate::model::{MachineContext, PhaseStats, RunResult, TestSpec};
use crate::storage::store::Store;

#[derive(Debug, Clone)]
pub struct RunPolicy {
    /// Per-phase deadline; bounds total run time when a compressor hangs.
    pub timeout: Duration,
    /// Re-execute entries that already have a row (upsert overwrites).
    pub force: bool,
}

impl Default for RunPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(3600),
            force: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub executed: usize,
    pub skipped: usize,
    pub failed: usize,
}

pub struct Runner {
    pub store: Store,
    pub exec: Arc<dyn MeasuredExec>,
    pub machine: MachineContext,
    pub archive: PathBuf,
    pub policy: RunPolicy,
}

impl Runner {
    /// Execute every catalog entry not already recorded for this machine
    /// label. Individual test failures are recorded and iteration continues;
    /// only store errors abort the pass.
    pub fn run(&self, catalog: &[TestSpec]) -> anyhow::Result<RunSummary> {
        let input_size = std::fs::metadata(&self.archive)
            .with_context(|| format!("cannot read archive {}", self.archive.display()))?
            .len();

        let config = serde_json::json!({
            "archive": self.archive.display().to_string(),
            "input_size": input_size,
            "timeout_secs": self.policy.timeout.as_secs(),
            "force": self.policy.force,
        });
        let invocation = self
            .store
            .insert_invocation(&self.machine, &config.to_string())?;

        let mut summary = RunSummary {
            total: catalog.len(),
            ..Default::default()
        };

        match self.iterate(catalog, input_size, &mut summary) {
            Ok(()) => {
                self.store.finalize_invocation(invocation, "completed")?;
                Ok(summary)
            }
            Err(e) => {
                let _ = self.store.finalize_invocation(invocation, "aborted");
                Err(e)
            }
        }
    }

    fn iterate(
        &self,
        catalog: &[TestSpec],
        input_size: u64,
        summary: &mut RunSummary,
    ) -> anyhow::Result<()> {
        for spec in catalog {
            if !self.policy.force && self.store.exists(&self.machine.label, spec)? {
                debug!(test = %spec, "already recorded; skipping");
                summary.skipped += 1;
                continue;
            }

            info!(test = %spec, "testing");
            let row = self.run_entry(spec, input_size);
            if !row.succeeded {
                summary.failed += 1;
            }

            // Committed before the next entry starts; a crash here loses at
            // most the in-flight test.
            self.store
                .upsert(&row)
                .with_context(|| format!("failed to persist result for {spec}"))?;
            summary.executed += 1;
        }
        Ok(())
    }

    /// A single compress/decompress cycle. Execution failures of any kind
    /// (non-zero exit, signal, timeout, unspawnable binary, scratch-file
    /// trouble) are contained here and reported as a `succeeded = false`
    /// row; they never abort the pass.
    fn run_entry(&self, spec: &TestSpec, input_size: u64) -> RunResult {
        match self.measure(spec, input_size) {
            Ok(row) => row,
            Err(e) => {
                warn!(test = %spec, error = %format!("{e:#}"), "test execution failed");
                RunResult::failed(&self.machine, spec, input_size)
            }
        }
    }

    fn measure(&self, spec: &TestSpec, input_size: u64) -> anyhow::Result<RunResult> {
        // Scratch artifacts are deleted on drop, success or failure.
        let artifact = NamedTempFile::new().context("cannot create scratch artifact")?;

        let comp = self.exec.run_measured(
            &spec.compressor,
            &spec.compress_args(),
            &self.archive,
            artifact.path(),
            self.policy.timeout,
        )?;
        if !comp.exit.success() {
            warn!(test = %spec, phase = "compress", exit = ?comp.exit, "phase failed");
            return Ok(RunResult::failed(&self.machine, spec, input_size));
        }
        let output_size = artifact.as_file().metadata()?.len();
        let comp_stats = PhaseStats {
            duration_secs: comp.elapsed.as_secs_f64(),
            peak_rss: comp.peak_rss,
        };

        let restored = NamedTempFile::new().context("cannot create scratch artifact")?;
        let decomp = self.exec.run_measured(
            &spec.compressor,
            &["-d".to_string()],
            artifact.path(),
            restored.path(),
            self.policy.timeout,
        )?;
        let restored_size = restored.as_file().metadata()?.len();

        if !decomp.exit.success() || restored_size != input_size {
            warn!(
                test = %spec,
                phase = "decompress",
                exit = ?decomp.exit,
                restored_size,
                input_size,
                "phase failed"
            );
            // The completed compress phase keeps its figures for diagnostic
            // value; the succeeded flag governs how consumers treat the row.
            return Ok(RunResult {
                machine: self.machine.label.clone(),
                arch: self.machine.arch.clone(),
                compressor: spec.compressor.clone(),
                options: spec.options_key(),
                level: spec.level.clone(),
                succeeded: false,
                comp: comp_stats,
                decomp: PhaseStats::default(),
                input_size,
                output_size,
            });
        }

        Ok(RunResult {
            machine: self.machine.label.clone(),
            arch: self.machine.arch.clone(),
            compressor: spec.compressor.clone(),
            options: spec.options_key(),
            level: spec.level.clone(),
            succeeded: true,
            comp: comp_stats,
            decomp: PhaseStats {
                duration_secs: decomp.elapsed.as_secs_f64(),
                peak_rss: decomp.peak_rss,
            },
            input_size,
            output_size,
        })
    }
}
