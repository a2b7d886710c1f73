use serde::{Deserialize, Serialize};

/// One (compressor, options, level) combination to benchmark.
///
/// `options` may be empty; `level` is the level flag as passed on the
/// command line (e.g. `-9`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TestSpec {
    pub compressor: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    pub level: String,
}

impl TestSpec {
    pub fn new(compressor: &str, options: &[&str], level: &str) -> Self {
        Self {
            compressor: compressor.to_string(),
            options: options.iter().map(|s| s.to_string()).collect(),
            level: level.to_string(),
        }
    }

    /// Canonical string form of `options`, used as the stored key component.
    pub fn options_key(&self) -> String {
        self.options.join(" ")
    }

    /// Full argument list for the compress phase.
    pub fn compress_args(&self) -> Vec<String> {
        let mut args = self.options.clone();
        args.push(self.level.clone());
        args
    }
}

impl std::fmt::Display for TestSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.compressor)?;
        for opt in &self.options {
            write!(f, " {}", opt)?;
        }
        write!(f, " {}", self.level)
    }
}

/// Identity of the host a benchmark pass runs on. Established once per
/// invocation, immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MachineContext {
    /// Operator-supplied free-text label, e.g. "Pi Zero 2".
    pub label: String,
    /// Debian-style architecture tag, e.g. "amd64", "arm64".
    pub arch: String,
}

/// Wall-clock time and peak resident memory for one measured phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PhaseStats {
    pub duration_secs: f64,
    pub peak_rss: u64,
}

/// One measured outcome, keyed by (machine, arch, compressor, options,
/// level). Compression ratio is derived downstream as
/// output_size / input_size and never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    pub machine: String,
    pub arch: String,
    pub compressor: String,
    pub options: String,
    pub level: String,
    pub succeeded: bool,
    pub comp: PhaseStats,
    pub decomp: PhaseStats,
    pub input_size: u64,
    pub output_size: u64,
}

impl RunResult {
    /// Row for a test that failed before producing trustworthy figures.
    /// Only `input_size` is meaningful; everything else is zeroed so a
    /// failed run cannot be mistaken for a zero-cost one.
    pub fn failed(machine: &MachineContext, spec: &TestSpec, input_size: u64) -> Self {
        Self {
            machine: machine.label.clone(),
            arch: machine.arch.clone(),
            compressor: spec.compressor.clone(),
            options: spec.options_key(),
            level: spec.level.clone(),
            succeeded: false,
            comp: PhaseStats::default(),
            decomp: PhaseStats::default(),
            input_size,
            output_size: 0,
        }
    }
}
