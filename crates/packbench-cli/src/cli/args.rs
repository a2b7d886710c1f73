use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser)]
#[command(
    name = "packbench",
    version,
    about = "Benchmark compression tools against a reference archive"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the benchmark corpus against an archive, resuming where the
    /// previous pass for this machine left off
    Run(RunArgs),
    /// Check tool availability and report database statistics
    Doctor(DoctorArgs),
}

#[derive(clap::Args, Debug, Clone)]
pub struct RunArgs {
    /// The filename of the (uncompressed) archive to use, e.g. an initramfs
    /// CPIO image
    pub archive: PathBuf,

    /// A (brief) description of this machine, e.g. 'Pi Zero 2'
    #[arg(short, long)]
    pub machine: String,

    /// The database to populate
    #[arg(short, long, default_value = "compression.db")]
    pub db: PathBuf,

    /// Per-phase deadline in seconds; a compressor that hangs longer is
    /// killed and recorded as failed
    #[arg(long, default_value_t = 3600)]
    pub timeout_secs: u64,

    /// Continue even when cataloged compressors are not installed; their
    /// tests are recorded as failures
    #[arg(long)]
    pub allow_missing: bool,

    /// Re-run tests already recorded for this machine (overwrites rows)
    #[arg(long)]
    pub force: bool,

    /// Summary output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(clap::Args, Debug, Clone)]
pub struct DoctorArgs {
    #[arg(short, long, default_value = "compression.db")]
    pub db: PathBuf,

    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}
