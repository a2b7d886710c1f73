pub mod doctor;
pub mod run;

use crate::cli::args::{Cli, Command};

pub mod exit_codes {
    pub const OK: i32 = 0;
    /// Cataloged compressors missing and the operator did not override.
    pub const PREFLIGHT_MISSING: i32 = 1;
    /// Unrecoverable error (bad archive, store failure, undetectable arch).
    pub const FATAL: i32 = 2;
}

pub fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Run(args) => run::run(args),
        Command::Doctor(args) => doctor::run(args),
    }
}
