use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;

use packbench_core::catalog::default_catalog;
use packbench_core::engine::{RunPolicy, Runner};
use packbench_core::exec::PosixExec;
use packbench_core::host::detect_arch;
use packbench_core::model::MachineContext;
use packbench_core::preflight;
use packbench_core::storage::store::Store;

use super::exit_codes;
use crate::cli::args::{OutputFormat, RunArgs};

pub fn run(args: RunArgs) -> anyhow::Result<i32> {
    let md = std::fs::metadata(&args.archive)
        .with_context(|| format!("cannot read archive {}", args.archive.display()))?;
    if !md.is_file() {
        anyhow::bail!("archive {} is not a regular file", args.archive.display());
    }

    let arch = detect_arch()?;
    let machine = MachineContext {
        label: args.machine.clone(),
        arch,
    };

    let store = Store::open(&args.db)?;
    store.init_schema()?;
    let catalog = default_catalog();
    store.seed_catalog(&catalog)?;

    // Check all the compressors are installed before wasting lots of time.
    let report = preflight::check(&catalog);
    if !report.all_present() {
        for name in &report.missing {
            eprintln!("please install missing {name}");
        }
        if !args.allow_missing {
            eprintln!("aborting; pass --allow-missing to record these tests as failures");
            return Ok(exit_codes::PREFLIGHT_MISSING);
        }
    }

    let runner = Runner {
        store,
        exec: Arc::new(PosixExec),
        machine,
        archive: args.archive.clone(),
        policy: RunPolicy {
            timeout: Duration::from_secs(args.timeout_secs),
            force: args.force,
        },
    };
    let summary = runner.run(&catalog)?;

    if args.format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        eprintln!(
            "{} tests: {} executed, {} skipped, {} failed",
            summary.total, summary.executed, summary.skipped, summary.failed
        );
    }

    // Failed individual tests do not fail the overall pass.
    Ok(exit_codes::OK)
}
