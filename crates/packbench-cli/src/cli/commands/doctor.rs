use packbench_core::catalog::default_catalog;
use packbench_core::preflight;
use packbench_core::storage::store::Store;

use super::exit_codes;
use crate::cli::args::{DoctorArgs, OutputFormat};

pub fn run(args: DoctorArgs) -> anyhow::Result<i32> {
    let catalog = default_catalog();
    let report = preflight::check(&catalog);

    // Store statistics are best-effort: doctor never creates a database,
    // and an unopenable one is reported as absent rather than fatal.
    let stats = if args.db.exists() {
        Store::open(&args.db)
            .ok()
            .and_then(|store| store.stats_best_effort().ok())
    } else {
        None
    };

    if args.format == OutputFormat::Json {
        let rendered = serde_json::json!({
            "required": report.required,
            "missing": report.missing,
            "db": stats.as_ref().map(|s| serde_json::json!({
                "path": args.db.display().to_string(),
                "tests": s.tests,
                "results": s.results,
                "machines": s.machines,
                "last_invocation_at": s.last_invocation_at,
            })),
        });
        println!("{}", serde_json::to_string_pretty(&rendered)?);
    } else {
        eprintln!("required compressors: {}", report.required.join(", "));
        if report.all_present() {
            eprintln!("all compressors present");
        } else {
            for name in &report.missing {
                eprintln!("please install missing {name}");
            }
        }
        if let Some(s) = &stats {
            eprintln!(
                "db {}: {} tests, {} results across {} machine(s)",
                args.db.display(),
                s.tests.unwrap_or(0),
                s.results.unwrap_or(0),
                s.machines.unwrap_or(0)
            );
            if let Some(at) = &s.last_invocation_at {
                eprintln!("last invocation: {at}");
            }
        }
    }

    Ok(if report.all_present() {
        exit_codes::OK
    } else {
        exit_codes::PREFLIGHT_MISSING
    })
}
