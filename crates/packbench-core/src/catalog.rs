//! The static test matrix.
//!
//! The catalog is plain data handed to the engine, not ambient state; tests
//! substitute small synthetic catalogs. Iteration order is stable so
//! preflight and progress reporting are reproducible across runs.

use crate::model::TestSpec;

/// The benchmark corpus: zstd 1-19 (single- and multi-threaded), gzip 1-9,
/// lz4 1-9, xz 0-9 (normal and extreme).
pub fn default_catalog() -> Vec<TestSpec> {
    let mut specs = Vec::new();

    for level in 1..=19 {
        specs.push(TestSpec::new("zstd", &[], &format!("-{level}")));
    }
    for level in 1..=19 {
        specs.push(TestSpec::new("zstd", &["-T0"], &format!("-{level}")));
    }
    for level in 1..=9 {
        specs.push(TestSpec::new("gzip", &[], &format!("-{level}")));
    }
    for level in 1..=9 {
        specs.push(TestSpec::new("lz4", &[], &format!("-{level}")));
    }
    for level in 0..=9 {
        specs.push(TestSpec::new("xz", &[], &format!("-{level}")));
    }
    for level in 0..=9 {
        specs.push(TestSpec::new("xz", &["-e"], &format!("-{level}")));
    }

    specs
}
