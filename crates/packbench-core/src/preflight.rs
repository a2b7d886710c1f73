//! Startup-time tool availability check.
//!
//! Runs once before any timed work; a binary that disappears mid-run is an
//! execution failure, not a preflight failure. The checker only reports —
//! the caller decides whether to abort.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::model::TestSpec;

#[derive(Debug, Clone, Default)]
pub struct PreflightReport {
    /// Distinct compressor names referenced by the catalog, sorted.
    pub required: Vec<String>,
    /// Subset of `required` that did not resolve to an executable, sorted.
    pub missing: Vec<String>,
}

impl PreflightReport {
    pub fn all_present(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Verify every compressor referenced by the catalog resolves to an
/// executable on the current `PATH`.
pub fn check(catalog: &[TestSpec]) -> PreflightReport {
    let required: BTreeSet<&str> = catalog.iter().map(|s| s.compressor.as_str()).collect();

    let missing = required
        .iter()
        .filter(|name| resolve(name).is_none())
        .map(|name| name.to_string())
        .collect();

    PreflightReport {
        required: required.iter().map(|s| s.to_string()).collect(),
        missing,
    }
}

fn resolve(name: &str) -> Option<PathBuf> {
    // Absolute or relative paths bypass the PATH search.
    if name.contains('/') {
        let p = Path::new(name);
        return is_executable(p).then(|| p.to_path_buf());
    }
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
}

fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    match std::fs::metadata(path) {
        Ok(md) => md.is_file() && md.permissions().mode() & 0o111 != 0,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_missing_binaries() {
        let catalog = vec![
            TestSpec::new("sh", &[], "-1"),
            TestSpec::new("packbench-no-such-tool", &[], "-1"),
            TestSpec::new("packbench-no-such-tool", &[], "-2"),
        ];
        let report = check(&catalog);
        assert_eq!(report.required, vec!["packbench-no-such-tool", "sh"]);
        assert_eq!(report.missing, vec!["packbench-no-such-tool"]);
        assert!(!report.all_present());
    }

    #[test]
    fn all_present_for_ubiquitous_tools() {
        let catalog = vec![TestSpec::new("sh", &[], "-1")];
        let report = check(&catalog);
        assert!(report.all_present(), "missing: {:?}", report.missing);
    }
}
