//! Host architecture detection.

use anyhow::Context;
use std::process::Command;

/// Debian-style architecture tag for the current host.
///
/// Prefers `dpkg --print-architecture` so results line up with the package
/// architecture on Debian-family machines (including Raspberry Pi OS); falls
/// back to mapping the compile-time target when dpkg is unavailable.
pub fn detect_arch() -> anyhow::Result<String> {
    if let Some(tag) = dpkg_arch() {
        return Ok(tag);
    }
    fallback_arch(std::env::consts::ARCH)
        .map(|s| s.to_string())
        .context("could not determine host architecture")
}

fn dpkg_arch() -> Option<String> {
    let out = Command::new("dpkg")
        .arg("--print-architecture")
        .output()
        .ok()?;
    if !out.status.success() {
        return None;
    }
    let tag = String::from_utf8(out.stdout).ok()?.trim().to_string();
    (!tag.is_empty()).then_some(tag)
}

fn fallback_arch(target: &str) -> Option<&'static str> {
    match target {
        "x86_64" => Some("amd64"),
        "x86" => Some("i386"),
        "aarch64" => Some("arm64"),
        "arm" => Some("armhf"),
        "riscv64" => Some("riscv64"),
        "powerpc64" => Some("ppc64el"),
        "s390x" => Some("s390x"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_maps_common_targets() {
        assert_eq!(fallback_arch("x86_64"), Some("amd64"));
        assert_eq!(fallback_arch("aarch64"), Some("arm64"));
        assert_eq!(fallback_arch("m68k"), None);
    }

    #[test]
    fn detect_arch_yields_nonempty_tag() {
        let tag = detect_arch().expect("arch should be detectable on test hosts");
        assert!(!tag.is_empty());
    }
}
