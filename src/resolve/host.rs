// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Facts about the host that parameterize package lookups.

use serde::Serialize;
use std::fs;

const OS_RELEASE: &str = "/etc/os-release";
const DISTRIBUTION_PREFIX: &str = "openSUSE ";

/// Architecture, word size and distribution version of the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostInfo {
    arch: String,
    is_64bit: bool,
    distribution_version: String,
}

impl HostInfo {
    /// Host facts for an explicitly named architecture; the word size is derived from the name.
    #[must_use]
    pub fn new(arch: impl Into<String>, distribution_version: impl Into<String>) -> Self {
        let arch = arch.into();
        Self {
            is_64bit: is_64bit_arch(&arch),
            arch,
            distribution_version: distribution_version.into(),
        }
    }

    /// Detect the running host, reading the distribution from `/etc/os-release`.
    ///
    /// An unreadable `os-release` yields an empty version, which matches any remote row.
    #[must_use]
    pub fn detect() -> Self {
        let version = fs::read_to_string(OS_RELEASE)
            .ok()
            .and_then(|content| distribution_version(&content))
            .unwrap_or_default();
        Self {
            arch: std::env::consts::ARCH.to_string(),
            is_64bit: cfg!(target_pointer_width = "64"),
            distribution_version: version,
        }
    }

    /// Replace the distribution version, keeping the architecture.
    #[must_use]
    pub fn with_distribution_version(mut self, distribution_version: impl Into<String>) -> Self {
        self.distribution_version = distribution_version.into();
        self
    }

    #[must_use]
    pub fn arch(&self) -> &str {
        &self.arch
    }

    #[must_use]
    pub fn is_64bit(&self) -> bool {
        self.is_64bit
    }

    /// Version string matched against the package index, e.g. `Tumbleweed` or `Leap 15.2`.
    #[must_use]
    pub fn distribution_version(&self) -> &str {
        &self.distribution_version
    }

    /// Architecture name used by the package index.
    #[must_use]
    pub fn index_arch(&self) -> &str {
        match self.arch.as_str() {
            "x86" | "i386" | "i486" | "i586" | "i686" => "i586",
            arch => arch,
        }
    }
}

/// Whether `arch` names a 64-bit architecture, e.g. `x86_64`, `ppc64le` or `s390x`.
fn is_64bit_arch(arch: &str) -> bool {
    matches!(arch, "s390x" | "ppc64le" | "mips64el" | "riscv64gc") || arch.ends_with("64")
}

/// Extract the distribution version from `os-release` content.
///
/// Uses `PRETTY_NAME` (falling back to `NAME` and `VERSION`) and drops a leading `openSUSE `.
pub(crate) fn distribution_version(os_release: &str) -> Option<String> {
    let field = |key: &str| {
        os_release.lines().find_map(|line| {
            line.trim()
                .strip_prefix(key)
                .and_then(|rest| rest.strip_prefix('='))
                .map(|value| value.trim().trim_matches('"').trim_matches('\'').to_string())
        })
    };
    let name = field("PRETTY_NAME").or_else(|| match (field("NAME"), field("VERSION")) {
        (Some(name), Some(version)) => Some(format!("{name} {version}")),
        (name, _) => name,
    })?;
    Some(
        name.strip_prefix(DISTRIBUTION_PREFIX)
            .unwrap_or(&name)
            .to_string(),
    )
}
