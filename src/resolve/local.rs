// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Looks up the installed package providing a library with `zypper`.

use std::ffi::OsStr;

use super::errors::{LookupError, LookupResult};
use super::host::HostInfo;
use crate::command::CommandRunner;

/// The host package manager.
pub const ZYPPER: &str = "/usr/bin/zypper";

/// `zypper` exit code for a search without matches.
const ZYPPER_EXIT_INF_CAP_NOT_FOUND: i32 = 104;

const COMPAT_32BIT_SUFFIX: &str = "-32bit";

/// Searches the local package database for the package owning a library file.
pub(crate) struct LocalLookup<'a> {
    runner: &'a dyn CommandRunner,
    host: &'a HostInfo,
    own_package: &'a str,
}

impl<'a> LocalLookup<'a> {
    pub(crate) fn new(
        runner: &'a dyn CommandRunner,
        host: &'a HostInfo,
        own_package: &'a str,
    ) -> Self {
        Self {
            runner,
            host,
            own_package,
        }
    }

    /// Find the installed package providing `library`, `None` if there is none.
    ///
    /// # Errors
    /// Returns an error if `zypper` cannot be run or fails for another reason than "no match".
    pub(crate) fn lookup(&self, library: &str) -> LookupResult<Option<String>> {
        let args = [
            OsStr::new("--no-refresh"),
            OsStr::new("se"),
            OsStr::new("-f"),
            OsStr::new("-i"),
            OsStr::new(library),
        ];
        let output = self
            .runner
            .run(ZYPPER, &args)
            .map_err(|e| LookupError::LocalQueryFailed {
                library: library.to_string(),
                source: e,
            })?;

        if output.code == ZYPPER_EXIT_INF_CAP_NOT_FOUND {
            return Ok(None);
        }
        if !output.success() {
            return Err(LookupError::LocalQueryStatus {
                library: library.to_string(),
                code: output.code,
                stderr: output.stderr.trim().to_string(),
            });
        }

        let candidates = installed_packages(&output.stdout);
        Ok(select_package(&candidates, self.host.is_64bit(), self.own_package).map(str::to_string))
    }
}

/// Package names of installed rows in a `zypper search` table.
///
/// Rows look like `i+ | libfoo2 | Foo library | package`; the status column starts with `i`
/// for installed packages. Header, separator and informational lines are skipped.
pub(crate) fn installed_packages(stdout: &str) -> Vec<&str> {
    stdout
        .lines()
        .filter_map(|line| {
            let mut columns = line.split('|');
            let status = columns.next()?.trim();
            let name = columns.next()?.trim();
            (status.starts_with('i') && !name.is_empty()).then_some(name)
        })
        .collect()
}

/// Pick the package to require from the installed candidates.
///
/// The bundle's own package is never chosen. On 64-bit hosts `-32bit` compatibility packages
/// are only chosen when nothing else provides the library.
pub(crate) fn select_package<'s>(
    candidates: &[&'s str],
    is_64bit: bool,
    own_package: &str,
) -> Option<&'s str> {
    let mut candidates = candidates
        .iter()
        .copied()
        .filter(|name| *name != own_package);
    if !is_64bit {
        return candidates.next();
    }
    let mut fallback = None;
    for name in candidates {
        if !name.contains(COMPAT_32BIT_SUFFIX) {
            return Some(name);
        }
        fallback.get_or_insert(name);
    }
    fallback
}
