// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Writes the `Requires:` section for the packaging manifest.

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;
use tracing::info;

use super::aggregate::{PackageOrigin, PackageSet};

const REQUIRES: &str = "Requires:";

/// Render the requirement lines, one package per line in sorted order.
///
/// Guessed packages are preceded by a comment naming the library they were guessed from.
#[must_use]
pub fn render(packages: &PackageSet) -> String {
    let mut out = String::new();
    for (package, origin) in packages.iter() {
        if let PackageOrigin::Guessed { library } = origin {
            let _ = writeln!(out, "# {package} guessed from {library}, verify manually");
        }
        let _ = writeln!(out, "{REQUIRES} {package}");
    }
    out
}

/// Replace `dest` with the rendered requirement lines.
///
/// # Errors
/// Returns an error if a stale file cannot be removed or the new one cannot be written.
pub fn write_requirements(packages: &PackageSet, dest: &Path) -> io::Result<()> {
    match fs::remove_file(dest) {
        Ok(()) => info!(file = %dest.display(), "Removed stale requirements file"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }
    fs::write(dest, render(packages))?;
    info!(file = %dest.display(), packages = packages.len(), "Wrote requirements");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::resolver::testing::{resolved, unresolved};
    use crate::resolve::ResolutionSource;
    use tempfile::TempDir;

    fn packages() -> PackageSet {
        PackageSet::from_resolutions(&[
            resolved("libfoo.so.2", "libfoo2", ResolutionSource::Local),
            resolved("libbar.so.1", "libbar1", ResolutionSource::Remote),
            unresolved("libQtXml.so.4", "libQtXml4"),
        ])
    }

    #[test]
    fn test_render() {
        assert_eq!(
            render(&packages()),
            "# libQtXml4 guessed from libQtXml.so.4, verify manually\n\
             Requires: libQtXml4\n\
             Requires: libbar1\n\
             Requires: libfoo2\n"
        );
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render(&PackageSet::default()), "");
    }

    #[test]
    fn test_write_replaces_stale_file() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("depends.txt");
        fs::write(&dest, "Requires: stale-package\nRequires: other\n").unwrap();

        write_requirements(&packages(), &dest).unwrap();
        let written = fs::read_to_string(&dest).unwrap();
        assert!(!written.contains("stale-package"));
        assert_eq!(written.lines().filter(|l| l.starts_with(REQUIRES)).count(), 3);
    }

    #[test]
    fn test_write_to_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("missing").join("depends.txt");
        assert!(write_requirements(&packages(), &dest).is_err());
    }
}
