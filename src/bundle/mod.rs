// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Scans an unpacked bundle for native binaries and collects their external libraries.

mod binary;
mod errors;
mod filter;
mod ldd;
mod library_set;
mod problematic;
mod sniff;

use path_clean::PathClean;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

pub use binary::{Binary, Classification, ElfType, SkipReason};
pub use errors::{ScanError, ScanResult};
pub use filter::SelfReferenceFilter;
pub use ldd::{parse_line, Extractor, RawDependency, LDD};
pub use library_set::{Library, LibrarySet};
pub use problematic::ProblematicLibraries;
pub use sniff::ContentType;

use crate::command::CommandRunner;

fn absolute_root(path: &Path) -> ScanResult<PathBuf> {
    std::path::absolute(path)
        .map(|path| path.clean())
        .map_err(|e| ScanError::InvalidRoot {
            path: path.to_path_buf(),
            source: e,
        })
}

/// The native binaries of an unpacked bundle.
#[derive(Debug, Serialize)]
pub struct Bundle {
    root: PathBuf,
    install_root: PathBuf,
    binaries: Vec<Binary>,
}

impl Bundle {
    /// Walk `root` and classify every entry.
    ///
    /// `install_root` is the prefix under which the bundle gets installed; dependencies resolved
    /// below it are provided by the bundle. It defaults to `root`. Both are made absolute
    /// against the current directory.
    ///
    /// # Errors
    /// Returns an error if a root cannot be made absolute or any directory entry cannot be read.
    /// No partial results are returned.
    pub fn scan(root: &Path, install_root: Option<&Path>) -> ScanResult<Self> {
        let root = absolute_root(root)?;
        let install_root = match install_root {
            Some(install_root) => absolute_root(install_root)?,
            None => root.clone(),
        };
        info!(root = %root.display(), install_root = %install_root.display(), "Scanning bundle");

        let mut binaries = Vec::new();
        for entry in WalkDir::new(&root).sort_by_file_name() {
            let entry = entry.map_err(|e| ScanError::WalkDirFailed {
                path: root.clone(),
                source: e,
            })?;
            match Binary::classify(entry.path())? {
                Classification::Candidate(binary) => {
                    debug!(path = %binary.path().display(), kind = ?binary.kind(), "Found binary");
                    binaries.push(binary);
                }
                Classification::Skipped(reason) => {
                    debug!(path = %entry.path().display(), ?reason, "Skipping file");
                }
            }
        }

        info!(binaries = binaries.len(), "Scan completed");
        Ok(Self {
            root,
            install_root,
            binaries,
        })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn install_root(&self) -> &Path {
        &self.install_root
    }

    #[must_use]
    pub fn binaries(&self) -> &[Binary] {
        &self.binaries
    }

    /// Collect the external libraries of all binaries, one `ldd` run per binary.
    ///
    /// Dependencies found inside the install root or matching a bundle binary are dropped.
    ///
    /// # Errors
    /// Returns an error if `ldd` fails for any binary.
    pub fn libraries(
        &self,
        runner: &dyn CommandRunner,
        problematic: &ProblematicLibraries,
    ) -> ScanResult<LibrarySet> {
        let extractor = Extractor::new(runner, &self.install_root);
        let filter = SelfReferenceFilter::new(&self.binaries);
        let mut libraries = LibrarySet::new();

        for binary in &self.binaries {
            for dependency in extractor.extract(binary.path())? {
                if filter.is_self_provided(&dependency.name) {
                    debug!(
                        binary = %binary.path().display(),
                        dependency = %dependency.name,
                        "Dependency is a bundle binary"
                    );
                    continue;
                }
                if libraries.insert(&dependency.name, binary.path()) {
                    self.warn_if_problematic(problematic, &dependency.name, binary.path());
                }
            }
        }

        info!(libraries = libraries.len(), "Collected external libraries");
        Ok(libraries)
    }

    /// Returns `true` if a warning was logged.
    fn warn_if_problematic(
        &self,
        problematic: &ProblematicLibraries,
        library: &str,
        required_by: &Path,
    ) -> bool {
        let Some(note) = problematic.lookup(library) else {
            return false;
        };
        let required_by = required_by.strip_prefix(&self.root).unwrap_or(required_by);
        warn!(
            library,
            required_by = %required_by.display(),
            note,
            "Known-problematic library required, it may not be available on this distribution"
        );
        true
    }

    #[cfg(test)]
    pub(crate) fn new_for_testing(root: &str, binaries: Vec<Binary>) -> Self {
        Self {
            root: PathBuf::from(root),
            install_root: PathBuf::from(root),
            binaries,
        }
    }
}
