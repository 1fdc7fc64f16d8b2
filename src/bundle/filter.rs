// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Suppresses dependencies that the bundle provides itself.

use super::binary::Binary;
use super::library_set::basename;

/// Matches dependency names against the file names of the bundle's own binaries.
pub struct SelfReferenceFilter {
    file_names: Vec<String>,
}

impl SelfReferenceFilter {
    #[must_use]
    pub fn new(binaries: &[Binary]) -> Self {
        Self {
            file_names: binaries
                .iter()
                .map(|binary| binary.file_name().to_string())
                .filter(|name| !name.is_empty())
                .collect(),
        }
    }

    /// Whether `dependency` names a file shipped in the bundle.
    ///
    /// A bundle binary matches when its file name contains the dependency's basename, so
    /// `libkso.so` is provided by a bundled `libkso.so` as well as `libkso.so.1`.
    #[must_use]
    pub fn is_self_provided(&self, dependency: &str) -> bool {
        let name = basename(dependency);
        !name.is_empty() && self.file_names.iter().any(|file| file.contains(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::ElfType;

    fn filter(paths: &[&str]) -> SelfReferenceFilter {
        let binaries: Vec<Binary> = paths
            .iter()
            .map(|path| Binary::new_for_testing(path, ElfType::SharedObject))
            .collect();
        SelfReferenceFilter::new(&binaries)
    }

    #[test]
    fn test_bundle_library_is_self_provided() {
        let filter = filter(&["/opt/office6/libkso.so", "/opt/office6/wps"]);
        assert!(filter.is_self_provided("libkso.so"));
        assert!(filter.is_self_provided("/somewhere/else/libkso.so"));
        assert!(!filter.is_self_provided("libfoo.so.2"));
    }

    #[test]
    fn test_substring_of_file_name_matches() {
        let filter = filter(&["/opt/office6/libqtcore.so.4.8.7"]);
        assert!(filter.is_self_provided("libqtcore.so.4"));
        // Directory names are not considered.
        assert!(!filter.is_self_provided("office6"));
    }

    #[test]
    fn test_empty_dependency_never_matches() {
        let filter = filter(&["/opt/office6/wps"]);
        assert!(!filter.is_self_provided(""));
    }

    #[test]
    fn test_decision_is_idempotent() {
        let filter = filter(&["/opt/office6/libkso.so", "/opt/office6/wps"]);
        for dependency in ["libkso.so", "libfoo.so.2", "wps", "libc.so.6"] {
            assert_eq!(
                filter.is_self_provided(dependency),
                filter.is_self_provided(dependency),
                "dependency: {dependency}"
            );
        }
    }
}
