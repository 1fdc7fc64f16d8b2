// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Deduplicating collection of external libraries, keyed by basename.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// File name part of a library reference; the reference itself if it has none.
pub(crate) fn basename(dependency: &str) -> &str {
    Path::new(dependency)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(dependency)
}

/// A unique external library and the binaries that link against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Library {
    name: String,
    required_by: Vec<PathBuf>,
}

impl Library {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Binaries requiring this library, in scan order.
    #[must_use]
    pub fn required_by(&self) -> &[PathBuf] {
        &self.required_by
    }
}

/// Grows monotonically while scanning; entries are never removed.
// BTreeMap keeps libraries sorted, so resolution and output order are deterministic.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct LibrarySet {
    libraries: BTreeMap<String, Library>,
}

impl LibrarySet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `required_by` depends on `dependency`.
    ///
    /// Returns `true` if the library was not in the set before.
    pub fn insert(&mut self, dependency: &str, required_by: &Path) -> bool {
        let name = basename(dependency);
        if let Some(library) = self.libraries.get_mut(name) {
            if !library.required_by.iter().any(|path| path == required_by) {
                library.required_by.push(required_by.to_path_buf());
            }
            return false;
        }
        self.libraries.insert(
            name.to_string(),
            Library {
                name: name.to_string(),
                required_by: vec![required_by.to_path_buf()],
            },
        );
        true
    }

    #[must_use]
    pub fn contains(&self, dependency: &str) -> bool {
        self.libraries.contains_key(basename(dependency))
    }

    #[must_use]
    pub fn get(&self, dependency: &str) -> Option<&Library> {
        self.libraries.get(basename(dependency))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.libraries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.libraries.is_empty()
    }

    /// Libraries sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = &Library> {
        self.libraries.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basename() {
        assert_eq!(basename("/a/libfoo.so.1"), "libfoo.so.1");
        assert_eq!(basename("libfoo.so.1"), "libfoo.so.1");
        assert_eq!(basename(""), "");
    }

    #[test]
    fn test_dedup_by_basename() {
        let mut libraries = LibrarySet::new();
        assert!(libraries.insert("/a/libfoo.so.1", Path::new("/bundle/wps")));
        assert!(!libraries.insert("/b/libfoo.so.1", Path::new("/bundle/et")));
        assert_eq!(libraries.len(), 1);
        assert!(libraries.contains("libfoo.so.1"));

        let library = libraries.get("libfoo.so.1").unwrap();
        assert_eq!(library.name(), "libfoo.so.1");
        assert_eq!(
            library.required_by(),
            &[PathBuf::from("/bundle/wps"), PathBuf::from("/bundle/et")]
        );
    }

    #[test]
    fn test_requirer_recorded_once() {
        let mut libraries = LibrarySet::new();
        libraries.insert("libbar.so.1", Path::new("/bundle/wps"));
        libraries.insert("libbar.so.1", Path::new("/bundle/wps"));
        assert_eq!(libraries.get("libbar.so.1").unwrap().required_by().len(), 1);
    }

    #[test]
    fn test_iteration_is_sorted() {
        let mut libraries = LibrarySet::new();
        libraries.insert("libz.so.1", Path::new("/bundle/wps"));
        libraries.insert("liba.so.1", Path::new("/bundle/wps"));
        libraries.insert("libm.so.6", Path::new("/bundle/wps"));
        let names: Vec<&str> = libraries.iter().map(Library::name).collect();
        assert_eq!(names, vec!["liba.so.1", "libm.so.6", "libz.so.1"]);
    }
}
