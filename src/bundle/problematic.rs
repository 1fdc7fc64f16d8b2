// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Known-problematic libraries that deserve a warning when a bundle requires them.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use super::errors::{ScanError, ScanResult};

/// Libraries with an optional note, loaded from a configuration file.
#[derive(Debug, Default)]
pub struct ProblematicLibraries {
    libraries: HashMap<String, String>,
}

impl ProblematicLibraries {
    /// Create an empty list.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load the list from a file.
    ///
    /// Each line holds a library name, optionally followed by `:` and a note, e.g.
    /// `libQtXml.so.4: Qt4 is no longer shipped by Tumbleweed`. Empty lines and lines
    /// starting with `#` are ignored.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read.
    pub fn from_file<P: AsRef<Path>>(path: P) -> ScanResult<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| ScanError::ProblematicListFailed {
                path: path.as_ref().to_path_buf(),
                source: e,
            })?;
        Ok(Self::parse(&content))
    }

    fn parse(content: &str) -> Self {
        let libraries = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(|line| match line.split_once(':') {
                Some((library, note)) => (library.trim().to_string(), note.trim().to_string()),
                None => (line.to_string(), String::new()),
            })
            .filter(|(library, _)| !library.is_empty())
            .collect();
        Self { libraries }
    }

    /// The note for `library` if it is known to be problematic (empty if it has none).
    #[must_use]
    pub fn lookup(&self, library: &str) -> Option<&str> {
        self.libraries.get(library).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.libraries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_list() {
        let libraries = ProblematicLibraries::empty();
        assert!(libraries.is_empty());
        assert_eq!(libraries.lookup("libQtXml.so.4"), None);
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# Qt4 was dropped").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "libQtXml.so.4: Qt4 is deprecated on Tumbleweed").unwrap();
        writeln!(file, "  libpng12.so.0  ").unwrap();
        file.flush().unwrap();

        let libraries = ProblematicLibraries::from_file(file.path()).unwrap();
        assert_eq!(
            libraries.lookup("libQtXml.so.4"),
            Some("Qt4 is deprecated on Tumbleweed")
        );
        assert_eq!(libraries.lookup("libpng12.so.0"), Some(""));
        assert_eq!(libraries.lookup("libQtCore.so.4"), None);
    }

    #[test]
    fn test_file_not_found() {
        let result = ProblematicLibraries::from_file("/nonexistent/problematic.txt");
        assert!(matches!(
            result,
            Err(ScanError::ProblematicListFailed { .. })
        ));
    }
}
