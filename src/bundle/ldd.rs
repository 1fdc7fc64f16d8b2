// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Extracts direct runtime dependencies of a binary from the `ldd` report.

use path_clean::PathClean;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::debug;

use super::errors::{ScanError, ScanResult};
use crate::command::CommandRunner;

/// The linker-introspection tool.
pub const LDD: &str = "ldd";

// `<name> => <path> (<address>)` or `<name> => not found`.
static DEPENDENCY_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\S.*?)\s*=>\s*([^(]*?)\s*(?:\(.*)?$")
        .expect("dependency line pattern is valid")
});

/// A dependency as reported by `ldd`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDependency {
    /// Library reference, usually a soname like `libfoo.so.2`.
    pub name: String,
    /// Where the loader found it, or `not found`.
    pub path: String,
}

/// Parse one line of `ldd` output.
///
/// Lines without `=>` (the loader itself, `linux-vdso`, "statically linked" notices) yield `None`.
#[must_use]
pub fn parse_line(line: &str) -> Option<RawDependency> {
    if !line.contains("=>") {
        return None;
    }
    let captures = DEPENDENCY_LINE.captures(line.trim_end())?;
    Some(RawDependency {
        name: captures[1].to_string(),
        path: captures[2].to_string(),
    })
}

/// Runs `ldd` on bundle binaries and drops dependencies satisfied from inside the install root.
pub struct Extractor<'a> {
    runner: &'a dyn CommandRunner,
    install_root: String,
    real_install_root: Option<PathBuf>,
}

impl<'a> Extractor<'a> {
    /// A relative `install_root` is taken relative to the current directory.
    pub fn new(runner: &'a dyn CommandRunner, install_root: &Path) -> Self {
        let install_root = std::path::absolute(install_root)
            .unwrap_or_else(|_| install_root.to_path_buf())
            .clean();
        Self {
            runner,
            real_install_root: install_root.canonicalize().ok(),
            install_root: install_root.to_string_lossy().into_owned(),
        }
    }

    /// Extract the external dependencies of `binary`.
    ///
    /// # Errors
    /// Returns an error if `ldd` cannot be run or reports a failure. This is fatal for the scan,
    /// since an unreadable report would silently under-report required packages.
    pub fn extract(&self, binary: &Path) -> ScanResult<Vec<RawDependency>> {
        let output = self
            .runner
            .run(LDD, &[binary.as_os_str()])
            .map_err(|e| ScanError::IntrospectionFailed {
                path: binary.to_path_buf(),
                source: e,
            })?;
        if !output.success() {
            return Err(ScanError::IntrospectionStatus {
                path: binary.to_path_buf(),
                code: output.code,
                stderr: output.stderr.trim().to_string(),
            });
        }

        Ok(output
            .stdout
            .lines()
            .filter_map(parse_line)
            .filter(|dependency| {
                let internal = self.is_internal(&dependency.path);
                if internal {
                    debug!(
                        binary = %binary.display(),
                        dependency = %dependency.name,
                        path = %dependency.path,
                        "Dependency provided by the bundle"
                    );
                }
                !internal
            })
            .collect())
    }

    /// Whether `path` lies inside the install root, either literally or after resolving symlinks.
    fn is_internal(&self, path: &str) -> bool {
        if path.contains(self.install_root.as_str()) {
            return true;
        }
        let Some(real_root) = &self.real_install_root else {
            return false;
        };
        let path = Path::new(path);
        path.is_absolute()
            && path
                .canonicalize()
                .is_ok_and(|real_path| real_path.starts_with(real_root))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::testing::FakeRunner;
    use crate::command::CommandError;

    fn dependency(name: &str, path: &str) -> Option<RawDependency> {
        Some(RawDependency {
            name: name.to_string(),
            path: path.to_string(),
        })
    }

    #[test]
    fn test_parse_line_table() {
        let cases: &[(&str, Option<RawDependency>)] = &[
            (
                "\tlibfoo.so.2 => /lib64/libfoo.so.2 (0x00007f3c1a2b3000)",
                dependency("libfoo.so.2", "/lib64/libfoo.so.2"),
            ),
            (
                "        libfoo.so.2 => /lib64/libfoo.so.2 (0x00007f...)\"",
                dependency("libfoo.so.2", "/lib64/libfoo.so.2"),
            ),
            (
                "\tlibQtXml.so.4 => not found",
                dependency("libQtXml.so.4", "not found"),
            ),
            (
                "\tlibstdc++.so.6 => /usr/lib64/libstdc++.so.6 (0x00007f0000000000)\r",
                dependency("libstdc++.so.6", "/usr/lib64/libstdc++.so.6"),
            ),
            (
                "\tlibbar.so.1 => /tmp/bundle/office6/libbar.so.1 (0x00007f0000000000)",
                dependency("libbar.so.1", "/tmp/bundle/office6/libbar.so.1"),
            ),
            ("\tlinux-vdso.so.1 (0x00007ffd4b1f2000)", None),
            ("\t/lib64/ld-linux-x86-64.so.2 (0x00007f3c1a4f8000)", None),
            ("\tstatically linked", None),
            ("/tmp/bundle/office6/wps:", None),
            ("", None),
            ("   => /lib64/libfoo.so.2 (0x0)", None),
        ];
        for (line, expected) in cases {
            assert_eq!(&parse_line(line), expected, "line: {line:?}");
        }
    }

    #[test]
    fn test_extract_drops_install_root_paths() {
        let stdout = "\tlinux-vdso.so.1 (0x00007ffd4b1f2000)\n\
                      \tlibfoo.so.2 => /lib64/libfoo.so.2 (0x00007f0000000000)\n\
                      \tlibbar.so.1 => /tmp/bundle/office6/libbar.so.1 (0x00007f0000000000)\n\
                      \tlibQtXml.so.4 => not found\n";
        let runner = FakeRunner::default().with("/tmp/bundle/office6/wps", 0, stdout);
        let extractor = Extractor::new(&runner, Path::new("/tmp/bundle"));

        let dependencies = extractor
            .extract(Path::new("/tmp/bundle/office6/wps"))
            .unwrap();
        let names: Vec<&str> = dependencies.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["libfoo.so.2", "libQtXml.so.4"]);
    }

    #[test]
    fn test_relative_install_root_matches_absolute_paths_only() {
        let stdout = "\tlibfoo.so.2 => /lib64/libfoo.so.2 (0x00007f0000000000)\n\
                      \tlibwpsx.so.1 => /usr/lib64/wps/libwpsx.so.1 (0x00007f0000000000)\n";
        let runner = FakeRunner::default().with("wps/office6/et", 0, stdout);

        for root in [".", "wps"] {
            let extractor = Extractor::new(&runner, Path::new(root));
            assert!(Path::new(&extractor.install_root).is_absolute());
            let dependencies = extractor.extract(Path::new("wps/office6/et")).unwrap();
            let names: Vec<&str> = dependencies.iter().map(|d| d.name.as_str()).collect();
            assert_eq!(names, vec!["libfoo.so.2", "libwpsx.so.1"], "root: {root}");
        }
    }

    #[test]
    fn test_extract_non_zero_exit_is_fatal() {
        let runner =
            FakeRunner::default().with("/tmp/bundle/blob", 1, "\tnot a dynamic executable\n");
        let extractor = Extractor::new(&runner, Path::new("/tmp/bundle"));
        let result = extractor.extract(Path::new("/tmp/bundle/blob"));
        assert!(matches!(
            result,
            Err(ScanError::IntrospectionStatus { code: 1, .. })
        ));
    }

    #[test]
    fn test_extract_missing_tool_is_fatal() {
        let runner = FakeRunner::default();
        let extractor = Extractor::new(&runner, Path::new("/tmp/bundle"));
        let result = extractor.extract(Path::new("/tmp/bundle/wps"));
        assert!(matches!(
            result,
            Err(ScanError::IntrospectionFailed {
                source: CommandError::NotFound { .. },
                ..
            })
        ));
    }
}
