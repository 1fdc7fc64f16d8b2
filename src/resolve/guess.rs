// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Best-effort package names for libraries no lookup could resolve.

/// Guess the package name from soname conventions.
///
/// `libfoo.so.2` becomes `libfoo2`, `libssl.so.1.1` becomes `libssl1_1`, and a stem ending in
/// a digit gets a separating dash (`libpng12.so.0` becomes `libpng12-0`). Unversioned names
/// drop the `.so` suffix. The result always needs manual verification.
#[must_use]
pub fn guess_package(library: &str) -> String {
    let (stem, version) = match library.split_once(".so") {
        Some((stem, rest)) if !stem.is_empty() => (stem, rest.trim_start_matches('.')),
        _ => return library.to_string(),
    };
    if version.is_empty() {
        return stem.to_string();
    }
    let version = version.replace('.', "_");
    if stem.ends_with(|c: char| c.is_ascii_digit()) {
        format!("{stem}-{version}")
    } else {
        format!("{stem}{version}")
    }
}
