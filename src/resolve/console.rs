// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Formats and prints run summaries to the console.

use comfy_table::{Attribute, Cell, Table};
use std::path::Path;

use super::resolver::ResolutionSource;
use super::Report;
use crate::bundle::ElfType;

/// Summarize the report to the console.
///
/// Prints the scanned binaries by ELF type, the libraries by resolution source and, if any
/// library could not be resolved, a table of those libraries with their guessed packages.
pub fn summarize_report(report: &Report<'_>) {
    println!("Bundle: {}", report.bundle.root().display());
    println!("Required packages: {}\n", report.totals.packages);

    println!("{}\n", binary_table(report));
    println!("{}\n", resolution_table(report));

    let unresolved = unresolved_rows(report);
    if !unresolved.is_empty() {
        println!("{}", unresolved_table(&unresolved));
        println!(
            "\nTotal: {} unresolved libraries, guessed package names need manual verification",
            unresolved.len()
        );
    }
}

fn default_table_preset() -> Table {
    let mut table = Table::new();
    table
        .load_preset(comfy_table::presets::UTF8_FULL_CONDENSED)
        .apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS)
        .set_content_arrangement(comfy_table::ContentArrangement::Dynamic);
    table
}

fn header(titles: &[&str]) -> Vec<Cell> {
    titles
        .iter()
        .map(|title| Cell::new(title).add_attribute(Attribute::Bold))
        .collect()
}

fn total_row(count: usize) -> Vec<Cell> {
    vec![
        Cell::new("Total").add_attribute(Attribute::Bold),
        Cell::new(count).add_attribute(Attribute::Bold),
    ]
}

/// Create a table showing the scanned binaries by ELF type.
fn binary_table(report: &Report) -> Table {
    let binaries = report.bundle.binaries();
    let count = |kind: ElfType| binaries.iter().filter(|b| b.kind() == kind).count();

    let mut table = default_table_preset();
    table.set_header(header(&["Binary Type", "Count"]));
    for (label, kind) in [
        ("Executables", ElfType::Executable),
        ("Shared libraries", ElfType::SharedObject),
        ("Relocatable", ElfType::Relocatable),
        ("Core", ElfType::Core),
        ("None", ElfType::None),
        ("Not ELF", ElfType::NotElf),
    ] {
        table.add_row(vec![Cell::new(label), Cell::new(count(kind))]);
    }
    table.add_row(total_row(binaries.len()));
    table
}

/// Create a table showing how the libraries were resolved.
fn resolution_table(report: &Report) -> Table {
    let totals = &report.totals;
    let mut table = default_table_preset();
    table
        .set_header(header(&["Resolution", "Libraries"]))
        .add_row(vec![Cell::new("Installed packages"), Cell::new(totals.local)])
        .add_row(vec![Cell::new("Package index"), Cell::new(totals.remote)])
        .add_row(vec![Cell::new("Unresolved"), Cell::new(totals.unresolved)])
        .add_row(total_row(totals.libraries));
    table
}

/// Unresolved libraries with their guess and the first binary requiring them.
fn unresolved_rows<'a>(report: &'a Report<'_>) -> Vec<(&'a str, &'a str, Option<&'a Path>)> {
    report
        .dependencies
        .iter()
        .filter(|dependency| dependency.source() == ResolutionSource::Unresolved)
        .map(|dependency| {
            let required_by = report
                .libraries
                .get(dependency.library())
                .and_then(|library| library.required_by().first())
                .map(|path| path.strip_prefix(report.bundle.root()).unwrap_or(path));
            (
                dependency.library(),
                dependency.guess().unwrap_or_default(),
                required_by,
            )
        })
        .collect()
}

fn unresolved_table(rows: &[(&str, &str, Option<&Path>)]) -> Table {
    let mut table = default_table_preset();
    table.set_header(header(&["Unresolved Library", "Guessed Package", "Required By"]));
    for (library, guess, required_by) in rows {
        let required_by = required_by
            .map(|path| path.to_string_lossy().into_owned())
            .unwrap_or_default();
        table.add_row(vec![
            Cell::new(library),
            Cell::new(guess),
            Cell::new(required_by),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::{Binary, Bundle, LibrarySet};
    use crate::resolve::aggregate::{PackageSet, Totals};
    use crate::resolve::resolver::testing::{resolved, unresolved};

    #[test]
    fn test_unresolved_rows_strip_bundle_root() {
        let bundle = Bundle::new_for_testing(
            "/tmp/bundle",
            vec![Binary::new_for_testing(
                "/tmp/bundle/office6/wps",
                ElfType::Executable,
            )],
        );
        let mut libraries = LibrarySet::new();
        libraries.insert("libfoo.so.2", Path::new("/tmp/bundle/office6/wps"));
        libraries.insert("libQtXml.so.4", Path::new("/tmp/bundle/office6/wps"));
        let dependencies = vec![
            unresolved("libQtXml.so.4", "libQtXml4"),
            resolved("libfoo.so.2", "libfoo2", ResolutionSource::Local),
        ];
        let packages = PackageSet::from_resolutions(&dependencies);
        let totals = Totals::calculate(&dependencies, &packages);
        let report = Report {
            bundle: &bundle,
            libraries: &libraries,
            dependencies,
            packages,
            totals,
        };

        let rows = unresolved_rows(&report);
        assert_eq!(
            rows,
            vec![(
                "libQtXml.so.4",
                "libQtXml4",
                Some(Path::new("office6/wps"))
            )]
        );
        assert_eq!(binary_table(&report).row_iter().count(), 7);
    }
}
