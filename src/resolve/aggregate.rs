// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Merges resolver results into the final, deduplicated set of required packages.

use serde::Serialize;
use std::collections::BTreeMap;

use super::resolver::{ResolutionSource, ResolvedDependency};

/// How a package entered the set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "origin", rename_all = "lowercase")]
pub enum PackageOrigin {
    Local,
    Remote,
    /// Guessed from the soname of `library`; needs manual verification.
    Guessed { library: String },
}

impl PackageOrigin {
    #[must_use]
    pub fn is_guess(&self) -> bool {
        matches!(self, Self::Guessed { .. })
    }
}

/// Required packages, sorted by name. The first origin recorded for a package wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PackageSet {
    packages: BTreeMap<String, PackageOrigin>,
}

impl PackageSet {
    /// Build the set from resolver results.
    ///
    /// Results are merged in library name order so the outcome does not depend on the order in
    /// which workers finished.
    #[must_use]
    pub fn from_resolutions(resolutions: &[ResolvedDependency]) -> Self {
        let mut ordered: Vec<&ResolvedDependency> = resolutions.iter().collect();
        ordered.sort_by(|a, b| a.library().cmp(b.library()));

        let mut set = Self::default();
        for resolution in ordered {
            set.merge(resolution);
        }
        set
    }

    /// Add the package of one resolution. Returns `true` if the package was new.
    pub fn merge(&mut self, resolution: &ResolvedDependency) -> bool {
        let entry = match (resolution.source(), resolution.package(), resolution.guess()) {
            (ResolutionSource::Local, Some(package), _) => (package, PackageOrigin::Local),
            (ResolutionSource::Remote, Some(package), _) => (package, PackageOrigin::Remote),
            (ResolutionSource::Unresolved, _, Some(guess)) => (
                guess,
                PackageOrigin::Guessed {
                    library: resolution.library().to_string(),
                },
            ),
            _ => return false,
        };
        let (package, origin) = entry;
        if self.packages.contains_key(package) {
            return false;
        }
        self.packages.insert(package.to_string(), origin);
        true
    }

    #[must_use]
    pub fn contains(&self, package: &str) -> bool {
        self.packages.contains_key(package)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Packages in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PackageOrigin)> {
        self.packages
            .iter()
            .map(|(package, origin)| (package.as_str(), origin))
    }
}

/// Counts for diagnostics.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub libraries: usize,
    pub local: usize,
    pub remote: usize,
    pub unresolved: usize,
    pub packages: usize,
    pub guessed_packages: usize,
}

impl Totals {
    #[must_use]
    pub fn calculate(resolutions: &[ResolvedDependency], packages: &PackageSet) -> Self {
        let mut totals = resolutions
            .iter()
            .fold(Totals::default(), |mut totals, resolution| {
                match resolution.source() {
                    ResolutionSource::Local => totals.local += 1,
                    ResolutionSource::Remote => totals.remote += 1,
                    ResolutionSource::Unresolved => totals.unresolved += 1,
                }
                totals
            });
        totals.libraries = resolutions.len();
        totals.packages = packages.len();
        totals.guessed_packages = packages.iter().filter(|(_, origin)| origin.is_guess()).count();
        totals
    }
}
