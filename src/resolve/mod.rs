// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Maps the collected libraries to distribution packages and reports the result.

mod aggregate;
mod console;
mod errors;
mod guess;
mod host;
mod local;
mod manifest;
mod remote;
mod resolver;

pub use aggregate::{PackageOrigin, PackageSet, Totals};
pub use console::summarize_report;
pub use errors::{LookupError, LookupResult, ResolverError};
pub use guess::guess_package;
pub use host::HostInfo;
pub use local::ZYPPER;
pub use manifest::{render, write_requirements};
pub use remote::DEFAULT_INDEX_URL;
pub use resolver::{
    PackageResolver, ResolutionSource, ResolvedDependency, ResolverOptions, DEFAULT_CONCURRENCY,
    DEFAULT_OWN_PACKAGE,
};

use serde::Serialize;
use tracing::{info, warn};

use crate::bundle::{Bundle, LibrarySet};

/// Everything one run found out about a bundle.
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    bundle: &'a Bundle,
    totals: Totals,
    packages: PackageSet,
    dependencies: Vec<ResolvedDependency>,
    libraries: &'a LibrarySet,
}

impl<'a> Report<'a> {
    /// Resolve `libraries` and aggregate the packages.
    ///
    /// # Errors
    /// Returns an error if the resolver cannot run. Unresolved libraries are not errors.
    pub fn new(
        bundle: &'a Bundle,
        libraries: &'a LibrarySet,
        resolver: &PackageResolver<'_>,
    ) -> Result<Self, ResolverError> {
        let dependencies = resolver.resolve_all(libraries)?;
        let packages = PackageSet::from_resolutions(&dependencies);
        let totals = Totals::calculate(&dependencies, &packages);

        for dependency in &dependencies {
            if let Some(guess) = dependency.guess() {
                warn!(
                    library = dependency.library(),
                    guess,
                    "Unresolved library, the guessed package name needs manual verification"
                );
            }
        }
        info!(
            libraries = totals.libraries,
            local = totals.local,
            remote = totals.remote,
            unresolved = totals.unresolved,
            packages = totals.packages,
            "Resolution completed"
        );

        Ok(Self {
            bundle,
            totals,
            packages,
            dependencies,
            libraries,
        })
    }

    #[must_use]
    pub fn packages(&self) -> &PackageSet {
        &self.packages
    }

    #[must_use]
    pub fn totals(&self) -> &Totals {
        &self.totals
    }

    #[must_use]
    pub fn dependencies(&self) -> &[ResolvedDependency] {
        &self.dependencies
    }
}
