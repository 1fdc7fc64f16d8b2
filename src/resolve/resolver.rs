// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Maps libraries to package names on a bounded pool of workers.
//!
//! Each library is resolved independently: the local package database is asked first, the
//! remote package index second, and when both miss a guessed name is recorded. Lookup
//! failures never abort the run; they only make the library unresolved.

use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use serde::Serialize;
use tracing::{debug, warn};

use super::errors::ResolverError;
use super::guess::guess_package;
use super::host::HostInfo;
use super::local::LocalLookup;
use super::remote::{RemoteLookup, DEFAULT_INDEX_URL};
use crate::bundle::{Library, LibrarySet};
use crate::command::CommandRunner;
use crate::http::HttpClient;

/// Default number of lookups in flight at once.
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Default name of the bundle's own package, which must never require itself.
pub const DEFAULT_OWN_PACKAGE: &str = "wps-office";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionSource {
    Local,
    Remote,
    Unresolved,
}

/// The outcome of resolving one library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedDependency {
    library: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    package: Option<String>,
    source: ResolutionSource,
    /// Best-effort name for unresolved libraries, to be verified by hand.
    #[serde(skip_serializing_if = "Option::is_none")]
    guess: Option<String>,
}

impl ResolvedDependency {
    fn resolved(library: &str, package: String, source: ResolutionSource) -> Self {
        Self {
            library: library.to_string(),
            package: Some(package),
            source,
            guess: None,
        }
    }

    fn unresolved(library: &str, guess: String) -> Self {
        Self {
            library: library.to_string(),
            package: None,
            source: ResolutionSource::Unresolved,
            guess: Some(guess),
        }
    }

    #[must_use]
    pub fn library(&self) -> &str {
        &self.library
    }

    /// The package found by a lookup, `None` for unresolved libraries.
    #[must_use]
    pub fn package(&self) -> Option<&str> {
        self.package.as_deref()
    }

    #[must_use]
    pub fn source(&self) -> ResolutionSource {
        self.source
    }

    #[must_use]
    pub fn guess(&self) -> Option<&str> {
        self.guess.as_deref()
    }
}

/// Resolver settings.
#[derive(Debug, Clone)]
pub struct ResolverOptions {
    pub own_package: String,
    pub index_url: String,
    pub concurrency: usize,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            own_package: DEFAULT_OWN_PACKAGE.to_string(),
            index_url: DEFAULT_INDEX_URL.to_string(),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

pub struct PackageResolver<'a> {
    runner: &'a dyn CommandRunner,
    client: Option<&'a dyn HttpClient>,
    host: &'a HostInfo,
    options: ResolverOptions,
}

impl<'a> PackageResolver<'a> {
    /// Create a resolver. Without an HTTP client the remote fallback is disabled.
    pub fn new(
        runner: &'a dyn CommandRunner,
        client: Option<&'a dyn HttpClient>,
        host: &'a HostInfo,
        options: ResolverOptions,
    ) -> Self {
        Self {
            runner,
            client,
            host,
            options,
        }
    }

    /// Resolve every library, at most `concurrency` at a time.
    ///
    /// Returns once all lookups have finished, in library name order.
    ///
    /// # Errors
    /// Returns an error if the concurrency limit is zero or the worker pool cannot be started.
    pub fn resolve_all(
        &self,
        libraries: &LibrarySet,
    ) -> Result<Vec<ResolvedDependency>, ResolverError> {
        if self.options.concurrency == 0 {
            return Err(ResolverError::InvalidConcurrency);
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.options.concurrency)
            .thread_name(|index| format!("resolver-{index}"))
            .build()
            .map_err(|e| ResolverError::ThreadPoolFailed { source: e })?;

        let libraries: Vec<&Library> = libraries.iter().collect();
        // `install` blocks until every task is done, so nothing outlives the pool.
        Ok(pool.install(|| {
            libraries
                .par_iter()
                .map(|library| self.resolve(library.name()))
                .collect()
        }))
    }

    /// Resolve a single library: local lookup, then remote lookup, then a guess.
    #[must_use]
    pub fn resolve(&self, library: &str) -> ResolvedDependency {
        let local = LocalLookup::new(self.runner, self.host, &self.options.own_package);
        match local.lookup(library) {
            Ok(Some(package)) => {
                debug!(library, package = %package, "Resolved from installed packages");
                return ResolvedDependency::resolved(library, package, ResolutionSource::Local);
            }
            Ok(None) => debug!(library, "No installed package provides library"),
            Err(e) => debug!(library, error = %e, "Local package query failed"),
        }

        if let Some(client) = self.client {
            let remote = RemoteLookup::new(client, self.host, &self.options.index_url);
            match remote.lookup(library) {
                Ok(Some(package)) => {
                    debug!(library, package = %package, "Resolved from package index");
                    return ResolvedDependency::resolved(
                        library,
                        package,
                        ResolutionSource::Remote,
                    );
                }
                Ok(None) => debug!(
                    library,
                    version = self.host.distribution_version(),
                    "Package index has no match for this distribution"
                ),
                Err(e) => warn!(library, error = %e, "Package index query failed"),
            }
        }

        let guess = guess_package(library);
        debug!(
            library,
            guess = %guess,
            version = self.host.distribution_version(),
            is_64bit = self.host.is_64bit(),
            "Falling back to guessed package name"
        );
        ResolvedDependency::unresolved(library, guess)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::testing::FakeRunner;
    use crate::http::HttpError;
    use std::path::Path;

    struct EmptyIndexClient;

    impl HttpClient for EmptyIndexClient {
        fn get(&self, _url: &str) -> Result<String, HttpError> {
            Ok("<html><body>No results</body></html>".to_string())
        }
    }

    const INSTALLED_LIBFOO: &str = "S  | Name    | Summary | Type\n\
                                    ---+---------+---------+--------\n\
                                    i+ | libfoo2 | Foo     | package\n";

    fn host() -> HostInfo {
        HostInfo::new("x86_64", "Tumbleweed")
    }

    #[test]
    fn test_local_resolution() {
        let runner = FakeRunner::default().with("libfoo.so.2", 0, INSTALLED_LIBFOO);
        let host = host();
        let resolver = PackageResolver::new(&runner, None, &host, ResolverOptions::default());

        let resolved = resolver.resolve("libfoo.so.2");
        assert_eq!(resolved.package(), Some("libfoo2"));
        assert_eq!(resolved.source(), ResolutionSource::Local);
        assert_eq!(resolved.guess(), None);
    }

    #[test]
    fn test_unresolved_gets_guess() {
        let runner = FakeRunner::default().with("libQtXml.so.4", 104, "");
        let host = host();
        let client = EmptyIndexClient;
        let resolver =
            PackageResolver::new(&runner, Some(&client), &host, ResolverOptions::default());

        let resolved = resolver.resolve("libQtXml.so.4");
        assert_eq!(resolved.package(), None);
        assert_eq!(resolved.source(), ResolutionSource::Unresolved);
        assert_eq!(resolved.guess(), Some("libQtXml4"));
    }

    #[test]
    fn test_resolve_all_is_ordered() {
        let runner = FakeRunner::default()
            .with("libfoo.so.2", 0, INSTALLED_LIBFOO)
            .with("libQtXml.so.4", 104, "");
        let host = host();
        let resolver = PackageResolver::new(&runner, None, &host, ResolverOptions::default());

        let mut libraries = LibrarySet::new();
        libraries.insert("libfoo.so.2", Path::new("/bundle/wps"));
        libraries.insert("libQtXml.so.4", Path::new("/bundle/wps"));

        let resolved = resolver.resolve_all(&libraries).unwrap();
        let names: Vec<&str> = resolved.iter().map(ResolvedDependency::library).collect();
        assert_eq!(names, vec!["libQtXml.so.4", "libfoo.so.2"]);
    }

    #[test]
    fn test_zero_concurrency_is_rejected() {
        let runner = FakeRunner::default();
        let host = host();
        let options = ResolverOptions {
            concurrency: 0,
            ..ResolverOptions::default()
        };
        let resolver = PackageResolver::new(&runner, None, &host, options);
        assert!(matches!(
            resolver.resolve_all(&LibrarySet::new()),
            Err(ResolverError::InvalidConcurrency)
        ));
    }
}
