// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Error types for package resolution.

use thiserror::Error;

use crate::command::CommandError;
use crate::http::HttpError;

/// Result type for a single package lookup.
pub type LookupResult<T> = std::result::Result<T, LookupError>;

/// Failures confined to the one library being resolved; the run continues.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Local package query failed for {library}")]
    LocalQueryFailed {
        library: String,
        #[source]
        source: CommandError,
    },
    #[error("Local package query exited with status {code} for {library}: {stderr}")]
    LocalQueryStatus {
        library: String,
        code: i32,
        stderr: String,
    },
    #[error("Invalid package index URL {url}: {reason}")]
    InvalidIndexUrl { url: String, reason: String },
    #[error("Package index query failed for {library}")]
    RemoteQueryFailed {
        library: String,
        #[source]
        source: HttpError,
    },
}

/// Errors that prevent the resolver from running at all.
#[derive(Debug, Error)]
pub enum ResolverError {
    #[error("Concurrency limit must be at least 1")]
    InvalidConcurrency,
    #[error("Failed to start resolver thread pool")]
    ThreadPoolFailed {
        #[source]
        source: rayon::ThreadPoolBuildError,
    },
}
