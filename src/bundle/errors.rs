// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Errors that abort a bundle scan.

use std::path::PathBuf;
use thiserror::Error;

use crate::command::CommandError;

/// Result type for scan operations.
pub type ScanResult<T> = std::result::Result<T, ScanError>;

/// Every variant is fatal: a partially scanned bundle would under-report its requirements.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Failed to resolve bundle path: {path:?}")]
    InvalidRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to walk bundle directory: {path:?}")]
    WalkDirFailed {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("Failed to stat file: {path:?}")]
    StatFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to open file: {path:?}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to read file: {path:?}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to run dependency introspection for {path:?}")]
    IntrospectionFailed {
        path: PathBuf,
        #[source]
        source: CommandError,
    },
    #[error("Dependency introspection exited with status {code} for {path:?}: {stderr}")]
    IntrospectionStatus {
        path: PathBuf,
        code: i32,
        stderr: String,
    },
    #[error("Failed to read known-problematic libraries file: {path:?}")]
    ProblematicListFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
