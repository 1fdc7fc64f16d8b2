// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! A tool for deriving the distribution packages an unpacked binary bundle requires.
//!
//! This crate provides functionality to:
//! - Find native binaries in a bundle by content sniffing
//! - Collect their external shared libraries with `ldd`
//! - Resolve libraries to packages via the local package database and a remote index
//! - Write a `Requires:` section and report on unresolved libraries

pub mod bundle;
pub mod command;
pub mod http;
pub mod resolve;

// Re-export key types for convenience
pub use bundle::{Binary, Bundle, LibrarySet, ProblematicLibraries};
pub use command::{CommandRunner, SystemCommandRunner};
pub use http::{HttpClient, ReqwestClient};
pub use resolve::{HostInfo, PackageResolver, PackageSet, Report, ResolverOptions};
