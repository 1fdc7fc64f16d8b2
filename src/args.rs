// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.
use clap::Parser;
use std::path::PathBuf;

use bundle_requires::resolve::{DEFAULT_CONCURRENCY, DEFAULT_INDEX_URL, DEFAULT_OWN_PACKAGE};

#[derive(Parser)]
#[command(name = "bundle_requires")]
#[command(version)]
#[command(about = "Derives the package requirements of the native binaries in an unpacked bundle")]
pub(crate) struct Args {
    /// Path to the unpacked bundle.
    pub bundle_dir: PathBuf,

    /// Prefix identifying libraries provided by the bundle itself. Defaults to the bundle path.
    #[arg(long)]
    pub install_root: Option<PathBuf>,

    /// Path to the file to write the `Requires:` lines to.
    #[arg(long, default_value = "depends.txt")]
    pub output: PathBuf,

    /// Path to the file to write the full results in JSON format.
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Name of the bundle's own package, never required by itself.
    #[arg(long, default_value = DEFAULT_OWN_PACKAGE)]
    pub package_name: String,

    /// Number of libraries resolved in parallel.
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Distribution version matched against the package index, e.g. "Tumbleweed" or "Leap 15.2".
    /// Detected from /etc/os-release if not given.
    #[arg(long)]
    pub distribution_version: Option<String>,

    /// Host architecture. Defaults to the architecture this tool was built for.
    #[arg(long)]
    pub arch: Option<String>,

    /// Search endpoint of the remote package index.
    #[arg(long, default_value = DEFAULT_INDEX_URL)]
    pub index_url: String,

    /// Only consult the local package database.
    #[arg(long)]
    pub no_remote: bool,

    #[arg(
        long,
        long_help = "Path to a text file of known-problematic libraries.\n\
                Each line contains a library name, optionally followed by ': <note>'.\n\
                Empty lines and lines starting with # are ignored."
    )]
    pub known_problematic: Option<PathBuf>,

    /// Timeout in seconds for each `ldd` and `zypper` run.
    #[arg(long, default_value_t = 30)]
    pub command_timeout: u64,

    /// Enable debug logging.
    #[arg(short, long)]
    pub verbose: bool,
}
