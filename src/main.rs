// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.
mod args;

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

use args::Args;
use bundle_requires::bundle::{Bundle, ProblematicLibraries};
use bundle_requires::command::SystemCommandRunner;
use bundle_requires::http::{HttpClient, ReqwestClient, DEFAULT_HTTP_TIMEOUT};
use bundle_requires::resolve::{
    summarize_report, write_requirements, HostInfo, PackageResolver, Report, ResolverOptions,
};

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let host = host_info(&args);
    let problematic = create_problematic_libraries(args.known_problematic.as_ref())?;
    let runner = SystemCommandRunner::new(Duration::from_secs(args.command_timeout));

    let bundle = Bundle::scan(&args.bundle_dir, args.install_root.as_deref())
        .with_context(|| format!("Failed to scan bundle: {}", args.bundle_dir.display()))?;
    let libraries = bundle
        .libraries(&runner, &problematic)
        .with_context(|| "Failed to collect library dependencies")?;

    let client = if args.no_remote {
        None
    } else {
        Some(
            ReqwestClient::new(DEFAULT_HTTP_TIMEOUT)
                .with_context(|| "Failed to create HTTP client")?,
        )
    };
    let options = ResolverOptions {
        own_package: args.package_name.clone(),
        index_url: args.index_url.clone(),
        concurrency: args.concurrency,
    };
    let resolver = PackageResolver::new(
        &runner,
        client.as_ref().map(|c| c as &dyn HttpClient),
        &host,
        options,
    );
    let report = Report::new(&bundle, &libraries, &resolver)
        .with_context(|| "Failed to resolve packages")?;

    write_requirements(report.packages(), &args.output).with_context(|| {
        format!("Failed to write requirements file: {}", args.output.display())
    })?;
    if let Some(dest) = &args.report {
        write_report_to_file(&report, dest)?;
    }
    summarize_report(&report);
    Ok(())
}

/// Log to stderr. `RUST_LOG` takes precedence over `--verbose`.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn host_info(args: &Args) -> HostInfo {
    let detected = HostInfo::detect();
    let version = args
        .distribution_version
        .clone()
        .unwrap_or_else(|| detected.distribution_version().to_string());
    let host = match &args.arch {
        Some(arch) => HostInfo::new(arch.as_str(), version),
        None => detected.with_distribution_version(version),
    };
    info!(
        arch = host.arch(),
        is_64bit = host.is_64bit(),
        version = host.distribution_version(),
        "Host"
    );
    host
}

fn create_problematic_libraries(path: Option<&PathBuf>) -> Result<ProblematicLibraries> {
    if let Some(known_problematic) = path {
        Ok(ProblematicLibraries::from_file(known_problematic)
            .with_context(|| "Failed to read known-problematic libraries file")?)
    } else {
        Ok(ProblematicLibraries::empty())
    }
}

/// Write the report to a file.
///
/// # Errors
/// Returns an error if the report cannot be serialized to JSON or if the file cannot be created.
fn write_report_to_file(report: &Report<'_>, dest: &Path) -> Result<()> {
    info!(file = %dest.display(), "Writing report");
    let file = File::create(dest)
        .with_context(|| format!("Failed to create JSON output file: {}", dest.display()))?;
    serde_json::to_writer_pretty(file, report)
        .with_context(|| format!("Failed to serialize report to JSON: {}", dest.display()))?;
    Ok(())
}
