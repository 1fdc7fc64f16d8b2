// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Falls back to the rpm2html search of a remote package index when no installed package
//! provides a library.

use regex::Regex;
use reqwest::Url;
use std::sync::LazyLock;

use super::errors::{LookupError, LookupResult};
use super::host::HostInfo;
use crate::http::HttpClient;

/// Default package index search endpoint.
pub const DEFAULT_INDEX_URL: &str = "https://rpmfind.net/linux/rpm2html/search.php";

/// The result table starts with this many header cells.
const HEADER_CELLS: usize = 12;

/// Capability suffix of 64-bit library provides, e.g. `libfoo.so.2()(64bit)`.
const CAPABILITY_64BIT: &str = "()(64bit)";

static TABLE_CELL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<td\b[^>]*>(.*?)</td\s*>").expect("table cell pattern is valid")
});

static MARKUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("markup pattern is valid"));

// Everything before the first `-<digits>.` version boundary.
static PACKAGE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*?)-\d+\.").expect("package name pattern is valid"));

/// Queries the package index for the package providing a library.
pub(crate) struct RemoteLookup<'a> {
    client: &'a dyn HttpClient,
    host: &'a HostInfo,
    index_url: &'a str,
}

impl<'a> RemoteLookup<'a> {
    pub(crate) fn new(client: &'a dyn HttpClient, host: &'a HostInfo, index_url: &'a str) -> Self {
        Self {
            client,
            host,
            index_url,
        }
    }

    /// Search URL for `library` on this host.
    ///
    /// # Errors
    /// Returns an error if the index URL is not a valid absolute URL.
    pub(crate) fn query_url(&self, library: &str) -> LookupResult<Url> {
        let query = if self.host.is_64bit() {
            format!("{library}{CAPABILITY_64BIT}")
        } else {
            library.to_string()
        };
        Url::parse_with_params(
            self.index_url,
            &[
                ("query", query.as_str()),
                ("submit", "Search ..."),
                ("system", "opensuse"),
                ("arch", self.host.index_arch()),
            ],
        )
        .map_err(|e| LookupError::InvalidIndexUrl {
            url: self.index_url.to_string(),
            reason: e.to_string(),
        })
    }

    /// Find the package providing `library` for the host's distribution version.
    ///
    /// # Errors
    /// Returns an error if the index cannot be queried.
    pub(crate) fn lookup(&self, library: &str) -> LookupResult<Option<String>> {
        let url = self.query_url(library)?;
        let body = self
            .client
            .get(url.as_str())
            .map_err(|e| LookupError::RemoteQueryFailed {
                library: library.to_string(),
                source: e,
            })?;
        let cells = table_cells(&body);
        Ok(select_package(&cells, self.host.distribution_version()))
    }
}

/// Text content of every `<td>` cell, in document order.
pub(crate) fn table_cells(html: &str) -> Vec<String> {
    TABLE_CELL
        .captures_iter(html)
        .map(|captures| decode_entities(MARKUP.replace_all(&captures[1], "").trim()))
        .collect()
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Pick the package from the result cells.
///
/// After the header cells every second cell is relevant, giving alternating
/// (package file, distribution) entries. The first entry whose distribution contains
/// `version` wins; rows whose package file has no version boundary are skipped.
pub(crate) fn select_package(cells: &[String], version: &str) -> Option<String> {
    let entries: Vec<&String> = cells.iter().skip(HEADER_CELLS).step_by(2).collect();
    entries
        .chunks_exact(2)
        .filter(|entry| entry[1].contains(version))
        .find_map(|entry| package_name(entry[0]))
        .map(str::to_string)
}

/// Package name of a package file, e.g. `libfoo2-1.2.3-1.1.x86_64.html` gives `libfoo2`.
pub(crate) fn package_name(file: &str) -> Option<&str> {
    PACKAGE_NAME
        .captures(file)
        .and_then(|captures| captures.get(1))
        .map(|name| name.as_str())
        .filter(|name| !name.is_empty())
}
