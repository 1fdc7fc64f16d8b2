// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! HTTP access to the remote package index behind the `HttpClient` trait.

use std::time::Duration;
use thiserror::Error;

/// Default timeout for a single request to the package index.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from the HTTP layer.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("Failed to build HTTP client")]
    ClientFailed {
        #[source]
        source: reqwest::Error,
    },
    #[error("Request failed: {url}")]
    RequestFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Capability to fetch a document over HTTP.
pub trait HttpClient: Sync {
    /// Fetch `url` and return the response body.
    ///
    /// # Errors
    /// Returns an error on connection failures, timeouts and non-success status codes.
    fn get(&self, url: &str) -> Result<String, HttpError>;
}

/// Blocking `reqwest` client. Honors the usual proxy environment variables.
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
}

impl ReqwestClient {
    /// Create a client with the given request timeout.
    ///
    /// # Errors
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn new(timeout: Duration) -> Result<Self, HttpError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HttpError::ClientFailed { source: e })?;
        Ok(Self { client })
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &str) -> Result<String, HttpError> {
        let request_failed = |e| HttpError::RequestFailed {
            url: url.to_string(),
            source: e,
        };
        self.client
            .get(url)
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .and_then(reqwest::blocking::Response::text)
            .map_err(request_failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_url_is_request_failure() {
        let client = ReqwestClient::new(DEFAULT_HTTP_TIMEOUT).unwrap();
        let result = client.get("not a url");
        assert!(matches!(result, Err(HttpError::RequestFailed { url, .. }) if url == "not a url"));
    }
}
