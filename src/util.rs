use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

/// Builds the client shared by the catalog fetch and the liveness probes.
///
/// Per-request timeouts are applied by the callers, this only bounds connection setup.
///
/// # Errors
/// Errors when the TLS backend cannot be initialised
pub fn init_http_client() -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_static(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        )),
    );

    reqwest::Client::builder()
        .default_headers(headers)
        .connect_timeout(Duration::from_secs(10))
        .build()
        .context("Building HTTP client")
}

/// Strips every `"` out of a cookie and trims surrounding whitespace so it can be
/// embedded inside the `#EXTHTTP` JSON object
#[must_use]
pub fn sanitize_cookie(cookie: &str) -> String {
    cookie.replace('"', "").trim().to_string()
}
