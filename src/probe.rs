use std::time::Duration;

use futures_util::{StreamExt as _, stream};
use reqwest::{StatusCode, header::USER_AGENT};
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("stream did not answer")]
    Request(#[from] reqwest::Error),
    #[error("stream answered with status {0}")]
    Status(StatusCode),
}

/// Liveness probe settings
#[derive(Debug, Clone)]
pub struct ProbeOptions<'a> {
    pub user_agent: &'a str,
    pub timeout: Duration,
    pub concurrency: usize,
}

/// Sends a `HEAD` request to a stream, following redirects.
///
/// # Errors
/// Errors on any network failure, timeout, or a final status of 400 and above
#[instrument(skip(client, user_agent, timeout))]
pub async fn probe_stream(
    client: &reqwest::Client,
    url: &str,
    user_agent: &str,
    timeout: Duration,
) -> Result<(), ProbeError> {
    let res = client
        .head(url)
        .header(USER_AGENT, user_agent)
        .timeout(timeout)
        .send()
        .await?;

    let status = res.status();
    if status.as_u16() >= 400 {
        return Err(ProbeError::Status(status));
    }

    Ok(())
}

/// Probes every URL with at most `options.concurrency` requests in flight.
///
/// Returns one liveness flag per URL, in input order.
pub async fn probe_all(
    client: &reqwest::Client,
    urls: &[&str],
    options: &ProbeOptions<'_>,
) -> Vec<bool> {
    stream::iter(urls)
        .map(|url| async move {
            match probe_stream(client, url, options.user_agent, options.timeout).await {
                Ok(()) => true,
                Err(e) => {
                    debug!("Probe of {url} failed: {e}");
                    false
                }
            }
        })
        .buffered(options.concurrency.max(1))
        .collect()
        .await
}
