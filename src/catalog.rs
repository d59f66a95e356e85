use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;
use tracing::{error, instrument};

/// A single stream entry of the upstream catalog.
///
/// Every field is optional. Anything that is not a JSON string is treated as missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub logo: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub link: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub cookie: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub drm_scheme: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub drm_license: Option<String>,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => Some(s),
        _ => None,
    })
}

impl ChannelRecord {
    /// Decodes one catalog element. Non-object elements become an empty record.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        // serde would also map an array onto the fields by position
        if !value.is_object() {
            return Self::default();
        }

        serde_json::from_value(value).unwrap_or_default()
    }

    /// Playback URL, only when it looks like an HTTP(S) URL
    #[must_use]
    pub fn valid_link(&self) -> Option<&str> {
        self.link.as_deref().filter(|l| l.starts_with("http"))
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed")]
    Request(#[source] reqwest::Error),
    #[error("server answered with status {0}")]
    Status(StatusCode),
    #[error("unable to read response body")]
    Body(#[source] reqwest::Error),
    #[error("response is not valid JSON")]
    Json(#[from] serde_json::Error),
    #[error("expected a JSON array of channels, got {0}")]
    NotAList(&'static str),
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Parses a catalog document into channel records, keeping source order
///
/// # Errors
/// Errors when the body is not JSON or its top-level value is not an array
pub fn parse_catalog(body: &str) -> Result<Vec<ChannelRecord>, FetchError> {
    let json = serde_json::from_str::<Value>(body)?;
    let Value::Array(items) = json else {
        return Err(FetchError::NotAList(json_kind(&json)));
    };

    Ok(items.into_iter().map(ChannelRecord::from_value).collect())
}

/// Downloads and parses the channel catalog with a single bounded attempt
///
/// # Errors
/// See [`FetchError`]
#[instrument(skip(client, timeout))]
pub async fn try_fetch_catalog(
    client: &reqwest::Client,
    url: &str,
    timeout: Duration,
) -> Result<Vec<ChannelRecord>, FetchError> {
    let res = client
        .get(url)
        .timeout(timeout)
        .send()
        .await
        .map_err(FetchError::Request)?;

    let status = res.status();
    if !status.is_success() {
        return Err(FetchError::Status(status));
    }

    let body = res.text().await.map_err(FetchError::Body)?;
    parse_catalog(&body)
}

/// Same as [`try_fetch_catalog`] but degrades every failure into an empty catalog after
/// reporting it
pub async fn fetch_catalog(
    client: &reqwest::Client,
    url: &str,
    timeout: Duration,
) -> Vec<ChannelRecord> {
    match try_fetch_catalog(client, url, timeout).await {
        Ok(channels) => channels,
        Err(e) => {
            error!("Fetch error: {:#}", anyhow::Error::new(e));
            Vec::new()
        }
    }
}
