use std::{path::PathBuf, time::Duration};

pub const DEFAULT_SOURCE_URL: &str = "https://playify.pages.dev/Jiotv.json";
pub const DEFAULT_OUTPUT_PATH: &str = "rjmtv.m3u";
pub const DEFAULT_EPG_URL: &str = "https://avkb.short.gy/jioepg.xml.gz";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Android 13; IPTV Player) AppleWebKit/537.36 Chrome/120.0.0.0 Mobile Safari/537.36";
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 12;

/// Everything a single playlist generation run needs to know
#[derive(Debug, Clone)]
pub struct Config {
    /// Where the JSON channel catalog is downloaded from
    pub source_url: String,
    pub output_path: PathBuf,
    /// EPG guide advertised in the `#EXTM3U` header
    pub epg_url: String,
    /// Sent to players through `#EXTVLCOPT` and used for liveness probes
    pub user_agent: String,
    pub fetch_timeout: Duration,
    pub probe_timeout: Duration,
    /// Drop channels whose stream does not answer a `HEAD` request
    pub verify_streams: bool,
    /// Maximum number of liveness probes in flight at once
    pub probe_concurrency: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            epg_url: DEFAULT_EPG_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            probe_timeout: Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS),
            verify_streams: false,
            probe_concurrency: 1,
        }
    }
}
