#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::cargo)]
#![warn(clippy::perf)]
#![warn(clippy::complexity)]
#![warn(clippy::style)]
#![allow(clippy::multiple_crate_versions)]

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use catalog::{ChannelRecord, fetch_catalog};
use category::categorize;
use clap::Parser;
use config::{
    Config, DEFAULT_EPG_URL, DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_OUTPUT_PATH,
    DEFAULT_PROBE_TIMEOUT_SECS, DEFAULT_SOURCE_URL, DEFAULT_USER_AGENT,
};
use playlist::{RenderStats, render, render_verified};
use tracing::{error, info, warn};
use util::init_http_client;

pub mod catalog;
pub mod category;
pub mod config;
pub mod playlist;
pub mod probe;
pub mod util;

/// Builds a categorized M3U playlist out of a JSON channel catalog
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// URL of the JSON channel catalog
    #[arg(long, env = "SOURCE_URL", default_value = DEFAULT_SOURCE_URL)]
    source_url: String,

    /// Where the playlist gets written
    #[arg(short, long, env = "OUTPUT_PATH", default_value = DEFAULT_OUTPUT_PATH)]
    output: PathBuf,

    /// EPG guide advertised in the playlist header
    #[arg(long, env = "EPG_URL", default_value = DEFAULT_EPG_URL)]
    epg_url: String,

    /// User agent handed to players and used for stream probes
    #[arg(long, env = "PLAYER_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    user_agent: String,

    /// Catalog download timeout, in seconds
    #[arg(long, default_value_t = DEFAULT_FETCH_TIMEOUT_SECS)]
    fetch_timeout: u64,

    /// Per-stream probe timeout, in seconds
    #[arg(long, default_value_t = DEFAULT_PROBE_TIMEOUT_SECS)]
    probe_timeout: u64,

    /// Skip channels whose stream does not answer a HEAD request
    #[arg(short, long, env = "VERIFY_STREAMS")]
    verify_streams: bool,

    /// The amount of parallel stream probes
    #[arg(short, long, default_value_t = 1)]
    parallelism: usize,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Self {
            source_url: args.source_url,
            output_path: args.output,
            epg_url: args.epg_url,
            user_agent: args.user_agent,
            fetch_timeout: Duration::from_secs(args.fetch_timeout),
            probe_timeout: Duration::from_secs(args.probe_timeout),
            verify_streams: args.verify_streams,
            probe_concurrency: args.parallelism,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The catalog was empty or could not be fetched, nothing was written
    NoData,
    Written(RenderStats),
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    dotenvy::dotenv().ok();

    let config = Config::from(Args::parse());
    run(&config).await?;

    Ok(())
}

/// Fetches the catalog and publishes it as a playlist
///
/// # Errors
/// Errors when the playlist cannot be written
pub async fn run(config: &Config) -> Result<Outcome> {
    run_with_client(config, init_http_client()).await
}

async fn run_with_client(
    config: &Config,
    client: Result<reqwest::Client>,
) -> Result<Outcome> {
    let client = match client {
        Ok(client) => client,
        Err(e) => {
            error!("Unable to prepare HTTP client: {e:#}");
            return Ok(Outcome::NoData);
        }
    };

    info!("Fetching channels from {}", config.source_url);
    let channels = fetch_catalog(&client, &config.source_url, config.fetch_timeout).await;

    publish(&client, config, &channels).await
}

/// Categorizes and renders already fetched channels, then writes the playlist.
///
/// An empty channel list leaves any previous playlist untouched.
///
/// # Errors
/// Errors when the playlist cannot be written
pub async fn publish(
    client: &reqwest::Client,
    config: &Config,
    channels: &[ChannelRecord],
) -> Result<Outcome> {
    if channels.is_empty() {
        error!("No data received, keeping any existing playlist");
        return Ok(Outcome::NoData);
    }
    info!("Channels found: {}", channels.len());

    let categorized = categorize(channels);
    for (category, channels) in &categorized {
        info!("{category}: {}", channels.len());
    }

    info!("Validating, filtering & writing M3U");
    let playlist = if config.verify_streams {
        render_verified(client, &categorized, config).await
    } else {
        render(&categorized, config)
    };

    let stats = playlist.stats;
    info!("Duplicates removed: {}", stats.duplicates);
    info!("Invalid URLs skipped: {}", stats.invalid);
    if config.verify_streams {
        info!("Dead streams skipped: {}", stats.unreachable);
    }

    tokio::fs::write(&config.output_path, playlist.text)
        .await
        .with_context(|| format!("Writing playlist to {}", config.output_path.display()))?;

    info!(
        "Final playlist created: {} ({} channels)",
        config.output_path.display(),
        stats.emitted
    );
    info!("Compatible with Kodi / TiviMate / OTT Navigator");
    warn!("DRM streams still require real ClearKey decryption keys");

    Ok(Outcome::Written(stats))
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::util::test_server::serve_once;

    fn config_in(dir: &TempDir) -> Config {
        Config {
            output_path: dir.path().join("playlist.m3u"),
            user_agent: "TestAgent/1.0".to_string(),
            ..Default::default()
        }
    }

    fn channel(name: &str, link: &str) -> ChannelRecord {
        ChannelRecord {
            name: Some(name.to_string()),
            link: Some(link.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn args_defaults_match_config_defaults() {
        let config = Config::from(Args::parse_from(["jiotv-playlist"]));
        let default = Config::default();

        assert_eq!(config.source_url, default.source_url);
        assert_eq!(config.output_path, default.output_path);
        assert_eq!(config.epg_url, default.epg_url);
        assert_eq!(config.user_agent, default.user_agent);
        assert_eq!(config.fetch_timeout, default.fetch_timeout);
        assert_eq!(config.probe_timeout, default.probe_timeout);
        assert_eq!(config.verify_streams, default.verify_streams);
        assert_eq!(config.probe_concurrency, default.probe_concurrency);
    }

    #[tokio::test]
    async fn empty_catalog_keeps_previous_playlist() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        std::fs::write(&config.output_path, "previous").unwrap();

        let outcome = publish(&reqwest::Client::new(), &config, &[])
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::NoData);
        assert_eq!(
            std::fs::read_to_string(&config.output_path).unwrap(),
            "previous"
        );
    }

    #[tokio::test]
    async fn publish_writes_rendered_playlist() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        std::fs::write(&config.output_path, "previous").unwrap();
        let channels = [
            channel("Star Sports 1", "http://a/x"),
            channel("Star Sports 1 dup", "http://a/x"),
            channel("Pogo Kids", "ftp://bad"),
        ];

        let outcome = publish(&reqwest::Client::new(), &config, &channels)
            .await
            .unwrap();

        let Outcome::Written(stats) = outcome else {
            panic!("expected a written playlist, got {outcome:?}");
        };
        assert_eq!(stats.emitted, 1);
        assert_eq!(stats.duplicates, 1);
        assert_eq!(stats.invalid, 1);

        let written = std::fs::read_to_string(&config.output_path).unwrap();
        assert_eq!(written, render(&categorize(&channels), &config).text);
    }

    #[tokio::test]
    async fn client_setup_failure_ends_without_writing() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);

        let outcome = run_with_client(&config, Err(anyhow::anyhow!("no TLS backend")))
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::NoData);
        assert!(!config.output_path.exists());
    }

    #[tokio::test]
    async fn run_without_channels_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            source_url: serve_once("200 OK", "[]").await,
            ..config_in(&dir)
        };

        assert_eq!(run(&config).await.unwrap(), Outcome::NoData);
        assert!(!config.output_path.exists());
    }

    #[tokio::test]
    async fn run_fetches_and_writes_playlist() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            source_url: serve_once(
                "200 OK",
                r#"[{"name": "NDTV India", "logo": "http://l/ndtv.png", "link": "https://n/ndtv.m3u8"}]"#,
            )
            .await,
            ..config_in(&dir)
        };

        let outcome = run(&config).await.unwrap();

        assert!(matches!(outcome, Outcome::Written(RenderStats { emitted: 1, .. })));
        let written = std::fs::read_to_string(&config.output_path).unwrap();
        assert!(written.starts_with(&format!("#EXTM3U x-tvg-url=\"{DEFAULT_EPG_URL}\"\n\n")));
        assert!(written.contains(
            "#EXTINF:-1 group-title=\"News\" tvg-logo=\"http://l/ndtv.png\",NDTV India\n"
        ));
        assert!(written.ends_with("https://n/ndtv.m3u8\n\n"));
    }
}
