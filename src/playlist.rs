use std::collections::HashSet;

use tracing::{instrument, warn};

use crate::{
    catalog::ChannelRecord,
    category::{Categorized, Category},
    config::Config,
    probe::{ProbeOptions, probe_all},
    util::sanitize_cookie,
};

/// Counters reported after a render pass
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RenderStats {
    /// Entry blocks written
    pub emitted: usize,
    /// Channels whose link was already emitted earlier in the pass
    pub duplicates: usize,
    /// Channels without an `http` link
    pub invalid: usize,
    /// Channels that failed the liveness probe
    pub unreachable: usize,
}

impl RenderStats {
    /// Invalid and unreachable channels combined
    #[must_use]
    pub const fn removed(&self) -> usize {
        self.invalid + self.unreachable
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playlist {
    pub text: String,
    pub stats: RenderStats,
}

/// A channel that survived validation and deduplication
struct Entry<'a> {
    category: Category,
    channel: &'a ChannelRecord,
    link: &'a str,
}

fn non_empty(field: Option<&str>) -> Option<&str> {
    field.filter(|f| !f.is_empty())
}

/// Walks categories in display order, dropping channels with an invalid or already seen link
fn select_entries<'a>(categorized: &'a Categorized, stats: &mut RenderStats) -> Vec<Entry<'a>> {
    let mut seen_links = HashSet::new();
    let mut entries = Vec::new();

    for category in Category::DISPLAY_ORDER {
        let Some(channels) = categorized.get(&category) else {
            continue;
        };

        for channel in channels {
            let Some(link) = channel.valid_link() else {
                stats.invalid += 1;
                continue;
            };

            if !seen_links.insert(link) {
                stats.duplicates += 1;
                continue;
            }

            entries.push(Entry {
                category,
                channel,
                link,
            });
        }
    }

    entries
}

#[must_use]
pub fn header(epg_url: &str) -> String {
    format!("#EXTM3U x-tvg-url=\"{epg_url}\"\n\n")
}

fn push_entry(out: &mut String, entry: &Entry<'_>, user_agent: &str) {
    let channel = entry.channel;
    let name = channel.name.as_deref().unwrap_or("Unknown");
    let logo = channel.logo.as_deref().unwrap_or_default();

    out.push_str(&format!(
        "#EXTINF:-1 group-title=\"{}\" tvg-logo=\"{logo}\",{name}\n",
        entry.category
    ));

    if let Some(scheme) = non_empty(channel.drm_scheme.as_deref()) {
        out.push_str(&format!(
            "#KODIPROP:inputstream.adaptive.license_type={scheme}\n"
        ));
    }

    if let Some(license) = non_empty(channel.drm_license.as_deref()) {
        out.push_str(&format!(
            "#KODIPROP:inputstream.adaptive.license_key={license}\n"
        ));
    }

    out.push_str(&format!("#EXTVLCOPT:http-user-agent={user_agent}\n"));

    if let Some(cookie) = non_empty(channel.cookie.as_deref()) {
        out.push_str(&format!(
            "#EXTHTTP:{{\"cookie\":\"{}\"}}\n",
            sanitize_cookie(cookie)
        ));
    }

    out.push_str(entry.link);
    out.push_str("\n\n");
}

fn compose<'a>(
    entries: impl IntoIterator<Item = Entry<'a>>,
    config: &Config,
    stats: &mut RenderStats,
) -> String {
    let mut text = header(&config.epg_url);
    for entry in entries {
        push_entry(&mut text, &entry, &config.user_agent);
        stats.emitted += 1;
    }

    text
}

/// Renders categorized channels into M3U text without checking stream liveness
#[must_use]
pub fn render(categorized: &Categorized, config: &Config) -> Playlist {
    let mut stats = RenderStats::default();
    let entries = select_entries(categorized, &mut stats);
    let text = compose(entries, config, &mut stats);

    Playlist { text, stats }
}

/// Like [`render`], but additionally drops channels whose stream fails a `HEAD` probe
#[instrument(skip_all)]
pub async fn render_verified(
    client: &reqwest::Client,
    categorized: &Categorized,
    config: &Config,
) -> Playlist {
    let mut stats = RenderStats::default();
    let entries = select_entries(categorized, &mut stats);

    let links = entries.iter().map(|e| e.link).collect::<Vec<_>>();
    let options = ProbeOptions {
        user_agent: &config.user_agent,
        timeout: config.probe_timeout,
        concurrency: config.probe_concurrency,
    };
    let alive = probe_all(client, &links, &options).await;

    let mut live_entries = Vec::with_capacity(entries.len());
    for (entry, alive) in entries.into_iter().zip(alive) {
        if alive {
            live_entries.push(entry);
        } else {
            warn!(
                "Dead stream skipped: {}",
                entry.channel.name.as_deref().unwrap_or("Unknown")
            );
            stats.unreachable += 1;
        }
    }

    let text = compose(live_entries, config, &mut stats);
    Playlist { text, stats }
}
