use std::{collections::BTreeMap, fmt};

use crate::catalog::ChannelRecord;

/// Content genre a channel is grouped under in the playlist.
///
/// Variants are declared in playlist display order, which is also their [`Ord`] order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Entertainment,
    Movies,
    Sports,
    Kids,
    News,
    Music,
    Religious,
    Others,
}

impl Category {
    pub const DISPLAY_ORDER: [Self; 8] = [
        Self::Entertainment,
        Self::Movies,
        Self::Sports,
        Self::Kids,
        Self::News,
        Self::Music,
        Self::Religious,
        Self::Others,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Entertainment => "Entertainment",
            Self::Movies => "Movies",
            Self::Sports => "Sports",
            Self::Kids => "Kids",
            Self::News => "News",
            Self::Music => "Music",
            Self::Religious => "Religious",
            Self::Others => "Others",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keyword rules, evaluated top to bottom. The first rule with a keyword contained in the
/// lowercased channel name wins.
///
/// Order matters: "zee" is both a News and an Entertainment keyword, and "star sports" must
/// land in Sports rather than Entertainment. Reordering changes classification.
pub const RULES: &[(Category, &[&str])] = &[
    (
        Category::Sports,
        &["sport", "cricket", "football", "tennis", "kabaddi", "wwe", "f1", "moto"],
    ),
    (
        Category::Kids,
        &["kids", "cartoon", "nick", "disney", "pogo", "hungama", "sonic", "junior"],
    ),
    (
        Category::Movies,
        &["movie", "cinema", "gold", "max", "flix", "film", "action", "thriller"],
    ),
    (
        Category::News,
        &["news", "aaj", "ndtv", "abp", "india", "republic", "times", "cnbc", "zee", "tv9"],
    ),
    (Category::Music, &["music", "mtv", "9xm", "b4u", "zoom"]),
    (
        Category::Religious,
        &["bhakti", "religious", "aastha", "sanskar", "vedic"],
    ),
    (
        Category::Entertainment,
        &["colors", "zee", "star", "sony", "sab", "&tv", "life", "dangal"],
    ),
];

/// Channels grouped by category, each group in source order
pub type Categorized = BTreeMap<Category, Vec<ChannelRecord>>;

/// Picks the category of a single channel name, case-insensitively
#[must_use]
pub fn classify(name: &str) -> Category {
    let name = name.to_lowercase();
    RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| name.contains(k)))
        .map_or(Category::Others, |(category, _)| *category)
}

/// Groups channels by category. Categories without channels are absent from the map.
#[must_use]
pub fn categorize(channels: &[ChannelRecord]) -> Categorized {
    let mut categorized = Categorized::new();
    for channel in channels {
        categorized
            .entry(classify(channel.name.as_deref().unwrap_or_default()))
            .or_default()
            .push(channel.clone());
    }

    categorized
}
