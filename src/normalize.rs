//! Channel metadata normalization.
//!
//! Converts the heterogeneous, optional-everywhere channel resource returned
//! by the metadata API into the canonical [`ChannelMetadata`] record the rest
//! of the system persists and displays. Every fallback rule lives here:
//! placeholder display name, deterministic canonical URL, thumbnail quality
//! ladder, zero-defaulted counts, and keyword tokenization.

use crate::api::{Thumbnails, YouTubeChannel};
use crate::models::{ChannelMetadata, ChannelSource};
use crate::scrapers::channel_page_url;

/// Placeholder used when the source record carries no usable title.
const UNKNOWN_CHANNEL_NAME: &str = "Unknown Channel";

/// Normalize one raw channel resource into the canonical record.
///
/// The canonical URL is always rebuilt from the channel id; a vanity
/// `customUrl` never participates in canonicalization and is carried along as
/// plain metadata instead.
pub fn normalize_channel(channel: &YouTubeChannel, source: ChannelSource) -> ChannelMetadata {
    let snippet = channel.snippet.clone().unwrap_or_default();
    let statistics = channel.statistics.clone().unwrap_or_default();

    let keywords = channel
        .branding_settings
        .as_ref()
        .and_then(|branding| branding.channel.as_ref())
        .and_then(|branding_channel| branding_channel.keywords.as_deref())
        .filter(|raw| !raw.trim().is_empty())
        .map(tokenize_keywords);

    ChannelMetadata {
        channel_id: channel.id.clone(),
        channel_name: snippet
            .title
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| UNKNOWN_CHANNEL_NAME.to_string()),
        channel_url: channel_page_url(&channel.id),
        custom_url: snippet.custom_url,
        thumbnail_url: pick_thumbnail(snippet.thumbnails.as_ref()),
        description: snippet.description,
        subscriber_count: parse_count(statistics.subscriber_count.as_deref()),
        video_count: parse_count(statistics.video_count.as_deref()),
        view_count: parse_count(statistics.view_count.as_deref()),
        country: snippet.country,
        published_at: snippet.published_at,
        keywords,
        topic_categories: channel
            .topic_details
            .as_ref()
            .and_then(|topics| topics.topic_categories.clone()),
        source,
    }
}

/// Base-10 parse of a string-typed count; missing or non-numeric becomes 0.
fn parse_count(value: Option<&str>) -> u64 {
    value
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .unwrap_or(0)
}

/// Pick the best thumbnail, falling through the quality ladder.
fn pick_thumbnail(thumbnails: Option<&Thumbnails>) -> Option<String> {
    let thumbnails = thumbnails?;
    [&thumbnails.high, &thumbnails.medium, &thumbnails.default]
        .into_iter()
        .find_map(|variant| variant.as_ref().map(|t| t.url.clone()))
}

/// Split a free-text keyword field on comma/whitespace runs, dropping empties.
fn tokenize_keywords(raw: &str) -> Vec<String> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}
