//! # Tube Tracker
//!
//! A channel-tracking companion that infers whether YouTube channels show
//! external signals of monetization, and resolves channel metadata through
//! the YouTube Data API for collection workflows.
//!
//! ## Features
//!
//! - Monetization checks from public pages only: membership affordance on the
//!   channel page, ad-placement state on one sampled video (3 fetches per
//!   check, no API quota spent)
//! - Tri-state verdicts with a confidence tier and a human-readable reason
//! - Channel lookup by id, handle, or any public channel URL shape
//! - Keyword search with subscriber filtering, normalized to one canonical
//!   channel record
//!
//! ## Usage
//!
//! ```sh
//! tube_tracker check UC_x5XG1OV2P6uZZ5FSM9Ttw
//! tube_tracker lookup "https://www.youtube.com/@somehandle"
//! tube_tracker search "cooking" --min-subscribers 10000
//! ```
//!
//! ## Architecture
//!
//! One monetization check is a strictly sequential pipeline:
//! 1. **Channel page**: fetch and scan for the membership affordance
//! 2. **Video listing**: fetch and extract the first embedded video id
//! 3. **Watch page**: fetch the sampled video and scan for ad placements
//! 4. **Reduce**: priority ladder to a verdict (membership > ads > nothing)
//!
//! Checks for different channels are independent and run concurrently up to
//! the `--concurrency` bound.

use clap::Parser;
use futures::stream::{self, StreamExt};
use itertools::Itertools;
use serde_json::json;
use std::error::Error;
use tracing::{debug, info, instrument};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod api;
mod checker;
mod cli;
mod fetch;
mod models;
mod normalize;
mod scrapers;
mod utils;

use api::YouTubeApi;
use cli::{Cli, Command};
use fetch::HttpFetcher;
use models::{ChannelMetadata, ChannelSource};
use normalize::normalize_channel;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let report = match args.command {
        Command::Check {
            channel_ids,
            concurrency,
        } => run_check(channel_ids, concurrency).await?,
        Command::Lookup { target, api_key } => run_lookup(&target, api_key).await?,
        Command::Search {
            query,
            api_key,
            min_subscribers,
            max_results,
            page_token,
        } => run_search(&query, api_key, min_subscribers, max_results, page_token.as_deref()).await?,
    };

    emit(&report, args.output.as_deref()).await?;

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    Ok(())
}

/// Run monetization checks for each channel id at bounded concurrency.
///
/// Every check resolves to a verdict, so the report always carries one entry
/// per requested channel, failures included.
#[instrument(level = "info", skip_all, fields(count = channel_ids.len(), concurrency))]
async fn run_check(
    channel_ids: Vec<String>,
    concurrency: usize,
) -> Result<serde_json::Value, Box<dyn Error>> {
    let fetcher = HttpFetcher::new()?;
    info!(count = channel_ids.len(), "Starting monetization checks");

    let results: Vec<serde_json::Value> = stream::iter(channel_ids.into_iter().enumerate())
        .map(|(i, channel_id)| {
            let fetcher = &fetcher;
            async move {
                debug!(index = i, %channel_id, "Checking channel");
                let verdict = checker::check_channel(fetcher, &channel_id).await;
                json!({ "channelId": channel_id, "verdict": verdict })
            }
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    info!(count = results.len(), "Completed monetization checks");
    Ok(serde_json::Value::Array(results))
}

/// Resolve one channel by id or URL and normalize it.
#[instrument(level = "info", skip(api_key))]
async fn run_lookup(target: &str, api_key: String) -> Result<serde_json::Value, Box<dyn Error>> {
    let api = YouTubeApi::new(api_key);

    let channel = if target.contains("youtube.com/") {
        api.channel_by_url(target).await?
    } else {
        api.channel_by_id(target).await?
    };

    match channel {
        Some(channel) => {
            let metadata = normalize_channel(&channel, ChannelSource::Manual);
            info!(channel_id = %metadata.channel_id, channel_name = %metadata.channel_name, "Resolved channel");
            Ok(serde_json::to_value(metadata)?)
        }
        None => Err(format!("channel not found: {}", target).into()),
    }
}

/// Search channels by keyword, batch-resolve details, filter, and normalize.
#[instrument(level = "info", skip(api_key, page_token))]
async fn run_search(
    query: &str,
    api_key: String,
    min_subscribers: u64,
    max_results: u32,
    page_token: Option<&str>,
) -> Result<serde_json::Value, Box<dyn Error>> {
    let api = YouTubeApi::new(api_key);

    let page = api.search_channels(query, max_results, page_token).await?;
    let channel_ids: Vec<String> = page
        .items
        .iter()
        .filter_map(|item| item.id.channel_id.clone())
        .unique()
        .collect();
    info!(hits = page.items.len(), distinct = channel_ids.len(), "Search page fetched");

    let details = api.channels_by_ids(&channel_ids).await?;
    let channels: Vec<ChannelMetadata> = details
        .iter()
        .unique_by(|channel| channel.id.clone())
        .map(|channel| normalize_channel(channel, ChannelSource::Search))
        .filter(|metadata| metadata.subscriber_count >= min_subscribers)
        .collect();
    info!(
        resolved = details.len(),
        kept = channels.len(),
        min_subscribers,
        "Search results normalized"
    );

    Ok(json!({
        "channels": channels,
        "nextPageToken": page.next_page_token,
        "totalResults": page.page_info.total_results,
    }))
}

/// Print the result JSON, or write it to the requested file.
async fn emit(value: &serde_json::Value, output: Option<&str>) -> Result<(), Box<dyn Error>> {
    let rendered = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            tokio::fs::write(path, &rendered).await?;
            info!(%path, "Wrote output file");
        }
        None => println!("{}", rendered),
    }
    Ok(())
}
