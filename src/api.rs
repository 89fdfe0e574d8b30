//! YouTube Data API v3 client with exponential backoff retry logic.
//!
//! This module wraps the official metadata API used to look up and search
//! channels. It includes automatic retry with exponential backoff and jitter
//! for transient failures (transport errors, 429, 5xx); client errors are
//! surfaced immediately.
//!
//! # Architecture
//!
//! The module uses a trait-based design for flexibility:
//! - [`ApiCall`]: Core trait defining an outbound GET returning a JSON body
//! - [`HttpCall`]: Wraps a `reqwest::Client`
//! - [`RetryCall`]: Decorator that adds retry logic to any `ApiCall` implementation
//! - [`YouTubeApi`]: High-level typed endpoints over the above
//!
//! # Retry Strategy
//!
//! - Maximum 3 retry attempts
//! - Exponential backoff starting at 500 milliseconds
//! - Maximum delay capped at 10 seconds
//! - Random jitter (0-250ms) added to prevent thundering herd
//! - Only transport failures and retryable statuses (429, 5xx) are retried

use crate::utils::{normalize_channel_url, truncate_for_log};
use once_cell::sync::Lazy;
use rand::{rng, Rng};
use regex::Regex;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::time::{Duration as StdDuration, Instant};
use tokio::time::sleep;
use tracing::{debug, error, instrument, warn};

const API_BASE: &str = "https://www.googleapis.com/youtube/v3";

/// Resource parts requested for every channel lookup.
const CHANNEL_PARTS: &str = "snippet,statistics,brandingSettings,topicDetails,contentDetails";

/// Maximum channel ids the API accepts in one batch lookup.
const MAX_BATCH_IDS: usize = 50;

static CHANNEL_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"youtube\.com/channel/(UC[\w-]+)").unwrap());
static HANDLE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"youtube\.com/@([^/?&]+)").unwrap());
static CUSTOM_NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"youtube\.com/(?:c|user)/([^/?&]+)").unwrap());

/// Extract a `UC…` channel id from a channel URL, if present.
pub fn extract_channel_id(url: &str) -> Option<String> {
    CHANNEL_ID_PATTERN
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Extract a handle or legacy custom name from a channel URL, if present.
///
/// Covers `youtube.com/@name`, `youtube.com/c/name`, and
/// `youtube.com/user/name`. The leading `@` is not included.
pub fn extract_handle(url: &str) -> Option<String> {
    HANDLE_PATTERN
        .captures(url)
        .or_else(|| CUSTOM_NAME_PATTERN.captures(url))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Non-success HTTP status from the metadata API.
#[derive(Debug)]
pub struct ApiStatusError {
    pub status: u16,
    pub body_preview: String,
}

impl fmt::Display for ApiStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "metadata API returned status {}: {}", self.status, self.body_preview)
    }
}

impl Error for ApiStatusError {}

/// Whether an error is worth another attempt.
///
/// Quota exhaustion (429) and server errors are transient; other API statuses
/// mean the request itself is wrong. Transport-level failures are retried.
fn is_retryable(e: &Box<dyn Error>) -> bool {
    match e.downcast_ref::<ApiStatusError>() {
        Some(status_err) => status_err.status == 429 || status_err.status >= 500,
        None => true,
    }
}

/// Trait for an outbound API GET.
///
/// Implementors fetch a URL and return the raw JSON body. This abstraction
/// allows decorators (like retry logic) and test doubles.
pub trait ApiCall {
    /// Perform the GET and return the response body.
    async fn call(&self, url: &str) -> Result<String, Box<dyn Error>>;
}

/// [`ApiCall`] backed by a `reqwest::Client`.
#[derive(Debug)]
pub struct HttpCall<'a> {
    pub client: &'a Client,
}

impl<'a> ApiCall for HttpCall<'a> {
    #[instrument(level = "debug", skip_all)]
    async fn call(&self, url: &str) -> Result<String, Box<dyn Error>> {
        let t0 = Instant::now();
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        let dt = t0.elapsed();

        if !status.is_success() {
            warn!(
                status = status.as_u16(),
                elapsed_ms = dt.as_millis() as u128,
                body_preview = %truncate_for_log(&body, 300),
                "API call returned non-success status"
            );
            return Err(Box::new(ApiStatusError {
                status: status.as_u16(),
                body_preview: truncate_for_log(&body, 300),
            }));
        }
        debug!(elapsed_ms = dt.as_millis() as u128, bytes = body.len(), "API call succeeded");
        Ok(body)
    }
}

/// Wrapper that adds exponential backoff retry logic to any [`ApiCall`] implementation.
///
/// The delay between retries follows:
/// ```text
/// delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
/// ```
pub struct RetryCall<T> {
    inner: T,
    max_retries: usize,
    base_delay: StdDuration,
    max_delay: StdDuration,
}

impl<T> RetryCall<T>
where
    T: ApiCall,
{
    pub fn new(inner: T, max_retries: usize, base_delay: StdDuration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: StdDuration::from_secs(10),
        }
    }
}

impl<T> fmt::Debug for RetryCall<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryCall")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T> ApiCall for RetryCall<T>
where
    T: ApiCall + fmt::Debug,
{
    #[instrument(level = "debug", skip_all)]
    async fn call(&self, url: &str) -> Result<String, Box<dyn Error>> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            match self.inner.call(url).await {
                Ok(body) => {
                    return Ok(body);
                }
                Err(e) => {
                    attempt += 1;
                    let total_dt = total_t0.elapsed();

                    if !is_retryable(&e) {
                        debug!(attempt, error = %e, "Error is not retryable; giving up");
                        return Err(e);
                    }
                    if attempt > self.max_retries {
                        error!(
                            attempt,
                            max = self.max_retries,
                            elapsed_ms_total = total_dt.as_millis() as u128,
                            error = %e,
                            "call() exhausted retries"
                        );
                        return Err(e);
                    }

                    // backoff calc
                    let mut delay = self.base_delay.saturating_mul(1 << (attempt - 1));
                    if delay > self.max_delay {
                        delay = self.max_delay;
                    }
                    let jitter_ms: u64 = rng().random_range(0..=250);
                    let delay = delay + StdDuration::from_millis(jitter_ms);

                    warn!(
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_total = total_dt.as_millis() as u128,
                        ?delay,
                        error = %e,
                        "call() attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

/// A single thumbnail variant.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Thumbnail {
    pub url: String,
}

/// The thumbnail quality ladder as the API returns it.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Thumbnails {
    pub default: Option<Thumbnail>,
    pub medium: Option<Thumbnail>,
    pub high: Option<Thumbnail>,
}

/// `snippet` group of a channel resource. Every field may be absent.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelSnippet {
    pub title: Option<String>,
    pub description: Option<String>,
    pub custom_url: Option<String>,
    pub published_at: Option<String>,
    pub thumbnails: Option<Thumbnails>,
    pub country: Option<String>,
}

/// `statistics` group of a channel resource. Counts arrive as strings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStatistics {
    pub view_count: Option<String>,
    pub subscriber_count: Option<String>,
    pub hidden_subscriber_count: Option<bool>,
    pub video_count: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BrandingChannel {
    pub keywords: Option<String>,
}

/// `brandingSettings` group of a channel resource.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BrandingSettings {
    pub channel: Option<BrandingChannel>,
}

/// `topicDetails` group of a channel resource.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicDetails {
    pub topic_categories: Option<Vec<String>>,
}

/// A channel resource as returned by the `channels` endpoint.
///
/// All nested groups are optional; the upstream API omits whole groups
/// depending on the requested parts and the channel's settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YouTubeChannel {
    pub id: String,
    pub snippet: Option<ChannelSnippet>,
    pub statistics: Option<ChannelStatistics>,
    pub branding_settings: Option<BrandingSettings>,
    pub topic_details: Option<TopicDetails>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
struct ChannelListResponse {
    #[serde(default)]
    items: Vec<YouTubeChannel>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub total_results: Option<u64>,
    pub results_per_page: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultId {
    pub channel_id: Option<String>,
}

/// One hit from the `search` endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchResult {
    pub id: SearchResultId,
}

/// Response page from the `search` endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchListResponse {
    #[serde(default)]
    pub items: Vec<SearchResult>,
    pub next_page_token: Option<String>,
    #[serde(default)]
    pub page_info: PageInfo,
}

/// Typed client for the channel-metadata API.
#[derive(Debug, Clone)]
pub struct YouTubeApi {
    client: Client,
    api_key: String,
}

impl YouTubeApi {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, Box<dyn Error>> {
        let api = RetryCall::new(
            HttpCall { client: &self.client },
            3,
            StdDuration::from_millis(500),
        );
        let body = api.call(url).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Look up one channel by its stable id.
    #[instrument(level = "info", skip(self))]
    pub async fn channel_by_id(&self, channel_id: &str) -> Result<Option<YouTubeChannel>, Box<dyn Error>> {
        let url = format!(
            "{}/channels?part={}&id={}&key={}",
            API_BASE,
            CHANNEL_PARTS,
            urlencoding::encode(channel_id),
            urlencoding::encode(&self.api_key),
        );
        let response: ChannelListResponse = self.get_json(&url).await?;
        Ok(response.items.into_iter().next())
    }

    /// Look up one channel by its `@handle` (with or without the `@`).
    #[instrument(level = "info", skip(self))]
    pub async fn channel_by_handle(&self, handle: &str) -> Result<Option<YouTubeChannel>, Box<dyn Error>> {
        let url = format!(
            "{}/channels?part={}&forHandle={}&key={}",
            API_BASE,
            CHANNEL_PARTS,
            urlencoding::encode(handle.trim_start_matches('@')),
            urlencoding::encode(&self.api_key),
        );
        let response: ChannelListResponse = self.get_json(&url).await?;
        Ok(response.items.into_iter().next())
    }

    /// Resolve a channel from any of the public URL shapes.
    ///
    /// Handles `/channel/UC…`, `/@handle`, `/c/name`, and `/user/name` URLs,
    /// including percent-encoded ones (localized handles arrive encoded).
    /// Returns `Ok(None)` when the URL matches no known shape.
    #[instrument(level = "info", skip(self))]
    pub async fn channel_by_url(&self, url: &str) -> Result<Option<YouTubeChannel>, Box<dyn Error>> {
        let decoded = urlencoding::decode(url)?.into_owned();
        let cleaned = normalize_channel_url(&decoded).unwrap_or(decoded);

        if let Some(channel_id) = extract_channel_id(&cleaned) {
            return self.channel_by_id(&channel_id).await;
        }
        if let Some(handle) = extract_handle(&cleaned) {
            return self.channel_by_handle(&handle).await;
        }
        debug!(%cleaned, "URL matches no channel shape");
        Ok(None)
    }

    /// Batch lookup of up to [`MAX_BATCH_IDS`] channels.
    #[instrument(level = "info", skip(self, channel_ids), fields(count = channel_ids.len()))]
    pub async fn channels_by_ids(&self, channel_ids: &[String]) -> Result<Vec<YouTubeChannel>, Box<dyn Error>> {
        if channel_ids.is_empty() {
            return Ok(Vec::new());
        }
        if channel_ids.len() > MAX_BATCH_IDS {
            return Err(format!("maximum {} channels per request", MAX_BATCH_IDS).into());
        }
        let url = format!(
            "{}/channels?part={}&id={}&key={}",
            API_BASE,
            CHANNEL_PARTS,
            urlencoding::encode(&channel_ids.join(",")),
            urlencoding::encode(&self.api_key),
        );
        let response: ChannelListResponse = self.get_json(&url).await?;
        Ok(response.items)
    }

    /// Search channels by keyword, one page at a time.
    #[instrument(level = "info", skip(self))]
    pub async fn search_channels(
        &self,
        query: &str,
        max_results: u32,
        page_token: Option<&str>,
    ) -> Result<SearchListResponse, Box<dyn Error>> {
        let mut url = format!(
            "{}/search?part=snippet&type=channel&q={}&maxResults={}&key={}",
            API_BASE,
            urlencoding::encode(query),
            max_results,
            urlencoding::encode(&self.api_key),
        );
        if let Some(token) = page_token {
            url.push_str("&pageToken=");
            url.push_str(&urlencoding::encode(token));
        }
        self.get_json(&url).await
    }
}
