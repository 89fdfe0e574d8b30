//! Ad-signal extractor.
//!
//! Two-stage: fetch the channel's video-listing page, pull the first embedded
//! video id out of the page-state payload, then fetch that single video's
//! watch page and scan it for ad-placement state. Sampling one video keeps the
//! request count bounded at two fetches here (three per whole check) no matter
//! how large the channel is, at the cost of the ad signal reflecting exactly
//! that one video.
//!
//! Every failure inside this extractor — transport error, unavailable page,
//! missing video-id pattern — degrades the signal to `false`. Nothing
//! propagates past [`detect_ads`].

use crate::fetch::{FetchPage, PageOutcome};
use crate::scrapers::{channel_videos_url, watch_url};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use tracing::{debug, instrument, warn};

/// First embedded video id in listing markup: an 11-character token after the
/// `"videoId"` JSON key.
static VIDEO_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""videoId":"([A-Za-z0-9_-]{11})""#).unwrap());

/// Literal substrings that mark ad-placement/ad-slot embedded state.
const AD_TOKENS: &[&str] = &[
    "\"yt_ad\"",
    "\"adPlacements\"",
    "\"playerAds\"",
    "ad_preroll",
    "\"adSlots\"",
];

/// Extract the first embedded video id from video-listing markup.
pub fn first_video_id(markup: &str) -> Option<&str> {
    VIDEO_ID_PATTERN
        .captures(markup)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Whether watch-page markup shows ad-placement state.
pub fn detect_ad_markers(markup: &str) -> bool {
    AD_TOKENS.iter().any(|token| markup.contains(token))
}

/// Whether a sampled recent video of the channel carries ad placements.
///
/// Never fails: any error inside the pipeline is logged and degrades the
/// signal to `false`.
#[instrument(level = "debug", skip(fetcher))]
pub async fn detect_ads<F: FetchPage>(fetcher: &F, channel_id: &str) -> bool {
    match scan_sampled_video(fetcher, channel_id).await {
        Ok(has_ads) => has_ads,
        Err(e) => {
            warn!(%channel_id, error = %e, "Ad check failed; treating signal as absent");
            false
        }
    }
}

async fn scan_sampled_video<F: FetchPage>(
    fetcher: &F,
    channel_id: &str,
) -> Result<bool, Box<dyn Error>> {
    let listing = match fetcher.fetch_page(&channel_videos_url(channel_id)).await? {
        PageOutcome::Content(markup) => markup,
        PageOutcome::Unavailable(status) => {
            debug!(status, "Video listing unavailable");
            return Ok(false);
        }
    };

    let Some(video_id) = first_video_id(&listing) else {
        debug!("No video id in listing markup");
        return Ok(false);
    };
    debug!(%video_id, "Sampling video for ad placements");

    match fetcher.fetch_page(&watch_url(video_id)).await? {
        PageOutcome::Content(markup) => {
            let has_ads = detect_ad_markers(&markup);
            debug!(%video_id, has_ads, "Scanned watch page");
            Ok(has_ads)
        }
        PageOutcome::Unavailable(status) => {
            debug!(status, %video_id, "Watch page unavailable");
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    struct StubFetcher {
        pages: HashMap<String, PageOutcome>,
        calls: RefCell<Vec<String>>,
    }

    impl StubFetcher {
        fn new(pages: Vec<(String, PageOutcome)>) -> Self {
            Self {
                pages: pages.into_iter().collect(),
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl FetchPage for StubFetcher {
        async fn fetch_page(&self, url: &str) -> Result<PageOutcome, Box<dyn Error>> {
            self.calls.borrow_mut().push(url.to_string());
            match self.pages.get(url) {
                Some(outcome) => Ok(outcome.clone()),
                None => Err("connection reset".into()),
            }
        }
    }

    #[test]
    fn test_first_video_id_match() {
        let markup = r#"{"videoId":"abc12345678","thumbnail":{}}"#;
        assert_eq!(first_video_id(markup), Some("abc12345678"));
    }

    #[test]
    fn test_first_video_id_takes_first_of_many() {
        let markup = r#""videoId":"AAAAAAAAAAA" ... "videoId":"BBBBBBBBBBB""#;
        assert_eq!(first_video_id(markup), Some("AAAAAAAAAAA"));
    }

    #[test]
    fn test_first_video_id_rejects_wrong_length() {
        assert_eq!(first_video_id(r#""videoId":"short""#), None);
        assert_eq!(first_video_id(""), None);
    }

    #[test]
    fn test_ad_markers() {
        assert!(detect_ad_markers(r#"{"adPlacements":[{"kind":"preroll"}]}"#));
        assert!(detect_ad_markers("config:ad_preroll=1"));
        assert!(detect_ad_markers(r#"{"playerAds":[]}"#));
        assert!(!detect_ad_markers("advertisement-free prose"));
    }

    #[tokio::test]
    async fn test_no_video_id_means_no_watch_fetch() {
        let fetcher = StubFetcher::new(vec![(
            channel_videos_url("UCx"),
            PageOutcome::Content("<html>no embedded state</html>".to_string()),
        )]);

        assert!(!detect_ads(&fetcher, "UCx").await);
        assert_eq!(fetcher.calls.borrow().len(), 1);
    }

    #[tokio::test]
    async fn test_sampled_video_with_ads() {
        let fetcher = StubFetcher::new(vec![
            (
                channel_videos_url("UCx"),
                PageOutcome::Content(r#""videoId":"abc12345678""#.to_string()),
            ),
            (
                watch_url("abc12345678"),
                PageOutcome::Content(r#"{"adPlacements":[]}"#.to_string()),
            ),
        ]);

        assert!(detect_ads(&fetcher, "UCx").await);
        assert_eq!(fetcher.calls.borrow().len(), 2);
    }

    #[tokio::test]
    async fn test_unavailable_listing_degrades_to_false() {
        let fetcher = StubFetcher::new(vec![(
            channel_videos_url("UCx"),
            PageOutcome::Unavailable(404),
        )]);

        assert!(!detect_ads(&fetcher, "UCx").await);
        assert_eq!(fetcher.calls.borrow().len(), 1);
    }

    #[tokio::test]
    async fn test_transport_error_degrades_to_false() {
        // Stub has no pages at all, so the listing fetch errors.
        let fetcher = StubFetcher::new(vec![]);
        assert!(!detect_ads(&fetcher, "UCx").await);
    }

    #[tokio::test]
    async fn test_watch_page_error_degrades_to_false() {
        let fetcher = StubFetcher::new(vec![(
            channel_videos_url("UCx"),
            PageOutcome::Content(r#""videoId":"abc12345678""#.to_string()),
        )]);

        assert!(!detect_ads(&fetcher, "UCx").await);
        assert_eq!(fetcher.calls.borrow().len(), 2);
    }
}
