//! The monetization check pipeline and verdict reducer.
//!
//! One check performs at most three sequential fetches: the channel page for
//! the membership signal, then the video-listing page and one sampled watch
//! page for the ad signal. The two signals are reduced to a tri-state verdict
//! by a fixed priority ladder.
//!
//! [`check_channel`] never fails by type — whatever goes wrong, the caller
//! gets a [`MonetizationVerdict`] back. A failure of the very first
//! channel-page fetch fails the whole check closed as `Unknown`; any later
//! failure degrades only the affected signal.

use crate::fetch::{FetchPage, PageOutcome};
use crate::models::{Confidence, MonetizationIndicators, MonetizationStatus, MonetizationVerdict};
use crate::scrapers::{self, ads, membership};
use crate::utils::now_rfc3339;
use std::error::Error;
use tracing::{debug, info, instrument, warn};

/// Run a full monetization check for one channel.
///
/// Independent checks share no state and may run concurrently; concurrency is
/// the caller's concern. Always resolves to a verdict, never an error.
#[instrument(level = "info", skip(fetcher))]
pub async fn check_channel<F: FetchPage>(fetcher: &F, channel_id: &str) -> MonetizationVerdict {
    match gather_indicators(fetcher, channel_id).await {
        Ok(indicators) => {
            let (status, confidence, reason) = reduce(&indicators);
            info!(
                %channel_id,
                has_membership = indicators.has_membership,
                has_ads = indicators.has_ads,
                monetized = ?status,
                ?confidence,
                "Monetization check complete"
            );
            MonetizationVerdict {
                is_monetized: status,
                checked_at: now_rfc3339(),
                indicators,
                confidence,
                reason: reason.to_string(),
            }
        }
        Err(e) => {
            warn!(%channel_id, error = %e, "Monetization check failed; returning unknown verdict");
            MonetizationVerdict {
                is_monetized: MonetizationStatus::Unknown,
                checked_at: now_rfc3339(),
                indicators: MonetizationIndicators::default(),
                confidence: Confidence::Low,
                reason: format!("monetization check failed: {}", e),
            }
        }
    }
}

/// Gather both raw signals for a channel.
///
/// The channel-page fetch is the one stage allowed to fail the whole check:
/// a transport error here propagates. Everything after it degrades locally.
async fn gather_indicators<F: FetchPage>(
    fetcher: &F,
    channel_id: &str,
) -> Result<MonetizationIndicators, Box<dyn Error>> {
    let has_membership = match fetcher
        .fetch_page(&scrapers::channel_page_url(channel_id))
        .await?
    {
        PageOutcome::Content(markup) => {
            if let Some(subscribers) = scrapers::visible_subscriber_text(&markup) {
                debug!(%channel_id, %subscribers, "Channel page subscriber text");
            }
            membership::detect_membership(&markup)
        }
        PageOutcome::Unavailable(status) => {
            debug!(%channel_id, status, "Channel page unavailable");
            false
        }
    };
    debug!(%channel_id, has_membership, "Membership signal");

    let has_ads = ads::detect_ads(fetcher, channel_id).await;

    Ok(MonetizationIndicators {
        has_membership,
        has_ads,
        has_super_chat: false,
    })
}

/// Reduce the raw signals to a verdict, first match wins.
///
/// Membership outranks ads: an owner-controlled, durable feature is stronger
/// evidence than a transient per-video ad placement.
pub fn reduce(indicators: &MonetizationIndicators) -> (MonetizationStatus, Confidence, &'static str) {
    if indicators.has_membership {
        (
            MonetizationStatus::Monetized,
            Confidence::High,
            "membership feature is enabled",
        )
    } else if indicators.has_ads {
        (
            MonetizationStatus::Monetized,
            Confidence::Medium,
            "ads detected on a sampled video",
        )
    } else {
        (
            MonetizationStatus::NotMonetized,
            Confidence::Low,
            "no clear evidence of monetization found",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::{channel_page_url, channel_videos_url, watch_url};
    use std::cell::RefCell;
    use std::collections::HashMap;

    struct CannedSite {
        pages: HashMap<String, PageOutcome>,
        fetches: RefCell<usize>,
    }

    impl CannedSite {
        fn new(pages: Vec<(String, &str)>) -> Self {
            Self {
                pages: pages
                    .into_iter()
                    .map(|(url, body)| (url, PageOutcome::Content(body.to_string())))
                    .collect(),
                fetches: RefCell::new(0),
            }
        }

        fn fetch_count(&self) -> usize {
            *self.fetches.borrow()
        }
    }

    impl FetchPage for CannedSite {
        async fn fetch_page(&self, url: &str) -> Result<PageOutcome, Box<dyn Error>> {
            *self.fetches.borrow_mut() += 1;
            match self.pages.get(url) {
                Some(outcome) => Ok(outcome.clone()),
                None => Err(format!("connection refused: {}", url).into()),
            }
        }
    }

    fn monetized(indicators: MonetizationIndicators) -> MonetizationStatus {
        reduce(&indicators).0
    }

    #[test]
    fn test_reduce_membership_wins_regardless_of_ads() {
        for has_ads in [false, true] {
            let indicators = MonetizationIndicators {
                has_membership: true,
                has_ads,
                has_super_chat: false,
            };
            let (status, confidence, reason) = reduce(&indicators);
            assert_eq!(status, MonetizationStatus::Monetized);
            assert_eq!(confidence, Confidence::High);
            assert_eq!(reason, "membership feature is enabled");
        }
    }

    #[test]
    fn test_reduce_ads_only_is_medium() {
        let indicators = MonetizationIndicators {
            has_membership: false,
            has_ads: true,
            has_super_chat: false,
        };
        let (status, confidence, reason) = reduce(&indicators);
        assert_eq!(status, MonetizationStatus::Monetized);
        assert_eq!(confidence, Confidence::Medium);
        assert_eq!(reason, "ads detected on a sampled video");
    }

    #[test]
    fn test_reduce_no_signals_is_not_monetized() {
        let (status, confidence, reason) = reduce(&MonetizationIndicators::default());
        assert_eq!(status, MonetizationStatus::NotMonetized);
        assert_eq!(confidence, Confidence::Low);
        assert_eq!(reason, "no clear evidence of monetization found");
    }

    #[test]
    fn test_monetized_iff_any_signal() {
        for has_membership in [false, true] {
            for has_ads in [false, true] {
                let indicators = MonetizationIndicators {
                    has_membership,
                    has_ads,
                    has_super_chat: false,
                };
                let expected = if has_membership || has_ads {
                    MonetizationStatus::Monetized
                } else {
                    MonetizationStatus::NotMonetized
                };
                assert_eq!(monetized(indicators), expected);
            }
        }
    }

    #[tokio::test]
    async fn test_membership_found_video_pipeline_unreachable() {
        // Only the channel page resolves; both ad-pipeline fetches error.
        let site = CannedSite::new(vec![(
            channel_page_url("UCx"),
            r#"{"header":{"sponsorButton":{}}}"#,
        )]);

        let verdict = check_channel(&site, "UCx").await;
        assert_eq!(verdict.is_monetized, MonetizationStatus::Monetized);
        assert_eq!(verdict.confidence, Confidence::High);
        assert!(verdict.indicators.has_membership);
        assert!(!verdict.indicators.has_ads);
    }

    #[tokio::test]
    async fn test_ads_only_path() {
        let site = CannedSite::new(vec![
            (channel_page_url("UCx"), "<html>plain channel page</html>"),
            (channel_videos_url("UCx"), r#""videoId":"abc12345678""#),
            (watch_url("abc12345678"), r#"{"adPlacements":[]}"#),
        ]);

        let verdict = check_channel(&site, "UCx").await;
        assert_eq!(verdict.is_monetized, MonetizationStatus::Monetized);
        assert_eq!(verdict.confidence, Confidence::Medium);
        assert!(!verdict.indicators.has_membership);
        assert!(verdict.indicators.has_ads);
        assert_eq!(site.fetch_count(), 3);
    }

    #[tokio::test]
    async fn test_no_signals_at_all() {
        let site = CannedSite::new(vec![
            (channel_page_url("UCx"), "<html>nothing</html>"),
            (channel_videos_url("UCx"), "<html>no embedded state</html>"),
        ]);

        let verdict = check_channel(&site, "UCx").await;
        assert_eq!(verdict.is_monetized, MonetizationStatus::NotMonetized);
        assert_eq!(verdict.confidence, Confidence::Low);
        assert_eq!(verdict.reason, "no clear evidence of monetization found");
        // No video id in the listing, so the watch page is never fetched.
        assert_eq!(site.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_first_fetch_failure_yields_unknown() {
        let site = CannedSite::new(vec![]);

        let verdict = check_channel(&site, "UCx").await;
        assert_eq!(verdict.is_monetized, MonetizationStatus::Unknown);
        assert_eq!(verdict.confidence, Confidence::Low);
        assert!(!verdict.indicators.has_membership);
        assert!(!verdict.indicators.has_ads);
        assert!(verdict.reason.contains("connection refused"));
    }

    #[tokio::test]
    async fn test_unavailable_channel_page_is_not_unknown() {
        // 404 on the channel page is "no signal", not a failed check.
        let mut site = CannedSite::new(vec![
            (channel_videos_url("UCx"), "<html>no embedded state</html>"),
        ]);
        site.pages
            .insert(channel_page_url("UCx"), PageOutcome::Unavailable(404));

        let verdict = check_channel(&site, "UCx").await;
        assert_eq!(verdict.is_monetized, MonetizationStatus::NotMonetized);
    }

    #[tokio::test]
    async fn test_fetch_ceiling_is_three() {
        let site = CannedSite::new(vec![
            (channel_page_url("UCx"), r#"{"sponsorButton":{}}"#),
            (channel_videos_url("UCx"), r#""videoId":"abc12345678""#),
            (watch_url("abc12345678"), r#"{"adSlots":[]}"#),
        ]);

        let verdict = check_channel(&site, "UCx").await;
        assert_eq!(site.fetch_count(), 3);
        // Membership outranks the ad signal even when both fired.
        assert_eq!(verdict.confidence, Confidence::High);
    }

    #[tokio::test]
    async fn test_checked_at_is_rfc3339() {
        let site = CannedSite::new(vec![]);
        let verdict = check_channel(&site, "UCx").await;
        assert!(chrono::DateTime::parse_from_rfc3339(&verdict.checked_at).is_ok());
    }
}
