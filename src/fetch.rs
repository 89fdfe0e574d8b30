//! Page fetching with a browser-like identity.
//!
//! All public-page requests go out with a fixed desktop-browser `User-Agent`
//! and `Accept-Language` so the upstream site serves the same markup a real
//! browser would see. A non-success HTTP status is a normal outcome
//! ([`PageOutcome::Unavailable`]) rather than an error, because the signal
//! extractors treat a missing page as "signal absent". Transport failures
//! propagate to the caller.
//!
//! Fetching sits behind the [`FetchPage`] trait so the check pipeline can be
//! exercised against canned markup in tests.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE};
use reqwest::Client;
use std::error::Error;
use tracing::{debug, instrument};

/// Fixed desktop-browser identity sent with every page fetch.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Fixed accepted-language preference sent with every page fetch.
pub const ACCEPT_LANGUAGE_VALUE: &str = "ja,en;q=0.9";

/// Outcome of fetching a single public page.
#[derive(Debug, Clone)]
pub enum PageOutcome {
    /// The page was served successfully; carries the raw markup text.
    Content(String),
    /// The site answered with a non-success status; carries the status code.
    Unavailable(u16),
}

/// A source of raw page markup.
///
/// One fetch attempt per call, no retry, no backoff. Implementations other
/// than [`HttpFetcher`] exist only in tests.
pub trait FetchPage {
    /// Fetch `url`, returning markup or a structured "not available" outcome.
    async fn fetch_page(&self, url: &str) -> Result<PageOutcome, Box<dyn Error>>;
}

/// [`FetchPage`] implementation backed by a shared [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a fetcher whose client carries the browser identity headers.
    pub fn new() -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static(ACCEPT_LANGUAGE_VALUE),
        );
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;
        Ok(Self { client })
    }
}

impl FetchPage for HttpFetcher {
    #[instrument(level = "debug", skip_all, fields(%url))]
    async fn fetch_page(&self, url: &str) -> Result<PageOutcome, Box<dyn Error>> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            debug!(status = status.as_u16(), "Page unavailable");
            return Ok(PageOutcome::Unavailable(status.as_u16()));
        }
        let body = response.text().await?;
        debug!(bytes = body.len(), "Fetched page");
        Ok(PageOutcome::Content(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_fetcher_builds() {
        // Header values are static strings; a failure here would be a bad constant.
        assert!(HttpFetcher::new().is_ok());
    }

    #[test]
    fn test_accept_language_is_valid_header() {
        assert!(HeaderValue::from_static(ACCEPT_LANGUAGE_VALUE)
            .to_str()
            .is_ok());
    }
}
