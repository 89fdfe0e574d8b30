//! Utility functions for timestamps, string truncation, and URL cleanup.

use chrono::{SecondsFormat, Utc};
use url::Url;

/// Current UTC time as an RFC 3339 string with millisecond precision.
///
/// This is the format stamped into `checkedAt` on every verdict.
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to `max` bytes with an ellipsis and byte-count
/// indicator appended. Used to keep response-body previews readable in logs.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        format!("{}…(+{} bytes)", &s[..max], s.len() - max)
    }
}

/// Strip query parameters and fragments from a channel URL.
///
/// Share links carry tracking junk (`?si=…`) that would confuse id and handle
/// extraction; only scheme, host, and path matter.
///
/// Returns `None` when the input is not an absolute URL.
pub fn normalize_channel_url(url: &str) -> Option<String> {
    let mut parsed = Url::parse(url).ok()?;
    parsed.set_query(None);
    parsed.set_fragment(None);
    Some(parsed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_rfc3339_parses_back() {
        let stamp = now_rfc3339();
        assert!(chrono::DateTime::parse_from_rfc3339(&stamp).is_ok());
        assert!(stamp.ends_with('Z'));
    }

    #[test]
    fn test_truncate_for_log_short_string() {
        assert_eq!(truncate_for_log("Hello, world!", 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_normalize_channel_url_strips_query() {
        assert_eq!(
            normalize_channel_url("https://www.youtube.com/@handle?si=tracking123").as_deref(),
            Some("https://www.youtube.com/@handle")
        );
    }

    #[test]
    fn test_normalize_channel_url_strips_fragment() {
        assert_eq!(
            normalize_channel_url("https://www.youtube.com/channel/UCabc#about").as_deref(),
            Some("https://www.youtube.com/channel/UCabc")
        );
    }

    #[test]
    fn test_normalize_channel_url_rejects_relative() {
        assert_eq!(normalize_channel_url("/channel/UCabc"), None);
    }
}
