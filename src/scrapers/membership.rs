//! Membership-signal extractor.
//!
//! Scans channel-page markup for the "become a member" affordance. The tokens
//! cover the localized button label plus the internal component identifiers
//! the platform embeds in its page-state payload, so the check works on
//! whichever rendering the site serves. Detection is a logical OR over the
//! set; neither order nor which token matched carries meaning.

/// Literal substrings that mark the membership affordance.
const MEMBERSHIP_TOKENS: &[&str] = &[
    "\"sponsorButton\"",
    "メンバーになる",
    "\"Join\"",
    "sponsorshipButton",
];

/// Whether channel-page markup shows a membership affordance.
pub fn detect_membership(markup: &str) -> bool {
    MEMBERSHIP_TOKENS.iter().any(|token| markup.contains(token))
}
