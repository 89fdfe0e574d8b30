//! Data models for monetization verdicts and canonical channel records.
//!
//! This module defines the core data structures used throughout the application:
//! - [`MonetizationVerdict`]: The reduced, explainable result of one monetization check
//! - [`MonetizationStatus`]: Tri-state outcome (`true` / `false` / `null` on the wire)
//! - [`MonetizationIndicators`]: The raw boolean signals a verdict was reduced from
//! - [`ChannelMetadata`]: The canonical channel record handed to persistence
//!
//! The verdict types serialize with camelCase field names to match the JSON
//! contract consumed by downstream clients, hence the `rename_all` attributes.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Tri-state outcome of a monetization check.
///
/// `Unknown` is produced only when the check pipeline itself failed before any
/// signal could be gathered. Absence of signals is `NotMonetized`, never
/// `Unknown` — "we found no evidence" and "we couldn't look" are distinct.
///
/// On the wire this is a nullable boolean: `Monetized` → `true`,
/// `NotMonetized` → `false`, `Unknown` → `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonetizationStatus {
    Monetized,
    NotMonetized,
    Unknown,
}

impl Serialize for MonetizationStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MonetizationStatus::Monetized => serializer.serialize_bool(true),
            MonetizationStatus::NotMonetized => serializer.serialize_bool(false),
            MonetizationStatus::Unknown => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for MonetizationStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<bool>::deserialize(deserializer)? {
            Some(true) => MonetizationStatus::Monetized,
            Some(false) => MonetizationStatus::NotMonetized,
            None => MonetizationStatus::Unknown,
        })
    }
}

/// Ordinal confidence tier attached to a verdict.
///
/// Derives `Ord` so that `Low < Medium < High` holds for callers that rank
/// or threshold verdicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

/// The raw boolean signals gathered during a check.
///
/// `has_super_chat` is a reserved placeholder for a signal that is not yet
/// implemented; it is always `false` and must not be read as evidence. It is
/// kept in the record for forward API stability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonetizationIndicators {
    /// A membership/sponsorship affordance was found on the channel page.
    pub has_membership: bool,
    /// Ad-placement state was found on a sampled video page.
    pub has_ads: bool,
    /// Reserved, always `false`.
    pub has_super_chat: bool,
}

/// The result of one monetization check for one channel at one point in time.
///
/// Produced by [`crate::checker::check_channel`] and handed straight back to
/// the caller; the engine holds no long-lived reference to it.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonetizationVerdict {
    /// Tri-state monetization determination.
    pub is_monetized: MonetizationStatus,
    /// RFC 3339 timestamp of when the verdict was finalized.
    pub checked_at: String,
    /// The raw signals the verdict was reduced from.
    pub indicators: MonetizationIndicators,
    /// Confidence tier derived from which indicators fired.
    pub confidence: Confidence,
    /// Short human-readable justification.
    pub reason: String,
}

/// Provenance of a [`ChannelMetadata`] record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelSource {
    /// Added directly by id or URL.
    Manual,
    /// Discovered through keyword search.
    Search,
}

/// Canonical channel record produced by the metadata normalizer.
///
/// Constructed once per external lookup and handed to the persistence layer.
/// Every numeric field is total: a missing or non-numeric source field becomes
/// `0`, never an absent value, so downstream aggregation and display stay
/// arithmetic-safe.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChannelMetadata {
    /// Stable opaque channel id (typically `UC…`).
    pub channel_id: String,
    /// Display name; `"Unknown Channel"` when the source record carries none.
    pub channel_name: String,
    /// Deterministic canonical URL, `https://www.youtube.com/channel/<id>`.
    pub channel_url: String,
    /// Vanity URL variant, preserved as metadata only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_url: Option<String>,
    /// Best available thumbnail, highest resolution first.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub subscriber_count: u64,
    pub video_count: u64,
    pub view_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    /// Tokenized channel keywords, only present when the source field is non-empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic_categories: Option<Vec<String>>,
    /// How this record entered the system.
    pub source: ChannelSource,
}
