//! Stream source resolution.
//!
//! Turns a (match identifier, channel key) pair into a single playable
//! URL from a heterogeneous, partially-missing match record. Resolution
//! is synchronous, side-effect-free, and returns absence reasons as
//! values rather than panicking; the session host maps each reason to a
//! distinct user-facing message.
//!
//! Channel precedence is an explicit three-step merge: the nested CDN
//! mapping minus the reserved primary key, overlaid by the flat curated
//! override fields. A flat field always wins over a same-named nested
//! entry, so a channel key resolves consistently regardless of which
//! origin supplied it.

use std::collections::HashMap;

use crate::feed::{MatchFeed, MatchRecord};

/// Nested-mapping key holding the canonical URL; never selectable.
pub const RESERVED_PRIMARY_KEY: &str = "Primary_Playback_URL";

/// Sentinel value meaning "channel exists but no stream is published".
pub const UNAVAILABLE_SENTINEL: &str = "Unavailable";

/// Flat override key for the ad-free rendition.
pub const ADFREE_CHANNEL: &str = "adfree_stream";

/// Flat override key for the dynamic-ad-insertion rendition.
pub const DAI_CHANNEL: &str = "dai_stream";

/// Language marker sometimes published among the nested channel keys.
const LANGUAGE_MARKER: &str = "language";

/// Reasons a (match, channel) pair does not resolve to a URL.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("match identifier or channel key missing from request")]
    MissingIdentifiers,

    #[error("no match with identifier {match_id}")]
    MatchNotFound { match_id: String },

    #[error("channel {channel} not present for this match")]
    ChannelNotPresent { channel: String },

    #[error("channel {channel} has no published stream")]
    ChannelUnavailable { channel: String },
}

impl ResolveError {
    /// Returns a user-friendly message suitable for display.
    pub fn user_message(&self) -> String {
        match self {
            ResolveError::MissingIdentifiers => {
                "Missing match ID or CDN information in the URL.".to_string()
            }
            ResolveError::MatchNotFound { .. } => "Match not found.".to_string(),
            ResolveError::ChannelNotPresent { channel } => {
                format!("No stream named '{channel}' exists for this match.")
            }
            ResolveError::ChannelUnavailable { channel } => {
                format!("Stream for '{channel}' is unavailable.")
            }
        }
    }
}

/// Resolves a requested channel key for a match into a playable URL.
///
/// The returned URL is exactly the feed value, unmodified: no
/// normalization, no protocol rewriting.
///
/// # Errors
///
/// - `ResolveError::MissingIdentifiers` - Empty identifier or channel key
/// - `ResolveError::MatchNotFound` - No record with that identifier
/// - `ResolveError::ChannelNotPresent` - Key absent from the effective mapping
/// - `ResolveError::ChannelUnavailable` - Value empty or the unavailable sentinel
pub fn resolve<'feed>(
    feed: &'feed MatchFeed,
    requested_id: &str,
    requested_channel: &str,
) -> Result<&'feed str, ResolveError> {
    if requested_id.is_empty() || requested_channel.is_empty() {
        return Err(ResolveError::MissingIdentifiers);
    }

    // Feed identifiers are normalized to digit strings on deserialization,
    // so a numeric-looking request compares by plain string equality.
    let record = feed
        .matches
        .iter()
        .find(|record| record.match_id == requested_id)
        .ok_or_else(|| ResolveError::MatchNotFound {
            match_id: requested_id.to_string(),
        })?;

    let channels = effective_channels(record);
    let url = channels
        .get(requested_channel)
        .copied()
        .ok_or_else(|| ResolveError::ChannelNotPresent {
            channel: requested_channel.to_string(),
        })?;

    if !is_playable(url) {
        return Err(ResolveError::ChannelUnavailable {
            channel: requested_channel.to_string(),
        });
    }

    Ok(url)
}

/// Builds the effective channel mapping for one match record.
///
/// Step 1: nested CDN mapping with the reserved primary key removed.
/// Step 2: flat override fields overlaid on top, so a flat field wins
/// over a same-named nested entry.
pub fn effective_channels(record: &MatchRecord) -> HashMap<&str, &str> {
    let mut channels = HashMap::new();

    if let Some(cdn) = &record.streaming_cdn {
        for (key, value) in cdn {
            if key != RESERVED_PRIMARY_KEY {
                channels.insert(key.as_str(), value.as_str());
            }
        }
    }

    if let Some(url) = &record.adfree_stream {
        channels.insert(ADFREE_CHANNEL, url.as_str());
    }
    if let Some(url) = &record.dai_stream {
        channels.insert(DAI_CHANNEL, url.as_str());
    }

    channels
}

/// Lists the channel keys a viewer may select for a match.
///
/// Curated overrides come first, then nested keys in sorted order.
/// Excluded: the language marker (case-insensitive), the reserved
/// primary key, and channels with no playable URL.
pub fn selectable_channels(record: &MatchRecord) -> Vec<String> {
    let channels = effective_channels(record);
    let mut keys = Vec::new();

    for key in [ADFREE_CHANNEL, DAI_CHANNEL] {
        if let Some(url) = channels.get(key)
            && is_playable(url)
        {
            keys.push(key.to_string());
        }
    }

    let mut nested: Vec<&str> = channels
        .iter()
        .map(|(key, url)| (*key, *url))
        .filter(|(key, url)| {
            *key != ADFREE_CHANNEL
                && *key != DAI_CHANNEL
                && !key.eq_ignore_ascii_case(LANGUAGE_MARKER)
                && is_playable(url)
        })
        .map(|(key, _)| key)
        .collect();
    nested.sort_unstable();

    keys.extend(nested.iter().map(|key| key.to_string()));
    keys
}

/// Converts a channel key to a human label.
///
/// The two curated override keys have exact labels; any other key is
/// rendered with separators as spaces and each word capitalized.
pub fn channel_label(key: &str) -> String {
    match key {
        ADFREE_CHANNEL => "Ad-Free".to_string(),
        DAI_CHANNEL => "DAI Stream".to_string(),
        _ => key
            .replace('_', " ")
            .split(' ')
            .map(capitalize_word)
            .collect::<Vec<_>>()
            .join(" "),
    }
}

fn is_playable(url: &str) -> bool {
    !url.is_empty() && url != UNAVAILABLE_SENTINEL
}

fn capitalize_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_feed() -> MatchFeed {
        serde_json::from_str(
            r#"{"matches":[{
                "match_id": "7",
                "title": "Final",
                "adfree_stream": "https://x/a.m3u8",
                "STREAMING_CDN": {
                    "cdn1": "https://x/b.m3u8",
                    "Primary_Playback_URL": "https://x/p.m3u8"
                }
            }]}"#,
        )
        .expect("feed should parse")
    }

    #[test]
    fn test_flat_override_wins_over_nested_entry() {
        let feed: MatchFeed = serde_json::from_str(
            r#"{"matches":[{
                "match_id": "7",
                "adfree_stream": "https://flat/stream.m3u8",
                "STREAMING_CDN": {"adfree_stream": "https://nested/stream.m3u8"}
            }]}"#,
        )
        .unwrap();

        assert_eq!(
            resolve(&feed, "7", "adfree_stream"),
            Ok("https://flat/stream.m3u8")
        );
    }

    #[test]
    fn test_resolution_grid() {
        let feed = sample_feed();

        assert_eq!(resolve(&feed, "7", "adfree_stream"), Ok("https://x/a.m3u8"));
        assert_eq!(resolve(&feed, "7", "cdn1"), Ok("https://x/b.m3u8"));
        assert_eq!(
            resolve(&feed, "7", "Primary_Playback_URL"),
            Err(ResolveError::ChannelNotPresent {
                channel: "Primary_Playback_URL".to_string()
            })
        );
        assert_eq!(
            resolve(&feed, "7", "cdn2"),
            Err(ResolveError::ChannelNotPresent {
                channel: "cdn2".to_string()
            })
        );
    }

    #[test]
    fn test_missing_identifiers() {
        let feed = sample_feed();

        assert_eq!(
            resolve(&feed, "", "cdn1"),
            Err(ResolveError::MissingIdentifiers)
        );
        assert_eq!(
            resolve(&feed, "42", ""),
            Err(ResolveError::MissingIdentifiers)
        );
    }

    #[test]
    fn test_match_not_found() {
        let feed = sample_feed();
        assert_eq!(
            resolve(&feed, "404", "cdn1"),
            Err(ResolveError::MatchNotFound {
                match_id: "404".to_string()
            })
        );
    }

    #[test]
    fn test_numeric_feed_id_matches_digit_request() {
        let feed: MatchFeed = serde_json::from_str(
            r#"{"matches":[{"match_id":7,"STREAMING_CDN":{"cdn1":"https://x/b.m3u8"}}]}"#,
        )
        .unwrap();
        assert_eq!(resolve(&feed, "7", "cdn1"), Ok("https://x/b.m3u8"));
    }

    #[test]
    fn test_unavailable_sentinel_never_resolves() {
        let feed: MatchFeed = serde_json::from_str(
            r#"{"matches":[{
                "match_id": "7",
                "STREAMING_CDN": {"cdn1": "Unavailable", "cdn2": ""}
            }]}"#,
        )
        .unwrap();

        assert_eq!(
            resolve(&feed, "7", "cdn1"),
            Err(ResolveError::ChannelUnavailable {
                channel: "cdn1".to_string()
            })
        );
        assert_eq!(
            resolve(&feed, "7", "cdn2"),
            Err(ResolveError::ChannelUnavailable {
                channel: "cdn2".to_string()
            })
        );
    }

    #[test]
    fn test_selectable_channels_exclusions() {
        let feed: MatchFeed = serde_json::from_str(
            r#"{"matches":[{
                "match_id": "7",
                "dai_stream": "https://x/d.m3u8",
                "STREAMING_CDN": {
                    "cdn2": "https://x/2.m3u8",
                    "cdn1": "https://x/1.m3u8",
                    "Language": "Hindi",
                    "Primary_Playback_URL": "https://x/p.m3u8",
                    "cdn3": "Unavailable"
                }
            }]}"#,
        )
        .unwrap();

        assert_eq!(
            selectable_channels(&feed.matches[0]),
            vec!["dai_stream", "cdn1", "cdn2"]
        );
    }

    #[test]
    fn test_channel_labels() {
        assert_eq!(channel_label("adfree_stream"), "Ad-Free");
        assert_eq!(channel_label("dai_stream"), "DAI Stream");
        assert_eq!(channel_label("cdn1"), "Cdn1");
        assert_eq!(channel_label("hotstar_backup"), "Hotstar Backup");
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let feed = sample_feed();
        let first = resolve(&feed, "7", "cdn1");
        let second = resolve(&feed, "7", "cdn1");
        assert_eq!(first, second);
    }
}
