//! Match feed model and home-screen ordering.
//!
//! The feed is a shared JSON document listing live and upcoming matches
//! together with their delivery channels: a nested CDN mapping plus flat
//! curated override fields. Records are heterogeneous and partially
//! missing by design; everything beyond `match_id` is optional.

pub mod loader;

use std::collections::HashMap;

use serde::{Deserialize, Deserializer};

pub use loader::{FeedError, FeedLoader};

/// One match record as published in the feed.
///
/// Channel keys across the nested mapping and the flat fields may
/// collide; precedence is decided by the resolver, not here.
#[derive(Debug, Clone, Deserialize)]
pub struct MatchRecord {
    /// Feed identifier; published inconsistently as a string or a number
    #[serde(deserialize_with = "match_id_from_string_or_number")]
    pub match_id: String,
    #[serde(default)]
    pub title: String,
    pub tournament: Option<String>,
    pub language: Option<String>,
    pub image: Option<String>,
    pub status: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    /// Nested per-CDN channel mapping, including the reserved primary key
    #[serde(rename = "STREAMING_CDN")]
    pub streaming_cdn: Option<HashMap<String, String>>,
    /// Curated ad-free override channel
    pub adfree_stream: Option<String>,
    /// Curated dynamic-ad-insertion override channel
    pub dai_stream: Option<String>,
}

impl MatchRecord {
    /// Whether the match is currently live, by case-insensitive status.
    pub fn is_live(&self) -> bool {
        self.status
            .as_deref()
            .is_some_and(|status| status.eq_ignore_ascii_case("LIVE"))
    }
}

/// The parsed match feed document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatchFeed {
    #[serde(default)]
    pub matches: Vec<MatchRecord>,
}

impl MatchFeed {
    /// Stable live-first ordering for the home screen.
    ///
    /// Live matches float to the front; relative order within the live
    /// and non-live groups is preserved.
    pub fn sort_live_first(&mut self) {
        self.matches.sort_by_key(|record| !record.is_live());
    }

    /// Extracts the first live match for the spotlight slot.
    ///
    /// Returns the spotlight record (if any match is live) and the
    /// remaining records in their original order. Records sharing the
    /// spotlight's identifier are not repeated in the remainder.
    pub fn split_spotlight(self) -> (Option<MatchRecord>, Vec<MatchRecord>) {
        let Some(spotlight) = self.matches.iter().find(|record| record.is_live()).cloned() else {
            return (None, self.matches);
        };

        let remainder = self
            .matches
            .into_iter()
            .filter(|record| record.match_id != spotlight.match_id)
            .collect();
        (Some(spotlight), remainder)
    }
}

/// The feed publishes `match_id` as either a JSON string or a bare
/// number; both must compare equal to the same request parameter.
fn match_id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Number(number) => number.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_from_json(json: &str) -> MatchFeed {
        serde_json::from_str(json).expect("feed should parse")
    }

    #[test]
    fn test_numeric_match_id_parses_as_digits() {
        let feed = feed_from_json(r#"{"matches":[{"match_id":42,"title":"A"}]}"#);
        assert_eq!(feed.matches[0].match_id, "42");

        let feed = feed_from_json(r#"{"matches":[{"match_id":"42","title":"A"}]}"#);
        assert_eq!(feed.matches[0].match_id, "42");
    }

    #[test]
    fn test_missing_matches_collection_defaults_empty() {
        let feed = feed_from_json("{}");
        assert!(feed.matches.is_empty());
    }

    #[test]
    fn test_live_status_is_case_insensitive() {
        let feed = feed_from_json(
            r#"{"matches":[
                {"match_id":"1","status":"live"},
                {"match_id":"2","status":"UPCOMING"},
                {"match_id":"3"}
            ]}"#,
        );
        assert!(feed.matches[0].is_live());
        assert!(!feed.matches[1].is_live());
        assert!(!feed.matches[2].is_live());
    }

    #[test]
    fn test_sort_live_first_is_stable() {
        let mut feed = feed_from_json(
            r#"{"matches":[
                {"match_id":"1","status":"UPCOMING"},
                {"match_id":"2","status":"LIVE"},
                {"match_id":"3","status":"UPCOMING"},
                {"match_id":"4","status":"LIVE"}
            ]}"#,
        );
        feed.sort_live_first();

        let order: Vec<&str> = feed.matches.iter().map(|m| m.match_id.as_str()).collect();
        assert_eq!(order, ["2", "4", "1", "3"]);
    }

    #[test]
    fn test_split_spotlight_extracts_first_live() {
        let feed = feed_from_json(
            r#"{"matches":[
                {"match_id":"1","status":"UPCOMING"},
                {"match_id":"2","status":"LIVE"},
                {"match_id":"3","status":"LIVE"}
            ]}"#,
        );
        let (spotlight, remainder) = feed.split_spotlight();

        assert_eq!(spotlight.expect("one live match").match_id, "2");
        let order: Vec<&str> = remainder.iter().map(|m| m.match_id.as_str()).collect();
        assert_eq!(order, ["1", "3"]);
    }

    #[test]
    fn test_split_spotlight_without_live_matches() {
        let feed = feed_from_json(r#"{"matches":[{"match_id":"1","status":"UPCOMING"}]}"#);
        let (spotlight, remainder) = feed.split_spotlight();

        assert!(spotlight.is_none());
        assert_eq!(remainder.len(), 1);
    }
}
