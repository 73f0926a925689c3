//! Property tests for the stream source resolver.

use std::collections::HashMap;

use overtime_core::feed::{MatchFeed, MatchRecord};
use overtime_core::resolver::{
    RESERVED_PRIMARY_KEY, ResolveError, UNAVAILABLE_SENTINEL, channel_label, resolve,
    selectable_channels,
};
use proptest::prelude::*;

fn record(
    nested: HashMap<String, String>,
    adfree: Option<String>,
    dai: Option<String>,
) -> MatchRecord {
    MatchRecord {
        match_id: "7".to_string(),
        title: "Prop Match".to_string(),
        tournament: None,
        language: None,
        image: None,
        status: None,
        date: None,
        time: None,
        streaming_cdn: Some(nested),
        adfree_stream: adfree,
        dai_stream: dai,
    }
}

fn feed_with(record: MatchRecord) -> MatchFeed {
    MatchFeed {
        matches: vec![record],
    }
}

prop_compose! {
    fn channel_key()(key in "[a-z][a-z0-9_]{0,11}") -> String { key }
}

prop_compose! {
    fn stream_url()(path in "[a-z]{1,10}") -> String {
        format!("https://cdn.example/{path}/index.m3u8")
    }
}

fn channel_value() -> impl Strategy<Value = String> {
    prop_oneof![
        stream_url(),
        Just(UNAVAILABLE_SENTINEL.to_string()),
        Just(String::new()),
    ]
}

proptest! {
    #[test]
    fn flat_override_always_wins(
        mut nested in proptest::collection::hash_map(channel_key(), channel_value(), 0..6),
        nested_adfree in stream_url(),
        flat_adfree in stream_url(),
    ) {
        nested.insert("adfree_stream".to_string(), nested_adfree);
        let feed = feed_with(record(nested, Some(flat_adfree.clone()), None));

        prop_assert_eq!(resolve(&feed, "7", "adfree_stream"), Ok(flat_adfree.as_str()));
    }

    #[test]
    fn reserved_primary_key_never_resolves(
        mut nested in proptest::collection::hash_map(channel_key(), channel_value(), 0..6),
        primary_url in stream_url(),
    ) {
        nested.insert(RESERVED_PRIMARY_KEY.to_string(), primary_url);
        let feed = feed_with(record(nested, None, None));

        prop_assert_eq!(
            resolve(&feed, "7", RESERVED_PRIMARY_KEY),
            Err(ResolveError::ChannelNotPresent {
                channel: RESERVED_PRIMARY_KEY.to_string()
            })
        );
    }

    #[test]
    fn sentinel_is_never_returned_as_a_url(
        nested in proptest::collection::hash_map(channel_key(), channel_value(), 0..8),
    ) {
        let keys: Vec<String> = nested.keys().cloned().collect();
        let feed = feed_with(record(nested, None, None));

        for key in keys {
            if let Ok(url) = resolve(&feed, "7", &key) {
                prop_assert_ne!(url, UNAVAILABLE_SENTINEL);
                prop_assert!(!url.is_empty());
            }
        }
    }

    #[test]
    fn labels_never_contain_underscores(key in "[a-zA-Z0-9_]{0,16}") {
        prop_assert!(!channel_label(&key).contains('_'));
    }

    #[test]
    fn listing_excludes_reserved_and_language_keys(
        mut nested in proptest::collection::hash_map(channel_key(), stream_url(), 0..6),
        primary_url in stream_url(),
        language in "[A-Za-z]{2,8}",
    ) {
        nested.insert(RESERVED_PRIMARY_KEY.to_string(), primary_url);
        nested.insert("Language".to_string(), language);
        let record = record(nested, None, None);

        let listed = selectable_channels(&record);
        prop_assert!(!listed.iter().any(|key| key == RESERVED_PRIMARY_KEY));
        prop_assert!(!listed.iter().any(|key| key.eq_ignore_ascii_case("language")));
    }
}
