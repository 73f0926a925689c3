//! End-to-end session host tests: resolve, start, events, teardown.

use std::sync::Arc;

use overtime_core::config::PlaybackConfig;
use overtime_core::feed::MatchFeed;
use overtime_core::host::{PlayerRequest, SessionHost};
use overtime_core::playback::{EngineEvent, SessionPhase};

use crate::mocks::{EngineProbe, MockEngineFactory, MockMediaElement, MockPlayerUi, UiProbe};

fn sample_feed() -> MatchFeed {
    serde_json::from_str(
        r#"{"matches":[
            {
                "match_id": "7",
                "title": "Grand Final",
                "status": "LIVE",
                "adfree_stream": "https://x/a.m3u8",
                "STREAMING_CDN": {
                    "cdn1": "https://x/b.m3u8",
                    "cdn_down": "Unavailable",
                    "Primary_Playback_URL": "https://x/p.m3u8"
                }
            },
            {"match_id": "8", "title": ""}
        ]}"#,
    )
    .expect("feed should parse")
}

struct Harness {
    host: SessionHost,
    engine: Arc<EngineProbe>,
    ui: Arc<UiProbe>,
}

fn harness() -> Harness {
    let engine = Arc::new(EngineProbe::default());
    let ui = Arc::new(UiProbe::default());
    let host = SessionHost::new(
        sample_feed(),
        MockMediaElement::browser(),
        MockEngineFactory::supported(engine.clone()),
        Some(MockPlayerUi::provider(ui.clone())),
        PlaybackConfig::default(),
    );
    Harness { host, engine, ui }
}

#[tokio::test]
async fn open_resolves_and_reaches_playing() {
    let mut h = harness();
    h.host
        .open(&PlayerRequest::new("7", "cdn1"))
        .await
        .expect("open");
    assert_eq!(h.host.session_phase(), Some(SessionPhase::Attaching));

    h.host.handle_engine_event(EngineEvent::ManifestParsed).await;
    assert_eq!(h.host.session_phase(), Some(SessionPhase::Playing));
    assert_eq!(*h.engine.loaded_sources.lock(), vec!["https://x/b.m3u8"]);
    assert_eq!(h.ui.live_instances(), 1);
}

#[tokio::test]
async fn absence_reasons_map_to_user_messages() {
    let mut h = harness();

    let err = h
        .host
        .open(&PlayerRequest::default())
        .await
        .expect_err("missing params");
    assert_eq!(
        err.user_message(),
        "Missing match ID or CDN information in the URL."
    );
    assert!(err.is_user_error());

    let err = h
        .host
        .open(&PlayerRequest::new("404", "cdn1"))
        .await
        .expect_err("unknown match");
    assert_eq!(err.user_message(), "Match not found.");

    let err = h
        .host
        .open(&PlayerRequest::new("7", "cdn9"))
        .await
        .expect_err("unknown channel");
    assert_eq!(
        err.user_message(),
        "No stream named 'cdn9' exists for this match."
    );

    let err = h
        .host
        .open(&PlayerRequest::new("7", "cdn_down"))
        .await
        .expect_err("unavailable channel");
    assert_eq!(err.user_message(), "Stream for 'cdn_down' is unavailable.");

    assert!(h.host.session_phase().is_none());
    assert_eq!(h.engine.live_engines(), 0);
}

#[tokio::test]
async fn reopen_tears_down_previous_session() {
    let mut h = harness();
    h.host
        .open(&PlayerRequest::new("7", "cdn1"))
        .await
        .expect("first open");
    h.host.handle_engine_event(EngineEvent::ManifestParsed).await;

    h.host
        .open(&PlayerRequest::new("7", "adfree_stream"))
        .await
        .expect("second open");

    assert_eq!(h.engine.engines_created(), 2);
    assert_eq!(h.engine.live_engines(), 1);
    assert_eq!(h.ui.live_instances(), 0);
    assert_eq!(
        h.engine.loaded_sources.lock().last().map(String::as_str),
        Some("https://x/a.m3u8")
    );
}

#[tokio::test]
async fn close_and_drop_release_everything() {
    let mut h = harness();
    h.host
        .open(&PlayerRequest::new("7", "cdn1"))
        .await
        .expect("open");

    h.host.close();
    assert_eq!(h.engine.live_engines(), 0);
    assert!(h.host.session_phase().is_none());
    h.host.close();

    h.host
        .open(&PlayerRequest::new("7", "cdn1"))
        .await
        .expect("reopen");
    let engine = h.engine.clone();
    drop(h);
    assert_eq!(engine.live_engines(), 0);
}

#[tokio::test]
async fn events_without_a_session_are_ignored() {
    let mut h = harness();
    h.host.handle_engine_event(EngineEvent::ManifestParsed).await;
    assert!(h.host.session_phase().is_none());
}

#[tokio::test]
async fn match_title_falls_back_for_missing_or_empty() {
    let h = harness();
    assert_eq!(h.host.match_title("7"), "Grand Final");
    assert_eq!(h.host.match_title("8"), "Live Match");
    assert_eq!(h.host.match_title("404"), "Live Match");
}
