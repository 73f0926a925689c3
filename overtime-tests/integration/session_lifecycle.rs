//! Playback session lifecycle and fault recovery tests.
//!
//! The central property under test: every exit path, from every phase,
//! leaves zero live engine and player-UI instances.

use std::sync::Arc;
use std::sync::atomic::Ordering;

use overtime_core::config::PlaybackConfig;
use overtime_core::playback::{
    EngineEvent, EngineFault, FaultKind, PlaybackError, PlaybackSession, SessionPhase,
};

use crate::mocks::{EngineProbe, MockEngineFactory, MockMediaElement, MockPlayerUi, UiProbe};

const MANIFEST_URL: &str = "https://cdn.example/live/stream.m3u8";
const DIRECT_URL: &str = "https://cdn.example/clips/highlight.mp4";

struct Harness {
    session: PlaybackSession,
    engine: Arc<EngineProbe>,
    ui: Arc<UiProbe>,
    media: Arc<MockMediaElement>,
}

fn harness_with(
    media: Arc<MockMediaElement>,
    engine_supported: bool,
    config: PlaybackConfig,
) -> Harness {
    let engine = Arc::new(EngineProbe::default());
    let ui = Arc::new(UiProbe::default());
    let factory = if engine_supported {
        MockEngineFactory::supported(engine.clone())
    } else {
        MockEngineFactory::unsupported(engine.clone())
    };
    let session = PlaybackSession::new(
        media.clone(),
        factory,
        Some(MockPlayerUi::provider(ui.clone())),
        config,
    );
    Harness {
        session,
        engine,
        ui,
        media,
    }
}

fn harness() -> Harness {
    harness_with(MockMediaElement::browser(), true, PlaybackConfig::default())
}

/// Drives a fresh session into the `Playing` phase on the adaptive path.
async fn playing_harness() -> Harness {
    let mut h = harness();
    h.session.start(MANIFEST_URL).await.expect("start");
    h.session.handle_event(EngineEvent::ManifestParsed).await;
    assert_eq!(h.session.phase(), SessionPhase::Playing);
    h
}

#[tokio::test]
async fn destroy_before_start_is_safe() {
    let mut h = harness();
    h.session.destroy();

    assert_eq!(h.session.phase(), SessionPhase::Destroyed);
    assert_eq!(h.engine.live_engines(), 0);
    assert_eq!(h.ui.live_instances(), 0);
}

#[tokio::test]
async fn destroyed_session_cannot_be_started() {
    let mut h = harness();
    h.session.destroy();

    assert_eq!(
        h.session.start(MANIFEST_URL).await,
        Err(PlaybackError::AlreadyStarted)
    );
    assert_eq!(h.session.phase(), SessionPhase::Destroyed);
    assert_eq!(h.engine.engines_created(), 0);
}

#[tokio::test]
async fn adaptive_start_attaches_engine() {
    let mut h = harness();
    h.session.start(MANIFEST_URL).await.expect("start");

    assert_eq!(h.session.phase(), SessionPhase::Attaching);
    assert_eq!(h.engine.engines_created(), 1);
    assert_eq!(h.engine.attach_calls.load(Ordering::SeqCst), 1);
    assert_eq!(*h.engine.loaded_sources.lock(), vec![MANIFEST_URL]);
    // Player UI waits for the manifest on the adaptive path.
    assert_eq!(h.ui.live_instances(), 0);
    assert_eq!(h.media.play_request_count(), 0);
}

#[tokio::test]
async fn manifest_parsed_wraps_ui_and_plays() {
    let h = playing_harness().await;

    assert_eq!(h.ui.live_instances(), 1);
    assert_eq!(h.media.play_request_count(), 1);
}

#[tokio::test]
async fn second_start_fails_fast() {
    let mut h = harness();
    h.session.start(MANIFEST_URL).await.expect("start");

    assert_eq!(
        h.session.start(DIRECT_URL).await,
        Err(PlaybackError::AlreadyStarted)
    );
    assert_eq!(h.session.phase(), SessionPhase::Attaching);
    assert_eq!(h.engine.engines_created(), 1);
}

#[tokio::test]
async fn autoplay_rejection_is_not_a_fault() {
    let media = MockMediaElement::rejecting_autoplay();
    let mut h = harness_with(media.clone(), true, PlaybackConfig::default());
    h.session.start(MANIFEST_URL).await.expect("start");
    h.session.handle_event(EngineEvent::ManifestParsed).await;

    assert_eq!(h.session.phase(), SessionPhase::Playing);
    assert_eq!(media.play_request_count(), 1);
    assert!(h.session.failure_message().is_none());
}

#[tokio::test]
async fn native_hls_path_skips_engine() {
    let media = MockMediaElement::with_native_hls();
    let mut h = harness_with(media.clone(), false, PlaybackConfig::default());
    h.session.start(MANIFEST_URL).await.expect("start");

    assert_eq!(h.session.phase(), SessionPhase::Playing);
    assert_eq!(h.engine.engines_created(), 0);
    assert_eq!(*media.sources.lock(), vec![MANIFEST_URL]);
    // Native path wraps the UI immediately.
    assert_eq!(h.ui.live_instances(), 1);
    assert_eq!(media.play_request_count(), 1);
}

#[tokio::test]
async fn direct_file_path_skips_engine() {
    let mut h = harness();
    h.session.start(DIRECT_URL).await.expect("start");

    assert_eq!(h.session.phase(), SessionPhase::Playing);
    assert_eq!(h.engine.engines_created(), 0);
    assert_eq!(*h.media.sources.lock(), vec![DIRECT_URL]);
    assert_eq!(h.ui.live_instances(), 1);
}

#[tokio::test]
async fn manifest_without_any_strategy_fails() {
    let mut h = harness_with(MockMediaElement::browser(), false, PlaybackConfig::default());

    let result = h.session.start(MANIFEST_URL).await;
    assert!(matches!(
        result,
        Err(PlaybackError::UnsupportedSource { .. })
    ));
    assert_eq!(h.session.phase(), SessionPhase::Failed);
    assert_eq!(h.engine.live_engines(), 0);
    assert_eq!(h.ui.live_instances(), 0);
}

#[tokio::test]
async fn destroy_after_start_releases_everything() {
    let mut h = playing_harness().await;
    h.session.destroy();

    assert_eq!(h.session.phase(), SessionPhase::Destroyed);
    assert_eq!(h.engine.live_engines(), 0);
    assert_eq!(h.ui.live_instances(), 0);

    // Idempotent.
    h.session.destroy();
    assert_eq!(h.engine.live_engines(), 0);
    assert_eq!(h.ui.live_instances(), 0);
}

#[tokio::test]
async fn destroy_after_recovery_releases_everything() {
    let mut h = playing_harness().await;
    h.session
        .handle_event(EngineEvent::Fault(EngineFault::fatal(FaultKind::Network)))
        .await;
    h.session.destroy();

    assert_eq!(h.engine.live_engines(), 0);
    assert_eq!(h.ui.live_instances(), 0);
}

#[tokio::test]
async fn drop_releases_everything() {
    let h = playing_harness().await;
    let (engine, ui) = (h.engine.clone(), h.ui.clone());
    drop(h);

    assert_eq!(engine.live_engines(), 0);
    assert_eq!(ui.live_instances(), 0);
}

#[tokio::test]
async fn non_fatal_faults_never_change_phase() {
    let mut h = harness();
    h.session.start(MANIFEST_URL).await.expect("start");

    h.session
        .handle_event(EngineEvent::Fault(EngineFault::non_fatal(
            FaultKind::Network,
        )))
        .await;
    assert_eq!(h.session.phase(), SessionPhase::Attaching);

    h.session.handle_event(EngineEvent::ManifestParsed).await;
    h.session
        .handle_event(EngineEvent::Fault(EngineFault::non_fatal(FaultKind::Media)))
        .await;
    assert_eq!(h.session.phase(), SessionPhase::Playing);
    assert_eq!(h.session.recovery_attempts(), 0);
}

#[tokio::test]
async fn network_fault_recovers_on_same_engine() {
    let mut h = playing_harness().await;
    h.session
        .handle_event(EngineEvent::Fault(EngineFault::fatal(FaultKind::Network)))
        .await;

    assert_eq!(h.session.phase(), SessionPhase::Playing);
    assert_eq!(h.engine.start_load_calls.load(Ordering::SeqCst), 1);
    // Same instance: created exactly once, still live.
    assert_eq!(h.engine.engines_created(), 1);
    assert_eq!(h.engine.live_engines(), 1);
    assert_eq!(h.session.recovery_attempts(), 1);
}

#[tokio::test]
async fn media_fault_recovers_in_place() {
    let mut h = playing_harness().await;
    h.session
        .handle_event(EngineEvent::Fault(EngineFault::fatal(FaultKind::Media)))
        .await;

    assert_eq!(h.session.phase(), SessionPhase::Playing);
    assert_eq!(h.engine.recover_media_calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.engine.engines_created(), 1);
}

#[tokio::test]
async fn unrecoverable_fault_fails_exactly_once() {
    let mut h = playing_harness().await;
    h.session
        .handle_event(EngineEvent::Fault(EngineFault::fatal(FaultKind::Other(
            "key system".to_string(),
        ))))
        .await;

    assert_eq!(h.session.phase(), SessionPhase::Failed);
    assert!(h.session.failure_message().is_some());
    assert_eq!(h.engine.live_engines(), 0);
    assert_eq!(h.ui.live_instances(), 0);

    // Further events are no-ops.
    h.session
        .handle_event(EngineEvent::Fault(EngineFault::fatal(FaultKind::Network)))
        .await;
    h.session.handle_event(EngineEvent::ManifestParsed).await;
    assert_eq!(h.session.phase(), SessionPhase::Failed);
    assert_eq!(h.engine.start_load_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn destroy_on_failed_session_is_safe() {
    let mut h = playing_harness().await;
    h.session
        .handle_event(EngineEvent::Fault(EngineFault::fatal(FaultKind::Other(
            "drm".to_string(),
        ))))
        .await;
    h.session.destroy();

    // Failed is terminal; resources were already released once.
    assert_eq!(h.session.phase(), SessionPhase::Failed);
    assert_eq!(h.engine.live_engines(), 0);
    assert_eq!(h.ui.live_instances(), 0);
}

#[tokio::test]
async fn unbounded_recovery_by_default() {
    let mut h = playing_harness().await;
    for _ in 0..20 {
        h.session
            .handle_event(EngineEvent::Fault(EngineFault::fatal(FaultKind::Network)))
            .await;
    }

    assert_eq!(h.session.phase(), SessionPhase::Playing);
    assert_eq!(h.session.recovery_attempts(), 20);
}

#[tokio::test]
async fn bounded_recovery_escalates_to_failure() {
    let config = PlaybackConfig {
        max_recovery_attempts: Some(2),
        ..PlaybackConfig::default()
    };
    let mut h = harness_with(MockMediaElement::browser(), true, config);
    h.session.start(MANIFEST_URL).await.expect("start");
    h.session.handle_event(EngineEvent::ManifestParsed).await;

    for _ in 0..2 {
        h.session
            .handle_event(EngineEvent::Fault(EngineFault::fatal(FaultKind::Network)))
            .await;
        assert_eq!(h.session.phase(), SessionPhase::Playing);
    }

    h.session
        .handle_event(EngineEvent::Fault(EngineFault::fatal(FaultKind::Network)))
        .await;
    assert_eq!(h.session.phase(), SessionPhase::Failed);
    assert_eq!(h.engine.live_engines(), 0);
    assert_eq!(h.session.recovery_attempts(), 2);
}

#[tokio::test]
async fn session_without_ui_provider_still_plays() {
    let engine = Arc::new(EngineProbe::default());
    let media = MockMediaElement::browser();
    let mut session = PlaybackSession::new(
        media.clone(),
        MockEngineFactory::supported(engine.clone()),
        None,
        PlaybackConfig::default(),
    );

    session.start(MANIFEST_URL).await.expect("start");
    session.handle_event(EngineEvent::ManifestParsed).await;

    assert_eq!(session.phase(), SessionPhase::Playing);
    assert_eq!(media.play_request_count(), 1);
}
