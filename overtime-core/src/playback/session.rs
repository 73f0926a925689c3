//! Playback session controller.
//!
//! Owns one media element's playback lifecycle: selects a strategy for
//! the resolved URL (adaptive engine, native HLS, or direct file),
//! reacts to engine events through the embedded fault recovery, and
//! guarantees the engine and player-UI instances are released on every
//! exit path. Failure to release leaks native decoding resources, so
//! teardown is also wired into `Drop`.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use super::capabilities::{
    AdaptiveEngine, AdaptiveEngineFactory, EngineEvent, EngineFault, MediaElement, PlayerUiHandle,
    PlayerUiOptions, PlayerUiProvider,
};
use super::recovery::{RecoveryAction, SessionPhase, classify_fault};
use crate::config::PlaybackConfig;

/// Errors returned by session controller invocations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlaybackError {
    /// `start` may be called exactly once per session
    #[error("session already started; create a new session instead")]
    AlreadyStarted,

    /// Manifest URL with neither adaptive support nor native HLS playback
    #[error("no playback strategy for source: {url}")]
    UnsupportedSource { url: String },
}

/// The live, mutable state of one playback view.
///
/// Created per view, started at most once, and never re-entered after
/// destruction. All transitions happen on the caller's task: either a
/// direct invocation (`start`/`destroy`) or an engine callback
/// forwarded through [`handle_event`](Self::handle_event).
pub struct PlaybackSession {
    media: Arc<dyn MediaElement>,
    engine_factory: Arc<dyn AdaptiveEngineFactory>,
    player_ui: Option<Arc<dyn PlayerUiProvider>>,
    config: PlaybackConfig,
    engine: Option<Box<dyn AdaptiveEngine>>,
    ui_handle: Option<Box<dyn PlayerUiHandle>>,
    phase: SessionPhase,
    recovery_attempts: u32,
    failure: Option<String>,
}

impl PlaybackSession {
    pub fn new(
        media: Arc<dyn MediaElement>,
        engine_factory: Arc<dyn AdaptiveEngineFactory>,
        player_ui: Option<Arc<dyn PlayerUiProvider>>,
        config: PlaybackConfig,
    ) -> Self {
        Self {
            media,
            engine_factory,
            player_ui,
            config,
            engine: None,
            ui_handle: None,
            phase: SessionPhase::Idle,
            recovery_attempts: 0,
            failure: None,
        }
    }

    /// Attaches the resolved URL and requests playback.
    ///
    /// Strategy is selected by URL shape, not by probing: a segmented
    /// manifest goes through the adaptive engine when supported, falls
    /// back to native assignment when the element understands HLS, and
    /// anything else is assigned directly as a plain media file.
    ///
    /// # Errors
    ///
    /// - `PlaybackError::AlreadyStarted` - Called on a non-idle session
    /// - `PlaybackError::UnsupportedSource` - Manifest URL but no way to play it
    pub async fn start(&mut self, url: &str) -> Result<(), PlaybackError> {
        if self.phase != SessionPhase::Idle {
            return Err(PlaybackError::AlreadyStarted);
        }

        if is_adaptive_manifest(url) {
            if self.engine_factory.is_supported() {
                let mut engine = self.engine_factory.create(&self.config.engine);
                engine.load_source(url);
                engine.attach_media();
                self.engine = Some(engine);
                self.set_phase(SessionPhase::Attaching);
                info!(strategy = "adaptive", "playback session started");
            } else if self.media.can_play_hls_natively() {
                self.media.set_source(url);
                self.attach_player_ui();
                self.set_phase(SessionPhase::Playing);
                info!(strategy = "native-hls", "playback session started");
                self.request_play().await;
            } else {
                self.fail("no adaptive support and no native manifest playback");
                return Err(PlaybackError::UnsupportedSource {
                    url: url.to_string(),
                });
            }
        } else {
            self.media.set_source(url);
            self.attach_player_ui();
            self.set_phase(SessionPhase::Playing);
            info!(strategy = "direct", "playback session started");
            self.request_play().await;
        }

        Ok(())
    }

    /// Reacts to an asynchronous engine callback.
    ///
    /// No-op once the session is terminal.
    pub async fn handle_event(&mut self, event: EngineEvent) {
        if self.phase.is_terminal() {
            debug!(?event, phase = ?self.phase, "engine event ignored in terminal phase");
            return;
        }

        match event {
            EngineEvent::ManifestParsed => self.on_manifest_parsed().await,
            EngineEvent::Fault(fault) => self.on_fault(fault),
        }
    }

    /// Releases the engine, then the player UI, then marks the session
    /// destroyed. Idempotent, callable from any phase, never errors.
    pub fn destroy(&mut self) {
        if self.phase == SessionPhase::Destroyed {
            return;
        }
        self.release_resources();
        // A failed session stays failed: both phases are terminal and
        // resources are already gone either way.
        if self.phase != SessionPhase::Failed {
            self.set_phase(SessionPhase::Destroyed);
        }
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// The surfaced message when the phase is `Failed`.
    pub fn failure_message(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Automatic recovery attempts performed so far.
    pub fn recovery_attempts(&self) -> u32 {
        self.recovery_attempts
    }

    async fn on_manifest_parsed(&mut self) {
        if self.phase != SessionPhase::Attaching && self.phase != SessionPhase::Playing {
            debug!(phase = ?self.phase, "manifest parsed outside attach flow; ignored");
            return;
        }

        if self.ui_handle.is_none() {
            self.attach_player_ui();
        }
        if self.phase == SessionPhase::Attaching {
            self.set_phase(SessionPhase::Playing);
        }
        self.request_play().await;
    }

    fn on_fault(&mut self, fault: EngineFault) {
        let Some(action) = classify_fault(&fault) else {
            debug!(?fault, "non-fatal engine fault; engine self-heals");
            return;
        };

        match action {
            RecoveryAction::RestartLoad | RecoveryAction::RecoverMedia => {
                self.attempt_recovery(action, &fault);
            }
            RecoveryAction::Abort => {
                error!(?fault, "unrecoverable engine fault");
                self.fail("this stream can no longer be played");
            }
        }
    }

    /// Runs a transient-fault recovery on the existing engine instance.
    ///
    /// The engine is never recreated here; both actions instruct the
    /// same instance and the session returns to `Playing`.
    fn attempt_recovery(&mut self, action: RecoveryAction, fault: &EngineFault) {
        if let Some(max) = self.config.max_recovery_attempts
            && self.recovery_attempts >= max
        {
            error!(attempts = self.recovery_attempts, "recovery attempt limit reached");
            self.fail("playback kept failing and was stopped");
            return;
        }

        if self.engine.is_none() {
            // Fatal fault without an engine means the collaborator wiring
            // is broken; nothing to recover.
            self.fail("engine fault received with no attached engine");
            return;
        }

        self.recovery_attempts += 1;
        self.set_phase(SessionPhase::Recovering);
        warn!(?fault, ?action, attempt = self.recovery_attempts, "recovering from engine fault");

        if let Some(engine) = self.engine.as_mut() {
            match action {
                RecoveryAction::RestartLoad => engine.start_load(),
                RecoveryAction::RecoverMedia => engine.recover_media_error(),
                RecoveryAction::Abort => unreachable!("abort is handled by the caller"),
            }
        }

        self.set_phase(SessionPhase::Playing);
    }

    /// Transitions to `Failed` with the same resource release as
    /// `destroy`. The message surfaces exactly once.
    fn fail(&mut self, message: &str) {
        self.release_resources();
        self.failure = Some(message.to_string());
        self.set_phase(SessionPhase::Failed);
    }

    fn release_resources(&mut self) {
        if let Some(mut engine) = self.engine.take() {
            engine.destroy();
        }
        if let Some(mut ui) = self.ui_handle.take() {
            ui.destroy();
        }
    }

    /// Best-effort player-UI wrapping; absence never blocks playback.
    fn attach_player_ui(&mut self) {
        if let Some(provider) = &self.player_ui {
            let options = PlayerUiOptions {
                autoplay: self.config.autoplay,
            };
            self.ui_handle = Some(provider.wrap(self.media.clone(), options));
        }
    }

    /// Requests playback start; a rejection (autoplay policy) is logged
    /// and swallowed. The viewer can resume via on-screen controls.
    async fn request_play(&self) {
        if !self.config.autoplay {
            return;
        }
        if let Err(rejected) = self.media.request_play().await {
            warn!(reason = %rejected.reason, "autoplay blocked");
        }
    }

    fn set_phase(&mut self, next: SessionPhase) {
        debug!(from = ?self.phase, to = ?next, "session phase transition");
        self.phase = next;
    }
}

impl Drop for PlaybackSession {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// Whether the URL denotes a segmented adaptive manifest, by the
/// file-extension convention the feed uses.
fn is_adaptive_manifest(url: &str) -> bool {
    url.contains(".m3u8")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_detection_by_extension() {
        assert!(is_adaptive_manifest("https://x/stream.m3u8"));
        assert!(is_adaptive_manifest("https://x/stream.m3u8?token=abc"));
        assert!(!is_adaptive_manifest("https://x/clip.mp4"));
        assert!(!is_adaptive_manifest("https://x/clip.webm"));
    }
}
