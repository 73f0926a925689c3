//! Capability seams for the playback pipeline.
//!
//! This module defines the traits that keep the session controller
//! decoupled from the environment it runs in. The media element, the
//! adaptive-bitrate engine, and the optional player-UI widget are all
//! injected capabilities; nothing is looked up from ambient state. The
//! controller can therefore be exercised end-to-end with substitutes.

use std::sync::Arc;

use crate::config::EngineConfig;

/// The media element a session plays into.
///
/// Owned by the surrounding view; the controller borrows it for the
/// lifetime of one session and never tears it down.
#[async_trait::async_trait]
pub trait MediaElement: Send + Sync {
    /// Assigns a source URL directly to the element.
    fn set_source(&self, url: &str);

    /// Whether the element understands segmented HLS manifests natively,
    /// without an adaptive engine in front of it.
    fn can_play_hls_natively(&self) -> bool;

    /// Requests playback start.
    ///
    /// # Errors
    ///
    /// - `PlayRejected` - The environment refused to start playback
    ///   (autoplay policy). Expected and recoverable by the viewer via
    ///   on-screen controls; callers log it and move on.
    async fn request_play(&self) -> Result<(), PlayRejected>;
}

/// Playback start was refused by the environment.
#[derive(Debug, Clone, thiserror::Error)]
#[error("playback start rejected: {reason}")]
pub struct PlayRejected {
    pub reason: String,
}

/// Creates adaptive engine instances when the environment supports them.
pub trait AdaptiveEngineFactory: Send + Sync {
    /// Whether the adaptive-streaming capability exists in this environment.
    fn is_supported(&self) -> bool;

    /// Creates one engine instance with the given tuning.
    fn create(&self, config: &EngineConfig) -> Box<dyn AdaptiveEngine>;
}

/// One adaptive-bitrate engine instance.
///
/// Exclusively owned by exactly one session controller while attached.
/// All methods are commands; outcomes arrive back as [`EngineEvent`]s
/// delivered through the session host.
pub trait AdaptiveEngine: Send {
    /// Begins loading the manifest at `url`.
    fn load_source(&mut self, url: &str);

    /// Attaches the engine to the session's media element.
    fn attach_media(&mut self);

    /// Restarts loading from the current manifest after a network fault.
    fn start_load(&mut self);

    /// Attempts in-place recovery from a media decode fault.
    fn recover_media_error(&mut self);

    /// Releases the engine and its native decoding resources.
    fn destroy(&mut self);
}

/// Asynchronous callbacks emitted by the adaptive engine.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// The manifest loaded and parsed; the source is ready to play.
    ManifestParsed,
    /// The engine reported a fault.
    Fault(EngineFault),
}

/// A fault reported by the adaptive engine.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineFault {
    pub kind: FaultKind,
    /// Non-fatal faults are self-healed by the engine; fatal faults
    /// require the controller to intervene.
    pub fatal: bool,
}

impl EngineFault {
    pub fn fatal(kind: FaultKind) -> Self {
        Self { kind, fatal: true }
    }

    pub fn non_fatal(kind: FaultKind) -> Self {
        Self { kind, fatal: false }
    }
}

/// Engine fault classes the recovery machinery distinguishes.
#[derive(Debug, Clone, PartialEq)]
pub enum FaultKind {
    /// Segment or manifest delivery failed
    Network,
    /// Media decode or buffering failed
    Media,
    /// Anything else the engine reports
    Other(String),
}

/// Optional third-party player-UI capability.
///
/// Best-effort: when no provider is injected, playback proceeds with
/// the element's own controls.
pub trait PlayerUiProvider: Send + Sync {
    /// Wraps the media element with on-screen controls.
    fn wrap(
        &self,
        media: Arc<dyn MediaElement>,
        options: PlayerUiOptions,
    ) -> Box<dyn PlayerUiHandle>;
}

/// A live player-UI instance wrapping one media element.
pub trait PlayerUiHandle: Send {
    /// Releases the UI instance.
    fn destroy(&mut self);
}

/// Options passed to the player UI on creation.
#[derive(Debug, Clone, Default)]
pub struct PlayerUiOptions {
    pub autoplay: bool,
}
