//! Adaptive playback pipeline.
//!
//! One [`PlaybackSession`] per view: strategy selection on start, an
//! embedded fault-recovery state machine reacting to engine events, and
//! guaranteed resource teardown. The adaptive engine and player-UI
//! widget are consumed as injected capabilities (see [`capabilities`]),
//! never looked up from ambient state.

pub mod capabilities;
pub mod recovery;
pub mod session;

pub use capabilities::{
    AdaptiveEngine, AdaptiveEngineFactory, EngineEvent, EngineFault, FaultKind, MediaElement,
    PlayRejected, PlayerUiHandle, PlayerUiOptions, PlayerUiProvider,
};
pub use recovery::{RecoveryAction, SessionPhase, classify_fault};
pub use session::{PlaybackError, PlaybackSession};
