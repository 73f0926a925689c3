//! Overtime Core - Stream resolution and adaptive playback
//!
//! This crate provides the building blocks for the Overtime match
//! viewer: the match feed model and loader, deterministic resolution of
//! a (match, channel) pair into a playable URL, and a playback session
//! controller with fault recovery and guaranteed resource teardown.

pub mod config;
pub mod feed;
pub mod host;
pub mod playback;
pub mod resolver;
pub mod tracing_setup;

// Re-export main types for convenient access
pub use config::OvertimeConfig;
pub use feed::{FeedError, FeedLoader, MatchFeed, MatchRecord};
pub use host::{PlayerRequest, SessionHost};
pub use playback::{EngineEvent, PlaybackError, PlaybackSession, SessionPhase};
pub use resolver::{ResolveError, resolve};

/// Core errors that can bubble up from any Overtime subsystem.
#[derive(Debug, thiserror::Error)]
pub enum OvertimeError {
    #[error("feed error: {0}")]
    Feed(#[from] FeedError),

    #[error("resolution error: {0}")]
    Resolve(#[from] ResolveError),

    #[error("playback error: {0}")]
    Playback(#[from] PlaybackError),
}

impl OvertimeError {
    /// Returns a user-friendly error message suitable for display.
    ///
    /// Resolution reasons map 1:1 to distinct messages; everything else
    /// collapses to a generic load failure, matching what a viewer can
    /// act on.
    pub fn user_message(&self) -> String {
        match self {
            OvertimeError::Feed(_) => "Sorry, this stream could not be loaded.".to_string(),
            OvertimeError::Resolve(reason) => reason.user_message(),
            OvertimeError::Playback(PlaybackError::AlreadyStarted) => {
                "Playback is already running.".to_string()
            }
            OvertimeError::Playback(PlaybackError::UnsupportedSource { .. }) => {
                "This stream format is not supported on this device.".to_string()
            }
        }
    }

    /// Checks if this error is due to user input validation.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            OvertimeError::Resolve(ResolveError::MissingIdentifiers)
        )
    }
}

pub type Result<T> = std::result::Result<T, OvertimeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_reasons_map_to_distinct_messages() {
        let reasons = [
            ResolveError::MissingIdentifiers,
            ResolveError::MatchNotFound {
                match_id: "7".to_string(),
            },
            ResolveError::ChannelNotPresent {
                channel: "cdn1".to_string(),
            },
            ResolveError::ChannelUnavailable {
                channel: "cdn1".to_string(),
            },
        ];

        let messages: Vec<String> = reasons
            .iter()
            .map(|reason| OvertimeError::from(reason.clone()).user_message())
            .collect();

        for (i, message) in messages.iter().enumerate() {
            for other in &messages[i + 1..] {
                assert_ne!(message, other);
            }
        }
    }

    #[test]
    fn test_missing_identifiers_is_user_error() {
        assert!(OvertimeError::from(ResolveError::MissingIdentifiers).is_user_error());
        assert!(
            !OvertimeError::from(ResolveError::MatchNotFound {
                match_id: "7".to_string()
            })
            .is_user_error()
        );
    }
}
