//! Centralized configuration for Overtime.
//!
//! All tunable parameters and settings are defined here to avoid
//! hard-coded values scattered throughout the codebase.

use std::time::Duration;

/// Default location of the published match feed.
pub const DEFAULT_FEED_URL: &str =
    "https://raw.githubusercontent.com/Jitendra-unatti/fancode/refs/heads/main/data/fancode.json";

/// Central configuration for all Overtime components.
///
/// Groups related configuration settings into logical sections.
#[derive(Debug, Clone, Default)]
pub struct OvertimeConfig {
    pub feed: FeedConfig,
    pub playback: PlaybackConfig,
}

/// Match feed fetching configuration.
///
/// Controls where the shared match feed is fetched from and the HTTP
/// parameters used to fetch it.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Location of the match feed JSON document
    pub url: String,
    /// HTTP request timeout for feed fetches
    pub request_timeout: Duration,
    /// User agent for HTTP requests
    pub user_agent: &'static str,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_FEED_URL.to_string(),
            request_timeout: Duration::from_secs(15),
            user_agent: "overtime/0.1.0",
        }
    }
}

/// Playback session and adaptive-engine configuration.
///
/// Controls how playback sessions start and how the embedded fault
/// recovery behaves.
#[derive(Debug, Clone)]
pub struct PlaybackConfig {
    /// Request playback start automatically once a source is attached
    pub autoplay: bool,
    /// Adaptive-engine tuning passed through on engine creation
    pub engine: EngineConfig,
    /// Maximum automatic recovery attempts per session (None = unbounded)
    ///
    /// The unbounded default matches the observed behavior of recovering
    /// on every fatal network/media fault. Setting a bound escalates the
    /// fault that trips it to an unrecoverable failure.
    pub max_recovery_attempts: Option<u32>,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            autoplay: true,
            engine: EngineConfig::default(),
            max_recovery_attempts: None, // Recover on every fatal fault by default
        }
    }
}

/// Tuning flags handed to the adaptive engine when one is created.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Run demuxing/transmuxing work off the UI thread where supported
    pub enable_worker: bool,
    /// Tune buffering for low-latency live streams
    pub low_latency_mode: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            enable_worker: true,
            low_latency_mode: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_sections() {
        let config = OvertimeConfig::default();
        assert_eq!(config.feed.url, DEFAULT_FEED_URL);
        assert!(config.playback.autoplay);
        assert!(config.playback.engine.enable_worker);
        assert_eq!(config.playback.max_recovery_attempts, None);
    }
}
