//! Page-level session host.
//!
//! Glues a view's request parameters to the resolver and to one
//! playback session: resolve on open, forward engine events while the
//! view is mounted, and tear the session down unconditionally when the
//! view unmounts or its parameters change. This is the only place
//! resource-leak prevention is enforced end-to-end.

use std::sync::Arc;

use tracing::info;

use crate::config::PlaybackConfig;
use crate::feed::MatchFeed;
use crate::playback::{
    AdaptiveEngineFactory, EngineEvent, MediaElement, PlaybackSession, PlayerUiProvider,
    SessionPhase,
};
use crate::Result;
use crate::resolver::resolve;

/// The identifier/channel pair carried in the view's location.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerRequest {
    pub match_id: String,
    pub channel: String,
}

impl PlayerRequest {
    pub fn new(match_id: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            match_id: match_id.into(),
            channel: channel.into(),
        }
    }

    /// Extracts the `id` and `cdn` parameters from query pairs.
    ///
    /// Absent parameters stay empty; the resolver reports them as
    /// missing identifiers.
    pub fn from_query_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut request = Self::default();
        for (key, value) in pairs {
            match key {
                "id" => request.match_id = value.to_string(),
                "cdn" => request.channel = value.to_string(),
                _ => {}
            }
        }
        request
    }
}

/// Hosts at most one live playback session against a feed snapshot.
///
/// Capabilities are injected once at construction; the player-UI
/// provider is optional and its absence never blocks playback. Opening
/// while a session is live tears the old one down first, and `Drop`
/// covers the unmount path.
pub struct SessionHost {
    feed: MatchFeed,
    media: Arc<dyn MediaElement>,
    engine_factory: Arc<dyn AdaptiveEngineFactory>,
    player_ui: Option<Arc<dyn PlayerUiProvider>>,
    config: PlaybackConfig,
    active: Option<PlaybackSession>,
}

impl SessionHost {
    pub fn new(
        feed: MatchFeed,
        media: Arc<dyn MediaElement>,
        engine_factory: Arc<dyn AdaptiveEngineFactory>,
        player_ui: Option<Arc<dyn PlayerUiProvider>>,
        config: PlaybackConfig,
    ) -> Self {
        Self {
            feed,
            media,
            engine_factory,
            player_ui,
            config,
            active: None,
        }
    }

    /// Resolves the request and starts a fresh playback session.
    ///
    /// Any previously open session is destroyed first, so changing view
    /// parameters can never leak a session.
    ///
    /// # Errors
    ///
    /// - `OvertimeError::Resolve` - One of the four absence reasons;
    ///   map with [`crate::OvertimeError::user_message`]
    /// - `OvertimeError::Playback` - No viable strategy for the source
    pub async fn open(&mut self, request: &PlayerRequest) -> Result<()> {
        self.close();

        let url = resolve(&self.feed, &request.match_id, &request.channel)?.to_string();
        info!(match_id = %request.match_id, channel = %request.channel, "stream resolved");

        let mut session = PlaybackSession::new(
            self.media.clone(),
            self.engine_factory.clone(),
            self.player_ui.clone(),
            self.config.clone(),
        );
        // On error the failed session drops here, releasing anything it
        // attached before failing.
        session.start(&url).await?;

        self.active = Some(session);
        Ok(())
    }

    /// Destroys the live session, if any. Idempotent.
    pub fn close(&mut self) {
        if let Some(mut session) = self.active.take() {
            session.destroy();
        }
    }

    /// Forwards an adaptive-engine callback to the live session.
    pub async fn handle_engine_event(&mut self, event: EngineEvent) {
        if let Some(session) = self.active.as_mut() {
            session.handle_event(event).await;
        }
    }

    /// Phase of the live session, if one is open.
    pub fn session_phase(&self) -> Option<SessionPhase> {
        self.active.as_ref().map(PlaybackSession::phase)
    }

    /// The live session, for inspecting failure state.
    pub fn session(&self) -> Option<&PlaybackSession> {
        self.active.as_ref()
    }

    /// Display title for a match, with the original's fallback.
    pub fn match_title(&self, match_id: &str) -> String {
        self.feed
            .matches
            .iter()
            .find(|record| record.match_id == match_id)
            .map(|record| record.title.as_str())
            .filter(|title| !title.is_empty())
            .unwrap_or("Live Match")
            .to_string()
    }

    /// Replaces the feed snapshot used for future opens.
    pub fn update_feed(&mut self, feed: MatchFeed) {
        self.feed = feed;
    }
}

impl Drop for SessionHost {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_from_query_pairs() {
        let request = PlayerRequest::from_query_pairs([("id", "7"), ("cdn", "cdn1"), ("x", "y")]);
        assert_eq!(request, PlayerRequest::new("7", "cdn1"));
    }

    #[test]
    fn test_request_with_missing_parameters_stays_empty() {
        let request = PlayerRequest::from_query_pairs([("cdn", "cdn1")]);
        assert_eq!(request.match_id, "");
        assert_eq!(request.channel, "cdn1");
    }
}
