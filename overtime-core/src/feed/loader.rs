//! HTTP loader for the shared match feed.

use tracing::{debug, info};

use super::MatchFeed;
use crate::config::FeedConfig;

/// Errors that can occur while fetching or decoding the match feed.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("feed request failed: {source}")]
    RequestFailed {
        #[source]
        source: reqwest::Error,
    },

    #[error("feed endpoint returned status {status}")]
    UnexpectedStatus { status: u16 },

    #[error("feed document is malformed: {source}")]
    MalformedFeed {
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP client construction failed: {source}")]
    ClientConstruction {
        #[source]
        source: reqwest::Error,
    },
}

/// Fetches and decodes the match feed document.
///
/// The feed is a plain HTTP JSON fetch; no caching or conditional
/// requests. Callers decide how often to refresh their snapshot.
pub struct FeedLoader {
    client: reqwest::Client,
    config: FeedConfig,
}

impl FeedLoader {
    /// Creates a loader with the HTTP parameters from `config`.
    ///
    /// # Errors
    ///
    /// - `FeedError::ClientConstruction` - HTTP client could not be built
    pub fn new(config: FeedConfig) -> Result<Self, FeedError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent)
            .build()
            .map_err(|source| FeedError::ClientConstruction { source })?;

        Ok(Self { client, config })
    }

    /// Fetches the current feed snapshot.
    ///
    /// # Errors
    ///
    /// - `FeedError::RequestFailed` - Transport-level failure or timeout
    /// - `FeedError::UnexpectedStatus` - Non-success HTTP status
    /// - `FeedError::MalformedFeed` - Body is not a valid feed document
    pub async fn fetch(&self) -> Result<MatchFeed, FeedError> {
        debug!(url = %self.config.url, "fetching match feed");

        let response = self
            .client
            .get(&self.config.url)
            .send()
            .await
            .map_err(|source| FeedError::RequestFailed { source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::UnexpectedStatus {
                status: status.as_u16(),
            });
        }

        let feed: MatchFeed = response
            .json()
            .await
            .map_err(|source| FeedError::MalformedFeed { source })?;

        info!(matches = feed.matches.len(), "match feed loaded");
        Ok(feed)
    }
}
