// Chat source abstraction
//
// The poller only sees this module's trait and types; the YouTube
// implementation lives behind it so the polling pipeline can be
// exercised against a scripted source in tests.

pub mod youtube;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub use youtube::YouTubeChatSource;

use crate::error::Result;

/// One chat message as returned by the source. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Opaque unique id, the dedup key for the session
    pub id: String,
    pub author: String,
    pub text: String,
    pub observed_at: DateTime<Utc>,
}

/// Continuation marker for the next page fetch.
///
/// `None` means "start of session" and must only be sent on the very
/// first call; the source issues a fresh token on every response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollCursor {
    pub token: Option<String>,
}

impl PollCursor {
    pub fn start() -> Self {
        Self { token: None }
    }

    pub fn from_token(token: impl Into<String>) -> Self {
        Self { token: Some(token.into()) }
    }
}

/// One page of chat messages plus the pacing the source demands.
#[derive(Debug, Clone)]
pub struct PollResult {
    pub messages: Vec<ChatMessage>,
    pub next_cursor: PollCursor,
    /// Authoritative wait before the next fetch, supplied per response
    pub poll_interval_ms: u64,
}

/// Main trait for chat feed access
#[async_trait]
pub trait ChatSource: Send + Sync {
    /// Fetch the next page of chat messages for a session.
    async fn fetch_page(&self, chat_id: &str, cursor: &PollCursor) -> Result<PollResult>;
}

/// Resolves a channel to its currently-live chat session, ahead of polling.
#[async_trait]
pub trait StreamLocator: Send + Sync {
    /// Returns the chat id of the channel's active live stream, or
    /// `NoActiveStream` when nothing is live.
    async fn locate_active_chat(&self, channel_id: &str) -> Result<ActiveChat>;
}

/// A located live chat session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveChat {
    pub video_id: String,
    pub chat_id: String,
}

#[cfg(test)]
mockall::mock! {
    pub Source {}

    #[async_trait]
    impl ChatSource for Source {
        async fn fetch_page(&self, chat_id: &str, cursor: &PollCursor) -> Result<PollResult>;
    }
}
