use std::time::Duration;
use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::config::SourceConfig;
use crate::error::{Result, ChatlateError};
use super::{ActiveChat, ChatMessage, ChatSource, PollCursor, PollResult, StreamLocator};

const API_BASE: &str = "https://www.googleapis.com/youtube/v3";

/// YouTube Data API v3 client covering live stream lookup and
/// live chat message paging.
pub struct YouTubeChatSource {
    client: Client,
    api_key: String,
    api_base: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItemId {
    video_id: String,
}

#[derive(Debug, Deserialize)]
struct VideosResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoItem {
    live_streaming_details: Option<LiveStreamingDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LiveStreamingDetails {
    active_live_chat_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LiveChatResponse {
    next_page_token: Option<String>,
    #[serde(default)]
    polling_interval_millis: Option<u64>,
    #[serde(default)]
    items: Vec<LiveChatItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LiveChatItem {
    id: String,
    snippet: LiveChatSnippet,
    author_details: AuthorDetails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LiveChatSnippet {
    display_message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthorDetails {
    display_name: String,
}

impl YouTubeChatSource {
    pub fn new(config: &SourceConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("HTTP client creation should not fail");

        Self {
            client,
            api_key: config.api_key.clone(),
            api_base: API_BASE.to_string(),
        }
    }

    fn endpoint(&self, resource: &str, params: &[(&str, &str)]) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/{}", self.api_base, resource))
            .map_err(|e| ChatlateError::Source(format!("Invalid API URL: {}", e)))?;
        url.query_pairs_mut()
            .extend_pairs(params)
            .append_pair("key", &self.api_key);
        Ok(url)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T> {
        let response = self.client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ChatlateError::Source(format!("Request failed: {}", e)))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatlateError::NotFound(format!("{}: {}", status, body)));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatlateError::Source(format!("API error {}: {}", status, body)));
        }

        response.json::<T>().await
            .map_err(|e| ChatlateError::Source(format!("Failed to parse response: {}", e)))
    }

    async fn find_live_video(&self, channel_id: &str) -> Result<String> {
        let url = self.endpoint("search", &[
            ("part", "id"),
            ("channelId", channel_id),
            ("eventType", "live"),
            ("type", "video"),
            ("maxResults", "1"),
        ])?;

        let response: SearchResponse = self.get_json(url).await?;
        response.items
            .into_iter()
            .next()
            .map(|item| item.id.video_id)
            .ok_or(ChatlateError::NoActiveStream)
    }

    async fn find_chat_id(&self, video_id: &str) -> Result<String> {
        let url = self.endpoint("videos", &[
            ("part", "liveStreamingDetails"),
            ("id", video_id),
        ])?;

        let response: VideosResponse = self.get_json(url).await?;
        response.items
            .into_iter()
            .next()
            .and_then(|item| item.live_streaming_details)
            .and_then(|details| details.active_live_chat_id)
            .ok_or_else(|| ChatlateError::NotFound(
                format!("No active live chat for video {}", video_id)
            ))
    }
}

#[async_trait]
impl StreamLocator for YouTubeChatSource {
    async fn locate_active_chat(&self, channel_id: &str) -> Result<ActiveChat> {
        let video_id = self.find_live_video(channel_id).await?;
        debug!("Live video found: {}", video_id);
        let chat_id = self.find_chat_id(&video_id).await?;
        Ok(ActiveChat { video_id, chat_id })
    }
}

#[async_trait]
impl ChatSource for YouTubeChatSource {
    async fn fetch_page(&self, chat_id: &str, cursor: &PollCursor) -> Result<PollResult> {
        let page_token = cursor.token.as_deref().unwrap_or("");
        let url = self.endpoint("liveChat/messages", &[
            ("liveChatId", chat_id),
            ("part", "snippet,authorDetails"),
            ("pageToken", page_token),
        ])?;

        let response: LiveChatResponse = self.get_json(url).await?;

        let poll_interval_ms = response.polling_interval_millis.unwrap_or_else(|| {
            warn!("Response carried no polling interval, assuming 2000ms");
            2000
        });

        let messages = response.items
            .into_iter()
            .filter_map(|item| {
                // System events carry no display message and are not chat
                let text = item.snippet.display_message?;
                Some(ChatMessage {
                    id: item.id,
                    author: item.author_details.display_name,
                    text,
                    observed_at: Utc::now(),
                })
            })
            .collect();

        Ok(PollResult {
            messages,
            next_cursor: PollCursor { token: response.next_page_token },
            poll_interval_ms,
        })
    }
}
