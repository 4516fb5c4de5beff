//! API client for the YouTube Data API v3.
//!
//! This module provides the `ApiClient` struct for listing subscriptions
//! and recent uploads, plus a plain byte fetch used for channel thumbnails.

use std::collections::HashSet;
use std::time::Duration;

use anyhow::{Context, Result};
use futures::stream::{self, Stream, TryStreamExt};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::models::{Channel, Page, SearchItem, SubscriptionItem};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Base URL for the YouTube Data API
pub const DEFAULT_API_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Page size for subscription listing. 50 is the API maximum.
const SUBSCRIPTIONS_PAGE_SIZE: u32 = 50;

/// Number of recent uploads returned per channel when none is requested.
/// Matches the API's own default page size for search.
pub const DEFAULT_RECENT_VIDEOS: u32 = 5;

/// Connection settings for the API client.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub api_key: String,
    pub base_url: String,
    /// Optional upper bound on pages fetched by a single listing.
    pub max_pages: Option<usize>,
}

impl ApiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_API_BASE_URL.to_string(),
            max_pages: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_max_pages(mut self, max_pages: Option<usize>) -> Self {
        self.max_pages = max_pages;
        self
    }
}

/// Cursor state carried between subscription pages.
struct PageCursor {
    token: Option<String>,
    seen: HashSet<String>,
    fetched: usize,
    done: bool,
}

/// API client for YouTube.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    config: ApiConfig,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(config: ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self { client, config })
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), name)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    /// GET an API endpoint with the key attached. The key is kept out of error messages.
    async fn get<T: DeserializeOwned>(&self, url: &str, query: &[(&str, &str)]) -> Result<T> {
        let response = self
            .client
            .get(url)
            .query(&[("key", self.config.api_key.as_str())])
            .query(query)
            .send()
            .await
            .map_err(|e| ApiError::from(e.without_url()))
            .with_context(|| format!("Failed to send GET request to {}", url))?;

        let response = Self::check_response(response).await?;

        let text = response
            .text()
            .await
            .map_err(|e| ApiError::from(e.without_url()))
            .with_context(|| format!("Failed to read response body from {}", url))?;

        serde_json::from_str(&text).map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse JSON response from {}: {}", url, e))
                .into()
        })
    }

    // ===== Data Fetching Methods =====

    /// Lazily walk every page of a channel's subscriptions.
    ///
    /// Each item is one page, already converted to channels. The stream ends
    /// after the first page without a `nextPageToken`. It fails if a token
    /// repeats or the configured page cap is exceeded.
    pub fn subscription_pages<'a>(
        &'a self,
        channel_id: &'a str,
    ) -> impl Stream<Item = Result<Vec<Channel>>> + 'a {
        let start = PageCursor {
            token: None,
            seen: HashSet::new(),
            fetched: 0,
            done: false,
        };

        stream::try_unfold(start, move |mut cursor| async move {
            if cursor.done {
                return Ok::<_, anyhow::Error>(None);
            }
            if let Some(cap) = self.config.max_pages {
                if cursor.fetched >= cap {
                    return Err(ApiError::TooManyPages(cap).into());
                }
            }

            let url = self.endpoint("subscriptions");
            let page_size = SUBSCRIPTIONS_PAGE_SIZE.to_string();
            let mut query = vec![
                ("part", "snippet"),
                ("channelId", channel_id),
                ("maxResults", page_size.as_str()),
            ];
            if let Some(ref token) = cursor.token {
                query.push(("pageToken", token.as_str()));
            }

            let page: Page<SubscriptionItem> = self
                .get(&url, &query)
                .await
                .context("Failed to load subscriptions")?;
            cursor.fetched += 1;

            let channels = page
                .items
                .iter()
                .map(|item| {
                    item.to_channel().ok_or_else(|| {
                        ApiError::InvalidResponse(format!(
                            "Subscription {:?} has no thumbnail URL",
                            item.snippet.title
                        ))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;

            debug!(page = cursor.fetched, items = channels.len(), "Fetched subscription page");

            match page.next_cursor() {
                Some(token) => {
                    if !cursor.seen.insert(token.to_string()) {
                        return Err(ApiError::RepeatedPageToken(token.to_string()).into());
                    }
                    cursor.token = Some(token.to_string());
                }
                None => cursor.done = true,
            }

            Ok(Some((channels, cursor)))
        })
    }

    /// Fetch every subscription of a channel, in page order.
    pub async fn list_subscriptions(&self, channel_id: &str) -> Result<Vec<Channel>> {
        let mut pages = std::pin::pin!(self.subscription_pages(channel_id));

        let mut channels = Vec::new();
        while let Some(page) = pages.try_next().await? {
            channels.extend(page);
        }

        debug!(channel_id, count = channels.len(), "Fetched all subscriptions");
        Ok(channels)
    }

    /// Fetch the IDs of a channel's most recent uploads, newest first.
    /// Only the first page of results is used.
    pub async fn list_recent_video_ids(&self, channel_id: &str, max_results: u32) -> Result<Vec<String>> {
        let url = self.endpoint("search");
        let max_results = max_results.to_string();
        let query = [
            ("part", "id"),
            ("channelId", channel_id),
            ("type", "video"),
            ("order", "date"),
            ("maxResults", max_results.as_str()),
        ];

        let page: Page<SearchItem> = self
            .get(&url, &query)
            .await
            .context("Failed to get recent videos")?;

        let ids: Vec<String> = page
            .items
            .into_iter()
            .filter_map(|item| item.id.video_id)
            .collect();

        debug!(channel_id, count = ids.len(), "Fetched recent videos");
        Ok(ids)
    }

    /// Download a resource outside the API, such as a thumbnail image.
    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(ApiError::from)
            .with_context(|| format!("Failed to send GET request to {}", url))?;

        let response = Self::check_response(response).await?;

        let bytes = response
            .bytes()
            .await
            .map_err(ApiError::from)
            .with_context(|| format!("Failed to read body from {}", url))?;
        Ok(bytes.to_vec())
    }
}

// ============================================================================
// Tests
// ============================================================================
