use serde::{Deserialize, Serialize};

/// A subscribed channel as stored in the subscription cache.
///
/// Field order matches the cache header `id,title,thumbnail`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    pub title: String,
    pub thumbnail: String,
}

impl Channel {
    pub fn new(id: impl Into<String>, title: impl Into<String>, thumbnail: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            thumbnail: thumbnail.into(),
        }
    }
}

// API Response wrappers

/// One page of a list response. `next_page_token` is absent on the last page.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(rename = "nextPageToken")]
    pub next_page_token: Option<String>,
}

impl<T> Page<T> {
    /// Cursor for the following page. An empty token counts as absent.
    pub fn next_cursor(&self) -> Option<&str> {
        self.next_page_token.as_deref().filter(|t| !t.is_empty())
    }
}

// Response from /subscriptions?part=snippet
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionItem {
    pub snippet: SubscriptionSnippet,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionSnippet {
    pub title: String,
    #[serde(rename = "resourceId")]
    pub resource_id: ResourceId,
    #[serde(default)]
    pub thumbnails: Thumbnails,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResourceId {
    #[serde(rename = "channelId")]
    pub channel_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Thumbnails {
    pub high: Option<Thumbnail>,
    pub medium: Option<Thumbnail>,
    #[serde(rename = "default")]
    pub fallback: Option<Thumbnail>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Thumbnail {
    pub url: String,
}

impl Thumbnails {
    /// Best available image URL, preferring `high`.
    pub fn best_url(&self) -> Option<&str> {
        [&self.high, &self.medium, &self.fallback]
            .into_iter()
            .flatten()
            .map(|t| t.url.as_str())
            .find(|url| !url.is_empty())
    }
}

impl SubscriptionItem {
    /// Convert to a cache record. Returns None when no thumbnail URL is present.
    pub fn to_channel(&self) -> Option<Channel> {
        let thumbnail = self.snippet.thumbnails.best_url()?;
        Some(Channel::new(
            self.snippet.resource_id.channel_id.clone(),
            self.snippet.title.clone(),
            thumbnail,
        ))
    }
}

// Response from /search?part=id
#[derive(Debug, Clone, Deserialize)]
pub struct SearchItem {
    pub id: SearchItemId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchItemId {
    #[serde(rename = "videoId")]
    pub video_id: Option<String>,
}
