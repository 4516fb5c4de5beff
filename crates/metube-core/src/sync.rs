//! Subscription sync and the workflows that run on the cached list.
//!
//! `Syncer` refreshes the subscription cache from the API, then either
//! collects recent video IDs into a text file or pulls channel posters
//! into a media library. Channels are processed one at a time in cache order.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::api::ApiClient;
use crate::cache::SubscriptionCache;
use crate::models::Channel;
use crate::utils::{is_single_component, write_atomic};

/// File name of the poster written into each channel's directory.
pub const POSTER_FILE: &str = "poster.jpeg";

/// A channel that was skipped, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelFailure {
    pub channel: String,
    pub reason: String,
}

impl ChannelFailure {
    fn new(channel: &Channel, reason: impl Into<String>) -> Self {
        Self {
            channel: channel.title.clone(),
            reason: reason.into(),
        }
    }
}

/// Outcome of `collect_recent_videos`.
#[derive(Debug, Default)]
pub struct VideoReport {
    pub channels: usize,
    pub video_ids: Vec<String>,
    pub failed: Vec<ChannelFailure>,
}

/// Outcome of `download_thumbnails`.
#[derive(Debug, Default)]
pub struct ThumbnailReport {
    pub saved: Vec<PathBuf>,
    pub failed: Vec<ChannelFailure>,
}

#[derive(Debug, Clone)]
pub struct VideoOptions {
    pub max_results: u32,
    /// Skip channels whose lookup fails instead of aborting.
    pub keep_going: bool,
}

#[derive(Debug, Clone)]
pub enum Mode {
    Videos { output: PathBuf, options: VideoOptions },
    Thumbnails { media_dir: PathBuf },
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub refresh: bool,
    pub mode: Mode,
}

#[derive(Debug)]
pub enum RunSummary {
    Videos(VideoReport),
    Thumbnails(ThumbnailReport),
}

pub struct Syncer {
    client: ApiClient,
    cache: SubscriptionCache,
    my_channel: String,
}

impl Syncer {
    pub fn new(client: ApiClient, cache: SubscriptionCache, my_channel: impl Into<String>) -> Self {
        Self {
            client,
            cache,
            my_channel: my_channel.into(),
        }
    }

    pub fn cache(&self) -> &SubscriptionCache {
        &self.cache
    }

    /// Fetch the complete subscription list and replace the cache with it.
    /// Nothing is written unless every page was fetched.
    pub async fn resync(&self) -> Result<Vec<Channel>> {
        info!(channel = %self.my_channel, "Refreshing subscription cache");
        let channels = self.client.list_subscriptions(&self.my_channel).await?;
        self.cache.save(&channels)?;
        info!(count = channels.len(), path = %self.cache.path().display(), "Subscription cache updated");
        Ok(channels)
    }

    fn load_channels(&self) -> Result<Vec<Channel>> {
        let channels = self.cache.load()?;
        let age = self
            .cache
            .age()
            .map(|a| a.age_display())
            .unwrap_or_else(|| "unknown".to_string());
        info!(count = channels.len(), age = %age, "Loaded subscriptions from cache");
        Ok(channels)
    }

    /// Gather recent video IDs of every cached channel into `output`,
    /// one per line. The file is only written once all lookups are done.
    pub async fn collect_recent_videos(&self, output: &Path, options: &VideoOptions) -> Result<VideoReport> {
        let channels = self.load_channels()?;
        let mut report = VideoReport {
            channels: channels.len(),
            ..VideoReport::default()
        };

        for channel in &channels {
            match self.client.list_recent_video_ids(&channel.id, options.max_results).await {
                Ok(ids) => {
                    debug!(channel = %channel.title, count = ids.len(), "Recent videos");
                    report.video_ids.extend(ids);
                }
                Err(e) if options.keep_going => {
                    warn!(channel = %channel.title, error = %format!("{:#}", e), "Skipping channel");
                    report.failed.push(ChannelFailure::new(channel, format!("{:#}", e)));
                }
                Err(e) => {
                    return Err(e.context(format!("Recent video lookup failed for {}", channel.title)));
                }
            }
        }

        write_atomic(output, report.video_ids.join("\n").as_bytes())
            .with_context(|| format!("Failed to write video list to {}", output.display()))?;
        info!(count = report.video_ids.len(), path = %output.display(), "Wrote video list");
        Ok(report)
    }

    /// Save each cached channel's thumbnail as `<media_dir>/<title>/poster.jpeg`.
    ///
    /// Channel directories must already exist. Any per-channel failure,
    /// remote or local, is logged and recorded, and the next channel is tried.
    pub async fn download_thumbnails(&self, media_dir: &Path) -> Result<ThumbnailReport> {
        let channels = self.load_channels()?;
        let mut report = ThumbnailReport::default();

        for channel in &channels {
            match self.save_thumbnail(channel, media_dir).await {
                Ok(path) => {
                    debug!(channel = %channel.title, path = %path.display(), "Saved poster");
                    report.saved.push(path);
                }
                Err(e) => {
                    warn!(channel = %channel.title, error = %format!("{:#}", e), "Error pulling image");
                    report.failed.push(ChannelFailure::new(channel, format!("{:#}", e)));
                }
            }
        }

        info!(saved = report.saved.len(), failed = report.failed.len(), "Thumbnail download finished");
        Ok(report)
    }

    async fn save_thumbnail(&self, channel: &Channel, media_dir: &Path) -> Result<PathBuf> {
        if !is_single_component(&channel.title) {
            anyhow::bail!("title {:?} is not a usable directory name", channel.title);
        }

        let bytes = self.client.fetch_bytes(&channel.thumbnail).await?;

        let dir = media_dir.join(&channel.title);
        if !dir.is_dir() {
            anyhow::bail!("directory {} does not exist", dir.display());
        }
        let path = dir.join(POSTER_FILE);
        std::fs::write(&path, &bytes)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Optionally refresh the cache, then run exactly one workflow.
    pub async fn run(&self, options: &RunOptions) -> Result<RunSummary> {
        if options.refresh {
            // The workflow reloads from the cache below
            self.resync().await?;
        }

        match &options.mode {
            Mode::Videos { output, options: video } => self
                .collect_recent_videos(output, video)
                .await
                .map(RunSummary::Videos),
            Mode::Thumbnails { media_dir } => self
                .download_thumbnails(media_dir)
                .await
                .map(RunSummary::Thumbnails),
        }
    }
}
