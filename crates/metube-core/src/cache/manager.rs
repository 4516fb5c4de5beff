use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use csv::StringRecord;
use tracing::debug;

use crate::models::Channel;
use crate::utils::{format_age, write_atomic};

use super::CacheError;

/// Column names, in the order they are written.
const HEADER: [&str; 3] = ["id", "title", "thumbnail"];

/// When the cache file was last written.
#[derive(Debug, Clone, Copy)]
pub struct CacheAge {
    pub written_at: DateTime<Utc>,
}

impl CacheAge {
    pub fn age_minutes(&self) -> i64 {
        (Utc::now() - self.written_at).num_minutes()
    }

    pub fn age_display(&self) -> String {
        format_age(self.age_minutes())
    }
}

pub struct SubscriptionCache {
    path: PathBuf,
}

impl SubscriptionCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the cache with `channels`, header first, in input order.
    pub fn save(&self, channels: &[Channel]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create cache directory {}", parent.display()))?;
        }

        // Header is written by hand so an empty list still gets one
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        writer.write_record(HEADER)?;
        for channel in channels {
            writer.serialize(channel)?;
        }
        let contents = writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("Failed to encode subscription cache: {}", e.error()))?;

        write_atomic(&self.path, &contents)?;
        debug!(path = %self.path.display(), count = channels.len(), "Saved subscription cache");
        Ok(())
    }

    /// Read every channel in file order.
    pub fn load(&self) -> Result<Vec<Channel>> {
        if !self.path.exists() {
            return Err(CacheError::Missing(self.path.clone()).into());
        }

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)
            .with_context(|| format!("Failed to open cache file: {}", self.path.display()))?;

        let headers = reader
            .headers()
            .with_context(|| format!("Failed to read cache header: {}", self.path.display()))?
            .clone();
        let columns = Columns::locate(&headers)?;

        let mut channels = Vec::new();
        for result in reader.records() {
            let record = result
                .with_context(|| format!("Failed to read cache file: {}", self.path.display()))?;
            channels.push(columns.channel(&record, headers.len())?);
        }

        debug!(path = %self.path.display(), count = channels.len(), "Loaded subscription cache");
        Ok(channels)
    }

    /// Age of the cache file, or None if it has never been written.
    pub fn age(&self) -> Option<CacheAge> {
        let modified = std::fs::metadata(&self.path).ok()?.modified().ok()?;
        Some(CacheAge {
            written_at: DateTime::<Utc>::from(modified),
        })
    }
}

/// Header positions of the three channel fields.
struct Columns {
    id: usize,
    title: usize,
    thumbnail: usize,
}

impl Columns {
    fn locate(headers: &StringRecord) -> Result<Self, CacheError> {
        let find = |name: &str| {
            headers.iter().position(|h| h == name).ok_or_else(|| CacheError::Format {
                line: 1,
                message: format!("header is missing the {:?} column", name),
            })
        };
        Ok(Self {
            id: find(HEADER[0])?,
            title: find(HEADER[1])?,
            thumbnail: find(HEADER[2])?,
        })
    }

    fn channel(&self, record: &StringRecord, width: usize) -> Result<Channel, CacheError> {
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        if record.len() != width {
            return Err(CacheError::Format {
                line,
                message: format!("expected {} fields, found {}", width, record.len()),
            });
        }

        let field = |index: usize, name: &str| match record.get(index) {
            Some(value) if !value.is_empty() => Ok(value.to_string()),
            _ => Err(CacheError::Format {
                line,
                message: format!("{} is empty", name),
            }),
        };

        Ok(Channel {
            id: field(self.id, HEADER[0])?,
            title: field(self.title, HEADER[1])?,
            thumbnail: field(self.thumbnail, HEADER[2])?,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
