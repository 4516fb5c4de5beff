//! metube core library.
//!
//! Mirrors a YouTube subscription list into a local CSV cache and runs
//! two workflows on top of it:
//!
//! - collecting the recent video IDs of every subscribed channel
//! - downloading channel thumbnails into a media library
//!
//! The `metube` binary in `metube-cli` is a thin wrapper over [`sync::Syncer`].

pub mod api;
pub mod cache;
pub mod config;
pub mod models;
pub mod sync;
pub mod utils;

pub use api::{ApiClient, ApiConfig, ApiError};
pub use cache::{CacheError, SubscriptionCache};
pub use config::{Config, Settings};
pub use models::Channel;
pub use sync::{Mode, RunOptions, RunSummary, Syncer, VideoOptions};
