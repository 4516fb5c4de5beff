//! Local subscription cache.
//!
//! This module provides the `SubscriptionCache`, a CSV file holding the
//! last synced list of subscribed channels. The file is always rewritten
//! whole, never patched in place.

pub mod error;
pub mod manager;

pub use error::CacheError;
pub use manager::{CacheAge, SubscriptionCache};
