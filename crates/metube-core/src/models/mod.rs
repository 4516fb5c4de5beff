//! Data models for subscription data.
//!
//! - `Channel`: a subscribed channel, the record kept in the subscription cache
//! - `Page`, `SubscriptionItem`, `SearchItem`: API response wrappers

pub mod channel;

pub use channel::{Channel, Page, SearchItem, SubscriptionItem};
