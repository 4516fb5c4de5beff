//! REST API client module for the YouTube Data API.
//!
//! This module provides the `ApiClient` for listing a channel's
//! subscriptions and the most recent uploads of a channel.
//!
//! Every API request is authorized with a static API key passed as the
//! `key` query parameter.

pub mod client;
pub mod error;

pub use client::{ApiClient, ApiConfig, DEFAULT_API_BASE_URL};
pub use error::ApiError;
