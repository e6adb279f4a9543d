//! Wire types for the X API v2 recent-search response.
//!
//! Field names mirror the API payload; everything the search can legally
//! omit is optional or defaulted so a sparse response never fails to parse.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Top-level response of `GET /2/tweets/search/recent`.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub data: Vec<Tweet>,
    pub includes: Option<Includes>,
    pub meta: Option<SearchMeta>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Tweet {
    pub id: String,
    pub text: String,
    pub author_id: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub attachments: Option<Attachments>,
    pub entities: Option<TweetEntities>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Attachments {
    #[serde(default)]
    pub media_keys: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TweetEntities {
    #[serde(default)]
    pub urls: Vec<UrlEntity>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UrlEntity {
    pub expanded_url: Option<String>,
}

/// Expansion objects joined to tweets via `author_id` and `media_keys`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Includes {
    #[serde(default)]
    pub users: Vec<ApiUser>,
    #[serde(default)]
    pub media: Vec<ApiMedia>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiUser {
    pub id: String,
    pub username: String,
    pub profile_image_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiMedia {
    pub media_key: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub url: Option<String>,
    pub preview_image_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchMeta {
    pub newest_id: Option<String>,
    pub oldest_id: Option<String>,
    pub result_count: Option<u32>,
    pub next_token: Option<String>,
}
