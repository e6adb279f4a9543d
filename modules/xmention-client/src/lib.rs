//! Pure X API v2 REST client for mention search.
//!
//! HTTP glue and wire types only — normalization into domain events happens
//! in the consumer. Auth is a bearer token; the only endpoint used is
//! recent search scoped to `@handle` mentions.

pub mod error;
pub mod types;

pub use error::{Result, XApiError};
pub use types::{
    ApiMedia, ApiUser, Attachments, Includes, SearchMeta, SearchResponse, Tweet, TweetEntities,
    UrlEntity,
};

const BASE_URL: &str = "https://api.twitter.com/2";

/// Tweet fields, expansions, and media fields requested with every search.
/// Everything the ingestion pipeline needs arrives in one round trip.
const SEARCH_FIELDS: &[(&str, &str)] = &[
    ("tweet.fields", "created_at,author_id,entities,attachments"),
    ("expansions", "author_id,attachments.media_keys"),
    ("user.fields", "username,profile_image_url"),
    ("media.fields", "url,preview_image_url,type"),
];

pub struct XMentionClient {
    client: reqwest::Client,
    bearer_token: String,
}

impl XMentionClient {
    pub fn new(bearer_token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            bearer_token,
        }
    }

    /// Search recent tweets mentioning `@handle`, newest window first.
    ///
    /// `since_id` bounds the search to tweets newer than the given tweet id,
    /// which makes re-polling replay-safe (no clock skew, no missed window).
    pub async fn search_mentions(
        &self,
        handle: &str,
        since_id: Option<&str>,
        max_results: u32,
    ) -> Result<SearchResponse> {
        let url = format!("{}/tweets/search/recent", BASE_URL);

        // The API rejects max_results outside 10..=100.
        let max_results = max_results.clamp(10, 100).to_string();
        let query = format!("@{handle}");

        let mut params: Vec<(&str, &str)> = vec![
            ("query", query.as_str()),
            ("max_results", max_results.as_str()),
        ];
        if let Some(since_id) = since_id {
            params.push(("since_id", since_id));
        }
        params.extend_from_slice(SEARCH_FIELDS);

        tracing::debug!(handle, since_id = since_id.unwrap_or("-"), "Searching recent mentions");

        let resp = self
            .client
            .get(&url)
            .query(&params)
            .bearer_auth(&self.bearer_token)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(XApiError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let search: SearchResponse = resp.json().await?;
        tracing::debug!(count = search.data.len(), "Mention search returned");
        Ok(search)
    }
}
