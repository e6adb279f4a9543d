// Trait abstraction for the mention feed.
//
// MentionSource is the pipeline's only view of the outside feed: one method
// returning a batch of normalized events plus an opaque cursor. The X API
// client and the fixture feed both sit behind it, which makes the pipeline
// deterministic under test — no network, no tokens.

use anyhow::Result;
use async_trait::async_trait;

use mintloom_common::{MediaKind, MediaRef, Mention, MentionBatch};
use xmention_client::{Includes, Tweet, XMentionClient};

#[async_trait]
pub trait MentionSource: Send + Sync {
    /// Fetch mention events newer than `cursor`, in feed order, plus the
    /// cursor for the next poll. The cursor is opaque to the caller.
    async fn fetch_since(&self, cursor: Option<&str>) -> Result<MentionBatch>;

    fn name(&self) -> &str;
}

// ---------------------------------------------------------------------------
// XMentionFeed — live feed over the X API v2 recent search
// ---------------------------------------------------------------------------

/// Live mention feed. The cursor is the newest tweet id seen so far,
/// replayed as `since_id` on the next poll.
pub struct XMentionFeed {
    client: XMentionClient,
    handle: String,
    page_size: u32,
}

impl XMentionFeed {
    pub fn new(bearer_token: String, handle: &str, page_size: u32) -> Self {
        Self {
            client: XMentionClient::new(bearer_token),
            handle: handle.to_string(),
            page_size,
        }
    }
}

#[async_trait]
impl MentionSource for XMentionFeed {
    async fn fetch_since(&self, cursor: Option<&str>) -> Result<MentionBatch> {
        let resp = self
            .client
            .search_mentions(&self.handle, cursor, self.page_size)
            .await?;

        let includes = resp.includes.unwrap_or_default();
        let mentions = resp
            .data
            .iter()
            .filter_map(|tweet| normalize_tweet(tweet, &includes))
            .collect();

        // No newest_id (empty window) → keep the previous cursor.
        let next_cursor = resp.meta.and_then(|m| m.newest_id);
        Ok(MentionBatch {
            mentions,
            next_cursor,
        })
    }

    fn name(&self) -> &str {
        "x-api"
    }
}

/// Join a tweet with its expansion objects into a normalized mention.
/// Tweets without an author id cannot be attributed and are dropped.
fn normalize_tweet(tweet: &Tweet, includes: &Includes) -> Option<Mention> {
    let author_external_id = tweet.author_id.clone()?;

    let author = includes.users.iter().find(|u| u.id == author_external_id);

    let media_keys: &[String] = tweet
        .attachments
        .as_ref()
        .map(|a| a.media_keys.as_slice())
        .unwrap_or_default();
    let media = includes
        .media
        .iter()
        .filter(|m| media_keys.contains(&m.media_key))
        .map(|m| MediaRef {
            kind: MediaKind::from_api(&m.kind),
            url: m.url.clone(),
            preview_url: m.preview_image_url.clone(),
        })
        .collect();

    let linked_urls = tweet
        .entities
        .as_ref()
        .map(|e| e.urls.iter().filter_map(|u| u.expanded_url.clone()).collect())
        .unwrap_or_default();

    Some(Mention {
        source_id: tweet.id.clone(),
        author_external_id,
        author_handle: author.map(|u| u.username.clone()),
        author_profile_image: author.and_then(|u| u.profile_image_url.clone()),
        text: tweet.text.clone(),
        media,
        linked_urls,
        posted_at: tweet.created_at,
    })
}
