//! Pipeline scenarios: scripted feed in, artifact records out.
//!
//! The feed and chain are the only fakes — the store and pipeline under
//! test are the real ones.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;

use mintloom_chain::SimulatedChain;
use mintloom_common::{
    MediaKind, MediaRef, Mention, MentionBatch, MintState, META_CONTENT_HASH, META_TOKEN_ID,
};
use mintloom_ingest::fixtures::FixtureFeed;
use mintloom_ingest::{Ingestor, MentionSource};
use mintloom_store::ArtifactStore;

const TIMEOUT: Duration = Duration::from_secs(5);

/// Feed that serves pre-scripted batches and records the cursors it saw.
struct ScriptedFeed {
    batches: Mutex<VecDeque<MentionBatch>>,
    cursors_seen: Mutex<Vec<Option<String>>>,
}

impl ScriptedFeed {
    fn new(batches: Vec<MentionBatch>) -> Self {
        Self {
            batches: Mutex::new(batches.into()),
            cursors_seen: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl MentionSource for ScriptedFeed {
    async fn fetch_since(&self, cursor: Option<&str>) -> Result<MentionBatch> {
        self.cursors_seen
            .lock()
            .await
            .push(cursor.map(String::from));
        Ok(self
            .batches
            .lock()
            .await
            .pop_front()
            .unwrap_or_default())
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

fn photo_mention(source_id: &str, author_id: &str, handle: &str, text: &str) -> Mention {
    Mention {
        source_id: source_id.to_string(),
        author_external_id: author_id.to_string(),
        author_handle: Some(handle.to_string()),
        author_profile_image: None,
        text: text.to_string(),
        media: vec![MediaRef {
            kind: MediaKind::Photo,
            url: Some(format!("https://img.example/{source_id}.png")),
            preview_url: None,
        }],
        linked_urls: vec![],
        posted_at: None,
    }
}

fn ingestor(store: Arc<ArtifactStore>, source: Arc<dyn MentionSource>) -> Ingestor {
    Ingestor::new(
        store,
        source,
        Arc::new(SimulatedChain::new()),
        "mintloom_xyz",
        TIMEOUT,
        TIMEOUT,
    )
}

#[tokio::test]
async fn two_mentions_same_author_share_identity_and_wallet() {
    let store = Arc::new(ArtifactStore::new());
    let feed = Arc::new(ScriptedFeed::new(vec![MentionBatch {
        mentions: vec![
            photo_mention("m1", "x99", "ada", "Title: First | Description: one"),
            photo_mention("m2", "x99", "ada", "Title: Second | Description: two"),
        ],
        next_cursor: Some("m2".to_string()),
    }]));

    let stats = ingestor(store.clone(), feed).run_once().await.unwrap();
    assert_eq!(stats.minted, 2);
    assert_eq!(stats.identities_created, 1);

    let identity = store.identity_by_external_id("x99").await.unwrap();
    assert_eq!(identity.handle, "ada");
    let wallet = store.wallet_by_identity(identity.id).await.unwrap();

    let artifacts = store.by_creator(identity.id).await;
    assert_eq!(artifacts.len(), 2);
    for artifact in &artifacts {
        assert_eq!(artifact.state, MintState::Lazy);
        assert_eq!(artifact.wallet_address, wallet.address);
        assert!(artifact.metadata.get(META_TOKEN_ID).is_some());
        assert!(artifact.metadata.get(META_CONTENT_HASH).is_some());
        assert!(artifact
            .transactions
            .as_deref()
            .unwrap()
            .starts_with("Lazy minted on "));
    }
}

#[tokio::test]
async fn replayed_mention_is_deduplicated_not_failed() {
    let store = Arc::new(ArtifactStore::new());
    let same = photo_mention("m1", "x99", "ada", "Title: A | Description: B");
    let feed = Arc::new(ScriptedFeed::new(vec![
        MentionBatch {
            mentions: vec![same.clone()],
            next_cursor: Some("m1".to_string()),
        },
        // Cursor replay re-delivers the same event.
        MentionBatch {
            mentions: vec![same],
            next_cursor: Some("m1".to_string()),
        },
    ]));

    let ing = ingestor(store.clone(), feed);
    let first = ing.run_once().await.unwrap();
    assert_eq!(first.minted, 1);

    let second = ing.run_once().await.unwrap();
    assert_eq!(second.minted, 0);
    assert_eq!(second.duplicates, 1);
    assert_eq!(second.failed, 0);

    assert_eq!(store.by_source("m1").await.len(), 1);
}

#[tokio::test]
async fn imageless_mention_is_skipped_by_policy() {
    let store = Arc::new(ArtifactStore::new());
    let mut no_image = photo_mention("m1", "x99", "ada", "mint this please");
    no_image.media.clear();
    no_image.linked_urls = vec!["https://example.com/not-an-image".to_string()];

    let feed = Arc::new(ScriptedFeed::new(vec![MentionBatch {
        mentions: vec![no_image],
        next_cursor: None,
    }]));

    let stats = ingestor(store.clone(), feed).run_once().await.unwrap();
    assert_eq!(stats.no_image, 1);
    assert_eq!(stats.minted, 0);
    assert_eq!(stats.failed, 0);
    assert!(store.newest_first().await.is_empty());
    // No identity was provisioned for a mention that produced nothing.
    assert!(store.identity_by_external_id("x99").await.is_none());
}

#[tokio::test]
async fn one_bad_mention_never_aborts_the_batch() {
    let store = Arc::new(ArtifactStore::new());
    // Cleans to nothing → parse failure inside the pipeline.
    let bad = photo_mention("m1", "x1", "ada", "@mintloom_xyz");
    let good = photo_mention("m2", "x2", "bo", "Title: Fine | Description: piece");

    let feed = Arc::new(ScriptedFeed::new(vec![MentionBatch {
        mentions: vec![bad, good],
        next_cursor: None,
    }]));

    let stats = ingestor(store.clone(), feed).run_once().await.unwrap();
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.minted, 1);

    let identity = store.identity_by_external_id("x2").await.unwrap();
    assert_eq!(store.by_creator(identity.id).await.len(), 1);
}

#[tokio::test]
async fn cursor_advances_and_replays_across_polls() {
    let store = Arc::new(ArtifactStore::new());
    let feed = Arc::new(ScriptedFeed::new(vec![
        MentionBatch {
            mentions: vec![],
            next_cursor: Some("c1".to_string()),
        },
        // Empty window: no cursor update, previous one must be reused.
        MentionBatch {
            mentions: vec![],
            next_cursor: None,
        },
        MentionBatch::default(),
    ]));

    let ing = ingestor(store, feed.clone());
    ing.run_once().await.unwrap();
    ing.run_once().await.unwrap();
    ing.run_once().await.unwrap();

    let seen = feed.cursors_seen.lock().await.clone();
    assert_eq!(
        seen,
        vec![None, Some("c1".to_string()), Some("c1".to_string())]
    );
}

#[tokio::test]
async fn fixture_feed_mints_two_of_three_then_runs_dry() {
    let store = Arc::new(ArtifactStore::new());
    let ing = ingestor(store.clone(), Arc::new(FixtureFeed::new()));

    let first = ing.run_once().await.unwrap();
    assert_eq!(first.fetched, 3);
    assert_eq!(first.minted, 2);
    assert_eq!(first.no_image, 1);

    let second = ing.run_once().await.unwrap();
    assert_eq!(second.fetched, 0);

    // Both fixture artifacts belong to the same creator.
    let identity = store.identity_by_external_id("fixture_user_1").await.unwrap();
    assert_eq!(identity.handle, "willow_render");
    assert_eq!(store.by_creator(identity.id).await.len(), 2);
    // The imageless author never got provisioned.
    assert!(store.identity_by_external_id("fixture_user_2").await.is_none());
}

#[tokio::test]
async fn feed_without_handles_gets_fallback_handles() {
    let store = Arc::new(ArtifactStore::new());
    let mut anon = photo_mention("m1", "x777", "ignored", "Title: A | Description: B");
    anon.author_handle = None;

    let feed = Arc::new(ScriptedFeed::new(vec![MentionBatch {
        mentions: vec![anon],
        next_cursor: None,
    }]));

    ingestor(store.clone(), feed).run_once().await.unwrap();
    let identity = store.identity_by_external_id("x777").await.unwrap();
    assert_eq!(identity.handle, "user_x777");
}
