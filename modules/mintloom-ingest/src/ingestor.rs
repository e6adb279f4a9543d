//! The ingestion pipeline: poll → dedup → provision → parse → lazy-mint.
//!
//! One run processes a single feed page, sequentially and in feed order.
//! A bad mention never aborts the batch: per-mention failures are logged
//! and counted, and the loop moves on.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::Value;
use tokio::sync::{watch, Mutex};
use tracing::{info, warn};
use uuid::Uuid;

use mintloom_chain::{ChainAdapter, NftMetadata};
use mintloom_common::{
    ArtifactDraft, Mention, MintError, NewIdentity, META_CONTENT_HASH, META_TOKEN_ID,
};
use mintloom_store::ArtifactStore;

use crate::parser::{self, MentionParser};
use crate::traits::MentionSource;

/// Counters from one ingestion run.
#[derive(Debug, Default, Clone, Copy)]
pub struct IngestStats {
    pub fetched: u32,
    pub duplicates: u32,
    pub no_image: u32,
    pub identities_created: u32,
    pub minted: u32,
    pub failed: u32,
}

impl std::fmt::Display for IngestStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "fetched={} minted={} duplicates={} no_image={} identities_created={} failed={}",
            self.fetched,
            self.minted,
            self.duplicates,
            self.no_image,
            self.identities_created,
            self.failed
        )
    }
}

enum MentionOutcome {
    Minted { created_identity: bool },
    NoImage,
}

pub struct Ingestor {
    store: Arc<ArtifactStore>,
    source: Arc<dyn MentionSource>,
    chain: Arc<dyn ChainAdapter>,
    parser: MentionParser,
    fetch_timeout: Duration,
    chain_timeout: Duration,
    /// Replayed across polls so no feed window is missed on restart of the
    /// loop; the store's dedup index covers re-delivery.
    cursor: Mutex<Option<String>>,
}

impl Ingestor {
    pub fn new(
        store: Arc<ArtifactStore>,
        source: Arc<dyn MentionSource>,
        chain: Arc<dyn ChainAdapter>,
        handle: &str,
        fetch_timeout: Duration,
        chain_timeout: Duration,
    ) -> Self {
        Self {
            store,
            source,
            chain,
            parser: MentionParser::new(handle),
            fetch_timeout,
            chain_timeout,
            cursor: Mutex::new(None),
        }
    }

    /// Run one ingestion cycle. Same semantics as a scheduled run.
    pub async fn run_once(&self) -> anyhow::Result<IngestStats> {
        self.run_batch(None).await
    }

    /// Run one cycle, stopping after the in-flight mention if `shutdown`
    /// flips. Fetch failure is a run failure; the caller retries next tick.
    pub(crate) async fn run_batch(
        &self,
        shutdown: Option<&watch::Receiver<bool>>,
    ) -> anyhow::Result<IngestStats> {
        let run_id = Uuid::new_v4().to_string();
        info!(run_id = run_id.as_str(), source = self.source.name(), "Checking for new mentions");

        let mut cursor = self.cursor.lock().await;
        let batch = tokio::time::timeout(
            self.fetch_timeout,
            self.source.fetch_since(cursor.as_deref()),
        )
        .await
        .map_err(|_| anyhow::anyhow!("mention fetch timed out"))??;

        if let Some(next) = batch.next_cursor {
            *cursor = Some(next);
        }
        drop(cursor);

        let mut stats = IngestStats {
            fetched: batch.mentions.len() as u32,
            ..IngestStats::default()
        };

        for mention in &batch.mentions {
            if shutdown.is_some_and(|s| *s.borrow()) {
                info!(run_id = run_id.as_str(), "Shutdown requested, stopping before next mention");
                break;
            }

            match self.process_mention(mention).await {
                Ok(MentionOutcome::Minted { created_identity }) => {
                    stats.minted += 1;
                    if created_identity {
                        stats.identities_created += 1;
                    }
                }
                Ok(MentionOutcome::NoImage) => stats.no_image += 1,
                // Expected on cursor replay and on races — not a failure.
                Err(MintError::Duplicate(_)) => stats.duplicates += 1,
                Err(e) => {
                    warn!(
                        source_id = mention.source_id.as_str(),
                        error = %e,
                        "Failed to process mention, continuing"
                    );
                    stats.failed += 1;
                }
            }
        }

        info!(
            run_id = run_id.as_str(),
            fetched = stats.fetched,
            minted = stats.minted,
            duplicates = stats.duplicates,
            no_image = stats.no_image,
            failed = stats.failed,
            "Ingestion run complete"
        );
        Ok(stats)
    }

    async fn process_mention(&self, mention: &Mention) -> Result<MentionOutcome, MintError> {
        // 1. Already ingested? Cheap index check before any provisioning.
        if self.store.already_ingested(&mention.source_id).await {
            return Err(MintError::Duplicate(format!("mention {}", mention.source_id)));
        }

        // 2. Images are mandatory. Policy, not an error.
        let Some(image_url) = parser::resolve_image(mention) else {
            info!(source_id = mention.source_id.as_str(), "No usable image, skipping mention");
            return Ok(MentionOutcome::NoImage);
        };

        // 3. Identity by external id first, create on first sighting.
        let (identity, created_identity) = match self
            .store
            .identity_by_external_id(&mention.author_external_id)
            .await
        {
            Some(identity) => (identity, false),
            None => {
                let handle = mention
                    .author_handle
                    .clone()
                    .unwrap_or_else(|| format!("user_{}", mention.author_external_id));
                let identity = self
                    .store
                    .create_identity(NewIdentity {
                        handle,
                        profile_ref: mention.author_profile_image.clone(),
                        external_id: Some(mention.author_external_id.clone()),
                    })
                    .await?;
                (identity, true)
            }
        };

        let wallet = tokio::time::timeout(
            self.chain_timeout,
            self.store.get_or_create_wallet(identity.id, self.chain.as_ref()),
        )
        .await
        .map_err(|_| MintError::Chain("wallet generation timed out".to_string()))??;

        // 4. Title and description from the mention text.
        let parsed = self.parser.parse(&mention.text)?;

        // 5. Prepare the off-chain mint.
        let posted = mention
            .posted_at
            .unwrap_or_else(Utc::now)
            .to_rfc3339();
        let metadata = NftMetadata::new(&parsed.title, &parsed.description, &image_url, &identity.handle)
            .with_attribute("Mention ID", &mention.source_id)
            .with_attribute("Posted", &posted);

        let lazy = tokio::time::timeout(self.chain_timeout, self.chain.prepare_lazy_mint(&metadata))
            .await
            .map_err(|_| MintError::Chain("lazy mint preparation timed out".to_string()))?
            .map_err(|e| MintError::Chain(e.to_string()))?;

        // 6. Persist as lazy. The token id and content hash ride in the blob.
        let mut blob = metadata.to_map();
        blob.insert(META_TOKEN_ID.to_string(), Value::String(lazy.token_id.clone()));
        blob.insert(
            META_CONTENT_HASH.to_string(),
            Value::String(lazy.content_hash.clone()),
        );

        let artifact = self
            .store
            .create_artifact(ArtifactDraft {
                title: parsed.title,
                description: Some(parsed.description),
                image_url,
                creator: identity.id,
                wallet_address: wallet.address,
                source_id: Some(mention.source_id.clone()),
                metadata: blob,
                featured: false,
                transactions: Some(format!("Lazy minted on {}", Utc::now().date_naive())),
                price: None,
            })
            .await?;

        info!(
            artifact_id = artifact.id,
            source_id = mention.source_id.as_str(),
            creator = identity.handle.as_str(),
            token_id = lazy.token_id.as_str(),
            "Lazy minted artifact from mention"
        );
        Ok(MentionOutcome::Minted { created_identity })
    }
}
