//! Finalize: the explicit lazy → finalized transition.
//!
//! Ordering matters here: the chain call happens first, and the store write
//! second. A failed chain call leaves the artifact `Lazy` with nothing to
//! roll back; the store's own state check settles concurrent double-buys.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::info;

use mintloom_chain::ChainAdapter;
use mintloom_common::{MintError, MintState, META_CONTENT_HASH, META_TOKEN_ID};
use mintloom_store::ArtifactStore;

pub struct LifecycleController {
    store: Arc<ArtifactStore>,
    chain: Arc<dyn ChainAdapter>,
    chain_timeout: Duration,
}

impl LifecycleController {
    pub fn new(
        store: Arc<ArtifactStore>,
        chain: Arc<dyn ChainAdapter>,
        chain_timeout: Duration,
    ) -> Self {
        Self {
            store,
            chain,
            chain_timeout,
        }
    }

    /// Execute the on-chain mint/transfer and freeze the ownership record.
    /// Returns the transaction ref.
    pub async fn finalize(
        &self,
        artifact_id: i64,
        buyer_address: &str,
    ) -> Result<String, MintError> {
        let artifact = self
            .store
            .artifact(artifact_id)
            .await
            .ok_or_else(|| MintError::NotFound(format!("artifact {artifact_id}")))?;

        if artifact.state != MintState::Lazy {
            return Err(MintError::InvalidState(format!(
                "artifact {artifact_id} is already {}",
                artifact.state
            )));
        }

        let token_id = metadata_str(&artifact.metadata, META_TOKEN_ID).ok_or_else(|| {
            MintError::InvalidState(format!("artifact {artifact_id} has no prepared token id"))
        })?;
        let content_hash = metadata_str(&artifact.metadata, META_CONTENT_HASH).ok_or_else(|| {
            MintError::InvalidState(format!("artifact {artifact_id} has no content hash"))
        })?;

        let receipt = tokio::time::timeout(
            self.chain_timeout,
            self.chain.finalize_mint(token_id, content_hash, buyer_address),
        )
        .await
        .map_err(|_| MintError::Chain("on-chain mint timed out".to_string()))?
        .map_err(|e| MintError::Chain(e.to_string()))?;

        // The store re-checks state under its write lock, so a concurrent
        // finalize that slipped past the check above still loses here.
        let note = format!(
            "Transferred to {buyer_address} on {}",
            chrono::Utc::now().date_naive()
        );
        self.store
            .mark_finalized(artifact_id, buyer_address, &note)
            .await?;

        info!(
            artifact_id,
            buyer = buyer_address,
            tx = receipt.transaction_ref.as_str(),
            "Artifact finalized on-chain"
        );
        Ok(receipt.transaction_ref)
    }
}

fn metadata_str<'a>(
    metadata: &'a serde_json::Map<String, Value>,
    key: &str,
) -> Option<&'a str> {
    metadata.get(key).and_then(Value::as_str)
}
