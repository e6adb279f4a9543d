//! Consumer-facing operations.
//!
//! The HTTP layer (external to this workspace) calls these and maps the
//! `MintError` taxonomy to status codes. Nothing here adds semantics beyond
//! wiring the store, chain, ingestor, and lifecycle together.

use std::sync::Arc;
use std::time::Duration;

use mintloom_chain::ChainAdapter;
use mintloom_common::{Artifact, Identity, MintError, NewIdentity, Wallet};
use mintloom_store::ArtifactStore;

use crate::ingestor::{IngestStats, Ingestor};
use crate::lifecycle::LifecycleController;

pub struct Mintloom {
    store: Arc<ArtifactStore>,
    chain: Arc<dyn ChainAdapter>,
    ingestor: Arc<Ingestor>,
    lifecycle: LifecycleController,
}

impl Mintloom {
    pub fn new(
        store: Arc<ArtifactStore>,
        chain: Arc<dyn ChainAdapter>,
        ingestor: Arc<Ingestor>,
        chain_timeout: Duration,
    ) -> Self {
        let lifecycle = LifecycleController::new(store.clone(), chain.clone(), chain_timeout);
        Self {
            store,
            chain,
            ingestor,
            lifecycle,
        }
    }

    /// Manual ingestion trigger. Same semantics as a scheduled run.
    pub async fn ingest_once(&self) -> anyhow::Result<IngestStats> {
        self.ingestor.run_once().await
    }

    /// Connect flow: get or create the identity for a handle, with its
    /// wallet. Idempotent — reconnecting returns the same pair.
    pub async fn connect(&self, handle: &str) -> Result<(Identity, Wallet), MintError> {
        let identity = match self.store.identity_by_handle(handle).await {
            Some(identity) => identity,
            None => {
                self.store
                    .create_identity(NewIdentity {
                        handle: handle.to_string(),
                        ..Default::default()
                    })
                    .await?
            }
        };
        let wallet = self
            .store
            .get_or_create_wallet(identity.id, self.chain.as_ref())
            .await?;
        Ok((identity, wallet))
    }

    pub async fn wallet_balance(&self, identity_id: i64) -> Result<u64, MintError> {
        let wallet = self
            .store
            .wallet_by_identity(identity_id)
            .await
            .ok_or_else(|| MintError::NotFound(format!("wallet for identity {identity_id}")))?;
        self.chain
            .get_balance(&wallet.address)
            .await
            .map_err(|e| MintError::Chain(e.to_string()))
    }

    pub async fn list_by_creator(&self, identity_id: i64) -> Vec<Artifact> {
        self.store.by_creator(identity_id).await
    }

    pub async fn list_featured(&self) -> Vec<Artifact> {
        self.store.featured().await
    }

    pub async fn list_newest_first(&self) -> Vec<Artifact> {
        self.store.newest_first().await
    }

    /// Detail read. Bumps the view counter as a side effect.
    pub async fn get_artifact(&self, id: i64) -> Result<Artifact, MintError> {
        self.store
            .artifact_detail(id)
            .await
            .ok_or_else(|| MintError::NotFound(format!("artifact {id}")))
    }

    pub async fn finalize(
        &self,
        artifact_id: i64,
        buyer_address: &str,
    ) -> Result<String, MintError> {
        self.lifecycle.finalize(artifact_id, buyer_address).await
    }
}
