//! Indexed in-memory repository for Identity, Wallet, and Artifact records.
//!
//! All mutation goes through this type. Indexes are maintained inside each
//! mutating method, under the same write lock as the owning write, so a
//! reader never sees an index entry pointing at a missing record. Compound
//! check-then-act operations (`get_or_create_wallet`, the dedup check in
//! `create_artifact`, `mark_finalized`) hold the write lock for their whole
//! critical section.
//!
//! Every read returns an owned clone. Callers cannot mutate store state
//! through returned values.

use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use mintloom_chain::ChainAdapter;
use mintloom_common::{Artifact, ArtifactDraft, Identity, MintError, MintState, NewIdentity, Wallet};

#[derive(Default)]
struct StoreInner {
    identities: HashMap<i64, Identity>,
    wallets: HashMap<i64, Wallet>,
    artifacts: HashMap<i64, Artifact>,

    next_identity_id: i64,
    next_wallet_id: i64,
    next_artifact_id: i64,

    // Secondary indexes. Maintained transactionally with the entity maps.
    handle_to_identity: HashMap<String, i64>,
    external_to_identity: HashMap<String, i64>,
    identity_to_wallet: HashMap<i64, i64>,
    /// Dedup index. Modeled as a set of ids to tolerate races; practically 0|1.
    source_to_artifacts: HashMap<String, Vec<i64>>,
    creator_to_artifacts: HashMap<i64, Vec<i64>>,
}

impl StoreInner {
    fn new() -> Self {
        Self {
            next_identity_id: 1,
            next_wallet_id: 1,
            next_artifact_id: 1,
            ..Self::default()
        }
    }
}

pub struct ArtifactStore {
    inner: RwLock<StoreInner>,
}

impl ArtifactStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(StoreInner::new()),
        }
    }

    // --- Identity operations ---

    /// Create an identity. Fails with `Conflict` if the handle is taken.
    /// If `external_id` is already indexed, returns the existing identity
    /// instead — ingestion must never fail merely because an account was
    /// seen twice.
    pub async fn create_identity(&self, new: NewIdentity) -> Result<Identity, MintError> {
        let mut inner = self.inner.write().await;

        if let Some(external_id) = &new.external_id {
            if let Some(id) = inner.external_to_identity.get(external_id) {
                return Ok(inner.identities[id].clone());
            }
        }
        if inner.handle_to_identity.contains_key(&new.handle) {
            return Err(MintError::Conflict(format!(
                "handle already taken: {}",
                new.handle
            )));
        }

        let id = inner.next_identity_id;
        inner.next_identity_id += 1;
        let identity = Identity {
            id,
            handle: new.handle,
            profile_ref: new.profile_ref,
            external_id: new.external_id,
            created_at: Utc::now(),
        };

        inner
            .handle_to_identity
            .insert(identity.handle.clone(), id);
        if let Some(external_id) = &identity.external_id {
            inner.external_to_identity.insert(external_id.clone(), id);
        }
        inner.identities.insert(id, identity.clone());

        debug!(identity_id = id, handle = identity.handle.as_str(), "Identity created");
        Ok(identity)
    }

    pub async fn identity(&self, id: i64) -> Option<Identity> {
        self.inner.read().await.identities.get(&id).cloned()
    }

    pub async fn identity_by_handle(&self, handle: &str) -> Option<Identity> {
        let inner = self.inner.read().await;
        inner
            .handle_to_identity
            .get(handle)
            .and_then(|id| inner.identities.get(id))
            .cloned()
    }

    pub async fn identity_by_external_id(&self, external_id: &str) -> Option<Identity> {
        let inner = self.inner.read().await;
        inner
            .external_to_identity
            .get(external_id)
            .and_then(|id| inner.identities.get(id))
            .cloned()
    }

    pub async fn identities(&self) -> Vec<Identity> {
        let mut all: Vec<Identity> = self.inner.read().await.identities.values().cloned().collect();
        all.sort_by_key(|i| i.id);
        all
    }

    // --- Wallet operations ---

    /// Return the identity's wallet, creating it via the chain adapter on
    /// first call. Holds the write lock across keypair generation so exactly
    /// one wallet is ever created per identity, even under concurrent
    /// provisioning.
    pub async fn get_or_create_wallet(
        &self,
        identity_id: i64,
        chain: &dyn ChainAdapter,
    ) -> Result<Wallet, MintError> {
        let mut inner = self.inner.write().await;

        if !inner.identities.contains_key(&identity_id) {
            return Err(MintError::NotFound(format!("identity {identity_id}")));
        }
        if let Some(wallet_id) = inner.identity_to_wallet.get(&identity_id) {
            return Ok(inner.wallets[wallet_id].clone());
        }

        let keys = chain
            .generate_wallet()
            .await
            .map_err(|e| MintError::Chain(e.to_string()))?;

        let id = inner.next_wallet_id;
        inner.next_wallet_id += 1;
        let wallet = Wallet {
            id,
            identity_id,
            address: keys.address,
            encrypted_secret: keys.encrypted_secret,
            created_at: Utc::now(),
        };
        inner.wallets.insert(id, wallet.clone());
        inner.identity_to_wallet.insert(identity_id, id);

        debug!(identity_id, wallet_id = id, address = wallet.address.as_str(), "Wallet created");
        Ok(wallet)
    }

    pub async fn wallet_by_identity(&self, identity_id: i64) -> Option<Wallet> {
        let inner = self.inner.read().await;
        inner
            .identity_to_wallet
            .get(&identity_id)
            .and_then(|id| inner.wallets.get(id))
            .cloned()
    }

    // --- Artifact operations ---

    /// Insert an artifact in `Lazy` state. The dedup check and the insert
    /// run under one write lock: `Duplicate` if the draft's source id is
    /// already indexed, with no state mutated.
    pub async fn create_artifact(&self, draft: ArtifactDraft) -> Result<Artifact, MintError> {
        let mut inner = self.inner.write().await;

        if let Some(source_id) = &draft.source_id {
            if inner
                .source_to_artifacts
                .get(source_id)
                .is_some_and(|ids| !ids.is_empty())
            {
                return Err(MintError::Duplicate(format!("mention {source_id}")));
            }
        }

        let id = inner.next_artifact_id;
        inner.next_artifact_id += 1;
        let artifact = Artifact {
            id,
            title: draft.title,
            description: draft.description,
            image_url: draft.image_url,
            creator: draft.creator,
            wallet_address: draft.wallet_address,
            source_id: draft.source_id,
            metadata: draft.metadata,
            minted_at: Utc::now(),
            state: MintState::Lazy,
            featured: draft.featured,
            views: 0,
            transactions: draft.transactions,
            price: draft.price,
        };

        if let Some(source_id) = &artifact.source_id {
            inner
                .source_to_artifacts
                .entry(source_id.clone())
                .or_default()
                .push(id);
        }
        inner
            .creator_to_artifacts
            .entry(artifact.creator)
            .or_default()
            .push(id);
        inner.artifacts.insert(id, artifact.clone());

        debug!(artifact_id = id, creator = artifact.creator, "Artifact created");
        Ok(artifact)
    }

    /// Execute the lazy → finalized transition. Not idempotent: a second
    /// call fails with `InvalidState` and leaves the record unchanged.
    pub async fn mark_finalized(
        &self,
        artifact_id: i64,
        new_wallet_address: &str,
        tx_note: &str,
    ) -> Result<Artifact, MintError> {
        let mut inner = self.inner.write().await;
        let artifact = inner
            .artifacts
            .get_mut(&artifact_id)
            .ok_or_else(|| MintError::NotFound(format!("artifact {artifact_id}")))?;

        if artifact.state == MintState::Finalized {
            return Err(MintError::InvalidState(format!(
                "artifact {artifact_id} is already finalized"
            )));
        }

        artifact.state = MintState::Finalized;
        artifact.wallet_address = new_wallet_address.to_string();
        artifact.transactions = Some(match artifact.transactions.take() {
            Some(log) => format!("{log}\n{tx_note}"),
            None => tx_note.to_string(),
        });

        Ok(artifact.clone())
    }

    /// Bump the view counter. Silent no-op when the artifact is absent —
    /// a read that 404s upstream must not crash this call.
    pub async fn increment_views(&self, artifact_id: i64) {
        let mut inner = self.inner.write().await;
        if let Some(artifact) = inner.artifacts.get_mut(&artifact_id) {
            artifact.views += 1;
        }
    }

    pub async fn artifact(&self, id: i64) -> Option<Artifact> {
        self.inner.read().await.artifacts.get(&id).cloned()
    }

    /// Detail read: bumps the view counter and returns the updated record
    /// in one critical section. The only path that increases views.
    pub async fn artifact_detail(&self, id: i64) -> Option<Artifact> {
        let mut inner = self.inner.write().await;
        let artifact = inner.artifacts.get_mut(&id)?;
        artifact.views += 1;
        Some(artifact.clone())
    }

    pub async fn by_source(&self, source_id: &str) -> Vec<Artifact> {
        let inner = self.inner.read().await;
        inner
            .source_to_artifacts
            .get(source_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| inner.artifacts.get(id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// True when an artifact already exists for this mention.
    pub async fn already_ingested(&self, source_id: &str) -> bool {
        self.inner
            .read()
            .await
            .source_to_artifacts
            .get(source_id)
            .is_some_and(|ids| !ids.is_empty())
    }

    pub async fn by_creator(&self, identity_id: i64) -> Vec<Artifact> {
        let inner = self.inner.read().await;
        inner
            .creator_to_artifacts
            .get(&identity_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| inner.artifacts.get(id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub async fn featured(&self) -> Vec<Artifact> {
        let mut all: Vec<Artifact> = self
            .inner
            .read()
            .await
            .artifacts
            .values()
            .filter(|a| a.featured)
            .cloned()
            .collect();
        all.sort_by_key(|a| a.id);
        all
    }

    /// All artifacts, newest mint first. Id breaks timestamp ties.
    pub async fn newest_first(&self) -> Vec<Artifact> {
        let mut all: Vec<Artifact> = self.inner.read().await.artifacts.values().cloned().collect();
        all.sort_by(|a, b| b.minted_at.cmp(&a.minted_at).then(b.id.cmp(&a.id)));
        all
    }
}

impl Default for ArtifactStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mintloom_chain::SimulatedChain;
    use serde_json::Map;

    fn draft(source_id: Option<&str>, creator: i64) -> ArtifactDraft {
        ArtifactDraft {
            title: "Test".to_string(),
            description: Some("desc".to_string()),
            image_url: "https://img.example/a.png".to_string(),
            creator,
            wallet_address: "addr".to_string(),
            source_id: source_id.map(String::from),
            metadata: Map::new(),
            featured: false,
            transactions: None,
            price: None,
        }
    }

    #[tokio::test]
    async fn handle_conflict_rejected() {
        let store = ArtifactStore::new();
        store
            .create_identity(NewIdentity {
                handle: "ada".into(),
                ..Default::default()
            })
            .await
            .unwrap();

        let err = store
            .create_identity(NewIdentity {
                handle: "ada".into(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, MintError::Conflict(_)));
    }

    #[tokio::test]
    async fn external_id_create_is_idempotent() {
        let store = ArtifactStore::new();
        let first = store
            .create_identity(NewIdentity {
                handle: "ada".into(),
                external_id: Some("x123".into()),
                ..Default::default()
            })
            .await
            .unwrap();

        // Second sighting of the same account, possibly under a changed
        // handle — must return the existing identity, not error.
        let second = store
            .create_identity(NewIdentity {
                handle: "ada_renamed".into(),
                external_id: Some("x123".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.handle, "ada");
    }

    #[tokio::test]
    async fn wallet_provisioning_is_idempotent() {
        let store = ArtifactStore::new();
        let chain = SimulatedChain::new();
        let identity = store
            .create_identity(NewIdentity {
                handle: "ada".into(),
                ..Default::default()
            })
            .await
            .unwrap();

        let first = store.get_or_create_wallet(identity.id, &chain).await.unwrap();
        let second = store.get_or_create_wallet(identity.id, &chain).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(first.address, second.address);
    }

    #[tokio::test]
    async fn wallet_for_unknown_identity_is_not_found() {
        let store = ArtifactStore::new();
        let chain = SimulatedChain::new();
        let err = store.get_or_create_wallet(42, &chain).await.unwrap_err();
        assert!(matches!(err, MintError::NotFound(_)));
    }

    #[tokio::test]
    async fn duplicate_source_id_rejected_without_mutation() {
        let store = ArtifactStore::new();
        store.create_artifact(draft(Some("m1"), 1)).await.unwrap();

        let err = store.create_artifact(draft(Some("m1"), 2)).await.unwrap_err();
        assert!(matches!(err, MintError::Duplicate(_)));
        assert_eq!(store.by_source("m1").await.len(), 1);
        assert!(store.by_creator(2).await.is_empty());
    }

    #[tokio::test]
    async fn artifacts_without_source_id_never_collide() {
        let store = ArtifactStore::new();
        store.create_artifact(draft(None, 1)).await.unwrap();
        store.create_artifact(draft(None, 1)).await.unwrap();
        assert_eq!(store.by_creator(1).await.len(), 2);
    }

    #[tokio::test]
    async fn finalize_transitions_once() {
        let store = ArtifactStore::new();
        let artifact = store.create_artifact(draft(Some("m1"), 1)).await.unwrap();
        assert_eq!(artifact.state, MintState::Lazy);

        let finalized = store
            .mark_finalized(artifact.id, "buyer_addr", "Transferred on 2026-08-06")
            .await
            .unwrap();
        assert_eq!(finalized.state, MintState::Finalized);
        assert_eq!(finalized.wallet_address, "buyer_addr");
        assert!(finalized.transactions.unwrap().contains("Transferred"));

        let err = store
            .mark_finalized(artifact.id, "other_buyer", "again")
            .await
            .unwrap_err();
        assert!(matches!(err, MintError::InvalidState(_)));

        // Losing call left the record untouched.
        let stored = store.artifact(artifact.id).await.unwrap();
        assert_eq!(stored.wallet_address, "buyer_addr");
    }

    #[tokio::test]
    async fn finalize_unknown_artifact_is_not_found() {
        let store = ArtifactStore::new();
        let err = store.mark_finalized(99, "addr", "note").await.unwrap_err();
        assert!(matches!(err, MintError::NotFound(_)));
    }

    #[tokio::test]
    async fn finalize_appends_to_transaction_log() {
        let store = ArtifactStore::new();
        let mut d = draft(Some("m1"), 1);
        d.transactions = Some("Lazy minted on 2026-08-01".to_string());
        let artifact = store.create_artifact(d).await.unwrap();

        let finalized = store
            .mark_finalized(artifact.id, "buyer", "Transferred to buyer on 2026-08-06")
            .await
            .unwrap();
        let log = finalized.transactions.unwrap();
        assert!(log.starts_with("Lazy minted"));
        assert!(log.ends_with("on 2026-08-06"));
    }

    #[tokio::test]
    async fn views_only_increase_via_detail_read() {
        let store = ArtifactStore::new();
        let artifact = store.create_artifact(draft(Some("m1"), 1)).await.unwrap();

        assert_eq!(store.artifact(artifact.id).await.unwrap().views, 0);
        let detail = store.artifact_detail(artifact.id).await.unwrap();
        assert_eq!(detail.views, 1);
        assert_eq!(store.artifact(artifact.id).await.unwrap().views, 1);
    }

    #[tokio::test]
    async fn increment_views_on_missing_artifact_is_a_noop() {
        let store = ArtifactStore::new();
        store.increment_views(12345).await;
        assert!(store.artifact_detail(12345).await.is_none());
    }

    #[tokio::test]
    async fn returned_copies_are_defensive() {
        let store = ArtifactStore::new();
        let artifact = store.create_artifact(draft(Some("m1"), 1)).await.unwrap();

        let mut copy = store.artifact(artifact.id).await.unwrap();
        copy.title = "mutated".to_string();
        copy.views = 999;

        let stored = store.artifact(artifact.id).await.unwrap();
        assert_eq!(stored.title, "Test");
        assert_eq!(stored.views, 0);
    }

    #[tokio::test]
    async fn newest_first_orders_by_mint_time_then_id() {
        let store = ArtifactStore::new();
        let a = store.create_artifact(draft(Some("m1"), 1)).await.unwrap();
        let b = store.create_artifact(draft(Some("m2"), 1)).await.unwrap();
        let c = store.create_artifact(draft(Some("m3"), 2)).await.unwrap();

        let order: Vec<i64> = store.newest_first().await.iter().map(|x| x.id).collect();
        assert_eq!(order, vec![c.id, b.id, a.id]);
    }

    #[tokio::test]
    async fn featured_filter() {
        let store = ArtifactStore::new();
        let mut d = draft(Some("m1"), 1);
        d.featured = true;
        store.create_artifact(d).await.unwrap();
        store.create_artifact(draft(Some("m2"), 1)).await.unwrap();

        let featured = store.featured().await;
        assert_eq!(featured.len(), 1);
        assert!(featured[0].featured);
    }
}
