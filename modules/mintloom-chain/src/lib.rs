//! Chain adapter boundary.
//!
//! Everything the pipeline needs from a ledger — keypair generation, balance
//! lookup, lazy-mint preparation, on-chain finalize — sits behind one trait,
//! so the core stays deterministic and a real chain client is a drop-in
//! replacement for the simulation.

pub mod metadata;
pub mod simulated;

pub use metadata::{NftAttribute, NftMetadata};
pub use simulated::SimulatedChain;

use anyhow::Result;
use async_trait::async_trait;

/// Keypair material for a new custodial wallet. The secret arrives already
/// encrypted; callers persist it as an opaque blob.
#[derive(Debug, Clone)]
pub struct WalletKeys {
    pub address: String,
    pub encrypted_secret: String,
}

/// Result of preparing a lazy mint: a token id and the content address of
/// the metadata. No on-chain transaction has happened yet.
#[derive(Debug, Clone)]
pub struct LazyMint {
    pub token_id: String,
    pub content_hash: String,
}

/// Receipt for an executed on-chain mint/transfer.
#[derive(Debug, Clone)]
pub struct MintReceipt {
    pub transaction_ref: String,
}

#[async_trait]
pub trait ChainAdapter: Send + Sync {
    /// Generate a fresh keypair for a custodial wallet.
    async fn generate_wallet(&self) -> Result<WalletKeys>;

    /// Balance of an address in the chain's smallest unit.
    async fn get_balance(&self, address: &str) -> Result<u64>;

    /// Prepare off-chain metadata for a future mint.
    async fn prepare_lazy_mint(&self, metadata: &NftMetadata) -> Result<LazyMint>;

    /// Execute the on-chain mint and transfer to the buyer.
    async fn finalize_mint(
        &self,
        token_id: &str,
        content_hash: &str,
        buyer_address: &str,
    ) -> Result<MintReceipt>;

    fn name(&self) -> &str;
}
