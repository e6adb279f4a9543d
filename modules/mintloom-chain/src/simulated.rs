//! Simulated chain adapter.
//!
//! All randomness in the system lives here. The pipeline never inspects the
//! values beyond treating them as opaque strings, so swapping in a real
//! chain client changes nothing upstream.

use std::hash::{Hash, Hasher};

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use tracing::debug;

use crate::{ChainAdapter, LazyMint, MintReceipt, NftMetadata, WalletKeys};

/// Base58 alphabet (no 0, O, I, l) — matches real address encodings.
const BASE58: &[u8] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Length of a simulated public address.
const ADDRESS_LEN: usize = 44;

/// Length of a simulated encrypted secret blob.
const SECRET_LEN: usize = 88;

pub struct SimulatedChain;

impl SimulatedChain {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SimulatedChain {
    fn default() -> Self {
        Self::new()
    }
}

fn random_base58(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| BASE58[rng.random_range(0..BASE58.len())] as char)
        .collect()
}

/// Content-address the metadata JSON. Stable for identical metadata.
fn content_address(metadata: &NftMetadata) -> String {
    let json = serde_json::to_string(metadata).unwrap_or_default();
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    json.hash(&mut hasher);
    let hi = hasher.finish();
    // Second word keyed off the reversed bytes so the address is 32 hex chars.
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    json.chars().rev().collect::<String>().hash(&mut hasher);
    format!("ipfs://{:016x}{:016x}", hi, hasher.finish())
}

#[async_trait]
impl ChainAdapter for SimulatedChain {
    async fn generate_wallet(&self) -> Result<WalletKeys> {
        let keys = WalletKeys {
            address: random_base58(ADDRESS_LEN),
            encrypted_secret: random_base58(SECRET_LEN),
        };
        debug!(address = keys.address.as_str(), "Generated simulated keypair");
        Ok(keys)
    }

    async fn get_balance(&self, _address: &str) -> Result<u64> {
        // 1 SOL in lamports.
        Ok(1_000_000_000)
    }

    async fn prepare_lazy_mint(&self, metadata: &NftMetadata) -> Result<LazyMint> {
        let suffix: u32 = rand::rng().random_range(0..1_000_000);
        let token_id = format!("{}{:06}", Utc::now().timestamp_millis(), suffix);
        Ok(LazyMint {
            token_id,
            content_hash: content_address(metadata),
        })
    }

    async fn finalize_mint(
        &self,
        token_id: &str,
        _content_hash: &str,
        buyer_address: &str,
    ) -> Result<MintReceipt> {
        let suffix: u32 = rand::rng().random_range(0..0xff_ffff);
        let transaction_ref = format!("{:x}{:06x}", Utc::now().timestamp_millis(), suffix);
        debug!(
            token_id,
            buyer = buyer_address,
            tx = transaction_ref.as_str(),
            "Simulated on-chain mint"
        );
        Ok(MintReceipt { transaction_ref })
    }

    fn name(&self) -> &str {
        "simulated"
    }
}
