//! Shared domain types for the mention-to-mint pipeline.
//!
//! Entity ids are `i64`, monotonic per entity kind, assigned by the store.
//! The metadata blob on `Artifact` is a schema-less map with two well-known
//! keys (`META_TOKEN_ID`, `META_CONTENT_HASH`) written at lazy-mint time;
//! everything else in it is free-form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Metadata blob key holding the prepared token id.
pub const META_TOKEN_ID: &str = "tokenId";

/// Metadata blob key holding the prepared content address.
pub const META_CONTENT_HASH: &str = "contentHash";

/// Mint lifecycle state of an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MintState {
    /// Metadata prepared off-chain, no on-chain transaction yet.
    Lazy,
    /// On-chain mint executed; ownership record is frozen.
    Finalized,
}

impl std::fmt::Display for MintState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MintState::Lazy => write!(f, "lazy"),
            MintState::Finalized => write!(f, "finalized"),
        }
    }
}

/// A creator account, provisioned on first mention or first connect.
/// Never deleted; immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub id: i64,
    /// Unique, case-sensitive.
    pub handle: String,
    pub profile_ref: Option<String>,
    /// External-platform account id. Unique when present.
    pub external_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Custodial wallet, at most one per identity. `encrypted_secret` is an
/// opaque blob — the core never touches plaintext key material.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    pub id: i64,
    pub identity_id: i64,
    pub address: String,
    pub encrypted_secret: String,
    pub created_at: DateTime<Utc>,
}

/// An NFT record driven through the lazy → finalized lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub image_url: String,
    /// Owning identity id.
    pub creator: i64,
    /// Denormalized copy of the creator's wallet address at creation time.
    /// Overwritten with the buyer's address on finalize.
    pub wallet_address: String,
    /// Originating mention id — the dedup key. Unique when present.
    pub source_id: Option<String>,
    pub metadata: Map<String, Value>,
    pub minted_at: DateTime<Utc>,
    pub state: MintState,
    pub featured: bool,
    /// Only increases, only via the detail read path.
    pub views: u64,
    /// Free-text transaction log, one line per lifecycle event.
    pub transactions: Option<String>,
    pub price: Option<String>,
}

/// Input for `create_identity`.
#[derive(Debug, Clone, Default)]
pub struct NewIdentity {
    pub handle: String,
    pub profile_ref: Option<String>,
    pub external_id: Option<String>,
}

/// Input for `create_artifact`. The store assigns id and mint timestamp.
#[derive(Debug, Clone)]
pub struct ArtifactDraft {
    pub title: String,
    pub description: Option<String>,
    pub image_url: String,
    pub creator: i64,
    pub wallet_address: String,
    pub source_id: Option<String>,
    pub metadata: Map<String, Value>,
    pub featured: bool,
    pub transactions: Option<String>,
    pub price: Option<String>,
}

/// Media type of a mention attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Photo,
    Video,
    Gif,
    Other,
}

impl MediaKind {
    /// Map a platform media-type string to a kind. Unknown types are `Other`.
    pub fn from_api(kind: &str) -> Self {
        match kind {
            "photo" => MediaKind::Photo,
            "video" => MediaKind::Video,
            "animated_gif" => MediaKind::Gif,
            _ => MediaKind::Other,
        }
    }
}

/// A media attachment on a mention.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaRef {
    pub kind: MediaKind,
    pub url: Option<String>,
    pub preview_url: Option<String>,
}

/// A normalized mention event from any feed. Platform clients convert their
/// native post types into this.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mention {
    /// Globally unique per mention — the dedup key.
    pub source_id: String,
    pub author_external_id: String,
    /// Best-effort; feeds may omit it.
    pub author_handle: Option<String>,
    pub author_profile_image: Option<String>,
    pub text: String,
    /// Explicit attachments. Take precedence over linked URLs for images.
    pub media: Vec<MediaRef>,
    /// URLs merely linked in the text.
    pub linked_urls: Vec<String>,
    pub posted_at: Option<DateTime<Utc>>,
}

/// One page of mention events plus the cursor for the next poll.
#[derive(Debug, Clone, Default)]
pub struct MentionBatch {
    /// In feed order. Processed sequentially.
    pub mentions: Vec<Mention>,
    /// Opaque to the core. `None` means "keep the previous cursor".
    pub next_cursor: Option<String>,
}
