//! Fixture feed and demo seed data.
//!
//! `FixtureFeed` stands in for the live X feed when no bearer token is
//! configured: one deterministic batch covering the three interesting
//! mention shapes (labeled form with attached photo, tag form with a linked
//! image, no image at all), then empty batches. `seed_demo_data` populates
//! the store the way a freshly-launched gallery would look.

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::info;

use mintloom_chain::ChainAdapter;
use mintloom_common::{
    ArtifactDraft, MediaKind, MediaRef, Mention, MentionBatch, NewIdentity,
};
use mintloom_store::ArtifactStore;

use crate::traits::MentionSource;

pub struct FixtureFeed {
    served: Mutex<bool>,
}

impl FixtureFeed {
    pub fn new() -> Self {
        Self {
            served: Mutex::new(false),
        }
    }

    fn batch() -> Vec<Mention> {
        vec![
            Mention {
                source_id: "fixture_mention_1".to_string(),
                author_external_id: "fixture_user_1".to_string(),
                author_handle: Some("willow_render".to_string()),
                author_profile_image: None,
                text: "Title: Glass Harbor | Description: the marina at dawn, all glass and light \
                       @mintloom_xyz mint this for me!"
                    .to_string(),
                media: vec![MediaRef {
                    kind: MediaKind::Photo,
                    url: Some("https://images.example/fixtures/glass-harbor.jpg".to_string()),
                    preview_url: None,
                }],
                linked_urls: vec![],
                posted_at: None,
            },
            Mention {
                source_id: "fixture_mention_2".to_string(),
                author_external_id: "fixture_user_1".to_string(),
                author_handle: Some("willow_render".to_string()),
                author_profile_image: None,
                text: "Just finished this one. #title Static Bloom #description flowers grown \
                       from signal noise @mintloom_xyz"
                    .to_string(),
                media: vec![],
                linked_urls: vec!["https://images.example/fixtures/static-bloom.png".to_string()],
                posted_at: None,
            },
            // No image — exercises the mandatory-image skip.
            Mention {
                source_id: "fixture_mention_3".to_string(),
                author_external_id: "fixture_user_2".to_string(),
                author_handle: Some("gale_draws".to_string()),
                author_profile_image: None,
                text: "Hey @mintloom_xyz can you mint something for me? Forgot the image though."
                    .to_string(),
                media: vec![],
                linked_urls: vec![],
                posted_at: None,
            },
        ]
    }
}

impl Default for FixtureFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MentionSource for FixtureFeed {
    async fn fetch_since(&self, _cursor: Option<&str>) -> Result<MentionBatch> {
        let mut served = self.served.lock().await;
        if *served {
            return Ok(MentionBatch::default());
        }
        *served = true;
        Ok(MentionBatch {
            mentions: Self::batch(),
            next_cursor: Some("fixture_mention_2".to_string()),
        })
    }

    fn name(&self) -> &str {
        "fixtures"
    }
}

/// Seed demo identities, wallets, and artifacts. Ids are assigned in
/// insertion order, so `newest_first` shows the last entries first.
pub async fn seed_demo_data(store: &ArtifactStore, chain: &dyn ChainAdapter) -> Result<()> {
    let seeds: &[(&str, &[(&str, &str, bool, &str)])] = &[
        (
            "aurora_fields",
            &[
                (
                    "Tidal Memory",
                    "Long-exposure study of a shoreline that no longer exists.",
                    true,
                    "2.45",
                ),
                (
                    "Salt Cathedral",
                    "Generated interior lit by a single procedural sun.",
                    false,
                    "0.89",
                ),
            ],
        ),
        (
            "vector_monk",
            &[
                (
                    "Orbit Litany",
                    "Twelve satellites rendered as illuminated manuscript marginalia.",
                    true,
                    "5.89",
                ),
                (
                    "Quiet Machine",
                    "A decommissioned loom, drawn from memory in four passes.",
                    false,
                    "1.55",
                ),
            ],
        ),
        (
            "heliotrope_09",
            &[
                (
                    "Afterimage Garden",
                    "What the eye keeps after staring at a greenhouse.",
                    true,
                    "1.24",
                ),
                (
                    "Copper Rain",
                    "Weather simulation over an abandoned foundry.",
                    false,
                    "3.21",
                ),
            ],
        ),
        (
            "night_cartographer",
            &[
                (
                    "Unlit Streets",
                    "A city map drawn only from windows still glowing at 3am.",
                    true,
                    "2.76",
                ),
                (
                    "Ferry Interval",
                    "The eleven minutes between crossings, as color fields.",
                    false,
                    "4.33",
                ),
            ],
        ),
        (
            "moss_protocol",
            &[
                (
                    "Understory",
                    "Fungal network traffic visualized as stained glass.",
                    true,
                    "7.12",
                ),
                (
                    "Patient Stone",
                    "Erosion timelapse compressed into one frame.",
                    true,
                    "6.78",
                ),
            ],
        ),
    ];

    let mut artifacts = 0;
    for (handle, pieces) in seeds {
        let identity = store
            .create_identity(NewIdentity {
                handle: handle.to_string(),
                ..Default::default()
            })
            .await?;
        let wallet = store.get_or_create_wallet(identity.id, chain).await?;

        for (title, description, featured, price) in *pieces {
            store
                .create_artifact(ArtifactDraft {
                    title: title.to_string(),
                    description: Some(description.to_string()),
                    image_url: format!(
                        "https://images.example/seed/{}.png",
                        title.to_lowercase().replace(' ', "-")
                    ),
                    creator: identity.id,
                    wallet_address: wallet.address.clone(),
                    source_id: None,
                    metadata: serde_json::Map::new(),
                    featured: *featured,
                    transactions: None,
                    price: Some(price.to_string()),
                })
                .await?;
            artifacts += 1;
        }
    }

    info!(identities = seeds.len(), artifacts, "Demo data seeded");
    Ok(())
}
