//! NFT metadata construction.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single trait on an NFT.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NftAttribute {
    pub trait_type: String,
    pub value: String,
}

/// Token metadata in the shape expected by the chain and by marketplaces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NftMetadata {
    pub name: String,
    pub description: String,
    pub image: String,
    pub attributes: Vec<NftAttribute>,
    pub creator: String,
    pub symbol: String,
    /// Royalty in basis points.
    pub seller_fee_basis_points: u32,
}

impl NftMetadata {
    /// Build metadata with the platform defaults: a `Creator` and `Platform`
    /// attribute, the `MINT` symbol, and a 5% royalty.
    pub fn new(title: &str, description: &str, image_url: &str, creator: &str) -> Self {
        Self {
            name: title.to_string(),
            description: description.to_string(),
            image: image_url.to_string(),
            attributes: vec![
                NftAttribute {
                    trait_type: "Creator".to_string(),
                    value: creator.to_string(),
                },
                NftAttribute {
                    trait_type: "Platform".to_string(),
                    value: "Mintloom".to_string(),
                },
            ],
            creator: creator.to_string(),
            symbol: "MINT".to_string(),
            seller_fee_basis_points: 500,
        }
    }

    pub fn with_attribute(mut self, trait_type: &str, value: &str) -> Self {
        self.attributes.push(NftAttribute {
            trait_type: trait_type.to_string(),
            value: value.to_string(),
        });
        self
    }

    /// Serialize to the JSON object stored in the artifact metadata blob.
    pub fn to_map(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            // A struct with only string/number fields always serializes to
            // an object; this arm is unreachable in practice.
            _ => Map::new(),
        }
    }
}
