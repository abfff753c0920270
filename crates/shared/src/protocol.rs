//! Wire payloads of the listing and detail endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::Reference;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    pub results: Vec<Reference>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedResource {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeSlot {
    #[serde(rename = "type")]
    pub kind: NamedResource,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbilitySlot {
    pub ability: NamedResource,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatSlot {
    pub base_stat: u32,
    pub stat: NamedResource,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpriteImage {
    #[serde(default)]
    pub front_default: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OtherSprites {
    #[serde(rename = "official-artwork", default)]
    pub official_artwork: Option<SpriteImage>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Sprites {
    #[serde(default)]
    pub front_default: Option<String>,
    #[serde(default)]
    pub other: Option<OtherSprites>,
}

impl Sprites {
    /// High quality artwork first, then the default sprite.
    pub fn preferred_image(&self) -> Option<&str> {
        self.other
            .as_ref()
            .and_then(|other| other.official_artwork.as_ref())
            .and_then(|artwork| artwork.front_default.as_deref())
            .or(self.front_default.as_deref())
    }
}

/// Raw detail record. Any field missing here makes the record malformed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailPayload {
    pub id: i64,
    pub name: String,
    pub weight: u32,
    pub height: u32,
    pub types: Vec<TypeSlot>,
    pub abilities: Vec<AbilitySlot>,
    pub stats: Vec<StatSlot>,
    #[serde(default)]
    pub sprites: Sprites,
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
