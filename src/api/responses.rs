//! Wire types for the player lookup API.

use crate::model::EntityRecord;
use crate::types::PlayerId;
use serde::{Deserialize, Deserializer};

/// Body of `GET /players/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct PlayerResponse {
    pub data: PlayerData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlayerData {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub attributes: PlayerAttributes,
}

/// Every key must be present; the API sends `null` for unknown values, which
/// decode to an empty string.
#[derive(Debug, Clone, Deserialize)]
pub struct PlayerAttributes {
    #[serde(deserialize_with = "nullable_string")]
    pub name: String,
    #[serde(deserialize_with = "nullable_string")]
    pub position: String,
    #[serde(deserialize_with = "nullable_string")]
    pub team: String,
    #[serde(deserialize_with = "nullable_string")]
    pub team_name: String,
    #[serde(deserialize_with = "nullable_string")]
    pub market: String,
    #[serde(deserialize_with = "nullable_string")]
    pub image_url: String,
    #[serde(deserialize_with = "nullable_string")]
    pub league: String,
    #[serde(deserialize_with = "nullable_string")]
    pub updated_at: String,
    #[serde(deserialize_with = "nullable_string")]
    pub created_at: String,
}

fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl PlayerResponse {
    /// Maps the response onto a record for `requested`.
    ///
    /// The response must describe the player that was asked for; a record is
    /// never re-keyed to a different identifier.
    pub fn into_record(self, requested: &PlayerId) -> Result<EntityRecord, String> {
        let PlayerData {
            id,
            kind,
            attributes,
        } = self.data;

        if id != requested.as_str() {
            return Err(format!(
                "response describes player {:?}, expected {:?}",
                id,
                requested.as_str()
            ));
        }

        Ok(EntityRecord {
            id: requested.clone(),
            name: attributes.name,
            position: attributes.position,
            team: attributes.team,
            team_name: attributes.team_name,
            market: attributes.market,
            image_url: attributes.image_url,
            league: attributes.league,
            updated_at: attributes.updated_at,
            created_at: attributes.created_at,
            record_type: kind,
        })
    }
}
