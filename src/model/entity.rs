use crate::types::PlayerId;
use serde::{Deserialize, Serialize};

/// The resolved attributes of one player, as returned by the lookup API.
///
/// Field order is the serialization order of the output artifact, so it must
/// stay stable for diff-friendly output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub id: PlayerId,
    pub name: String,
    pub position: String,
    pub team: String,
    pub team_name: String,
    pub market: String,
    pub image_url: String,
    pub league: String,
    pub updated_at: String,
    pub created_at: String,
    #[serde(rename = "type")]
    pub record_type: String,
}

/// Enriched records in identifier processing order.
pub type EnrichmentResult = Vec<EntityRecord>;
