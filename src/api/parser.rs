// src/api/parser.rs
//! Turns a raw player API response into a record or a typed failure.

use super::client::ApiResponse;
use super::responses::PlayerResponse;
use crate::constants::ERROR_BODY_PREVIEW_LENGTH;
use crate::error::FetchFailure;
use crate::model::EntityRecord;
use crate::types::PlayerId;

/// Classifies a response for `id`: non-2xx is a bad status, anything that
/// does not decode into the expected player document is a decode failure.
pub fn parse_player_response(
    id: &PlayerId,
    result: ApiResponse<String>,
) -> Result<EntityRecord, FetchFailure> {
    if !result.status.is_success() {
        let mut detail = format!("HTTP {} from {}", result.status, result.url);
        let body = result.data.trim();
        if !body.is_empty() {
            detail.push_str(": ");
            detail.push_str(&preview(body));
        }
        return Err(FetchFailure::bad_status(
            id.clone(),
            result.status.as_u16(),
            detail,
        ));
    }

    let response: PlayerResponse = serde_json::from_str(&result.data).map_err(|e| {
        log::debug!(
            "Failed to parse response from {}: {} (body: {})",
            result.url,
            e,
            preview(&result.data)
        );
        FetchFailure::decode(id.clone(), e)
    })?;

    response
        .into_record(id)
        .map_err(|reason| FetchFailure::decode(id.clone(), reason))
}

fn preview(body: &str) -> String {
    if body.chars().count() > ERROR_BODY_PREVIEW_LENGTH {
        let cut: String = body.chars().take(ERROR_BODY_PREVIEW_LENGTH).collect();
        format!("{}...", cut)
    } else {
        body.to_string()
    }
}
