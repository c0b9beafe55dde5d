//! Player API interaction: looking up one player record per identifier.
//!
//! The pipeline depends on the `PlayerRepository` trait, never on HTTP
//! details, so lookups can be served by the real client or by an
//! in-memory double.

pub mod client;
mod concurrent_queue;
mod parallel_fetcher;
pub mod parser;
mod responses;

use crate::error::FetchFailure;
use crate::model::EntityRecord;
use crate::types::PlayerId;

/// The ability to resolve a player identifier into a record.
///
/// Implementations make exactly one attempt per call: no caching, no retry.
/// Every failure must name the identifier it was called with.
#[async_trait::async_trait]
pub trait PlayerRepository: Send + Sync {
    async fn fetch_player(&self, id: &PlayerId) -> Result<EntityRecord, FetchFailure>;
}

pub use client::{ApiResponse, PlayerHttpClient};
pub use parallel_fetcher::{FetchBatch, PlayerFetcher};
pub use parser::parse_player_response;
