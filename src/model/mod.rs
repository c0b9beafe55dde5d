//! Domain model: the betting-line source document and the enriched player record.

mod entity;
mod source;

pub use entity::{EnrichmentResult, EntityRecord};
pub use source::{SourceDocument, SourceFormat};
