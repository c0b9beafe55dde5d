// src/extract.rs
//! Identifier extraction: turns a source document into a deduplicated set of player IDs.

use crate::error::MalformedRecord;
use crate::model::{SourceDocument, SourceFormat};
use crate::types::PlayerId;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON pointer to the player reference inside a projection record.
const PLAYER_ID_POINTER: &str = "/relationships/new_player/data/id";

/// JSON pointer to the stat a projection is offered on (e.g. "Points").
const STAT_DISPLAY_NAME_POINTER: &str = "/attributes/stat_display_name";

/// A set of unique player identifiers.
///
/// Membership is the only semantic operation. First-seen order is kept so
/// that everything derived from the set (fetch order, artifacts) is
/// reproducible for a given document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentifierSet(IndexSet<PlayerId>);

impl IdentifierSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an identifier. Returns `false` when it was already present.
    pub fn insert(&mut self, id: PlayerId) -> bool {
        self.0.insert(id)
    }

    pub fn contains(&self, id: &PlayerId) -> bool {
        self.0.contains(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlayerId> {
        self.0.iter()
    }
}

impl FromIterator<PlayerId> for IdentifierSet {
    fn from_iter<I: IntoIterator<Item = PlayerId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for IdentifierSet {
    type Item = PlayerId;
    type IntoIter = indexmap::set::IntoIter<PlayerId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// What extraction produced: the identifiers plus the records it had to skip.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub identifiers: IdentifierSet,
    pub malformed: Vec<MalformedRecord>,
    /// Records left out because they did not match the stat filter.
    pub filtered_out: usize,
}

/// Pulls player identifiers out of a source document.
#[derive(Debug, Clone, Default)]
pub struct IdentifierExtractor {
    stat_filter: Option<String>,
}

impl IdentifierExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only keep projections offered on the given stat (matched against
    /// `attributes.stat_display_name`). Ignored for identifier lists.
    pub fn with_stat_filter(mut self, stat: Option<String>) -> Self {
        self.stat_filter = stat;
        self
    }

    pub fn extract(&self, document: &SourceDocument) -> Extraction {
        let mut extraction = Extraction::default();

        for (index, record) in document.records().iter().enumerate() {
            if document.format() == SourceFormat::Projections && !self.matches_filter(record) {
                extraction.filtered_out += 1;
                continue;
            }

            let reference = match document.format() {
                SourceFormat::Projections => player_reference(record),
                SourceFormat::IdentifierList => listed_identifier(record),
            };

            match reference {
                Ok(id) => {
                    if !extraction.identifiers.insert(id) {
                        log::trace!("Record #{} repeats an identifier already seen", index);
                    }
                }
                Err(reason) => {
                    log::warn!("Skipping malformed record #{}: {}", index, reason);
                    extraction.malformed.push(MalformedRecord { index, reason });
                }
            }
        }

        log::info!(
            "Extracted {} unique identifiers from {} records ({} malformed, {} filtered out)",
            extraction.identifiers.len(),
            document.len(),
            extraction.malformed.len(),
            extraction.filtered_out
        );

        extraction
    }

    fn matches_filter(&self, record: &Value) -> bool {
        let Some(stat) = &self.stat_filter else {
            return true;
        };
        record
            .pointer(STAT_DISPLAY_NAME_POINTER)
            .and_then(Value::as_str)
            .is_some_and(|name| name == stat)
    }
}

/// Reads the single player reference of a projection record.
fn player_reference(record: &Value) -> Result<PlayerId, String> {
    let value = record
        .pointer(PLAYER_ID_POINTER)
        .ok_or_else(|| "missing relationships.new_player.data.id".to_string())?;
    let raw = value
        .as_str()
        .ok_or_else(|| format!("player id is not a string: {}", value))?;
    PlayerId::new(raw).map_err(|e| e.to_string())
}

fn listed_identifier(record: &Value) -> Result<PlayerId, String> {
    let raw = record
        .as_str()
        .ok_or_else(|| format!("list entry is not a string: {}", record))?;
    PlayerId::new(raw).map_err(|e| e.to_string())
}
