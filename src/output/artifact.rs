//! Rendering of pipeline aggregates into their on-disk JSON form.

use crate::error::{AppError, FetchFailure};
use crate::extract::IdentifierSet;
use crate::model::EntityRecord;
use serde::Serialize;

/// An aggregate the pipeline can persist.
#[derive(Debug, Clone, Copy)]
pub enum Artifact<'a> {
    /// The deduplicated player IDs, as an array of strings.
    Identifiers(&'a IdentifierSet),
    /// The enriched player records.
    Records(&'a [EntityRecord]),
    /// Per-player lookup failures.
    Failures(&'a [FetchFailure]),
}

impl Artifact<'_> {
    /// Pretty-printed JSON with a trailing newline.
    ///
    /// Object keys follow struct declaration order, so the same aggregate
    /// always renders to the same text.
    pub fn render(&self) -> Result<String, AppError> {
        let mut text = match self {
            Artifact::Identifiers(ids) => to_pretty(ids)?,
            Artifact::Records(records) => to_pretty(records)?,
            Artifact::Failures(failures) => to_pretty(failures)?,
        };
        text.push('\n');
        Ok(text)
    }

    pub fn len(&self) -> usize {
        match self {
            Artifact::Identifiers(ids) => ids.len(),
            Artifact::Records(records) => records.len(),
            Artifact::Failures(failures) => failures.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn to_pretty<T: Serialize + ?Sized>(value: &T) -> Result<String, AppError> {
    Ok(serde_json::to_string_pretty(value)?)
}
