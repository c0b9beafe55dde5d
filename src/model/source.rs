use crate::error::AppError;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

/// How the records of a source document are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceFormat {
    /// A projections export: `{ "data": [ { "relationships": ... }, ... ] }`.
    #[default]
    Projections,
    /// A plain JSON array of identifier strings, as written by the `ids` stage.
    IdentifierList,
}

#[derive(Deserialize)]
struct ProjectionsEnvelope {
    data: Vec<Value>,
}

/// A parsed source document.
///
/// Only the top-level shape is validated here. Each record is kept as raw JSON
/// so that one bad record can be skipped without rejecting the whole document.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceDocument {
    format: SourceFormat,
    records: Vec<Value>,
}

impl SourceDocument {
    pub fn new(format: SourceFormat, records: Vec<Value>) -> Self {
        Self { format, records }
    }

    /// Parses document text, returning the reason when the top-level shape is wrong.
    pub fn from_json(text: &str, format: SourceFormat) -> Result<Self, String> {
        let records = match format {
            SourceFormat::Projections => {
                serde_json::from_str::<ProjectionsEnvelope>(text)
                    .map_err(|e| format!("expected an object with a `data` array: {}", e))?
                    .data
            }
            SourceFormat::IdentifierList => serde_json::from_str::<Vec<Value>>(text)
                .map_err(|e| format!("expected an array of identifiers: {}", e))?,
        };
        Ok(Self { format, records })
    }

    /// Reads and parses the document at `path`.
    pub fn load(path: &Path, format: SourceFormat) -> Result<Self, AppError> {
        log::debug!("Reading source document {} ({:?})", path.display(), format);

        let text = std::fs::read_to_string(path).map_err(|source| AppError::SourceRead {
            path: path.to_path_buf(),
            source,
        })?;

        let document =
            Self::from_json(&text, format).map_err(|reason| AppError::SourceParse {
                path: path.to_path_buf(),
                reason,
            })?;

        log::info!(
            "Loaded {} records from {}",
            document.len(),
            path.display()
        );
        Ok(document)
    }

    pub fn format(&self) -> SourceFormat {
        self.format
    }

    pub fn records(&self) -> &[Value] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
