// src/error.rs
//! Application error types with structured error handling.
//!
//! Two families live here. `AppError` covers the conditions that end a run:
//! an unreadable or unparseable source document, bad configuration, or an
//! artifact that could not be written. `FetchFailure` and `MalformedRecord`
//! are per-item diagnostics: they are collected and returned alongside a
//! successful run and never abort it.

use crate::types::PlayerId;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Main application error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Failed to read source document {path}: {source}")]
    SourceRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Source document {path} does not have the expected shape: {reason}")]
    SourceParse { path: PathBuf, reason: String },

    #[error("Failed to write output: {}", failures.join(", "))]
    SinkWrite { failures: Vec<String> },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Filesystem IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize artifact: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {message}")]
    InternalError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error(transparent)]
    Validation(#[from] crate::types::ValidationError),
}

/// Why a single player lookup did not produce a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason")]
pub enum FetchFailureReason {
    /// The API answered with a non-2xx status.
    #[serde(rename = "bad status")]
    BadStatus { status: u16, detail: String },
    /// The request never produced a complete response (connect, DNS, timeout, body read).
    #[serde(rename = "transport")]
    Transport { detail: String },
    /// The response body was not the expected player document.
    #[serde(rename = "decode")]
    Decode { detail: String },
}

impl FetchFailureReason {
    /// Short label used in diagnostics and logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::BadStatus { .. } => "bad status",
            Self::Transport { .. } => "transport",
            Self::Decode { .. } => "decode",
        }
    }

    /// HTTP status code, when the failure carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::BadStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl fmt::Display for FetchFailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadStatus { status, detail } => write!(f, "bad status {}: {}", status, detail),
            Self::Transport { detail } => write!(f, "transport: {}", detail),
            Self::Decode { detail } => write!(f, "decode: {}", detail),
        }
    }
}

/// A per-identifier lookup failure.
///
/// Always carries the identifier that triggered it so the pipeline can report
/// which players are missing from the result.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("player {identifier}: {reason}")]
pub struct FetchFailure {
    pub identifier: PlayerId,
    #[serde(flatten)]
    pub reason: FetchFailureReason,
}

impl FetchFailure {
    pub fn bad_status(identifier: PlayerId, status: u16, detail: impl Into<String>) -> Self {
        Self {
            identifier,
            reason: FetchFailureReason::BadStatus {
                status,
                detail: detail.into(),
            },
        }
    }

    pub fn transport(identifier: PlayerId, detail: impl fmt::Display) -> Self {
        Self {
            identifier,
            reason: FetchFailureReason::Transport {
                detail: detail.to_string(),
            },
        }
    }

    pub fn decode(identifier: PlayerId, detail: impl fmt::Display) -> Self {
        Self {
            identifier,
            reason: FetchFailureReason::Decode {
                detail: detail.to_string(),
            },
        }
    }
}

/// A source record that was skipped during identifier extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MalformedRecord {
    /// Position of the record in the source document's list.
    pub index: usize,
    pub reason: String,
}

impl fmt::Display for MalformedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "record #{}: {}", self.index, self.reason)
    }
}
