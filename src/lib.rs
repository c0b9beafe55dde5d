// src/lib.rs
//! prop-enricher library: extracts player identifiers from betting-line
//! projections and enriches them with player records from the lookup API.
//!
//! # Public API
//!
//! The library exposes types organized by concern:
//! - **Error handling**: `AppError`, `FetchFailure`, `MalformedRecord`, `ValidationError`
//! - **Configuration**: `CommandLineInput`, `PipelineConfig`, `FetchSettings`
//! - **Domain model**: `SourceDocument`, `EntityRecord`, `PlayerId`
//! - **Extraction**: `IdentifierExtractor`, `IdentifierSet`
//! - **API client**: `PlayerRepository`, `PlayerHttpClient`, `PlayerFetcher`
//! - **Pipeline**: `EnrichmentPipeline`, `RecordEnricher`
//! - **Output**: `ResultSink`, `Artifact`, `Destination`

mod analytics;
mod api;
mod config;
mod constants;
mod error;
mod extract;
mod model;
mod output;
mod pipeline;
mod types;

// --- Error Handling ---
pub use crate::error::{AppError, FetchFailure, FetchFailureReason, MalformedRecord};
pub use crate::types::ValidationError;

// --- Configuration ---
pub use crate::config::{
    parse_base_url, Command, CommandLineInput, FetchArgs, FetchSettings, PipelineConfig,
    RunMode, SourceArgs,
};

// --- Domain Model ---
pub use crate::model::{EnrichmentResult, EntityRecord, SourceDocument, SourceFormat};
pub use crate::types::PlayerId;

// --- Extraction ---
pub use crate::extract::{Extraction, IdentifierExtractor, IdentifierSet};

// --- API Client ---
pub use crate::api::{
    parse_player_response, ApiResponse, FetchBatch, PlayerFetcher, PlayerHttpClient,
    PlayerRepository,
};

// --- Pipeline ---
pub use crate::pipeline::{EnrichmentOutcome, EnrichmentPipeline, PipelineStage, RecordEnricher};

// --- Output ---
pub use crate::output::{Artifact, Destination, OutputReport, ResultSink};

// --- Analytics ---
pub use crate::analytics::{summarize_enrichment, summarize_extraction, RunSummary};
