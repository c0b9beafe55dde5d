// src/pipeline.rs
//! The enrichment pipeline: extract identifiers, look each one up, aggregate.
//!
//! Lookups sit behind the `RecordEnricher` capability so the pipeline can be
//! driven by the parallel HTTP fetcher or by an in-memory double.

use crate::api::{FetchBatch, PlayerFetcher};
use crate::error::{AppError, FetchFailure, MalformedRecord};
use crate::extract::{Extraction, IdentifierExtractor, IdentifierSet};
use crate::model::{EnrichmentResult, SourceDocument};
use std::fmt;

/// Resolves a whole identifier set into records and per-identifier failures.
#[async_trait::async_trait]
pub trait RecordEnricher: Send + Sync {
    async fn enrich(&self, ids: &IdentifierSet) -> Result<FetchBatch, AppError>;
}

#[async_trait::async_trait]
impl RecordEnricher for PlayerFetcher {
    async fn enrich(&self, ids: &IdentifierSet) -> Result<FetchBatch, AppError> {
        self.fetch_all(ids).await
    }
}

/// Where a pipeline run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Idle,
    Extracting,
    Fetching { total: usize },
    Aggregating,
    Done,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineStage::Idle => write!(f, "Idle"),
            PipelineStage::Extracting => write!(f, "Extracting"),
            PipelineStage::Fetching { total } => write!(f, "Fetching({} players)", total),
            PipelineStage::Aggregating => write!(f, "Aggregating"),
            PipelineStage::Done => write!(f, "Done"),
        }
    }
}

/// Everything one enrichment run produced.
#[derive(Debug, Clone)]
pub struct EnrichmentOutcome {
    /// Successful lookups, in identifier-set order.
    pub records: EnrichmentResult,
    /// Failed lookups, in identifier-set order.
    pub failures: Vec<FetchFailure>,
    /// Source records skipped during extraction.
    pub malformed: Vec<MalformedRecord>,
    /// Source records left out by the stat filter.
    pub filtered_out: usize,
    /// Number of distinct identifiers looked up.
    pub attempted: usize,
    /// Stages the run went through, in order.
    pub stages: Vec<PipelineStage>,
}

/// Owns one run's state transitions and logs each of them.
#[derive(Debug)]
struct StageTracker {
    current: PipelineStage,
    history: Vec<PipelineStage>,
}

impl StageTracker {
    fn new() -> Self {
        Self {
            current: PipelineStage::Idle,
            history: vec![PipelineStage::Idle],
        }
    }

    fn advance(&mut self, next: PipelineStage) {
        log::info!("Pipeline stage: {} -> {}", self.current, next);
        self.current = next;
        self.history.push(next);
    }

    fn finish(mut self) -> Vec<PipelineStage> {
        self.advance(PipelineStage::Done);
        self.history
    }
}

/// Extraction followed by one lookup per distinct identifier.
pub struct EnrichmentPipeline<E> {
    extractor: IdentifierExtractor,
    enricher: E,
}

impl<E: RecordEnricher> EnrichmentPipeline<E> {
    pub fn new(extractor: IdentifierExtractor, enricher: E) -> Self {
        Self {
            extractor,
            enricher,
        }
    }

    /// Identifier extraction alone, for runs that stop before any lookup.
    pub fn extract(&self, document: &SourceDocument) -> Extraction {
        self.extractor.extract(document)
    }

    /// Runs every stage. Individual lookup failures are collected in the
    /// outcome; only an internal fault in the worker pool is an error.
    pub async fn run(&self, document: &SourceDocument) -> Result<EnrichmentOutcome, AppError> {
        let mut stages = StageTracker::new();

        stages.advance(PipelineStage::Extracting);
        let Extraction {
            identifiers,
            malformed,
            filtered_out,
        } = self.extract(document);

        stages.advance(PipelineStage::Fetching {
            total: identifiers.len(),
        });
        let batch = self.enricher.enrich(&identifiers).await?;

        stages.advance(PipelineStage::Aggregating);
        for failure in &batch.failures {
            log::debug!("Dropped from results: {}", failure);
        }

        Ok(EnrichmentOutcome {
            records: batch.records,
            failures: batch.failures,
            malformed,
            filtered_out,
            attempted: identifiers.len(),
            stages: stages.finish(),
        })
    }
}
