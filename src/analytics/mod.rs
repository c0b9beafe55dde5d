// src/analytics/mod.rs
//! Run measurement and statistics for user-facing summaries.

use crate::error::FetchFailure;
use crate::extract::Extraction;
use crate::pipeline::EnrichmentOutcome;
use indexmap::IndexMap;

/// Quick statistics for the completion message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Distinct identifiers found in the source document.
    pub identifiers: usize,
    /// Players successfully looked up. Zero for extraction-only runs.
    pub records: usize,
    /// Failed lookups, counted per reason label in first-seen order.
    pub failures_by_reason: IndexMap<&'static str, usize>,
    /// Source records skipped as malformed.
    pub malformed: usize,
    /// Source records left out by the stat filter.
    pub filtered_out: usize,
}

impl RunSummary {
    pub fn total_failures(&self) -> usize {
        self.failures_by_reason.values().sum()
    }

    /// One line per notable fact; empty lines are never produced.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![format!("Found {} unique players.", self.identifiers)];

        if self.records > 0 || self.total_failures() > 0 {
            lines.push(format!("Enriched {} players.", self.records));
        }
        if self.total_failures() > 0 {
            let breakdown = self
                .failures_by_reason
                .iter()
                .map(|(label, count)| format!("{} {}", count, label))
                .collect::<Vec<_>>()
                .join(", ");
            lines.push(format!(
                "{} lookups failed ({}).",
                self.total_failures(),
                breakdown
            ));
        }
        if self.malformed > 0 {
            lines.push(format!("Skipped {} malformed records.", self.malformed));
        }
        if self.filtered_out > 0 {
            lines.push(format!(
                "Ignored {} records for other stats.",
                self.filtered_out
            ));
        }
        lines
    }
}

/// Measures an extraction-only run.
pub fn summarize_extraction(extraction: &Extraction) -> RunSummary {
    RunSummary {
        identifiers: extraction.identifiers.len(),
        malformed: extraction.malformed.len(),
        filtered_out: extraction.filtered_out,
        ..RunSummary::default()
    }
}

/// Measures a full enrichment run.
pub fn summarize_enrichment(outcome: &EnrichmentOutcome) -> RunSummary {
    RunSummary {
        identifiers: outcome.attempted,
        records: outcome.records.len(),
        failures_by_reason: count_by_reason(&outcome.failures),
        malformed: outcome.malformed.len(),
        filtered_out: outcome.filtered_out,
    }
}

fn count_by_reason(failures: &[FetchFailure]) -> IndexMap<&'static str, usize> {
    let mut counts = IndexMap::new();
    for failure in failures {
        *counts.entry(failure.reason.label()).or_insert(0) += 1;
    }
    counts
}
