//! Collects rendered artifacts and writes them out as one unit.

use super::artifact::Artifact;
use super::types::{Destination, OutputPlan, OutputReport};
use super::writer::deliver;
use crate::error::AppError;

/// Artifacts waiting to be written.
#[derive(Debug, Default)]
pub struct ResultSink {
    plan: OutputPlan,
}

impl ResultSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders `artifact` now and queues it for `destination`.
    pub fn stage(self, artifact: Artifact<'_>, destination: &Destination) -> Result<Self, AppError> {
        let content = artifact.render()?;
        log::debug!(
            "Staged {} entries ({} bytes) for {}",
            artifact.len(),
            content.len(),
            destination
        );
        Ok(Self {
            plan: self.plan.with_destination(destination, content),
        })
    }

    /// Writes every staged artifact. Any destination that could not be
    /// written turns the whole write into a `SinkWrite` error.
    pub fn write(self) -> Result<OutputReport, AppError> {
        let report = deliver(self.plan)?;

        if !report.is_success() {
            return Err(AppError::SinkWrite {
                failures: report.failed.iter().map(|f| f.error.clone()).collect(),
            });
        }

        Ok(report)
    }
}
