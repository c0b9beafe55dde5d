//! Output handling with clear separation of planning and execution.
//!
//! Artifacts are rendered to text first (pure), then an `OutputPlan` of
//! delivery targets is executed by `deliver`, the only place that touches
//! the filesystem or stdout.

mod artifact;
mod sink;
mod types;
mod writer;

pub use artifact::Artifact;
pub use sink::ResultSink;
pub use types::{Destination, OutputReport};
