//! Type definitions for output operations.

use std::fmt;
use std::path::PathBuf;

/// Where an artifact ends up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    File(PathBuf),
    Stdout,
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::File(path) => write!(f, "{}", path.display()),
            Destination::Stdout => write!(f, "<stdout>"),
        }
    }
}

/// Represents a complete output plan.
#[derive(Debug, Clone, Default)]
pub struct OutputPlan {
    /// List of operations to perform
    pub operations: Vec<DeliveryTarget>,
}

impl OutputPlan {
    /// Creates a new empty output plan.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an operation to the plan.
    pub fn with_operation(mut self, operation: DeliveryTarget) -> Self {
        self.operations.push(operation);
        self
    }

    /// Adds the operation that sends `content` to `destination`.
    pub fn with_destination(self, destination: &Destination, content: String) -> Self {
        let operation = match destination {
            Destination::File(path) => DeliveryTarget::WriteFile {
                path: path.clone(),
                content,
            },
            Destination::Stdout => DeliveryTarget::PrintToStdout { content },
        };
        self.with_operation(operation)
    }
}

/// Represents a single output operation.
#[derive(Debug, Clone)]
pub enum DeliveryTarget {
    /// Durably write content to a file, replacing it atomically
    WriteFile { path: PathBuf, content: String },
    /// Print to stdout
    PrintToStdout { content: String },
}

impl DeliveryTarget {
    /// Human-readable name of the target, for reports and errors.
    pub fn describe(&self) -> String {
        match self {
            DeliveryTarget::WriteFile { path, .. } => path.display().to_string(),
            DeliveryTarget::PrintToStdout { .. } => "<stdout>".to_string(),
        }
    }
}

/// Result of executing an output plan.
#[derive(Debug, Clone, Default)]
pub struct OutputReport {
    /// Successfully completed operations
    pub completed: Vec<CompletedOperation>,
    /// Failed operations with errors
    pub failed: Vec<FailedOperation>,
    /// Execution statistics
    pub stats: ExecutionStats,
}

impl OutputReport {
    /// Creates a new empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a completed operation to the report.
    pub fn with_completed(mut self, operation: CompletedOperation) -> Self {
        self.stats.operations_completed += 1;
        self.stats.bytes_written += operation.bytes_written;
        self.completed.push(operation);
        self
    }

    /// Adds a failed operation to the report.
    pub fn with_failed(mut self, operation: FailedOperation) -> Self {
        self.stats.operations_failed += 1;
        self.failed.push(operation);
        self
    }

    /// Checks if all operations succeeded.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// A successfully completed operation.
#[derive(Debug, Clone)]
pub struct CompletedOperation {
    pub operation: DeliveryTarget,
    pub bytes_written: usize,
}

/// A failed operation with error information.
#[derive(Debug, Clone)]
pub struct FailedOperation {
    pub operation: DeliveryTarget,
    pub error: String,
}

/// Execution statistics.
#[derive(Debug, Clone, Default)]
pub struct ExecutionStats {
    pub operations_completed: usize,
    pub operations_failed: usize,
    pub bytes_written: usize,
    pub total_duration_ms: u64,
}
