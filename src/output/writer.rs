//! Executes output operations by performing actual I/O.
//!
//! This module is the only place where artifact I/O happens, keeping the
//! rest of the codebase pure and testable.

use super::types::*;
use crate::error::AppError;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Delivers the output plan, performing all I/O operations.
///
/// Every operation is attempted; failures are recorded in the report rather
/// than stopping the remaining operations.
pub fn deliver(plan: OutputPlan) -> Result<OutputReport, AppError> {
    let mut report = OutputReport::new();
    let start_time = Instant::now();

    log::info!(
        "Executing output plan with {} operations",
        plan.operations.len()
    );

    for operation in plan.operations {
        match execute_operation(&operation) {
            Ok(bytes_written) => {
                report = report.with_completed(CompletedOperation {
                    operation,
                    bytes_written,
                });
            }
            Err(e) => {
                log::error!("Writing {} failed: {}", operation.describe(), e);
                report = report.with_failed(FailedOperation {
                    error: format!("{}: {}", operation.describe(), e),
                    operation,
                });
            }
        }
    }

    report.stats.total_duration_ms = start_time.elapsed().as_millis() as u64;

    log::info!(
        "Output plan execution complete: {} succeeded, {} failed in {}ms",
        report.stats.operations_completed,
        report.stats.operations_failed,
        report.stats.total_duration_ms
    );

    Ok(report)
}

/// Executes a single output operation.
fn execute_operation(operation: &DeliveryTarget) -> Result<usize, AppError> {
    match operation {
        DeliveryTarget::WriteFile { path, content } => write_file(path, content),
        DeliveryTarget::PrintToStdout { content } => {
            print_to_stdout(content)?;
            Ok(content.len())
        }
    }
}

/// Writes content to a file so that the destination holds either the old
/// content or the complete new content, never a partial write.
fn write_file(path: &Path, content: &str) -> Result<usize, AppError> {
    log::debug!("Writing {} bytes to {}", content.len(), path.display());

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let staging = staging_path(path)?;
    let written = write_synced(&staging, content).and_then(|_| fs::rename(&staging, path));
    if let Err(e) = written {
        let _ = fs::remove_file(&staging);
        return Err(e.into());
    }

    log::info!("Wrote file: {}", path.display());
    Ok(content.len())
}

fn write_synced(path: &Path, content: &str) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    file.sync_all()
}

/// Hidden sibling of `path` used while the content is being written.
fn staging_path(path: &Path) -> Result<PathBuf, AppError> {
    let file_name = path.file_name().ok_or_else(|| {
        AppError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("Output path has no file name: {}", path.display()),
        ))
    })?;
    Ok(path.with_file_name(format!(".{}.tmp", file_name.to_string_lossy())))
}

/// Prints content to stdout.
fn print_to_stdout(content: &str) -> Result<(), AppError> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(content.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_plan(path: &Path, content: &str) -> OutputPlan {
        OutputPlan::new().with_operation(DeliveryTarget::WriteFile {
            path: path.to_path_buf(),
            content: content.to_string(),
        })
    }

    #[test]
    fn writes_file_and_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out/player_ids.json");

        let report = deliver(write_plan(&path, "[]\n")).unwrap();

        assert!(report.is_success());
        assert_eq!(report.stats.bytes_written, 3);
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]\n");
    }

    #[test]
    fn replaces_existing_content_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("all_players.json");
        fs::write(&path, "old content that is longer than the new one").unwrap();

        let report = deliver(write_plan(&path, "[]\n")).unwrap();

        assert!(report.is_success());
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]\n");
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn unwritable_destination_is_reported_as_failed() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-directory");
        fs::write(&blocker, "").unwrap();
        let path = blocker.join("out.json");

        let report = deliver(write_plan(&path, "[]\n")).unwrap();

        assert!(!report.is_success());
        assert_eq!(report.stats.operations_failed, 1);
        assert!(report.failed[0].error.contains("out.json"));
    }

    #[test]
    fn directory_destination_fails_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("taken");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), "x").unwrap();

        let report = deliver(write_plan(&path, "[]\n")).unwrap();

        assert!(!report.is_success());
        assert!(!dir.path().join(".taken.tmp").exists());
        assert!(path.is_dir());
    }

    #[test]
    fn later_operations_run_after_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "").unwrap();
        let good = dir.path().join("good.json");

        let plan = write_plan(&blocker.join("bad.json"), "[]").with_operation(
            DeliveryTarget::WriteFile {
                path: good.clone(),
                content: "[]".to_string(),
            },
        );
        let report = deliver(plan).unwrap();

        assert_eq!(report.stats.operations_failed, 1);
        assert_eq!(report.stats.operations_completed, 1);
        assert!(good.exists());
    }
}
