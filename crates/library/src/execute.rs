//! Plan execution.
//!
//! Applies a [`ReorganizationPlan`] to the filesystem, one operation at a
//! time and in plan order. Each move is an independent unit of work: a
//! failure is recorded and execution continues with the next operation.
//! Nothing is ever rolled back — the plan is re-derivable from whatever
//! state the collection is left in.

use crate::plan::ReorganizationPlan;
use std::io;
use std::path::PathBuf;
use tokio::fs;
use tracing::{info, warn};

/// How often to log progress while applying a long plan.
const PROGRESS_EVERY: usize = 50;

/// One operation that could not be applied.
#[derive(Debug)]
pub struct MoveFailure {
    pub source: PathBuf,
    pub error: String,
}

/// The outcome of applying a plan: how many moves succeeded and which ones
/// did not.
#[derive(Debug, Default)]
pub struct ExecutionReport {
    pub succeeded: usize,
    pub failures: Vec<MoveFailure>,
}

impl ExecutionReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Applies every operation in the plan, in order.
///
/// Parent directories are created as needed. An occupied target is a
/// per-operation failure (never an overwrite), as is any I/O error; both
/// are accumulated into the report without halting the run.
pub async fn apply(plan: &ReorganizationPlan) -> ExecutionReport {
    let mut report = ExecutionReport::default();
    for (index, op) in plan.operations.iter().enumerate() {
        match apply_one(&op.source, &op.target).await {
            Ok(()) => report.succeeded += 1,
            Err(e) => {
                warn!(source = %op.source.display(), error = %e, "move failed");
                report.failures.push(MoveFailure { source: op.source.clone(), error: e.to_string() });
            },
        }
        if (index + 1) % PROGRESS_EVERY == 0 {
            info!("progress: {}/{} files moved", index + 1, plan.operations.len());
        }
    }
    info!(succeeded = report.succeeded, failed = report.failures.len(), "plan applied");
    report
}

/// Moves a single file, creating parent directories first.
///
/// Rename is attempted first; when source and target sit on different
/// filesystems the rename fails with `CrossesDevices` and the move degrades
/// to copy-then-delete.
async fn apply_one(source: &PathBuf, target: &PathBuf) -> io::Result<()> {
    if fs::try_exists(target).await? {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("target already exists: {}", target.display()),
        ));
    }
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).await?;
    }
    match fs::rename(source, target).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            fs::copy(source, target).await?;
            fs::remove_file(source).await
        },
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{TargetLayout, group, plan};
    use crate::record::EbookRecord;
    use buchfink_classify::parse_stem;
    use std::path::Path;
    use time::OffsetDateTime;

    fn record_on_disk(root: &Path, name: &str, bytes: usize) -> EbookRecord {
        let path = root.join(name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, vec![1u8; bytes]).unwrap();
        let parsed = parse_stem(&path.file_stem().unwrap().to_string_lossy());
        EbookRecord {
            source_path: path.clone(),
            relative_path: PathBuf::from(name),
            format: crate::record::BookFormat::from_path(&path).unwrap(),
            size_bytes: bytes as u64,
            modified: OffsetDateTime::UNIX_EPOCH,
            author: parsed.author,
            title: parsed.title,
            genre: "Sonstiges".to_string(),
        }
    }

    fn layout(base: &Path) -> TargetLayout {
        TargetLayout {
            library_root: base.join("library"),
            quarantine_root: base.join("quarantine"),
            unknown_author: "Unbekannter_Autor".to_string(),
        }
    }

    #[tokio::test]
    async fn test_apply_moves_and_quarantines() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("collection");
        let records = vec![
            record_on_disk(&root, "Fitzek, Sebastian - Der Joker.epub", 200),
            record_on_disk(&root, "Fitzek, Sebastian - Der Joker.pdf", 500),
        ];
        let built = plan(&root, &records, &group(&records), &layout(dir.path()));

        let report = apply(&built).await;
        assert_eq!(report.succeeded, 2);
        assert!(report.is_clean());

        let kept = dir
            .path()
            .join("library/Sonstiges/Fitzek, Sebastian/Fitzek, Sebastian - Der Joker.epub");
        let parked = dir.path().join("quarantine/Fitzek, Sebastian - Der Joker.pdf");
        assert!(kept.is_file());
        assert!(parked.is_file());
        assert!(!records[0].source_path.exists());
        assert!(!records[1].source_path.exists());
    }

    #[tokio::test]
    async fn test_failures_do_not_halt_execution() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("collection");
        let records = vec![
            record_on_disk(&root, "gone.epub", 10),
            record_on_disk(&root, "stays.epub", 10),
        ];
        let built = plan(&root, &records, &group(&records), &layout(dir.path()));
        // Sabotage the first operation.
        std::fs::remove_file(&records[0].source_path).unwrap();

        let report = apply(&built).await;
        assert_eq!(report.succeeded, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].source, records[0].source_path);
    }

    #[tokio::test]
    async fn test_occupied_target_is_a_failure_not_an_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("collection");
        let records = vec![record_on_disk(&root, "book.epub", 10)];
        let built = plan(&root, &records, &group(&records), &layout(dir.path()));

        let target = &built.operations[0].target;
        std::fs::create_dir_all(target.parent().unwrap()).unwrap();
        std::fs::write(target, b"occupant").unwrap();

        let report = apply(&built).await;
        assert_eq!(report.succeeded, 0);
        assert_eq!(report.failures.len(), 1);
        // The occupant survives untouched.
        assert_eq!(std::fs::read(target).unwrap(), b"occupant");
    }
}
