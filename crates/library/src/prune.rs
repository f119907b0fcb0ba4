//! Empty-directory pruning.
//!
//! After a reorganization run the old tree is typically left full of empty
//! genre/author folders. This module finds them (deepest first, so that
//! children are handled before their parents) and optionally deletes them.
//! Like plan execution, deletion failures are warnings, never fatal.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};

/// The outcome of a prune pass.
#[derive(Debug, Default)]
pub struct PruneReport {
    /// Empty directories, deepest first.
    pub empty: Vec<PathBuf>,
    /// How many were actually removed (zero in a dry run).
    pub deleted: usize,
    /// Directories that could not be inspected or removed.
    pub failures: Vec<(PathBuf, String)>,
}

impl PruneReport {
    /// Empty-directory counts per top-level segment under the scan root —
    /// in a reorganized collection that segment is the genre folder.
    pub fn by_top_segment(&self, root: &Path) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for dir in &self.empty {
            let segment = dir
                .strip_prefix(root)
                .ok()
                .and_then(|relative| relative.components().next())
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .unwrap_or_else(|| "_root".to_string());
            *counts.entry(segment).or_insert(0) += 1;
        }
        counts
    }
}

/// Finds empty directories under `root` and, when `delete` is set, removes
/// them child-first.
///
/// Emptiness is re-checked immediately before each removal, so a directory
/// that gained content between the sweep and the delete is left alone.
pub async fn prune(root: &Path, delete: bool) -> PruneReport {
    let mut report = PruneReport::default();

    let mut directories = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(current) = stack.pop() {
        let mut entries = match fs::read_dir(&current).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %current.display(), error = %e, "cannot list directory");
                report.failures.push((current, e.to_string()));
                continue;
            },
        };
        while let Ok(Some(entry)) = entries.next_entry().await {
            if entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false) {
                stack.push(entry.path());
            }
        }
        if current != root {
            directories.push(current);
        }
    }

    // Deepest first: a child directory always sorts before its parent.
    directories.sort_by_key(|dir| std::cmp::Reverse(dir.components().count()));
    for dir in directories {
        match is_empty(&dir).await {
            Ok(true) => report.empty.push(dir),
            Ok(false) => {},
            Err(e) => report.failures.push((dir, e.to_string())),
        }
    }
    info!(found = report.empty.len(), "empty directory sweep complete");

    if !delete {
        return report;
    }
    for dir in report.empty.clone() {
        match is_empty(&dir).await {
            Ok(true) => match fs::remove_dir(&dir).await {
                Ok(()) => report.deleted += 1,
                Err(e) => {
                    warn!(path = %dir.display(), error = %e, "cannot remove directory");
                    report.failures.push((dir, e.to_string()));
                },
            },
            Ok(false) => {},
            Err(e) => report.failures.push((dir, e.to_string())),
        }
    }
    info!(deleted = report.deleted, "empty directories removed");
    report
}

async fn is_empty(dir: &Path) -> std::io::Result<bool> {
    let mut entries = fs::read_dir(dir).await?;
    Ok(entries.next_entry().await?.is_none())
}
