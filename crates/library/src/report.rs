//! Read-only plan reporting.
//!
//! Renders a [`ReorganizationPlan`] for humans: per-genre counts, duplicate
//! totals and a bounded operation sample for the terminal preview, plus a
//! full per-genre listing for persisted report files. Reporting never
//! mutates the plan — it is a pure view over it.

use crate::plan::{MoveKind, MoveOperation, ReorganizationPlan};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter, Result as FmtResult, Write};

/// Default number of operations shown in the terminal preview.
const DEFAULT_SAMPLE: usize = 10;

/// A human-readable view of a plan.
pub struct PlanReport<'a> {
    plan: &'a ReorganizationPlan,
    sample: usize,
}

impl<'a> PlanReport<'a> {
    pub fn new(plan: &'a ReorganizationPlan) -> Self {
        Self { plan, sample: DEFAULT_SAMPLE }
    }

    /// Caps the operation sample in the summary to `sample` entries.
    pub fn with_sample(mut self, sample: usize) -> Self {
        self.sample = sample;
        self
    }

    /// Planned reorganizations per genre, sorted by genre label.
    pub fn genre_counts(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for op in &self.plan.operations {
            if op.kind == MoveKind::Reorganize {
                *counts.entry(op.genre.as_str()).or_insert(0) += 1;
            }
        }
        counts
    }

    /// The full report grouping every entry by genre, for persisting next to
    /// the collection. Not meant for machine re-ingestion.
    pub fn detailed(&self) -> String {
        let mut by_genre: BTreeMap<&str, Vec<&MoveOperation>> = BTreeMap::new();
        for op in &self.plan.operations {
            by_genre.entry(op.genre.as_str()).or_default().push(op);
        }

        let mut out = String::new();
        let _ = writeln!(out, "Reorganization plan for {}", self.plan.scan_root.display());
        let _ = writeln!(out, "Library root:    {}", self.plan.library_root.display());
        let _ = writeln!(out, "Quarantine root: {}", self.plan.quarantine_root.display());
        for (genre, ops) in by_genre {
            let _ = writeln!(out, "\n{genre} ({} files)", ops.len());
            let _ = writeln!(out, "{}", "-".repeat(genre.chars().count().max(40)));
            for op in ops {
                match op.kind {
                    MoveKind::Reorganize => {
                        let _ = writeln!(out, "  {}", self.display_source(op));
                        let _ = writeln!(out, "    -> {}", op.target.display());
                    },
                    MoveKind::Quarantine => {
                        let _ = writeln!(out, "  [DUPLIKAT] {}", self.display_source(op));
                        let _ = writeln!(out, "    -> {}", op.target.display());
                        if let Some(reason) = &op.reason {
                            let _ = writeln!(out, "    {reason}");
                        }
                    },
                }
            }
        }
        out
    }

    fn display_source(&self, op: &MoveOperation) -> String {
        op.source.strip_prefix(&self.plan.scan_root).unwrap_or(&op.source).display().to_string()
    }

    fn fmt_operation(&self, f: &mut Formatter<'_>, index: usize, op: &MoveOperation) -> FmtResult {
        match op.kind {
            MoveKind::Quarantine => {
                writeln!(f, "{:3}. [DUPLIKAT] {}", index + 1, self.display_source(op))?;
                writeln!(f, "     -> {}", op.target.display())?;
                if let Some(reason) = &op.reason {
                    writeln!(f, "     {reason}")?;
                }
            },
            MoveKind::Reorganize => {
                writeln!(f, "{:3}. {}", index + 1, self.display_source(op))?;
                let target = op.target.strip_prefix(&self.plan.library_root).unwrap_or(&op.target);
                writeln!(f, "     -> {}", target.display())?;
            },
        }
        Ok(())
    }
}

impl Display for PlanReport<'_> {
    /// The terminal summary: genre counts, duplicate totals and the first
    /// few operations.
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        writeln!(f, "Reorganization plan for {}", self.plan.scan_root.display())?;
        writeln!(f)?;
        writeln!(f, "Books per genre:")?;
        for (genre, count) in self.genre_counts() {
            writeln!(f, "  {genre:<30} {count:>4}")?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "Duplicate groups: {} ({} files to quarantine)",
            self.plan.duplicate_groups,
            self.plan.quarantined()
        )?;
        writeln!(f, "Planned operations: {}", self.plan.operations.len())?;

        let shown = self.plan.operations.len().min(self.sample);
        if shown > 0 {
            writeln!(f)?;
            writeln!(f, "First {shown} of {} operations:", self.plan.operations.len())?;
            for (index, op) in self.plan.operations.iter().take(self.sample).enumerate() {
                self.fmt_operation(f, index, op)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{TargetLayout, group, plan};
    use crate::record::BookFormat;
    use crate::testutil::record_with_genre;
    use std::path::{Path, PathBuf};

    fn sample_plan() -> ReorganizationPlan {
        let records = vec![
            record_with_genre(
                "Fitzek, Sebastian - Der Joker.epub",
                "Fitzek, Sebastian",
                "Der Joker",
                "Krimi/Thriller",
                BookFormat::Epub,
                2_000_000,
            ),
            record_with_genre(
                "Fitzek, Sebastian - Der Joker.pdf",
                "Fitzek, Sebastian",
                "Der Joker",
                "Krimi/Thriller",
                BookFormat::Pdf,
                5_000_000,
            ),
            record_with_genre("Foundation.epub", "", "Foundation", "Science Fiction", BookFormat::Epub, 1),
        ];
        let layout = TargetLayout {
            library_root: PathBuf::from("/books-neu"),
            quarantine_root: PathBuf::from("/books-papierkorb"),
            unknown_author: "Unbekannter_Autor".to_string(),
        };
        plan(Path::new("/books"), &records, &group(&records), &layout)
    }

    #[test]
    fn test_summary_counts() {
        let plan = sample_plan();
        let report = PlanReport::new(&plan);
        let counts = report.genre_counts();
        assert_eq!(counts.get("Krimi/Thriller"), Some(&1));
        assert_eq!(counts.get("Science Fiction"), Some(&1));

        let rendered = report.to_string();
        assert!(rendered.contains("Duplicate groups: 1 (1 files to quarantine)"));
        assert!(rendered.contains("Duplikat von Fitzek, Sebastian - Der Joker.epub"));
    }

    #[test]
    fn test_summary_sample_is_bounded() {
        let plan = sample_plan();
        let rendered = PlanReport::new(&plan).with_sample(1).to_string();
        assert!(rendered.contains("First 1 of 3 operations:"));
        // Only the single quarantine entry is listed.
        assert!(rendered.contains("[DUPLIKAT]"));
        assert!(!rendered.contains("  2. "));
    }

    #[test]
    fn test_detailed_groups_by_genre() {
        let plan = sample_plan();
        let detailed = PlanReport::new(&plan).detailed();
        assert!(detailed.contains("Krimi/Thriller (2 files)"));
        assert!(detailed.contains("Science Fiction (1 files)"));
        assert!(detailed.contains("[DUPLIKAT]"));
    }

    #[test]
    fn test_reporting_does_not_change_the_plan() {
        let plan = sample_plan();
        let before = plan.clone();
        let _ = PlanReport::new(&plan).to_string();
        let _ = PlanReport::new(&plan).detailed();
        assert_eq!(plan, before);
    }
}
