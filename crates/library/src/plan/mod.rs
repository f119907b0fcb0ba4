//! Reorganization planning.
//!
//! Turns a scanned record list into an ordered list of move operations:
//! duplicate losers go to a quarantine root (tagged with the retained copy's
//! filename), everything else goes to `<genre>/<author>/<filename>` under
//! the new library root.
//!
//! The whole pipeline — [`group`], [`select`], [`plan`] — is pure: it never
//! touches the filesystem, so a plan can be previewed, diffed and unit
//! tested without any I/O, and planning the same records twice produces an
//! identical operation sequence.

mod group;
mod select;

pub use self::group::{DuplicateGroup, DuplicateKey, Grouping, group};
pub use self::select::{Selection, select};

use crate::record::EbookRecord;
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use tracing::debug;

/// What a [`MoveOperation`] does with its file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveKind {
    /// Relocate into the `<genre>/<author>/` library layout.
    Reorganize,
    /// Park a duplicate loser under the quarantine root.
    Quarantine,
}

/// A single planned filesystem action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOperation {
    pub kind: MoveKind,
    /// Existing location of the record.
    pub source: PathBuf,
    /// Computed destination; unique across the whole plan.
    pub target: PathBuf,
    /// The record's genre (kept for both kinds, so reports can group
    /// quarantined files by genre too).
    pub genre: String,
    /// For [`MoveKind::Quarantine`]: names the retained sibling's filename.
    pub reason: Option<String>,
}

/// Destination roots and labels for plan construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetLayout {
    /// Root of the reorganized library.
    pub library_root: PathBuf,
    /// Root of the duplicate quarantine.
    pub quarantine_root: PathBuf,
    /// Directory label substituted when a record has no author.
    pub unknown_author: String,
}

/// The full ordered move sequence for one scan, plus the roots it was
/// computed against. Immutable once built: the executor applies it without
/// re-deriving any decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorganizationPlan {
    pub scan_root: PathBuf,
    pub library_root: PathBuf,
    pub quarantine_root: PathBuf,
    pub operations: Vec<MoveOperation>,
    /// Number of duplicate groups the plan resolved.
    pub duplicate_groups: usize,
}

impl ReorganizationPlan {
    pub fn quarantined(&self) -> usize {
        self.operations.iter().filter(|op| op.kind == MoveKind::Quarantine).count()
    }

    pub fn reorganized(&self) -> usize {
        self.operations.len() - self.quarantined()
    }
}

/// Builds the move plan for a scanned collection.
///
/// For every duplicate group the canonical copy is kept and each loser gets
/// a quarantine operation (preserving its scan-relative path under the
/// quarantine root). Every other record — including the canonicals — gets a
/// reorganize operation targeting
/// `<library_root>/<genre>/<author>/<filename>`.
///
/// Operation order is stable for reproducible reports: quarantine
/// operations first (bucket order, best-first within a bucket), then
/// reorganize operations in record-scan order. Exactly one operation is
/// emitted per record.
///
/// Two distinct works can collide on the same reorganize target (same
/// genre, author and filename); the later one is disambiguated with a
/// numeric stem suffix so that targets stay unique across the plan.
pub fn plan(
    scan_root: &Path,
    records: &[EbookRecord],
    grouping: &Grouping,
    layout: &TargetLayout,
) -> ReorganizationPlan {
    let mut operations = Vec::with_capacity(records.len());
    let mut losers = BTreeSet::new();

    for duplicate_group in &grouping.groups {
        let selection = select(records, duplicate_group);
        let retained = records[selection.canonical].file_name();
        for &loser in &selection.losers {
            let record = &records[loser];
            losers.insert(loser);
            operations.push(MoveOperation {
                kind: MoveKind::Quarantine,
                source: record.source_path.clone(),
                target: layout.quarantine_root.join(&record.relative_path),
                genre: record.genre.clone(),
                reason: Some(format!("Duplikat von {retained}")),
            });
        }
    }

    let mut taken = HashSet::new();
    for (index, record) in records.iter().enumerate() {
        if losers.contains(&index) {
            continue;
        }
        let author = match sanitize_segment(&record.author) {
            segment if segment.is_empty() => layout.unknown_author.clone(),
            segment => segment,
        };
        let target = layout.library_root.join(&record.genre).join(author).join(record.file_name());
        let target = disambiguate(target, &taken);
        taken.insert(target.clone());
        operations.push(MoveOperation {
            kind: MoveKind::Reorganize,
            source: record.source_path.clone(),
            target,
            genre: record.genre.clone(),
            reason: None,
        });
    }

    debug!(
        operations = operations.len(),
        duplicate_groups = grouping.groups.len(),
        "reorganization plan built"
    );
    ReorganizationPlan {
        scan_root: scan_root.to_path_buf(),
        library_root: layout.library_root.clone(),
        quarantine_root: layout.quarantine_root.clone(),
        operations,
        duplicate_groups: grouping.groups.len(),
    }
}

/// Cleans a string for use as a single path segment.
///
/// Characters that are illegal (or troublesome) in directory names are
/// dropped, path separators become hyphens, surrounding dots and spaces are
/// trimmed, and the result is capped at 200 characters.
pub fn sanitize_segment(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | ':' | '"' | '|' | '?' | '*'))
        .map(|c| if matches!(c, '/' | '\\') { '-' } else { c })
        .collect();
    cleaned.trim_matches(['.', ' ']).chars().take(200).collect()
}

/// Appends `-2`, `-3`, … to the file stem until the target is unique.
fn disambiguate(target: PathBuf, taken: &HashSet<PathBuf>) -> PathBuf {
    if !taken.contains(&target) {
        return target;
    }
    let stem = target.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    let extension = target.extension().map(|e| e.to_string_lossy().into_owned());
    let parent = target.parent().map(Path::to_path_buf).unwrap_or_default();
    for n in 2u32.. {
        let file_name = match &extension {
            Some(ext) => format!("{stem}-{n}.{ext}"),
            None => format!("{stem}-{n}"),
        };
        let candidate = parent.join(file_name);
        if !taken.contains(&candidate) {
            return candidate;
        }
    }
    unreachable!("u32 suffix space exhausted");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::BookFormat;
    use crate::testutil::{record, record_with_genre};
    use rstest::rstest;

    fn layout() -> TargetLayout {
        TargetLayout {
            library_root: PathBuf::from("/books-neu"),
            quarantine_root: PathBuf::from("/books-papierkorb"),
            unknown_author: "Unbekannter_Autor".to_string(),
        }
    }

    fn fitzek_pair() -> Vec<EbookRecord> {
        vec![
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
        ]
    }

    #[test]
    fn test_duplicate_pair_end_to_end() {
        let records = fitzek_pair();
        let grouping = group(&records);
        let built = plan(Path::new("/books"), &records, &grouping, &layout());

        assert_eq!(built.operations.len(), 2);
        assert_eq!(built.duplicate_groups, 1);

        let quarantine = &built.operations[0];
        assert_eq!(quarantine.kind, MoveKind::Quarantine);
        assert_eq!(quarantine.source, Path::new("/books/Fitzek, Sebastian - Der Joker.pdf"));
        assert_eq!(
            quarantine.target,
            Path::new("/books-papierkorb/Fitzek, Sebastian - Der Joker.pdf")
        );
        assert_eq!(quarantine.reason.as_deref(), Some("Duplikat von Fitzek, Sebastian - Der Joker.epub"));

        let reorganize = &built.operations[1];
        assert_eq!(reorganize.kind, MoveKind::Reorganize);
        assert_eq!(reorganize.source, Path::new("/books/Fitzek, Sebastian - Der Joker.epub"));
        assert_eq!(
            reorganize.target,
            Path::new("/books-neu/Krimi/Thriller/Fitzek, Sebastian/Fitzek, Sebastian - Der Joker.epub")
        );
        assert_eq!(reorganize.reason, None);
    }

    #[test]
    fn test_exactly_one_operation_per_record() {
        let mut records = fitzek_pair();
        records.push(record("untitled.epub", "", "", BookFormat::Epub, 1));
        records.push(record("dune.mobi", "Herbert, Frank", "Dune", BookFormat::Mobi, 1));
        let grouping = group(&records);
        let built = plan(Path::new("/books"), &records, &grouping, &layout());
        assert_eq!(built.operations.len(), records.len());

        let sources: BTreeSet<_> = built.operations.iter().map(|op| &op.source).collect();
        assert_eq!(sources.len(), records.len());
    }

    #[test]
    fn test_plan_is_deterministic() {
        let records = fitzek_pair();
        let grouping = group(&records);
        let first = plan(Path::new("/books"), &records, &grouping, &layout());
        let second = plan(Path::new("/books"), &records, &grouping, &layout());
        assert_eq!(first, second);
    }

    #[test]
    fn test_unknown_author_label() {
        let records = vec![record("Mystery.epub", "", "Mystery", BookFormat::Epub, 1)];
        let grouping = group(&records);
        let built = plan(Path::new("/books"), &records, &grouping, &layout());
        assert_eq!(
            built.operations[0].target,
            Path::new("/books-neu/Sonstiges/Unbekannter_Autor/Mystery.epub")
        );
    }

    #[test]
    fn test_colliding_targets_get_numeric_suffixes() {
        // Two distinct works whose files share a name: same
        // genre/author/filename target, but different duplicate keys.
        let records = vec![
            record("box1/Dune.epub", "Herbert, Frank", "Dune", BookFormat::Epub, 1),
            record("box2/Dune.epub", "Herbert, Frank", "Dune Messiah", BookFormat::Epub, 2),
        ];
        let grouping = group(&records);
        assert!(grouping.groups.is_empty());

        let built = plan(Path::new("/books"), &records, &grouping, &layout());
        let targets: Vec<_> = built.operations.iter().map(|op| op.target.clone()).collect();
        assert_eq!(targets[0], Path::new("/books-neu/Sonstiges/Herbert, Frank/Dune.epub"));
        assert_eq!(targets[1], Path::new("/books-neu/Sonstiges/Herbert, Frank/Dune-2.epub"));
    }

    #[rstest]
    #[case("Fitzek, Sebastian", "Fitzek, Sebastian")]
    #[case("A<B>C:D\"E|F?G*H", "ABCDEFGH")]
    #[case("AC/DC \\ Backslash", "AC-DC - Backslash")]
    #[case(" . dotted . ", "dotted")]
    #[case("", "")]
    fn test_sanitize_segment(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(sanitize_segment(input), expected);
    }

    #[test]
    fn test_sanitize_caps_length() {
        let long = "x".repeat(500);
        assert_eq!(sanitize_segment(&long).chars().count(), 200);
    }
}
