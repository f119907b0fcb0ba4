use crate::record::EbookRecord;
use std::collections::{BTreeSet, HashMap};

/// Normalized identity of a work, used for duplicate detection.
///
/// Built from the lower-cased author and title with every non-ASCII-
/// alphanumeric character stripped, joined as `"{author}_{title}"`. Two
/// records with equal, non-empty keys are treated as the same work in
/// different containers. A record whose normalized title is empty has no
/// key: it cannot be reliably deduplicated and always passes through as a
/// singleton.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DuplicateKey(String);

impl DuplicateKey {
    /// Derives the key for a record, or `None` when the normalized title is
    /// empty.
    pub fn of(record: &EbookRecord) -> Option<Self> {
        let title = normalize(&record.title);
        if title.is_empty() {
            return None;
        }
        let author = normalize(&record.author);
        Some(Self(format!("{author}_{title}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn normalize(s: &str) -> String {
    s.to_lowercase().chars().filter(char::is_ascii_alphanumeric).collect()
}

/// Records sharing one [`DuplicateKey`], as indices into the scanned record
/// list, in scan order. Always has at least two members: single-member
/// buckets are not duplicate groups and never surface here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    pub key: DuplicateKey,
    pub members: Vec<usize>,
}

/// The grouper's output: duplicate groups in first-seen key order, plus the
/// set of record indices those groups consume.
///
/// The consumed set is threaded into the planner explicitly so that the
/// records themselves stay untouched and each phase remains a pure function
/// of its inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grouping {
    pub groups: Vec<DuplicateGroup>,
    pub consumed: BTreeSet<usize>,
}

impl Grouping {
    /// Total number of records sitting in duplicate groups.
    pub fn duplicate_files(&self) -> usize {
        self.consumed.len()
    }
}

/// Buckets records by [`DuplicateKey`] and keeps the multi-member buckets.
///
/// Bucket order follows the first appearance of each key in `records`, so
/// the result is deterministic for a fixed input sequence regardless of any
/// hash-map iteration order underneath.
pub fn group(records: &[EbookRecord]) -> Grouping {
    let mut order = Vec::new();
    let mut buckets: HashMap<DuplicateKey, Vec<usize>> = HashMap::new();
    for (index, record) in records.iter().enumerate() {
        let Some(key) = DuplicateKey::of(record) else {
            continue;
        };
        buckets
            .entry(key.clone())
            .or_insert_with(|| {
                order.push(key);
                Vec::new()
            })
            .push(index);
    }

    let mut grouping = Grouping::default();
    for key in order {
        let members = buckets.remove(&key).unwrap_or_default();
        if members.len() > 1 {
            grouping.consumed.extend(members.iter().copied());
            grouping.groups.push(DuplicateGroup { key, members });
        }
    }
    grouping
}
