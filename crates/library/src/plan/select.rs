use crate::plan::group::DuplicateGroup;
use crate::record::EbookRecord;

/// The outcome of picking a canonical copy from a duplicate group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Index of the retained copy.
    pub canonical: usize,
    /// Indices of the remaining copies, best-first.
    pub losers: Vec<usize>,
}

/// Picks the best copy of a duplicated work.
///
/// Members are ordered descending by `(format priority, size)`: format rank
/// dominates, and within the same format the larger file wins on the
/// assumption that it is the more complete conversion. The sort is stable,
/// so records tying on both rank and size keep their scan order — given a
/// fixed input, selection is fully deterministic.
pub fn select(records: &[EbookRecord], group: &DuplicateGroup) -> Selection {
    let mut members = group.members.clone();
    members.sort_by(|&a, &b| {
        let rank_a = (records[a].format.priority(), records[a].size_bytes);
        let rank_b = (records[b].format.priority(), records[b].size_bytes);
        rank_b.cmp(&rank_a)
    });
    let canonical = members[0];
    Selection { canonical, losers: members.split_off(1) }
}
