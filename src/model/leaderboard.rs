//! Bounded "largest offenders" tracking
//!
//! Each category keeps the top [`LEADERBOARD_CAPACITY`] objects by metric
//! value, updated online as objects are finalized.

use gix::ObjectId;
use serde::Serialize;
use std::collections::BTreeMap;

/// Number of entries retained per category
pub const LEADERBOARD_CAPACITY: usize = 5;

/// Metrics for which the largest offenders are tracked
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    CommitSize,
    ParentCount,
    TreeEntries,
    BlobSize,
    HistoryDepth,
    TagDepth,
    CheckoutTrees,
    PathDepth,
    PathLength,
    CheckoutBlobs,
    CheckoutSize,
    CheckoutLinks,
    CheckoutSubmodules,
}

impl Category {
    pub const ALL: [Category; 13] = [
        Category::CommitSize,
        Category::ParentCount,
        Category::TreeEntries,
        Category::BlobSize,
        Category::HistoryDepth,
        Category::TagDepth,
        Category::CheckoutTrees,
        Category::PathDepth,
        Category::PathLength,
        Category::CheckoutBlobs,
        Category::CheckoutSize,
        Category::CheckoutLinks,
        Category::CheckoutSubmodules,
    ];
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    #[serde(serialize_with = "crate::model::serialize_oid")]
    pub id: ObjectId,
    pub value: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Top-N table for one category, ordered by value descending
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Leaderboard {
    entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a candidate; returns true if it was admitted
    ///
    /// A full table only admits values strictly greater than its current
    /// minimum, and equal values rank after those already present, so ties
    /// keep first-seen order. An object already on the board is not
    /// admitted twice.
    pub fn offer(&mut self, id: ObjectId, value: u64, name: Option<&str>) -> bool {
        if self.entries.iter().any(|e| e.id == id) {
            return false;
        }
        if self.entries.len() >= LEADERBOARD_CAPACITY {
            match self.entries.last() {
                Some(min) if value > min.value => {
                    self.entries.pop();
                }
                _ => return false,
            }
        }

        let pos = self.entries.partition_point(|e| e.value >= value);
        self.entries.insert(
            pos,
            LeaderboardEntry {
                id,
                value,
                name: name.map(str::to_owned),
            },
        );
        true
    }

    pub fn top(&self) -> Option<&LeaderboardEntry> {
        self.entries.first()
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn strip_names(&mut self) {
        for entry in &mut self.entries {
            entry.name = None;
        }
    }
}

/// One leaderboard per [`Category`]
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Leaderboards {
    boards: BTreeMap<Category, Leaderboard>,
}

impl Leaderboards {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offer(&mut self, category: Category, id: ObjectId, value: u64, name: Option<&str>) {
        // Zero-valued metrics never name an offender.
        if value == 0 {
            return;
        }
        self.boards
            .entry(category)
            .or_default()
            .offer(id, value, name);
    }

    pub fn get(&self, category: Category) -> Option<&Leaderboard> {
        self.boards.get(&category)
    }

    pub fn top(&self, category: Category) -> Option<&LeaderboardEntry> {
        self.get(category).and_then(Leaderboard::top)
    }

    /// Copy with human-readable names removed
    pub fn without_names(&self) -> Self {
        let mut copy = self.clone();
        for board in copy.boards.values_mut() {
            board.strip_names();
        }
        copy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oid(n: u8) -> ObjectId {
        ObjectId::from([n; 20])
    }

    fn values(board: &Leaderboard) -> Vec<u64> {
        board.entries().iter().map(|e| e.value).collect()
    }

    #[test]
    fn test_fills_unconditionally_until_capacity() {
        let mut board = Leaderboard::new();
        for i in 0..LEADERBOARD_CAPACITY as u8 {
            assert!(board.offer(oid(i), u64::from(i), None));
        }
        assert_eq!(board.len(), LEADERBOARD_CAPACITY);
        assert_eq!(values(&board), vec![4, 3, 2, 1, 0]);
    }

    #[test]
    fn test_keeps_n_largest() {
        let mut board = Leaderboard::new();
        let offered = [5u64, 1, 9, 3, 7, 2, 8, 6, 4, 10];
        for (i, v) in offered.iter().enumerate() {
            board.offer(oid(i as u8), *v, None);
        }
        assert_eq!(values(&board), vec![10, 9, 8, 7, 6]);
    }

    #[test]
    fn test_ties_keep_first_seen() {
        let mut board = Leaderboard::new();
        for i in 0..LEADERBOARD_CAPACITY as u8 {
            board.offer(oid(i), 100, None);
        }
        // Equal to the minimum: rejected
        assert!(!board.offer(oid(42), 100, None));
        let ids: Vec<_> = board.entries().iter().map(|e| e.id).collect();
        assert_eq!(ids, (0..LEADERBOARD_CAPACITY as u8).map(oid).collect::<Vec<_>>());
    }

    #[test]
    fn test_tie_inserted_after_existing() {
        let mut board = Leaderboard::new();
        board.offer(oid(1), 50, Some("first"));
        board.offer(oid(2), 50, Some("second"));
        assert_eq!(board.top().and_then(|e| e.name.as_deref()), Some("first"));
    }

    #[test]
    fn test_same_object_admitted_once() {
        let mut board = Leaderboard::new();
        assert!(board.offer(oid(1), 50, Some("refs/heads/main^{tree}")));
        assert!(!board.offer(oid(1), 50, Some("refs/heads/topic^{tree}")));
        assert!(board.offer(oid(2), 40, None));
        assert_eq!(board.len(), 2);
        assert_eq!(board.top().and_then(|e| e.name.as_deref()), Some("refs/heads/main^{tree}"));
    }

    #[test]
    fn test_zero_values_ignored() {
        let mut boards = Leaderboards::new();
        boards.offer(Category::BlobSize, oid(1), 0, None);
        assert!(boards.top(Category::BlobSize).is_none());
    }

    #[test]
    fn test_without_names() {
        let mut boards = Leaderboards::new();
        boards.offer(Category::BlobSize, oid(1), 10, Some("refs/heads/main:big.bin"));
        let stripped = boards.without_names();
        assert_eq!(stripped.top(Category::BlobSize).map(|e| e.name.clone()), Some(None));
        assert_eq!(stripped.top(Category::BlobSize).map(|e| e.id), Some(oid(1)));
    }
}
