//! Repository-wide size aggregate

use gix::ObjectId;
use serde::Serialize;
use std::collections::BTreeMap;

use super::counts::{Count32, Count64};
use super::descriptor::{BlobSize, CommitSize, TagSize, TreeSize};
use super::leaderboard::{Category, Leaderboards};

/// Aggregate statistics over every object reachable from the selected
/// references.
///
/// Created empty when a scan starts, updated once per finalized object and
/// handed back frozen when the scan completes.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize)]
pub struct HistorySize {
    pub unique_commit_count: Count32,
    pub unique_commit_size: Count64,
    pub max_commit_size: Count32,
    pub max_history_depth: Count32,
    pub max_parent_count: Count32,

    pub unique_tree_count: Count32,
    pub unique_tree_size: Count64,
    pub unique_tree_entries: Count64,
    pub max_tree_entries: Count32,

    pub unique_blob_count: Count32,
    pub unique_blob_size: Count64,
    pub max_blob_size: Count32,

    pub unique_tag_count: Count32,
    pub max_tag_depth: Count32,

    pub reference_count: Count32,
    pub reference_groups: BTreeMap<String, Count32>,

    pub max_path_depth: Count32,
    pub max_path_length: Count32,
    pub max_expanded_tree_count: Count32,
    pub max_expanded_blob_count: Count32,
    pub max_expanded_blob_size: Count64,
    pub max_expanded_link_count: Count32,
    pub max_expanded_submodule_count: Count32,

    pub leaderboards: Leaderboards,
}

/// Reference groups, matched by prefix in order
const REFERENCE_GROUPS: &[(&str, &str)] = &[
    ("refs/heads/", "branches"),
    ("refs/tags/", "tags"),
    ("refs/remotes/", "remotes"),
    ("refs/notes/", "notes"),
    ("refs/stash", "stash"),
];

/// Group a reference name falls into
pub fn reference_group(refname: &str) -> &'static str {
    REFERENCE_GROUPS
        .iter()
        .find(|(prefix, _)| refname.starts_with(prefix))
        .map(|(_, group)| *group)
        .unwrap_or("other")
}

impl HistorySize {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_reference(&mut self, refname: &str) {
        self.reference_count.increment(Count32::new(1));
        self.reference_groups
            .entry(reference_group(refname).to_string())
            .or_default()
            .increment(Count32::new(1));
    }

    pub fn record_blob(&mut self, id: ObjectId, size: &BlobSize, name: Option<&str>) {
        self.unique_blob_count.increment(Count32::new(1));
        self.unique_blob_size.increment(Count64::from(size.size));
        self.max_blob_size.adjust_max(size.size);
        self.offer(Category::BlobSize, id, size.size.into(), name);
    }

    pub fn record_tree(&mut self, id: ObjectId, raw_size: u64, size: &TreeSize, name: Option<&str>) {
        self.unique_tree_count.increment(Count32::new(1));
        self.unique_tree_size.increment(Count64::new(raw_size));
        self.unique_tree_entries
            .increment(Count64::from(size.entry_count));
        self.max_tree_entries.adjust_max(size.entry_count);
        self.offer(Category::TreeEntries, id, size.entry_count.into(), name);
    }

    pub fn record_commit(&mut self, id: ObjectId, raw_size: u64, size: &CommitSize, name: Option<&str>) {
        let raw = Count32::new(raw_size);
        self.unique_commit_count.increment(Count32::new(1));
        self.unique_commit_size.increment(Count64::new(raw_size));
        self.max_commit_size.adjust_max(raw);
        self.max_parent_count.adjust_max(size.parent_count);
        self.max_history_depth.adjust_max(size.max_ancestor_depth);

        self.offer(Category::CommitSize, id, raw.into(), name);
        self.offer(Category::ParentCount, id, size.parent_count.into(), name);
        self.offer(Category::HistoryDepth, id, size.max_ancestor_depth.into(), name);

        self.record_checkout(size, name);
    }

    /// Checkout maxima come from each commit's root tree
    fn record_checkout(&mut self, commit: &CommitSize, commit_name: Option<&str>) {
        let tree = commit.tree;
        let c = &commit.checkout;
        let tree_name = commit_name.map(|n| format!("{n}^{{tree}}"));
        let name = tree_name.as_deref();

        self.max_path_depth.adjust_max(c.max_path_depth);
        self.max_path_length.adjust_max(c.max_path_length);
        self.max_expanded_tree_count
            .adjust_max(c.expanded_tree_count);
        self.max_expanded_blob_count
            .adjust_max(c.expanded_blob_count);
        self.max_expanded_blob_size.adjust_max(c.expanded_blob_size);
        self.max_expanded_link_count
            .adjust_max(c.expanded_link_count);
        self.max_expanded_submodule_count
            .adjust_max(c.expanded_submodule_count);

        self.offer(Category::PathDepth, tree, c.max_path_depth.into(), name);
        self.offer(Category::PathLength, tree, c.max_path_length.into(), name);
        self.offer(Category::CheckoutTrees, tree, c.expanded_tree_count.into(), name);
        self.offer(Category::CheckoutBlobs, tree, c.expanded_blob_count.into(), name);
        self.offer(Category::CheckoutSize, tree, c.expanded_blob_size.get(), name);
        self.offer(Category::CheckoutLinks, tree, c.expanded_link_count.into(), name);
        self.offer(
            Category::CheckoutSubmodules,
            tree,
            c.expanded_submodule_count.into(),
            name,
        );
    }

    pub fn record_tag(&mut self, id: ObjectId, size: &TagSize, name: Option<&str>) {
        self.unique_tag_count.increment(Count32::new(1));
        self.max_tag_depth.adjust_max(size.tag_depth);
        self.offer(Category::TagDepth, id, size.tag_depth.into(), name);
    }

    fn offer(&mut self, category: Category, id: ObjectId, value: u64, name: Option<&str>) {
        self.leaderboards.offer(category, id, value, name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oid(n: u8) -> ObjectId {
        ObjectId::from([n; 20])
    }

    #[test]
    fn test_reference_groups() {
        assert_eq!(reference_group("refs/heads/main"), "branches");
        assert_eq!(reference_group("refs/tags/v1.0"), "tags");
        assert_eq!(reference_group("refs/remotes/origin/main"), "remotes");
        assert_eq!(reference_group("refs/notes/commits"), "notes");
        assert_eq!(reference_group("refs/stash"), "stash");
        assert_eq!(reference_group("refs/pull/1/head"), "other");
    }

    #[test]
    fn test_record_reference_counts_groups() {
        let mut h = HistorySize::new();
        h.record_reference("refs/heads/main");
        h.record_reference("refs/heads/dev");
        h.record_reference("refs/tags/v1");
        assert_eq!(h.reference_count.get(), 3);
        assert_eq!(h.reference_groups.get("branches").map(|c| c.get()), Some(2));
        assert_eq!(h.reference_groups.get("tags").map(|c| c.get()), Some(1));
    }

    #[test]
    fn test_record_blobs() {
        let mut h = HistorySize::new();
        h.record_blob(oid(1), &BlobSize { size: Count32::new(10) }, None);
        h.record_blob(oid(2), &BlobSize { size: Count32::new(20) }, Some("refs/heads/main:b"));
        assert_eq!(h.unique_blob_count.get(), 2);
        assert_eq!(h.unique_blob_size.get(), 30);
        assert_eq!(h.max_blob_size.get(), 20);
        let top = h.leaderboards.top(Category::BlobSize).map(|e| e.id);
        assert_eq!(top, Some(oid(2)));
    }

    #[test]
    fn test_checkout_named_after_commit_tree() {
        let mut h = HistorySize::new();
        let mut checkout = TreeSize::new(1);
        checkout.add_blob(b"file", BlobSize { size: Count32::new(4) });
        let commit = CommitSize::new(oid(9), checkout);
        h.record_commit(oid(3), 180, &commit, Some("refs/heads/main"));

        let top = h.leaderboards.top(Category::CheckoutSize);
        assert_eq!(top.map(|e| e.id), Some(oid(9)));
        assert_eq!(
            top.and_then(|e| e.name.as_deref()),
            Some("refs/heads/main^{tree}")
        );
        assert_eq!(h.max_history_depth.get(), 1);
        assert_eq!(h.max_expanded_blob_size.get(), 4);
    }

    #[test]
    fn test_shared_tree_listed_once() {
        let mut h = HistorySize::new();
        let mut checkout = TreeSize::new(1);
        checkout.add_blob(b"file", BlobSize { size: Count32::new(4) });
        let commit = CommitSize::new(oid(10), checkout);
        h.record_commit(oid(1), 180, &commit, Some("refs/heads/main~2"));
        h.record_commit(oid(2), 180, &commit, Some("refs/heads/main~1"));
        h.record_commit(oid(3), 180, &commit, Some("refs/heads/main"));

        for category in [Category::CheckoutSize, Category::CheckoutBlobs, Category::PathDepth] {
            let board = h.leaderboards.get(category);
            assert_eq!(board.map(|b| b.entries().len()), Some(1), "{category:?}");
        }
        assert_eq!(
            h.leaderboards.top(Category::CheckoutSize).and_then(|e| e.name.as_deref()),
            Some("refs/heads/main~2^{tree}")
        );
    }
}
