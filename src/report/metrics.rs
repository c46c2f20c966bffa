//! Report rows
//!
//! The layout is a small tree of titled sections whose leaves are rated
//! metrics. The table and the v2 JSON encoding both walk it.

use crate::concern::{ConcernScale, Metric, MAX_STARS};
use crate::model::{Category, Count32, Count64, HistorySize, LeaderboardEntry};
use crate::util::Prefixes;

/// One rated metric
#[derive(Debug)]
pub struct Item {
    pub metric: Metric,
    pub label: &'static str,
    pub description: &'static str,
    pub unit: &'static str,
    pub prefixes: Prefixes,
    /// Leaderboard naming the object responsible for the value
    pub offender: Option<Category>,
    value: fn(&HistorySize) -> (u64, bool),
}

#[derive(Debug)]
pub enum Node {
    Section(Section),
    Item(Item),
}

#[derive(Debug)]
pub struct Section {
    pub title: &'static str,
    pub children: Vec<Node>,
}

/// An item evaluated against a particular aggregate
#[derive(Debug, Clone, Copy)]
pub struct Rating {
    pub value: u64,
    /// The underlying counter saturated
    pub overflow: bool,
    pub level: f64,
    pub severity: u32,
}

impl Item {
    pub fn value(&self, history: &HistorySize) -> (u64, bool) {
        (self.value)(history)
    }

    pub fn rate(&self, history: &HistorySize, scale: &ConcernScale) -> Rating {
        let (value, overflow) = self.value(history);
        let severity = if overflow {
            MAX_STARS
        } else {
            scale.severity(self.metric, value)
        };
        Rating {
            value,
            overflow,
            level: scale.level(self.metric, value),
            severity,
        }
    }

    /// Largest offender, if this item has a leaderboard and it is non-empty
    pub fn offender<'a>(&self, history: &'a HistorySize) -> Option<&'a LeaderboardEntry> {
        self.offender.and_then(|c| history.leaderboards.top(c))
    }
}

impl Section {
    fn new(title: &'static str, children: Vec<Node>) -> Self {
        Self { title, children }
    }

    /// Items in display order, depth-first
    pub fn items(&self) -> Vec<&Item> {
        let mut out = Vec::new();
        collect(&self.children, &mut out);
        out
    }
}

fn collect<'a>(nodes: &'a [Node], out: &mut Vec<&'a Item>) {
    for node in nodes {
        match node {
            Node::Section(s) => collect(&s.children, out),
            Node::Item(i) => out.push(i),
        }
    }
}

fn c32(c: Count32) -> (u64, bool) {
    c.to_u64()
}

fn c64(c: Count64) -> (u64, bool) {
    c.to_u64()
}

fn section(title: &'static str, children: Vec<Node>) -> Node {
    Node::Section(Section::new(title, children))
}

fn count(
    metric: Metric,
    label: &'static str,
    description: &'static str,
    offender: Option<Category>,
    value: fn(&HistorySize) -> (u64, bool),
) -> Node {
    Node::Item(Item {
        metric,
        label,
        description,
        unit: "",
        prefixes: Prefixes::Metric,
        offender,
        value,
    })
}

fn bytes(
    metric: Metric,
    label: &'static str,
    description: &'static str,
    offender: Option<Category>,
    value: fn(&HistorySize) -> (u64, bool),
) -> Node {
    Node::Item(Item {
        metric,
        label,
        description,
        unit: "B",
        prefixes: Prefixes::Binary,
        offender,
        value,
    })
}

/// Every report section, in display order
pub fn layout() -> Vec<Section> {
    vec![
        Section::new(
            "Overall repository size",
            vec![
                section(
                    "Commits",
                    vec![
                        count(
                            Metric::UniqueCommitCount,
                            "Count",
                            "The total number of distinct commit objects",
                            None,
                            |h| c32(h.unique_commit_count),
                        ),
                        bytes(
                            Metric::UniqueCommitSize,
                            "Total size",
                            "The total size of all commit objects",
                            None,
                            |h| c64(h.unique_commit_size),
                        ),
                    ],
                ),
                section(
                    "Trees",
                    vec![
                        count(
                            Metric::UniqueTreeCount,
                            "Count",
                            "The total number of distinct tree objects",
                            None,
                            |h| c32(h.unique_tree_count),
                        ),
                        bytes(
                            Metric::UniqueTreeSize,
                            "Total size",
                            "The total size of all distinct tree objects",
                            None,
                            |h| c64(h.unique_tree_size),
                        ),
                        count(
                            Metric::UniqueTreeEntries,
                            "Total tree entries",
                            "The total number of entries in all distinct tree objects",
                            None,
                            |h| c64(h.unique_tree_entries),
                        ),
                    ],
                ),
                section(
                    "Blobs",
                    vec![
                        count(
                            Metric::UniqueBlobCount,
                            "Count",
                            "The total number of distinct blob objects",
                            None,
                            |h| c32(h.unique_blob_count),
                        ),
                        bytes(
                            Metric::UniqueBlobSize,
                            "Total size",
                            "The total size of all distinct blob objects",
                            None,
                            |h| c64(h.unique_blob_size),
                        ),
                    ],
                ),
                section(
                    "Annotated tags",
                    vec![count(
                        Metric::UniqueTagCount,
                        "Count",
                        "The total number of annotated tags",
                        None,
                        |h| c32(h.unique_tag_count),
                    )],
                ),
                section(
                    "References",
                    vec![count(
                        Metric::ReferenceCount,
                        "Count",
                        "The total number of references",
                        None,
                        |h| c32(h.reference_count),
                    )],
                ),
            ],
        ),
        Section::new(
            "Biggest objects",
            vec![
                section(
                    "Commits",
                    vec![
                        bytes(
                            Metric::MaxCommitSize,
                            "Maximum size",
                            "The size of the largest single commit",
                            Some(Category::CommitSize),
                            |h| c32(h.max_commit_size),
                        ),
                        count(
                            Metric::MaxParentCount,
                            "Maximum parents",
                            "The most parents of any single commit",
                            Some(Category::ParentCount),
                            |h| c32(h.max_parent_count),
                        ),
                    ],
                ),
                section(
                    "Trees",
                    vec![count(
                        Metric::MaxTreeEntries,
                        "Maximum entries",
                        "The most entries in any single tree",
                        Some(Category::TreeEntries),
                        |h| c32(h.max_tree_entries),
                    )],
                ),
                section(
                    "Blobs",
                    vec![bytes(
                        Metric::MaxBlobSize,
                        "Maximum size",
                        "The size of the largest blob object",
                        Some(Category::BlobSize),
                        |h| c32(h.max_blob_size),
                    )],
                ),
            ],
        ),
        Section::new(
            "History structure",
            vec![
                count(
                    Metric::MaxHistoryDepth,
                    "Maximum history depth",
                    "The longest chain of commits in history",
                    Some(Category::HistoryDepth),
                    |h| c32(h.max_history_depth),
                ),
                count(
                    Metric::MaxTagDepth,
                    "Maximum tag depth",
                    "The longest chain of annotated tags pointing at one another",
                    Some(Category::TagDepth),
                    |h| c32(h.max_tag_depth),
                ),
            ],
        ),
        Section::new(
            "Biggest checkouts",
            vec![
                count(
                    Metric::MaxExpandedTreeCount,
                    "Number of directories",
                    "The number of directories in the largest checkout",
                    Some(Category::CheckoutTrees),
                    |h| c32(h.max_expanded_tree_count),
                ),
                count(
                    Metric::MaxPathDepth,
                    "Maximum path depth",
                    "The maximum path depth in any checkout",
                    Some(Category::PathDepth),
                    |h| c32(h.max_path_depth),
                ),
                bytes(
                    Metric::MaxPathLength,
                    "Maximum path length",
                    "The maximum path length in any checkout",
                    Some(Category::PathLength),
                    |h| c32(h.max_path_length),
                ),
                count(
                    Metric::MaxExpandedBlobCount,
                    "Number of files",
                    "The number of files in the largest checkout",
                    Some(Category::CheckoutBlobs),
                    |h| c32(h.max_expanded_blob_count),
                ),
                bytes(
                    Metric::MaxExpandedBlobSize,
                    "Total size of files",
                    "The total size of files in the largest checkout",
                    Some(Category::CheckoutSize),
                    |h| c64(h.max_expanded_blob_size),
                ),
                count(
                    Metric::MaxExpandedLinkCount,
                    "Number of symlinks",
                    "The number of symlinks in the largest checkout",
                    Some(Category::CheckoutLinks),
                    |h| c32(h.max_expanded_link_count),
                ),
                count(
                    Metric::MaxExpandedSubmoduleCount,
                    "Number of submodules",
                    "The number of submodules in the largest checkout",
                    Some(Category::CheckoutSubmodules),
                    |h| c32(h.max_expanded_submodule_count),
                ),
            ],
        ),
    ]
}
