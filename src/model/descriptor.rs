//! Per-object size descriptors
//!
//! A descriptor summarizes the size and shape of one object. Descriptors of
//! trees, commits and tags are combined from the already-finalized
//! descriptors of their children, never from raw child data.

use gix::ObjectId;
use serde::Serialize;

use super::counts::{Count32, Count64};

/// The four kinds of object found in a history graph
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Blob,
    Tree,
    Commit,
    Tag,
}

impl ObjectKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ObjectKind::Blob => "blob",
            ObjectKind::Tree => "tree",
            ObjectKind::Commit => "commit",
            ObjectKind::Tag => "tag",
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Serialize)]
pub struct BlobSize {
    pub size: Count32,
}

/// Shape of a tree, expanded over everything beneath it
///
/// The `expanded_*` fields are what a checkout of this tree would contain:
/// a subtree referenced twice contributes twice, but its descriptor is
/// computed once and reused.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Serialize)]
pub struct TreeSize {
    /// Number of direct entries
    pub entry_count: Count32,
    pub max_path_depth: Count32,
    pub max_path_length: Count32,
    pub expanded_tree_count: Count32,
    pub expanded_blob_count: Count32,
    pub expanded_blob_size: Count64,
    pub expanded_link_count: Count32,
    pub expanded_submodule_count: Count32,
}

impl TreeSize {
    /// Starting point for a tree with `entries` direct entries; the tree
    /// counts itself as one directory.
    pub fn new(entries: usize) -> Self {
        Self {
            entry_count: Count32::new(entries as u64),
            expanded_tree_count: Count32::new(1),
            ..Self::default()
        }
    }

    fn add_leaf_path(&mut self, filename: &[u8]) {
        self.max_path_depth.adjust_max(Count32::new(1));
        self.max_path_length
            .adjust_max(Count32::new(filename.len() as u64));
    }

    pub fn add_blob(&mut self, filename: &[u8], blob: BlobSize) {
        self.add_leaf_path(filename);
        self.expanded_blob_count.increment(Count32::new(1));
        self.expanded_blob_size.increment(Count64::from(blob.size));
    }

    pub fn add_link(&mut self, filename: &[u8]) {
        self.add_leaf_path(filename);
        self.expanded_link_count.increment(Count32::new(1));
    }

    pub fn add_submodule(&mut self, filename: &[u8]) {
        self.add_leaf_path(filename);
        self.expanded_submodule_count.increment(Count32::new(1));
    }

    /// Fold in a subtree found under `filename`
    pub fn add_subtree(&mut self, filename: &[u8], sub: &TreeSize) {
        self.max_path_depth
            .adjust_max(sub.max_path_depth.plus(Count32::new(1)));

        let name_len = Count32::new(filename.len() as u64);
        if sub.max_path_length > Count32::default() {
            // "dir" + "/" + longest path inside it
            self.max_path_length
                .adjust_max(name_len.plus(Count32::new(1)).plus(sub.max_path_length));
        } else {
            self.max_path_length.adjust_max(name_len);
        }

        self.expanded_tree_count.increment(sub.expanded_tree_count);
        self.expanded_blob_count.increment(sub.expanded_blob_count);
        self.expanded_blob_size.increment(sub.expanded_blob_size);
        self.expanded_link_count.increment(sub.expanded_link_count);
        self.expanded_submodule_count
            .increment(sub.expanded_submodule_count);
    }
}

/// Per-commit descriptor
///
/// Distinct trees and blobs reachable from a commit's ancestors are not
/// tracked here; they are only counted repository-wide in `HistorySize`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize)]
pub struct CommitSize {
    pub parent_count: Count32,
    /// Longest chain of commits down to a root commit, counting this one
    pub max_ancestor_depth: Count32,
    #[serde(serialize_with = "crate::model::serialize_oid")]
    pub tree: ObjectId,
    /// Checkout metrics of the root tree
    pub checkout: TreeSize,
}

impl CommitSize {
    pub fn new(tree: ObjectId, checkout: TreeSize) -> Self {
        Self {
            parent_count: Count32::default(),
            max_ancestor_depth: Count32::new(1),
            tree,
            checkout,
        }
    }

    pub fn add_parent(&mut self, parent: &CommitSize) {
        self.parent_count.increment(Count32::new(1));
        self.max_ancestor_depth
            .adjust_max(parent.max_ancestor_depth.plus(Count32::new(1)));
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize)]
pub struct TagSize {
    /// Length of the tag-to-tag chain starting here, counting this tag
    pub tag_depth: Count32,
    #[serde(serialize_with = "crate::model::serialize_oid")]
    pub target: ObjectId,
}

impl TagSize {
    pub fn new(target: ObjectId, target_descriptor: &Descriptor) -> Self {
        let tag_depth = match target_descriptor {
            Descriptor::Tag(inner) => inner.tag_depth.plus(Count32::new(1)),
            _ => Count32::new(1),
        };
        Self { tag_depth, target }
    }
}

/// Finalized descriptor of one object
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Descriptor {
    Blob(BlobSize),
    Tree(TreeSize),
    Commit(CommitSize),
    Tag(TagSize),
}

impl Descriptor {
    pub fn kind(&self) -> ObjectKind {
        match self {
            Descriptor::Blob(_) => ObjectKind::Blob,
            Descriptor::Tree(_) => ObjectKind::Tree,
            Descriptor::Commit(_) => ObjectKind::Commit,
            Descriptor::Tag(_) => ObjectKind::Tag,
        }
    }
}
