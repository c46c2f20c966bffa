//! Object source abstraction
//!
//! The scanner pulls objects one at a time from an [`ObjectSource`]. Order
//! is discovery order, not topological, and the same object may be
//! produced more than once.

use gix::ObjectId;
use gix::bstr::BString;
use rustc_hash::FxHashMap;
use std::collections::VecDeque;

use crate::error::SourceError;
use crate::model::ObjectKind;

/// How a child is referenced by its parent
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ChildMode {
    /// A regular object the parent's descriptor depends on
    Object,
    /// A tree entry pointing at a symbolic link's blob
    Symlink,
    /// A tree entry pointing at a commit in another repository
    Submodule,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ChildRef {
    pub id: ObjectId,
    /// Path segment for tree entries
    pub name: Option<BString>,
    pub mode: ChildMode,
}

impl ChildRef {
    pub fn object(id: ObjectId) -> Self {
        Self {
            id,
            name: None,
            mode: ChildMode::Object,
        }
    }

    pub fn entry(id: ObjectId, name: impl Into<BString>, mode: ChildMode) -> Self {
        Self {
            id,
            name: Some(name.into()),
            mode,
        }
    }

    /// Whether the parent must wait for this child's descriptor
    pub fn is_dependency(&self) -> bool {
        self.mode == ChildMode::Object
    }
}

/// One object as produced by a source
///
/// Children of a commit are its root tree followed by its parents in order.
/// A tag has exactly one child, the tagged object.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RawObject {
    pub id: ObjectId,
    pub kind: ObjectKind,
    /// Uncompressed object size in bytes
    pub size: u64,
    pub children: Vec<ChildRef>,
    /// Human-readable name, when the source tracks them
    pub name: Option<String>,
}

impl RawObject {
    pub fn blob(id: ObjectId, size: u64) -> Self {
        Self {
            id,
            kind: ObjectKind::Blob,
            size,
            children: Vec::new(),
            name: None,
        }
    }

    pub fn tree(id: ObjectId, size: u64, entries: Vec<ChildRef>) -> Self {
        Self {
            id,
            kind: ObjectKind::Tree,
            size,
            children: entries,
            name: None,
        }
    }

    pub fn commit(id: ObjectId, size: u64, tree: ObjectId, parents: &[ObjectId]) -> Self {
        let mut children = Vec::with_capacity(parents.len() + 1);
        children.push(ChildRef::object(tree));
        children.extend(parents.iter().copied().map(ChildRef::object));
        Self {
            id,
            kind: ObjectKind::Commit,
            size,
            children,
            name: None,
        }
    }

    pub fn tag(id: ObjectId, size: u64, target: ObjectId) -> Self {
        Self {
            id,
            kind: ObjectKind::Tag,
            size,
            children: vec![ChildRef::object(target)],
            name: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn dependencies(&self) -> impl Iterator<Item = &ChildRef> {
        self.children.iter().filter(|c| c.is_dependency())
    }
}

/// Pull-based stream of reachable objects
pub trait ObjectSource {
    /// Next object, `Ok(None)` once exhausted
    fn next_object(&mut self) -> Result<Option<RawObject>, SourceError>;

    /// Names of the references the stream was seeded from
    fn references(&self) -> &[String] {
        &[]
    }

    /// Total number of parent edges pointing at `id`, if the source knows it
    ///
    /// When known, the scanner drops a cached descriptor once every
    /// referencing parent has been finalized.
    fn reference_count_hint(&self, _id: &ObjectId) -> Option<u32> {
        None
    }
}

/// In-memory object source over a fixed list of objects
///
/// Knows the complete graph up front, so it can report exact reference
/// counts. Used by tests and benchmarks.
#[derive(Debug, Default)]
pub struct MemorySource {
    objects: VecDeque<RawObject>,
    references: Vec<String>,
    in_degree: FxHashMap<ObjectId, u32>,
    hints: bool,
    fail_after: Option<usize>,
    produced: usize,
}

impl MemorySource {
    pub fn new(objects: Vec<RawObject>) -> Self {
        let mut in_degree: FxHashMap<ObjectId, u32> = FxHashMap::default();
        // Duplicate entries describe the same edges; count each id once.
        let mut counted = rustc_hash::FxHashSet::default();
        for obj in &objects {
            if !counted.insert(obj.id) {
                continue;
            }
            for child in obj.dependencies() {
                *in_degree.entry(child.id).or_default() += 1;
            }
        }
        Self {
            objects: objects.into(),
            references: Vec::new(),
            in_degree,
            hints: true,
            fail_after: None,
            produced: 0,
        }
    }

    pub fn with_references<I, S>(mut self, refs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.references = refs.into_iter().map(Into::into).collect();
        self
    }

    /// Stop reporting reference counts, so every descriptor is retained
    pub fn without_hints(mut self) -> Self {
        self.hints = false;
        self
    }

    /// Fail with a read error after `n` objects have been produced
    pub fn fail_after(mut self, n: usize) -> Self {
        self.fail_after = Some(n);
        self
    }
}

impl ObjectSource for MemorySource {
    fn next_object(&mut self) -> Result<Option<RawObject>, SourceError> {
        if self.fail_after == Some(self.produced) {
            if let Some(next) = self.objects.front() {
                return Err(SourceError::Read {
                    id: next.id,
                    source: "object data truncated".into(),
                });
            }
        }
        let next = self.objects.pop_front();
        if next.is_some() {
            self.produced += 1;
        }
        Ok(next)
    }

    fn references(&self) -> &[String] {
        &self.references
    }

    fn reference_count_hint(&self, id: &ObjectId) -> Option<u32> {
        if !self.hints {
            return None;
        }
        Some(self.in_degree.get(id).copied().unwrap_or(0))
    }
}
