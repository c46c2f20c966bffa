//! Traversal engine
//!
//! Objects arrive in discovery order. An object whose children are all
//! finalized is scored at once; otherwise it is parked until the last
//! missing child is finalized. Parked objects are released through an
//! explicit ready stack, so arbitrarily deep histories never recurse.

use gix::ObjectId;
use rustc_hash::FxHashMap;

use crate::error::{ScanError, SourceError};
use crate::model::{
    BlobSize, CommitSize, Count32, Descriptor, HistorySize, ObjectKind, TagSize, TreeSize,
};

use super::cache::SizeCache;
use super::progress::{CancelFlag, ProgressCounter};
use crate::repository::source::{ChildMode, ChildRef, ObjectSource, RawObject};

/// An object waiting for some of its children
struct Pending {
    raw: RawObject,
    missing: usize,
}

/// Counters describing how a scan went, for logging
#[derive(Debug, Default, Clone, Copy)]
pub struct EngineStats {
    pub finalized: u64,
    pub duplicates: u64,
    pub peak_pending: usize,
}

/// State of one scan
pub struct ScanCtx<'a> {
    cache: SizeCache,
    pending: FxHashMap<ObjectId, Pending>,
    /// child id -> parents parked on it, one entry per edge
    waiters: FxHashMap<ObjectId, Vec<ObjectId>>,
    ready: Vec<RawObject>,
    history: HistorySize,
    progress: &'a ProgressCounter,
    cancel: &'a CancelFlag,
    stats: EngineStats,
}

impl<'a> ScanCtx<'a> {
    pub fn new(progress: &'a ProgressCounter, cancel: &'a CancelFlag) -> Self {
        Self {
            cache: SizeCache::new(),
            pending: FxHashMap::default(),
            waiters: FxHashMap::default(),
            ready: Vec::new(),
            history: HistorySize::new(),
            progress,
            cancel,
            stats: EngineStats::default(),
        }
    }

    pub fn record_reference(&mut self, refname: &str) {
        self.history.record_reference(refname);
    }

    /// Take one object from the source
    pub fn accept<S: ObjectSource + ?Sized>(&mut self, raw: RawObject, source: &S) -> Result<(), ScanError> {
        if self.cache.is_finalized(&raw.id) || self.pending.contains_key(&raw.id) {
            self.stats.duplicates += 1;
            return Ok(());
        }

        let mut missing = 0;
        for child in raw.dependencies() {
            if !self.cache.is_finalized(&child.id) {
                self.waiters.entry(child.id).or_default().push(raw.id);
                missing += 1;
            }
        }

        if missing == 0 {
            self.ready.push(raw);
            self.drain(source)
        } else {
            self.pending.insert(raw.id, Pending { raw, missing });
            self.stats.peak_pending = self.stats.peak_pending.max(self.pending.len());
            Ok(())
        }
    }

    /// Finalize everything on the ready stack, including parents it unblocks
    fn drain<S: ObjectSource + ?Sized>(&mut self, source: &S) -> Result<(), ScanError> {
        while let Some(raw) = self.ready.pop() {
            if self.cancel.is_cancelled() {
                return Err(ScanError::Cancelled);
            }

            let descriptor = self.combine(&raw)?;
            let id = raw.id;
            self.finalize(raw, descriptor, source);

            let Some(parents) = self.waiters.remove(&id) else {
                continue;
            };
            for parent in parents {
                let entry = self.pending.get_mut(&parent).ok_or_else(|| {
                    ScanError::Invariant(format!("{parent} waits on {id} but is not pending"))
                })?;
                entry.missing -= 1;
                if entry.missing == 0 {
                    if let Some(unblocked) = self.pending.remove(&parent) {
                        self.ready.push(unblocked.raw);
                    }
                }
            }
        }
        Ok(())
    }

    fn finalize<S: ObjectSource + ?Sized>(&mut self, raw: RawObject, descriptor: Descriptor, source: &S) {
        self.cache
            .put(raw.id, descriptor, source.reference_count_hint(&raw.id));
        self.fold(&raw, &descriptor);
        for child in raw.dependencies() {
            self.cache.consume(&child.id);
        }
        self.stats.finalized += 1;
        self.progress.inc();
    }

    fn fold(&mut self, raw: &RawObject, descriptor: &Descriptor) {
        let name = raw.name.as_deref();
        match descriptor {
            Descriptor::Blob(blob) => self.history.record_blob(raw.id, blob, name),
            Descriptor::Tree(tree) => self.history.record_tree(raw.id, raw.size, tree, name),
            Descriptor::Commit(commit) => {
                self.history.record_commit(raw.id, raw.size, commit, name)
            }
            Descriptor::Tag(tag) => self.history.record_tag(raw.id, tag, name),
        }
    }

    /// Build the descriptor of `raw` from its finalized children
    fn combine(&self, raw: &RawObject) -> Result<Descriptor, ScanError> {
        match raw.kind {
            ObjectKind::Blob => Ok(Descriptor::Blob(BlobSize {
                size: Count32::new(raw.size),
            })),
            ObjectKind::Tree => {
                let mut size = TreeSize::new(raw.children.len());
                for child in &raw.children {
                    let name: &[u8] = child.name.as_ref().map(|n| n.as_slice()).unwrap_or_default();
                    match child.mode {
                        ChildMode::Symlink => size.add_link(name),
                        ChildMode::Submodule => size.add_submodule(name),
                        ChildMode::Object => match self.lookup(raw, child)? {
                            Descriptor::Blob(blob) => size.add_blob(name, *blob),
                            Descriptor::Tree(sub) => size.add_subtree(name, sub),
                            other => return Err(unexpected(raw, child, "blob or tree", other)),
                        },
                    }
                }
                Ok(Descriptor::Tree(size))
            }
            ObjectKind::Commit => {
                let mut children = raw.children.iter();
                let tree = children.next().ok_or_else(|| malformed(raw, "commit has no tree"))?;
                let checkout = match self.lookup(raw, tree)? {
                    Descriptor::Tree(t) => *t,
                    other => return Err(unexpected(raw, tree, "tree", other)),
                };
                let mut size = CommitSize::new(tree.id, checkout);
                for parent in children {
                    match self.lookup(raw, parent)? {
                        Descriptor::Commit(p) => size.add_parent(p),
                        other => return Err(unexpected(raw, parent, "commit", other)),
                    }
                }
                Ok(Descriptor::Commit(size))
            }
            ObjectKind::Tag => {
                let target = raw
                    .children
                    .first()
                    .ok_or_else(|| malformed(raw, "tag has no target"))?;
                let descriptor = self.lookup(raw, target)?;
                Ok(Descriptor::Tag(TagSize::new(target.id, descriptor)))
            }
        }
    }

    fn lookup(&self, parent: &RawObject, child: &ChildRef) -> Result<&Descriptor, ScanError> {
        self.cache.get(&child.id).ok_or_else(|| {
            ScanError::Invariant(format!(
                "{} {} combined without a descriptor for child {}",
                parent.kind, parent.id, child.id
            ))
        })
    }

    /// Finish the scan; fails if any object is still waiting on a child
    pub fn finish(self) -> Result<(HistorySize, EngineStats), ScanError> {
        if !self.pending.is_empty() {
            let mut never_produced: Vec<(ObjectId, ObjectId)> = self
                .waiters
                .iter()
                .filter(|(child, _)| !self.pending.contains_key(*child))
                .filter_map(|(child, parents)| parents.first().map(|p| (*child, *p)))
                .collect();
            never_produced.sort();

            return Err(match never_produced.first() {
                Some(&(id, parent)) => ScanError::MissingObject { id, parent },
                None => ScanError::Invariant(format!(
                    "{} objects still pending with no missing child",
                    self.pending.len()
                )),
            });
        }
        Ok((self.history, self.stats))
    }

    pub fn cached_descriptors(&self) -> usize {
        self.cache.live()
    }
}

fn unexpected(parent: &RawObject, child: &ChildRef, expected: &'static str, found: &Descriptor) -> ScanError {
    ScanError::UnexpectedKind {
        id: child.id,
        parent: parent.id,
        expected,
        found: found.kind(),
    }
}

fn malformed(raw: &RawObject, reason: &str) -> ScanError {
    ScanError::Source(SourceError::Malformed {
        id: raw.id,
        reason: reason.to_string(),
    })
}
