//! Git object source
//!
//! Walks every object reachable from the selected references of a real
//! repository (via gix) and streams them depth-first to the scanner.

use gix::ObjectId;
use gix::bstr::ByteSlice;
use gix::prelude::FindExt;
use log::{debug, info};
use rustc_hash::FxHashSet;
use std::path::Path;
use std::time::Instant;

use crate::error::SourceError;
use crate::model::ObjectKind;

use super::filter::ReferenceFilter;
use super::names;
use super::source::{ChildMode, ChildRef, ObjectSource, RawObject};

/// A reference and whether the filter selected it
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RefSelection {
    pub name: String,
    pub included: bool,
}

/// An object discovered but not yet read
struct Discovered {
    id: ObjectId,
    /// Known from the parent; roots are looked up
    kind: Option<ObjectKind>,
    name: Option<String>,
}

/// Object source backed by a git repository on disk
pub struct GitObjectSource {
    repo: gix::Repository,
    selection: Vec<RefSelection>,
    references: Vec<String>,
    stack: Vec<Discovered>,
    discovered: FxHashSet<ObjectId>,
    track_names: bool,
    buf: Vec<u8>,
}

impl GitObjectSource {
    /// Open the repository at `path` and seed the walk from every reference
    /// `filter` selects
    pub fn open(path: impl AsRef<Path>, filter: &ReferenceFilter) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let phase_start = Instant::now();
        let repo = gix::open(path).map_err(|e| SourceError::Open {
            path: path.display().to_string(),
            source: Box::new(e),
        })?;
        if repo.is_shallow() {
            return Err(SourceError::Shallow);
        }
        debug!("Open repository: {:?}", phase_start.elapsed());

        let phase_start = Instant::now();
        let mut roots = list_references(&repo)?;
        roots.sort_by(|a, b| a.0.cmp(&b.0));

        let mut selection = Vec::with_capacity(roots.len());
        let mut references = Vec::new();
        let mut stack = Vec::new();
        let mut discovered = FxHashSet::default();

        for (name, id) in roots {
            let included = filter.matches(&name);
            if included {
                references.push(name.clone());
                if discovered.insert(id) {
                    stack.push(Discovered {
                        id,
                        kind: None,
                        name: Some(name.clone()),
                    });
                }
            }
            selection.push(RefSelection { name, included });
        }
        // Pop in name order
        stack.reverse();

        info!(
            "Selected {} of {} references",
            references.len(),
            selection.len()
        );
        debug!("Enumerate references: {:?}", phase_start.elapsed());

        Ok(Self {
            repo,
            selection,
            references,
            stack,
            discovered,
            track_names: true,
            buf: Vec::with_capacity(8 * 1024),
        })
    }

    /// Whether to derive human-readable names for discovered objects
    pub fn with_names(mut self, track_names: bool) -> Self {
        self.track_names = track_names;
        if !track_names {
            for item in &mut self.stack {
                item.name = None;
            }
        }
        self
    }

    /// Every reference in the repository, with the filter's verdict
    pub fn reference_selection(&self) -> &[RefSelection] {
        &self.selection
    }

    fn discover(&mut self, id: ObjectId, kind: ObjectKind, name: impl FnOnce() -> String) {
        if self.discovered.insert(id) {
            let name = self.track_names.then(name);
            self.stack.push(Discovered {
                id,
                kind: Some(kind),
                name,
            });
        }
    }

    fn read(&mut self, item: Discovered) -> Result<RawObject, SourceError> {
        let id = item.id;
        let kind = match item.kind {
            Some(kind) => kind,
            None => object_kind(self.header(id)?.kind()),
        };

        let mut buf = std::mem::take(&mut self.buf);
        let (raw, next) = match kind {
            ObjectKind::Blob => {
                let size = self.header(id)?.size();
                (RawObject::blob(id, size), Vec::new())
            }
            ObjectKind::Tree => {
                let (entries, next) = {
                    let tree = self
                        .repo
                        .objects
                        .find_tree(&id, &mut buf)
                        .map_err(|e| read_error(id, e))?;

                    let mut entries = Vec::with_capacity(tree.entries.len());
                    let mut next = Vec::new();
                    for entry in &tree.entries {
                        let child = entry.oid.to_owned();
                        let filename = entry.filename.to_owned();
                        let (mode, child_kind) = if entry.mode.is_tree() {
                            (ChildMode::Object, Some(ObjectKind::Tree))
                        } else if entry.mode.is_commit() {
                            (ChildMode::Submodule, None)
                        } else if entry.mode.is_link() {
                            (ChildMode::Symlink, Some(ObjectKind::Blob))
                        } else {
                            (ChildMode::Object, Some(ObjectKind::Blob))
                        };
                        if let Some(child_kind) = child_kind {
                            let name = item
                                .name
                                .as_deref()
                                .map(|tree| names::entry_name(tree, &filename.to_str_lossy()));
                            next.push((child, child_kind, name));
                        }
                        entries.push(ChildRef::entry(child, filename, mode));
                    }
                    (entries, next)
                };
                (RawObject::tree(id, buf.len() as u64, entries), next)
            }
            ObjectKind::Commit => {
                let (tree, parents) = {
                    let commit = self
                        .repo
                        .objects
                        .find_commit(&id, &mut buf)
                        .map_err(|e| read_error(id, e))?;
                    let parents: Vec<ObjectId> = commit.parents().collect();
                    (commit.tree(), parents)
                };

                let mut next = Vec::with_capacity(parents.len() + 1);
                next.push((tree, ObjectKind::Tree, item.name.as_deref().map(names::tree_name)));
                for (i, parent) in parents.iter().enumerate() {
                    let name = item.name.as_deref().map(|c| names::parent_name(c, i));
                    next.push((*parent, ObjectKind::Commit, name));
                }
                (RawObject::commit(id, buf.len() as u64, tree, &parents), next)
            }
            ObjectKind::Tag => {
                let (target, target_kind) = {
                    let tag = self
                        .repo
                        .objects
                        .find_tag(&id, &mut buf)
                        .map_err(|e| read_error(id, e))?;
                    (tag.target(), object_kind(tag.target_kind))
                };
                let name = item.name.as_deref().map(names::tag_target_name);
                (
                    RawObject::tag(id, buf.len() as u64, target),
                    vec![(target, target_kind, name)],
                )
            }
        };
        self.buf = buf;

        // Reversed so the first child is walked first
        for (child, child_kind, name) in next.into_iter().rev() {
            self.discover(child, child_kind, || name.unwrap_or_default());
        }

        Ok(match item.name {
            Some(name) if self.track_names => raw.named(name),
            _ => raw,
        })
    }

    fn header(&self, id: ObjectId) -> Result<gix::odb::find::Header, SourceError> {
        self.repo.find_header(id).map_err(|e| read_error(id, e))
    }
}

impl ObjectSource for GitObjectSource {
    fn next_object(&mut self) -> Result<Option<RawObject>, SourceError> {
        match self.stack.pop() {
            Some(item) => self.read(item).map(Some),
            None => Ok(None),
        }
    }

    fn references(&self) -> &[String] {
        &self.references
    }
}

/// All direct references and the objects they point at; symbolic
/// references are skipped since their targets are listed themselves
fn list_references(repo: &gix::Repository) -> Result<Vec<(String, ObjectId)>, SourceError> {
    let platform = repo
        .references()
        .map_err(|e| SourceError::References(Box::new(e)))?;
    let iter = platform
        .all()
        .map_err(|e| SourceError::References(Box::new(e)))?;

    let mut refs = Vec::new();
    for reference in iter {
        let reference = reference.map_err(SourceError::References)?;
        if let Some(id) = reference.target().try_id() {
            refs.push((reference.name().as_bstr().to_string(), id.to_owned()));
        }
    }
    Ok(refs)
}

fn object_kind(kind: gix::object::Kind) -> ObjectKind {
    match kind {
        gix::object::Kind::Blob => ObjectKind::Blob,
        gix::object::Kind::Tree => ObjectKind::Tree,
        gix::object::Kind::Commit => ObjectKind::Commit,
        gix::object::Kind::Tag => ObjectKind::Tag,
    }
}

fn read_error<E>(id: ObjectId, e: E) -> SourceError
where
    E: std::error::Error + Send + Sync + 'static,
{
    SourceError::Read {
        id,
        source: Box::new(e),
    }
}
