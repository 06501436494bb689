//! A uniform, source-agnostic tree walker: the same `N`-way, name-ordered descent drives reads
//! from a commit's tree, the index ("stage"), and a working directory alike.
//!
//! Every higher-level operation in this workspace that needs to compare or enumerate trees (status,
//! diffing, merging) is built as a thin `map`/`reduce` pair over [`walk()`], rather than
//! re-implementing its own recursive descent.
#![forbid(unsafe_code)]

use std::collections::{BTreeMap, BTreeSet};

use bstr::{BStr, BString, ByteSlice};
use git_hash::ObjectId;
use git_object::tree::TreeEntryMode;

pub mod stage;
pub mod tree;
pub mod workdir;

pub use stage::StageSource;
pub use tree::TreeSource;
pub use workdir::WorkdirSource;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("tree object {oid} referenced at '{path}' does not exist")]
    MissingTree { oid: ObjectId, path: BString },
    #[error("object {0} referenced as a tree is actually a {1}")]
    NotATree(ObjectId, git_object::Kind),
    #[error("blob {0} is missing from the object database")]
    MissingBlob(ObjectId),
    #[error("this source cannot produce content for '{0}'")]
    ContentUnavailable(BString),
    #[error(transparent)]
    Odb(#[from] git_odb::Error),
    #[error(transparent)]
    Decode(#[from] git_object::decode::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// One source's view of a single path: the mode it's recorded under, and the id of the object it
/// points to (a synthetic `null` id for directories a source doesn't address by content, like a
/// plain working-tree directory or an in-memory stage directory).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkEntry {
    pub mode: TreeEntryMode,
    pub oid: ObjectId,
}

/// A source [`walk()`] can drive: a commit's tree, the index, or a working directory.
///
/// Implementors track their own notion of "current position" through the `entry` each method
/// receives, which is always one this same source produced (from [`Source::root()`] or a prior
/// [`Source::children()`] call) — never a sibling source's.
pub trait Source {
    /// This source's root entry, or `None` if it has nothing to contribute to the walk.
    fn root(&mut self) -> Result<Option<WalkEntry>, Error>;

    /// The immediate children of `entry` (a tree-shaped entry previously produced by this same
    /// source at `path`), in any order — [`walk()`] computes the name-ordered union itself.
    fn children(&mut self, path: &BStr, entry: &WalkEntry) -> Result<Vec<(BString, WalkEntry)>, Error>;

    /// The raw content addressed by `entry` at `path`, if this source can produce one.
    fn content(&mut self, path: &BStr, entry: &WalkEntry) -> Result<Vec<u8>, Error>;
}

/// Join a directory path and a child name with `/`, or just return `name` if `path` is the root.
pub(crate) fn join(path: &BStr, name: &BStr) -> BString {
    if path.is_empty() {
        name.to_owned()
    } else {
        let mut joined = path.to_owned();
        joined.push(b'/');
        joined.extend_from_slice(name);
        joined
    }
}

/// Drive `sources` through a synchronous, name-ordered `N`-way descent.
///
/// At every directory, the union of child names across all sources is visited in ascending
/// lexicographic order; a source that has no entry for a given name contributes `None` rather
/// than an error. `map` turns a path's per-source entries into a value; whenever at least one
/// source says the path is a tree, the walk first recurses into it and then folds the recursed
/// children's values together with the path's own mapped value via `reduce`.
pub fn walk<'a, T>(
    sources: &mut [Box<dyn Source + 'a>],
    map: &mut dyn FnMut(&BStr, &[Option<WalkEntry>]) -> Result<T, Error>,
    reduce: &mut dyn FnMut(&BStr, T, Vec<T>) -> Result<T, Error>,
) -> Result<T, Error> {
    let root_entries: Vec<Option<WalkEntry>> = sources.iter_mut().map(|s| s.root()).collect::<Result<_, _>>()?;
    let root_path = BString::default();
    let root_value = map(root_path.as_bstr(), &root_entries)?;
    let children = walk_children(sources, root_path.as_bstr(), &root_entries, map, reduce)?;
    reduce(root_path.as_bstr(), root_value, children)
}

fn walk_children<'a, T>(
    sources: &mut [Box<dyn Source + 'a>],
    parent_path: &BStr,
    parent_entries: &[Option<WalkEntry>],
    map: &mut dyn FnMut(&BStr, &[Option<WalkEntry>]) -> Result<T, Error>,
    reduce: &mut dyn FnMut(&BStr, T, Vec<T>) -> Result<T, Error>,
) -> Result<Vec<T>, Error> {
    let mut per_source: Vec<BTreeMap<BString, WalkEntry>> = Vec::with_capacity(sources.len());
    for (source, parent_entry) in sources.iter_mut().zip(parent_entries) {
        let children = match parent_entry {
            Some(entry) if entry.mode == TreeEntryMode::Tree => {
                source.children(parent_path, entry)?.into_iter().collect()
            }
            _ => BTreeMap::new(),
        };
        per_source.push(children);
    }

    let mut names: BTreeSet<BString> = BTreeSet::new();
    for children in &per_source {
        names.extend(children.keys().cloned());
    }

    let mut values = Vec::with_capacity(names.len());
    for name in names {
        let child_path = join(parent_path, name.as_bstr());
        let entries: Vec<Option<WalkEntry>> = per_source.iter().map(|children| children.get(&name).copied()).collect();
        let own_value = map(child_path.as_bstr(), &entries)?;
        let is_tree = entries.iter().flatten().any(|entry| entry.mode == TreeEntryMode::Tree);
        let value = if is_tree {
            let grandchildren = walk_children(sources, child_path.as_bstr(), &entries, map, reduce)?;
            reduce(child_path.as_bstr(), own_value, grandchildren)?
        } else {
            own_value
        };
        values.push(value);
    }
    Ok(values)
}
