//! Recursive three-way merge of trees, driven by [`git_traverse::TreeSource`] directly rather
//! than through [`git_traverse::walk()`]: the merge decision table needs to see all three sides'
//! entries together *before* deciding whether to recurse at all (a type mismatch between `ours`
//! and `theirs` is a conflict even when one side is a tree and the walk's generic "recurse if any
//! side is a tree" rule would otherwise silently drop the other side's content), so this module
//! owns its own descent while still reading trees through the same `Source` the rest of the
//! workspace uses.
use std::collections::{BTreeMap, BTreeSet};

use bstr::{BStr, BString, ByteSlice};
use git_hash::ObjectId;
use git_index::entry::Stage;
use git_object::tree::{Tree, TreeEntry, TreeEntryMode};
use git_odb::{Find, Write};
use git_traverse::{Source, TreeSource, WalkEntry};

use crate::blob::merge_blobs;
use crate::{Conflict, ConflictKind, Error, MergeOptions, TreeMergeOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Tree,
    Blob,
    Link,
    Commit,
}

fn kind_of(mode: TreeEntryMode) -> Kind {
    match mode {
        TreeEntryMode::Tree => Kind::Tree,
        TreeEntryMode::Blob | TreeEntryMode::BlobExecutable => Kind::Blob,
        TreeEntryMode::Link => Kind::Link,
        TreeEntryMode::Commit => Kind::Commit,
    }
}

fn changed(side: Option<WalkEntry>, base: Option<WalkEntry>) -> bool {
    match (side, base) {
        (None, None) => false,
        (Some(_), None) | (None, Some(_)) => true,
        (Some(a), Some(b)) => a.oid != b.oid,
    }
}

fn index_mode(mode: TreeEntryMode) -> Option<git_index::entry::Mode> {
    use git_index::entry::Mode as M;
    Some(match mode {
        TreeEntryMode::Blob => M::File,
        TreeEntryMode::BlobExecutable => M::FileExecutable,
        TreeEntryMode::Link => M::Symlink,
        TreeEntryMode::Commit => M::Commit,
        TreeEntryMode::Tree => return None,
    })
}

fn stage_entry(path: &BStr, stage: Stage, entry: WalkEntry) -> Option<git_index::Entry> {
    let mode = index_mode(entry.mode)?;
    Some(git_index::Entry {
        stat: git_index::entry::Stat::default(),
        id: entry.oid,
        mode,
        stage,
        assume_valid: false,
        skip_worktree: false,
        intent_to_add: false,
        path: path.to_owned(),
    })
}

fn stage_conflict_sides(
    index: &mut git_index::State,
    path: &BStr,
    base: Option<WalkEntry>,
    ours: Option<WalkEntry>,
    theirs: Option<WalkEntry>,
) {
    for (side_stage, entry) in [(Stage::Base, base), (Stage::Ours, ours), (Stage::Theirs, theirs)] {
        if let Some(entry) = entry {
            if let Some(index_entry) = stage_entry(path, side_stage, entry) {
                index.insert(index_entry);
            }
        }
    }
}

fn children_of<O: Find>(source: &mut TreeSource<'_, O>, path: &BStr, entry: WalkEntry) -> Result<BTreeMap<BString, WalkEntry>, Error> {
    if entry.mode == TreeEntryMode::Tree {
        Ok(source.children(path, &entry)?.into_iter().collect())
    } else {
        Ok(BTreeMap::new())
    }
}

fn write_tree<O: Write>(odb: &O, mut entries: Vec<TreeEntry>) -> Result<ObjectId, Error> {
    Tree::sort_entries(&mut entries);
    let tree = Tree { entries };
    let mut buf = Vec::new();
    tree.write_to(&mut buf).expect("encoding a tree's canonical bytes cannot fail");
    Ok(odb.write_buf(git_object::Kind::Tree, &buf)?)
}

fn join(path: &BStr, name: &BStr) -> BString {
    if path.is_empty() {
        name.to_owned()
    } else {
        let mut joined = path.to_owned();
        joined.push(b'/');
        joined.extend_from_slice(name);
        joined
    }
}

#[allow(clippy::too_many_arguments)]
fn merge_dir<O: Find + Write>(
    odb: &O,
    hash_kind: git_hash::Kind,
    ours: &mut TreeSource<'_, O>,
    base: &mut TreeSource<'_, O>,
    theirs: &mut TreeSource<'_, O>,
    path: &BStr,
    ours_entry: WalkEntry,
    base_entry: WalkEntry,
    theirs_entry: WalkEntry,
    index: &mut git_index::State,
    options: &MergeOptions<'_>,
    conflicts: &mut Vec<Conflict>,
) -> Result<ObjectId, Error> {
    let ours_children = children_of(ours, path, ours_entry)?;
    let base_children = children_of(base, path, base_entry)?;
    let theirs_children = children_of(theirs, path, theirs_entry)?;

    let mut names: BTreeSet<BString> = BTreeSet::new();
    names.extend(ours_children.keys().cloned());
    names.extend(base_children.keys().cloned());
    names.extend(theirs_children.keys().cloned());

    let mut merged_entries = Vec::new();

    for name in names {
        let child_path = join(path, name.as_bstr());
        let our_child = ours_children.get(&name).copied();
        let base_child = base_children.get(&name).copied();
        let their_child = theirs_children.get(&name).copied();

        if let (Some(o), Some(t)) = (our_child, their_child) {
            if kind_of(o.mode) != kind_of(t.mode) {
                conflicts.push(Conflict {
                    path: child_path.clone(),
                    kind: ConflictKind::TypeMismatch,
                    conflicted_blob: None,
                });
                stage_conflict_sides(index, child_path.as_bstr(), base_child, our_child, their_child);
                merged_entries.push(TreeEntry {
                    mode: o.mode,
                    filename: name,
                    oid: o.oid,
                });
                continue;
            }
        }

        let our_change = changed(our_child, base_child);
        let their_change = changed(their_child, base_child);

        let resolved = if !our_change && !their_change {
            base_child
        } else if !our_change && their_change {
            if their_child.is_none() {
                our_child
            } else {
                their_child
            }
        } else if our_change && !their_change {
            if our_child.is_none() {
                their_child
            } else {
                our_child
            }
        } else {
            match (our_child, their_child) {
                (Some(o), Some(t)) if kind_of(o.mode) == Kind::Tree && kind_of(t.mode) == Kind::Tree => {
                    let base_for_recurse = base_child.unwrap_or(WalkEntry {
                        mode: TreeEntryMode::Tree,
                        oid: ObjectId::empty_tree(hash_kind),
                    });
                    let child_oid = merge_dir(
                        odb,
                        hash_kind,
                        ours,
                        base,
                        theirs,
                        child_path.as_bstr(),
                        o,
                        base_for_recurse,
                        t,
                        index,
                        options,
                        conflicts,
                    )?;
                    Some(WalkEntry {
                        mode: TreeEntryMode::Tree,
                        oid: child_oid,
                    })
                }
                (Some(o), Some(t)) if kind_of(o.mode) == Kind::Blob && kind_of(t.mode) == Kind::Blob => {
                    let base_content = base_child.map(|e| base.content(child_path.as_bstr(), &e)).transpose()?.unwrap_or_default();
                    let our_content = ours.content(child_path.as_bstr(), &o)?;
                    let their_content = theirs.content(child_path.as_bstr(), &t)?;
                    let outcome = merge_blobs(&base_content, &our_content, &their_content, options.our_name, options.their_name);
                    if outcome.has_conflict {
                        conflicts.push(Conflict {
                            path: child_path.clone(),
                            kind: ConflictKind::BothModified,
                            conflicted_blob: Some(outcome.content),
                        });
                        stage_conflict_sides(index, child_path.as_bstr(), base_child, our_child, their_child);
                        None
                    } else {
                        let oid = odb.write_buf(git_object::Kind::Blob, &outcome.content)?;
                        Some(WalkEntry { mode: o.mode, oid })
                    }
                }
                (None, None) => {
                    // Both sides deleted the same path: agreement, not a conflict.
                    None
                }
                (None, Some(_)) => {
                    conflicts.push(Conflict {
                        path: child_path.clone(),
                        kind: ConflictKind::DeleteByUs,
                        conflicted_blob: None,
                    });
                    stage_conflict_sides(index, child_path.as_bstr(), base_child, None, their_child);
                    None
                }
                (Some(_), None) => {
                    conflicts.push(Conflict {
                        path: child_path.clone(),
                        kind: ConflictKind::DeleteByTheirs,
                        conflicted_blob: None,
                    });
                    stage_conflict_sides(index, child_path.as_bstr(), base_child, our_child, None);
                    None
                }
                _ => {
                    return Err(Error::MergeNotSupported { path: child_path });
                }
            }
        };

        if let Some(entry) = resolved {
            merged_entries.push(TreeEntry {
                mode: entry.mode,
                filename: name,
                oid: entry.oid,
            });
        }
    }

    write_tree(odb, merged_entries)
}

/// Merge `ours`, `base` and `theirs` three ways, returning the resulting tree's id along with a
/// report of every conflicted path. Conflicting blob paths get their diff3-marked content staged
/// at stages 1/2/3 of `index` (base/ours/theirs) and omitted from the returned tree; callers that
/// want worktree conflict markers written take `Conflict::conflicted_blob` and do so themselves.
///
/// When `options.abort_on_conflict` is set and at least one conflict occurred, no index mutation
/// happens and [`Error::MergeConflict`] is returned instead.
pub fn merge_trees<O: Find + Write>(
    odb: &O,
    hash_kind: git_hash::Kind,
    index: &mut git_index::State,
    ours: ObjectId,
    base: ObjectId,
    theirs: ObjectId,
    options: MergeOptions<'_>,
) -> Result<TreeMergeOutcome, Error> {
    let mut ours_src = TreeSource::new(odb, hash_kind, ours);
    let mut base_src = TreeSource::new(odb, hash_kind, base);
    let mut theirs_src = TreeSource::new(odb, hash_kind, theirs);

    let ours_root = ours_src.root()?.expect("a tree source always has a root");
    let base_root = base_src.root()?.expect("a tree source always has a root");
    let theirs_root = theirs_src.root()?.expect("a tree source always has a root");
    let root_path = BString::default();

    if options.abort_on_conflict {
        let mut staging_index = index.clone();
        let mut conflicts = Vec::new();
        let tree_oid = merge_dir(
            odb,
            hash_kind,
            &mut ours_src,
            &mut base_src,
            &mut theirs_src,
            root_path.as_bstr(),
            ours_root,
            base_root,
            theirs_root,
            &mut staging_index,
            &options,
            &mut conflicts,
        )?;
        if !conflicts.is_empty() {
            return Err(Error::MergeConflict(conflicts));
        }
        *index = staging_index;
        return Ok(TreeMergeOutcome { tree: tree_oid, conflicts });
    }

    let mut conflicts = Vec::new();
    let tree_oid = merge_dir(
        odb,
        hash_kind,
        &mut ours_src,
        &mut base_src,
        &mut theirs_src,
        root_path.as_bstr(),
        ours_root,
        base_root,
        theirs_root,
        index,
        &options,
        &mut conflicts,
    )?;
    Ok(TreeMergeOutcome { tree: tree_oid, conflicts })
}
