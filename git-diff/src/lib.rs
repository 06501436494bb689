//! Compute the set of changes between two trees, reusing the same `N`-way walk that drives
//! status and checkout rather than writing a second recursive descent.
#![forbid(unsafe_code)]

use bstr::{BStr, BString};
use git_hash::ObjectId;
use git_object::tree::TreeEntryMode;
use git_traverse::{Source, TreeSource, WalkEntry};
use quick_error::quick_error;

quick_error! {
    #[derive(Debug)]
    pub enum Error {
        Traverse(err: git_traverse::Error) {
            display("could not walk the compared trees")
            from()
            source(err)
        }
    }
}

/// What happened to a single path between an old and a new tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Added { mode: TreeEntryMode, oid: ObjectId },
    Removed { mode: TreeEntryMode, oid: ObjectId },
    Modified {
        previous_mode: TreeEntryMode,
        previous_oid: ObjectId,
        mode: TreeEntryMode,
        oid: ObjectId,
    },
}

/// One entry of a [`tree_changes()`] result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeChange {
    pub path: BString,
    pub change: Change,
}

/// Diff `previous` against `new`, returning every path whose blob, symlink, or submodule entry
/// differs. Trees that are equal by id are skipped without being read at all; a path that is a
/// tree on one side and a non-tree on the other is reported once, at the non-tree's granularity,
/// never descended into on the side where it doesn't exist as a tree.
pub fn tree_changes<O>(odb: &O, hash_kind: git_hash::Kind, previous: ObjectId, new: ObjectId) -> Result<Vec<TreeChange>, Error>
where
    O: git_odb::Find,
{
    if previous == new {
        return Ok(Vec::new());
    }

    let mut sources: Vec<Box<dyn Source + '_>> = vec![
        Box::new(TreeSource::new(odb, hash_kind, previous)),
        Box::new(TreeSource::new(odb, hash_kind, new)),
    ];

    let changes = git_traverse::walk(
        &mut sources,
        &mut |path: &BStr, entries: &[Option<WalkEntry>]| -> Result<Vec<TreeChange>, git_traverse::Error> {
            let (old, new) = (entries[0], entries[1]);
            Ok(classify(path, old, new).into_iter().collect())
        },
        &mut |_path, own, children| {
            let mut all = own;
            for child in children {
                all.extend(child);
            }
            Ok(all)
        },
    )?;

    Ok(changes)
}

fn classify(path: &BStr, old: Option<WalkEntry>, new: Option<WalkEntry>) -> Option<TreeChange> {
    if path.is_empty() {
        return None;
    }
    match (old, new) {
        (None, None) => None,
        (Some(old), None) => {
            if old.mode == TreeEntryMode::Tree {
                None
            } else {
                Some(TreeChange {
                    path: path.to_owned(),
                    change: Change::Removed {
                        mode: old.mode,
                        oid: old.oid,
                    },
                })
            }
        }
        (None, Some(new)) => {
            if new.mode == TreeEntryMode::Tree {
                None
            } else {
                Some(TreeChange {
                    path: path.to_owned(),
                    change: Change::Added {
                        mode: new.mode,
                        oid: new.oid,
                    },
                })
            }
        }
        (Some(old), Some(new)) => {
            if old.mode == TreeEntryMode::Tree && new.mode == TreeEntryMode::Tree {
                None
            } else if old.mode == TreeEntryMode::Tree {
                Some(TreeChange {
                    path: path.to_owned(),
                    change: Change::Added {
                        mode: new.mode,
                        oid: new.oid,
                    },
                })
            } else if new.mode == TreeEntryMode::Tree {
                Some(TreeChange {
                    path: path.to_owned(),
                    change: Change::Removed {
                        mode: old.mode,
                        oid: old.oid,
                    },
                })
            } else if old.mode == new.mode && old.oid == new.oid {
                None
            } else {
                Some(TreeChange {
                    path: path.to_owned(),
                    change: Change::Modified {
                        previous_mode: old.mode,
                        previous_oid: old.oid,
                        mode: new.mode,
                        oid: new.oid,
                    },
                })
            }
        }
    }
}
