//! Three-way merging: diff3 blob content merge, and a recursive tree merge built on top of it
//! that writes the merged tree through an object database and records conflicts as index stage
//! entries.
#![forbid(unsafe_code)]

use bstr::BString;

pub mod blob;
pub mod tree;

pub use blob::{merge_blobs, BlobMergeOutcome};
pub use tree::merge_trees;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("could not read or write an object during the merge")]
    Odb(#[from] git_odb::Error),
    #[error("could not read a tree during the merge")]
    Traverse(#[from] git_traverse::Error),
    #[error("merging '{path}' is not supported")]
    MergeNotSupported { path: BString },
    #[error("merge produced {} conflict(s)", .0.len())]
    MergeConflict(Vec<Conflict>),
}

/// Why a path is reported in a [`tree::merge_trees()`] outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// Both sides changed the same blob differently; `Conflict::conflicted_blob` carries the
    /// diff3-marked content.
    BothModified,
    /// We deleted the path, they modified it.
    DeleteByUs,
    /// We modified the path, they deleted it.
    DeleteByTheirs,
    /// Both sides give the path a different type (tree vs. blob vs. symlink vs. submodule).
    TypeMismatch,
}

/// One unresolved path from a [`tree::merge_trees()`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub path: BString,
    pub kind: ConflictKind,
    /// The diff3-marked blob content for a [`ConflictKind::BothModified`] conflict; `None` for
    /// every other kind, which has no merged content to offer.
    pub conflicted_blob: Option<Vec<u8>>,
}

/// Tunables for [`tree::merge_trees()`].
#[derive(Debug, Clone, Copy)]
pub struct MergeOptions<'a> {
    /// The label used in `<<<<<<<` conflict markers for our side. Defaults to `"ours"`.
    pub our_name: &'a str,
    /// The label used in `>>>>>>>` conflict markers for their side. Defaults to `"theirs"`.
    pub their_name: &'a str,
    /// If set, a conflict anywhere in the tree raises [`Error::MergeConflict`] instead of staging
    /// conflicts into the index and returning a tree with the conflicting paths omitted.
    pub abort_on_conflict: bool,
}

impl Default for MergeOptions<'_> {
    fn default() -> Self {
        MergeOptions {
            our_name: "ours",
            their_name: "theirs",
            abort_on_conflict: false,
        }
    }
}

/// The result of a successful (possibly still conflicted) [`tree::merge_trees()`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeMergeOutcome {
    /// The id of the merged tree, written to the object database. Paths left unresolved by a
    /// [`ConflictKind::BothModified`] conflict are omitted from it.
    pub tree: git_hash::ObjectId,
    /// Every path that could not be merged automatically.
    pub conflicts: Vec<Conflict>,
}
