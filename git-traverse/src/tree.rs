use bstr::{BStr, BString};
use git_hash::ObjectId;
use git_object::tree::{Tree, TreeEntryMode};
use git_odb::{Find, Format};

use crate::{Error, Source, WalkEntry};

/// A [`Source`] backed by a single tree (normally a commit's tree, or the canonical empty tree
/// for a from-scratch comparison), reading sub-trees and blobs lazily through an object database.
pub struct TreeSource<'odb, O> {
    odb: &'odb O,
    hash_kind: git_hash::Kind,
    root: ObjectId,
}

impl<'odb, O: Find> TreeSource<'odb, O> {
    pub fn new(odb: &'odb O, hash_kind: git_hash::Kind, root: ObjectId) -> Self {
        TreeSource { odb, hash_kind, root }
    }

    fn read_tree(&self, oid: &ObjectId, path: &BStr) -> Result<Tree, Error> {
        if *oid == ObjectId::empty_tree(self.hash_kind) {
            return Ok(Tree::default());
        }
        match self.odb.try_find(oid, Format::Content)? {
            Some(data) if data.kind == git_object::Kind::Tree => Ok(Tree::from_bytes(&data.bytes, self.hash_kind)?),
            Some(data) => Err(Error::NotATree(oid.to_owned(), data.kind)),
            None => Err(Error::MissingTree {
                oid: oid.to_owned(),
                path: path.to_owned(),
            }),
        }
    }
}

impl<'odb, O: Find> Source for TreeSource<'odb, O> {
    fn root(&mut self) -> Result<Option<WalkEntry>, Error> {
        Ok(Some(WalkEntry {
            mode: TreeEntryMode::Tree,
            oid: self.root,
        }))
    }

    fn children(&mut self, path: &BStr, entry: &WalkEntry) -> Result<Vec<(BString, WalkEntry)>, Error> {
        let tree = self.read_tree(&entry.oid, path)?;
        Ok(tree
            .entries
            .into_iter()
            .map(|entry| (entry.filename, WalkEntry { mode: entry.mode, oid: entry.oid }))
            .collect())
    }

    fn content(&mut self, _path: &BStr, entry: &WalkEntry) -> Result<Vec<u8>, Error> {
        match self.odb.try_find(&entry.oid, Format::Content)? {
            Some(data) => Ok(data.bytes),
            None => Err(Error::MissingBlob(entry.oid)),
        }
    }
}
