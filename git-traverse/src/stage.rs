use std::collections::BTreeMap;

use bstr::{BStr, BString, ByteSlice};
use git_hash::ObjectId;
use git_index::entry::{Mode, Stage};
use git_object::tree::TreeEntryMode;

use crate::{Error, Source, WalkEntry};

fn tree_mode(mode: Mode) -> TreeEntryMode {
    match mode {
        Mode::File => TreeEntryMode::Blob,
        Mode::FileExecutable => TreeEntryMode::BlobExecutable,
        Mode::Symlink => TreeEntryMode::Link,
        Mode::Commit => TreeEntryMode::Commit,
    }
}

/// A [`Source`] that presents the live index's resolved (stage 0) entries as a directory tree,
/// without ever reading blob content — a path with an unresolved conflict simply doesn't appear,
/// matching how `git write-tree` treats the unmerged set.
pub struct StageSource<'index> {
    entries: Vec<&'index git_index::Entry>,
    hash_kind: git_hash::Kind,
}

impl<'index> StageSource<'index> {
    pub fn new(index: &'index git_index::State, hash_kind: git_hash::Kind) -> Self {
        let entries = index.entries().iter().filter(|e| e.stage == Stage::Resolved).collect();
        StageSource { entries, hash_kind }
    }
}

impl<'index> Source for StageSource<'index> {
    fn root(&mut self) -> Result<Option<WalkEntry>, Error> {
        Ok(Some(WalkEntry {
            mode: TreeEntryMode::Tree,
            oid: ObjectId::null(self.hash_kind),
        }))
    }

    fn children(&mut self, path: &BStr, _entry: &WalkEntry) -> Result<Vec<(BString, WalkEntry)>, Error> {
        let mut prefix: BString = path.to_owned();
        if !prefix.is_empty() {
            prefix.push(b'/');
        }

        let mut out: BTreeMap<BString, WalkEntry> = BTreeMap::new();
        for entry in &self.entries {
            if !entry.path.starts_with(&prefix) {
                continue;
            }
            let path_bytes: &[u8] = entry.path.as_ref();
            let rest = &path_bytes[prefix.len()..];
            if rest.is_empty() {
                continue;
            }
            let (name, child_entry) = match rest.iter().position(|&b| b == b'/') {
                Some(slash) => (
                    BString::from(rest[..slash].to_vec()),
                    WalkEntry {
                        mode: TreeEntryMode::Tree,
                        oid: ObjectId::null(self.hash_kind),
                    },
                ),
                None => (
                    BString::from(rest.to_vec()),
                    WalkEntry {
                        mode: tree_mode(entry.mode),
                        oid: entry.id,
                    },
                ),
            };
            out.entry(name).or_insert(child_entry);
        }
        Ok(out.into_iter().collect())
    }

    fn content(&mut self, path: &BStr, _entry: &WalkEntry) -> Result<Vec<u8>, Error> {
        Err(Error::ContentUnavailable(path.to_owned()))
    }
}
