use std::cmp::Ordering;

use bstr::{BStr, BString, ByteSlice};
use git_hash::ObjectId;

use crate::{decode, encode};

/// The mode of a tree entry, one of the five forms git allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde1", derive(serde::Serialize, serde::Deserialize))]
pub enum TreeEntryMode {
    /// A sub-tree, i.e. a directory.
    Tree,
    /// A regular, non-executable file.
    Blob,
    /// A regular, executable file.
    BlobExecutable,
    /// A symbolic link, whose blob content is the link target.
    Link,
    /// A commit, recorded by a submodule.
    Commit,
}

impl TreeEntryMode {
    /// The raw octal value git stores for this mode.
    pub fn value(&self) -> u32 {
        match self {
            TreeEntryMode::Tree => 0o040000,
            TreeEntryMode::Blob => 0o100644,
            TreeEntryMode::BlobExecutable => 0o100755,
            TreeEntryMode::Link => 0o120000,
            TreeEntryMode::Commit => 0o160000,
        }
    }

    /// Recover a `TreeEntryMode` from its raw octal value, accepting any valid file-permission
    /// bits for a regular blob (git itself normalizes these to `644`/`755` but a loose tree may
    /// have been written by another implementation).
    pub fn from_value(mode: u32) -> Result<Self, decode::Error> {
        Ok(match mode {
            0o040000 => TreeEntryMode::Tree,
            0o120000 => TreeEntryMode::Link,
            0o160000 => TreeEntryMode::Commit,
            _ if mode & 0o170000 == 0o100000 => {
                if mode & 0o111 != 0 {
                    TreeEntryMode::BlobExecutable
                } else {
                    TreeEntryMode::Blob
                }
            }
            _ => return Err(decode::Error::Malformed("unrecognized tree entry mode")),
        })
    }

    /// Whether this mode refers to a sub-tree.
    pub fn is_tree(&self) -> bool {
        matches!(self, TreeEntryMode::Tree)
    }

    /// Whether this mode refers to anything that can be read as a blob (a regular file or a
    /// symlink target).
    pub fn is_blob_like(&self) -> bool {
        matches!(self, TreeEntryMode::Blob | TreeEntryMode::BlobExecutable | TreeEntryMode::Link)
    }
}

/// A single entry inside a [`Tree`]: a name, the mode under which it's recorded, and the id of the
/// object it points to.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde1", derive(serde::Serialize, serde::Deserialize))]
pub struct TreeEntry {
    /// The entry's mode.
    pub mode: TreeEntryMode,
    /// The entry's name; never contains a `/` nor traverses (`.`/`..`).
    pub filename: BString,
    /// The object this entry points to — another tree, a blob, or a commit for submodules.
    pub oid: ObjectId,
}

/// A directory listing: an ordered, duplicate-free set of [`TreeEntry`] values.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde1", derive(serde::Serialize, serde::Deserialize))]
pub struct Tree {
    /// The entries, always kept in git's tree sort order (see [`compare_entries()`]).
    pub entries: Vec<TreeEntry>,
}

/// Compare two entry names the way git orders tree entries: a name that names a sub-tree sorts as
/// though it had a trailing `/`, so `"foo"` (a blob) sorts before `"foo.txt"` but after `"foo/"`
/// would if `"foo"` were a tree and there also existed a literal `"foo.txt"`.
pub fn compare_entries(a_name: &BStr, a_mode: TreeEntryMode, b_name: &BStr, b_mode: TreeEntryMode) -> Ordering {
    let common_len = a_name.len().min(b_name.len());
    match a_name[..common_len].cmp(&b_name[..common_len]) {
        Ordering::Equal => {}
        non_eq => return non_eq,
    }
    let a_tail = tail_byte(a_name, a_mode, common_len);
    let b_tail = tail_byte(b_name, b_mode, common_len);
    a_tail.cmp(&b_tail)
}

fn tail_byte(name: &BStr, mode: TreeEntryMode, common_len: usize) -> Option<u8> {
    if common_len < name.len() {
        Some(name[common_len])
    } else if mode.is_tree() {
        Some(b'/')
    } else {
        None
    }
}

impl Tree {
    /// Sort `entries` into git's canonical tree order in place.
    pub fn sort_entries(entries: &mut [TreeEntry]) {
        entries.sort_by(|a, b| compare_entries(a.filename.as_bstr(), a.mode, b.filename.as_bstr(), b.mode));
    }

    /// Decode a tree's canonical byte representation. `hash_kind` must be the object format of
    /// the repository the tree was read from — a tree entry's id is stored as raw bytes with no
    /// length prefix, so the reader has to already know whether to take 20 or 32 of them.
    pub fn from_bytes(mut data: &[u8], hash_kind: git_hash::Kind) -> Result<Self, decode::Error> {
        let hash_len = hash_kind.len_in_bytes();
        let mut entries = Vec::new();
        let mut previous: Option<(BString, TreeEntryMode)> = None;
        while !data.is_empty() {
            let space = data
                .iter()
                .position(|b| *b == b' ')
                .ok_or(decode::Error::Malformed("missing space after mode"))?;
            let mode_value = std::str::from_utf8(&data[..space])
                .ok()
                .and_then(|s| u32::from_str_radix(s, 8).ok())
                .ok_or(decode::Error::Malformed("mode is not valid octal"))?;
            let mode = TreeEntryMode::from_value(mode_value)?;
            data = &data[space + 1..];

            let nul = data
                .iter()
                .position(|b| *b == 0)
                .ok_or(decode::Error::Malformed("missing NUL after name"))?;
            let name = git_validate::tree::name(data[..nul].as_bstr())?.to_owned();
            data = &data[nul + 1..];

            if data.len() < hash_len {
                return Err(decode::Error::Malformed("truncated object id"));
            }
            let oid = ObjectId::from_bytes(&data[..hash_len]).expect("length matches hash_kind");
            data = &data[hash_len..];

            if let Some((prev_name, prev_mode)) = &previous {
                if compare_entries(prev_name.as_bstr(), *prev_mode, name.as_bstr(), mode) != Ordering::Less {
                    return Err(decode::Error::Malformed("tree entries are not strictly ordered"));
                }
            }
            previous = Some((name.clone(), mode));
            entries.push(TreeEntry { mode, filename: name, oid });
        }
        Ok(Tree { entries })
    }

    /// Serialize this tree's entries, which must already be in canonical order, into their
    /// canonical byte representation.
    pub fn write_to(&self, out: &mut Vec<u8>) -> Result<(), encode::Error> {
        for entry in &self.entries {
            out.extend_from_slice(format!("{:o}", entry.mode.value()).as_bytes());
            out.push(b' ');
            out.extend_from_slice(&entry.filename);
            out.push(0);
            out.extend_from_slice(entry.oid.as_oid().as_bytes());
        }
        Ok(())
    }
}
