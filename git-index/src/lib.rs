//! Parsing and serialization of the git index (the staging area file normally found at
//! `.git/index`), along with an in-memory representation that can be mutated and written back.
#![forbid(unsafe_code)]

use bstr::{BStr, BString, ByteSlice};
use git_hash::{Kind as HashKind, ObjectId};

pub mod entry;
mod decode;
mod encode;

pub use entry::Entry;

/// The on-disk index format version. Only the two versions git itself still writes are
/// supported; version 3 is what unlocks the per-entry extended flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Version {
    V2,
    V3,
}

impl Default for Version {
    fn default() -> Self {
        Version::V2
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("not a git index file - signature mismatch")]
    BadSignature,
    #[error("unsupported index version {0}, only 2 and 3 are understood")]
    UnsupportedVersion(u32),
    #[error("index file is truncated")]
    Truncated,
    #[error("index checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: ObjectId, actual: ObjectId },
    #[error("entry claims extended flags but the index is version 2")]
    ExtendedFlagsInV2,
    #[error("entry sets a reserved extended-flag bit")]
    ReservedExtendedFlagBitSet,
    #[error("entry has an unsupported mode 0o{0:o}")]
    UnsupportedMode(u32),
    #[error("entry padding contains non-NUL bytes")]
    MalformedPadding,
    #[error("entry path '{0}' is unsafe")]
    UnsafePath(BString),
    #[error("entries are not in strictly ascending (path, stage) order at '{0}'")]
    OutOfOrder(BString),
}

/// The parsed, in-memory content of an index file: a flat, sorted list of entries.
///
/// Entries are kept sorted by `(path, stage)`, matching the order git itself requires on disk:
/// paths in byte order, and within a path the resolved entry (stage 0) before the conflict
/// sides (stages 1, 2, 3).
#[derive(Debug, Clone)]
pub struct State {
    version: Version,
    hash_kind: HashKind,
    entries: Vec<Entry>,
}

fn sort_key(entry: &Entry) -> (&BStr, u16) {
    (entry.path.as_bstr(), entry.stage.to_bits())
}

impl State {
    /// An empty index for a fresh repository using `hash_kind` as its object hash.
    pub fn empty(hash_kind: HashKind) -> Self {
        State {
            version: Version::V2,
            hash_kind,
            entries: Vec::new(),
        }
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Parse the content of an index file, validating its trailing checksum against `hash_kind`.
    pub fn parse(data: &[u8], hash_kind: HashKind) -> Result<Self, Error> {
        decode::verify_checksum(data, hash_kind)?;
        let (version, count) = decode::header(data)?;

        let mut entries = Vec::with_capacity(count as usize);
        let mut pos = 12;
        for _ in 0..count {
            let (entry, next_pos) = decode::entry(data, pos, version, hash_kind)?;
            if let Some(previous) = entries.last() {
                if sort_key(&entry) <= sort_key(previous) {
                    return Err(Error::OutOfOrder(entry.path.clone()));
                }
            }
            entries.push(entry);
            pos = next_pos;
        }

        // Any bytes between the last entry and the trailing checksum are optional extension
        // chunks (tree cache, untracked cache, ...). We don't interpret them, and since they are
        // not reproduced on write, there is nothing further to parse here.

        Ok(State {
            version,
            hash_kind,
            entries,
        })
    }

    /// Serialize this index back to its on-disk byte representation. Any extension chunks that
    /// were present in the source this `State` was parsed from are not reproduced.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(b"DIRC");
        let version = match self.version {
            Version::V2 => 2u32,
            Version::V3 => 3u32,
        };
        out.extend_from_slice(&version.to_be_bytes());
        out.extend_from_slice(&(self.entries.len() as u32).to_be_bytes());

        for entry in &self.entries {
            encode::entry(&mut out, entry, self.version);
        }

        let checksum = git_hash::hash(self.hash_kind, &out);
        out.extend_from_slice(checksum.as_bytes());
        out
    }

    /// Look up the resolved (stage 0) entry for `path`.
    pub fn has(&self, path: &BStr) -> bool {
        self.entries
            .iter()
            .any(|e| e.path.as_bstr() == path && e.stage == entry::Stage::Resolved)
    }

    /// Find the entry for `path` at the given stage, if present.
    pub fn entry(&self, path: &BStr, stage: entry::Stage) -> Option<&Entry> {
        self.entries
            .iter()
            .find(|e| e.path.as_bstr() == path && e.stage == stage)
    }

    /// Insert or replace the entry for `entry.path` at `entry.stage`, keeping entries sorted.
    /// Bumps the index to version 3 if `entry` carries extended-only state.
    pub fn insert(&mut self, entry: Entry) {
        if entry.skip_worktree || entry.intent_to_add {
            self.version = Version::V3;
        }
        let key = sort_key(&entry);
        match self.entries.binary_search_by(|probe| sort_key(probe).cmp(&key)) {
            Ok(existing) => self.entries[existing] = entry,
            Err(insert_at) => self.entries.insert(insert_at, entry),
        }
    }

    /// Remove every entry at `path`, across all stages, along with any entries nested under it
    /// (i.e. whose path starts with `path/`).
    pub fn remove(&mut self, path: &BStr) -> bool {
        let before = self.entries.len();
        let mut subtree_prefix = path.to_vec();
        subtree_prefix.push(b'/');
        self.entries
            .retain(|e| e.path.as_bstr() != path && !e.path.starts_with(&subtree_prefix));
        self.entries.len() != before
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
