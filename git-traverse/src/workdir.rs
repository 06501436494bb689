use bstr::{BStr, BString, ByteSlice};
use git_fs::{Filesystem, ReadOptions};
use git_hash::ObjectId;
use git_index::entry::Stage;
use git_object::tree::TreeEntryMode;

use crate::{Error, Source, WalkEntry};

/// A [`Source`] backed by a real (or test-double) working directory, honoring the racy-git OID
/// caching rule: a regular file whose `lstat` still matches its index entry's recorded stat is
/// assumed unchanged and its indexed id is reused rather than rehashed; when rehashing turns out
/// to reproduce the same id despite drifted stats, the index entry's stat is refreshed in place.
///
/// `.git` is always excluded, at any depth, matching how a submodule's own `.git` file must never
/// be walked into either.
pub struct WorkdirSource<'fs, F: Filesystem> {
    fs: &'fs F,
    root: std::path::PathBuf,
    hash_kind: git_hash::Kind,
    index: Option<&'fs mut git_index::State>,
}

impl<'fs, F: Filesystem> WorkdirSource<'fs, F> {
    pub fn new(fs: &'fs F, root: impl Into<std::path::PathBuf>, hash_kind: git_hash::Kind) -> Self {
        WorkdirSource {
            fs,
            root: root.into(),
            hash_kind,
            index: None,
        }
    }

    /// Enable the OID-caching rule against `index`, writing back refreshed stats as files are
    /// rehashed.
    pub fn with_index(mut self, index: &'fs mut git_index::State) -> Self {
        self.index = Some(index);
        self
    }

    fn disk_path(&self, path: &BStr) -> std::path::PathBuf {
        let mut full = self.root.clone();
        if !path.is_empty() {
            full.push(path.to_str_lossy().as_ref());
        }
        full
    }

    fn oid_for_file(&mut self, path: &BStr, disk_path: &std::path::Path, lstat: &git_fs::Stat) -> Result<ObjectId, Error> {
        if let Some(index) = self.index.as_deref() {
            if let Some(existing) = index
                .entries()
                .iter()
                .find(|e| e.path.as_bstr() == path && e.stage == Stage::Resolved)
            {
                if stats_match(&existing.stat, lstat) {
                    return Ok(existing.id);
                }
            }
        }

        let content = self
            .fs
            .read(disk_path, ReadOptions::default())?
            .ok_or_else(|| Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "file vanished during walk")))?;
        let (oid, _wrapped) = git_odb::hash_object(git_object::Kind::Blob, &content, self.hash_kind);

        if let Some(index) = self.index.as_deref_mut() {
            if let Some(existing) = index
                .entries()
                .iter()
                .find(|e| e.path.as_bstr() == path && e.stage == Stage::Resolved)
            {
                let refreshed_stat = to_index_stat(lstat);
                if existing.id == oid && existing.stat != refreshed_stat {
                    let mut refreshed = existing.clone();
                    refreshed.stat = refreshed_stat;
                    index.insert(refreshed);
                }
            }
        }

        Ok(oid)
    }
}

fn stats_match(indexed: &git_index::entry::Stat, lstat: &git_fs::Stat) -> bool {
    indexed.ctime_secs == lstat.ctime_seconds
        && indexed.ctime_nsecs == lstat.ctime_nanoseconds
        && indexed.mtime_secs == lstat.mtime_seconds
        && indexed.mtime_nsecs == lstat.mtime_nanoseconds
        && indexed.dev == lstat.dev
        && indexed.ino == lstat.ino
        && indexed.uid == lstat.uid
        && indexed.gid == lstat.gid
        && indexed.size == lstat.size
}

fn to_index_stat(lstat: &git_fs::Stat) -> git_index::entry::Stat {
    git_index::entry::Stat {
        ctime_secs: lstat.ctime_seconds,
        ctime_nsecs: lstat.ctime_nanoseconds,
        mtime_secs: lstat.mtime_seconds,
        mtime_nsecs: lstat.mtime_nanoseconds,
        dev: lstat.dev,
        ino: lstat.ino,
        uid: lstat.uid,
        gid: lstat.gid,
        size: lstat.size,
    }
}

impl<'fs, F: Filesystem> Source for WorkdirSource<'fs, F> {
    fn root(&mut self) -> Result<Option<WalkEntry>, Error> {
        Ok(Some(WalkEntry {
            mode: TreeEntryMode::Tree,
            oid: ObjectId::null(self.hash_kind),
        }))
    }

    fn children(&mut self, path: &BStr, _entry: &WalkEntry) -> Result<Vec<(BString, WalkEntry)>, Error> {
        let dir = self.disk_path(path);
        let mut out = Vec::new();
        for child_path in self.fs.read_dir(&dir)? {
            let name = match child_path.file_name().and_then(|n| n.to_str()) {
                Some(name) => name,
                None => continue,
            };
            if name == ".git" {
                continue;
            }
            let lstat = match self.fs.lstat(&child_path)? {
                Some(lstat) => lstat,
                None => continue,
            };
            let mode = TreeEntryMode::from_value(lstat.mode).unwrap_or(TreeEntryMode::Blob);
            let child_rel_path = super::join(path, name.as_bytes().as_bstr());
            let oid = match mode {
                TreeEntryMode::Tree => ObjectId::null(self.hash_kind),
                TreeEntryMode::Link => {
                    let target = self.fs.readlink(&child_path)?.unwrap_or_default();
                    let (oid, _) = git_odb::hash_object(git_object::Kind::Blob, &target, self.hash_kind);
                    oid
                }
                _ => self.oid_for_file(child_rel_path.as_bstr(), &child_path, &lstat)?,
            };
            out.push((BString::from(name.as_bytes().to_vec()), WalkEntry { mode, oid }));
        }
        out.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(out)
    }

    fn content(&mut self, path: &BStr, entry: &WalkEntry) -> Result<Vec<u8>, Error> {
        let disk_path = self.disk_path(path);
        match entry.mode {
            TreeEntryMode::Link => Ok(self.fs.readlink(&disk_path)?.unwrap_or_default()),
            _ => self
                .fs
                .read(&disk_path, ReadOptions::default())?
                .ok_or_else(|| Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "file vanished"))),
        }
    }
}
