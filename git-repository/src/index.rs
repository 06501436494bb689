//! The index as the repository's sole mutable singleton: [`Repository::read_index_direct()`] and
//! [`Repository::write_index_direct()`] are the only sanctioned way to observe or change it, so
//! every caller sees the same mtime-gated cache rather than racing their own parse of the file.
use std::{io::Write as _, path::PathBuf, time::Duration};

use git_fs::Filesystem;

use crate::{Error, Repository};

#[derive(Default)]
pub(crate) struct Cache {
    pub(crate) state: Option<git_index::State>,
    pub(crate) stat: Option<git_fs::Stat>,
}

impl<F: Filesystem> Repository<F> {
    fn index_path(&self) -> PathBuf {
        self.git_dir.join("index")
    }

    /// Return the current index, parsing a fresh copy if `force` is set or the file's stat
    /// (mtime/size) has moved since the last read; otherwise return the cached copy.
    ///
    /// Fails with [`Error::UnmergedIndex`] if `allow_unmerged` is `false` and the index still has
    /// stage 1/2/3 entries from an unresolved conflict.
    pub fn read_index_direct(&self, force: bool, allow_unmerged: bool) -> Result<git_index::State, Error> {
        let path = self.index_path();
        let current_stat = self.fs.stat(&path).map_err(|source| Error::Io { path: path.clone(), source })?;

        let mut cache = self.index.borrow_mut();
        let stale = force || cache.state.is_none() || cache.stat != current_stat;
        if stale {
            let bytes = self
                .fs
                .read(&path, Default::default())
                .map_err(|source| Error::Io { path: path.clone(), source })?;
            let state = match bytes {
                Some(bytes) => git_index::State::parse(&bytes, self.hash_kind)?,
                None => git_index::State::empty(self.hash_kind),
            };
            cache.state = Some(state);
            cache.stat = current_stat;
        }
        let state = cache.state.clone().expect("populated by the stale branch above, unconditionally");
        drop(cache);

        if !allow_unmerged && state.entries().iter().any(|entry| entry.stage != git_index::entry::Stage::Resolved) {
            return Err(Error::UnmergedIndex);
        }
        Ok(state)
    }

    /// Serialize `index` and atomically rewrite the index file through [`git_lock`], then refresh
    /// the cache so the next [`Repository::read_index_direct()`] call sees it without re-parsing.
    pub fn write_index_direct(&self, index: &git_index::State) -> Result<(), Error> {
        let path = self.index_path();
        let bytes = index.serialize();
        git_lock::acquire(&path, git_lock::Fail::AfterDurationWithBackoff(Duration::from_secs(5)), git_lock::ContainingDirectory::CreateAllRaceproof, |file| {
            file.write_all(&bytes).map_err(git_lock::Error::from)
        })?;
        self.fs.fsync(&path).map_err(|source| Error::Io { path: path.clone(), source })?;

        let mut cache = self.index.borrow_mut();
        cache.state = Some(index.clone());
        cache.stat = self.fs.stat(&path).map_err(|source| Error::Io { path, source })?;
        Ok(())
    }
}
