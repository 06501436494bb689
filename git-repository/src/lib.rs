//! The process-wide handle into a git repository: owns the filesystem, the object database, the
//! reference store and the index, and mediates every other crate's access to them.
//!
//! A [`Repository`] is opened once per `gitdir` and kept around for the caches it accumulates - the
//! object database's in-memory object cache, and the index's last-known on-disk stat. Nothing here
//! re-reads the index file on every call; [`Repository::read_index_direct()`] only parses a fresh
//! copy when the file's mtime or size has moved since the last read.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

use std::{
    cell::RefCell,
    path::{Path, PathBuf},
    sync::Arc,
};

use git_hash::{oid, ObjectId};

mod index;
mod reference;

pub use git_ref::{FullName, Target};

/// Everything that can go wrong opening or operating on a [`Repository`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A filesystem operation on `path` failed.
    #[error("could not access '{path}'")]
    Io {
        /// The path that couldn't be read or written.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// `path` doesn't look like a git directory: it has no `objects` subdirectory.
    #[error("'{0}' does not look like a git directory (no 'objects' subdirectory)")]
    NotARepository(PathBuf),
    /// [`Repository::workdir_source()`] was called on a bare repository.
    #[error("this repository is bare and has no work tree")]
    Bare,
    /// [`Repository::read_index_direct()`] was called with `allow_unmerged = false` against an
    /// index that still has stage 1/2/3 entries from an unresolved conflict.
    #[error("the index has unresolved conflicts; pass allow_unmerged to read it anyway")]
    UnmergedIndex,
    #[error(transparent)]
    Config(#[from] git_config::Error),
    #[error(transparent)]
    Odb(#[from] git_odb::Error),
    #[error(transparent)]
    Refs(#[from] git_ref::Error),
    #[error(transparent)]
    Index(#[from] git_index::Error),
    #[error(transparent)]
    Traverse(#[from] git_traverse::Error),
    #[error(transparent)]
    Diff(#[from] git_diff::Error),
    #[error(transparent)]
    Merge(#[from] git_merge::Error),
    #[error(transparent)]
    Lock(#[from] git_lock::Error),
    #[error(transparent)]
    Decode(#[from] git_object::decode::Error),
}

/// A handle onto one repository's `gitdir`, generic over the filesystem implementation so tests
/// can swap in something other than [`git_fs::StdFilesystem`].
pub struct Repository<F: git_fs::Filesystem = git_fs::StdFilesystem> {
    fs: F,
    git_dir: PathBuf,
    work_dir: Option<PathBuf>,
    hash_kind: git_hash::Kind,
    config: git_config::Config,
    objects: git_odb::Handle,
    refs: git_ref::Store,
    index: RefCell<index::Cache>,
}

impl Repository<git_fs::StdFilesystem> {
    /// Open the repository rooted at `git_dir` (e.g. `/path/to/project/.git`), using the host
    /// filesystem directly.
    pub fn open(git_dir: impl Into<PathBuf>) -> Result<Self, Error> {
        Self::open_with_fs(git_fs::StdFilesystem, git_dir)
    }
}

impl<F: git_fs::Filesystem> Repository<F> {
    /// Open the repository rooted at `git_dir`, reading its `config` and wiring the object
    /// database, reference store and index cache to it. `fs` drives every read/write this handle
    /// performs, letting tests substitute an in-memory or faulty filesystem.
    pub fn open_with_fs(fs: F, git_dir: impl Into<PathBuf>) -> Result<Self, Error> {
        let git_dir = git_dir.into();
        let objects_dir = git_dir.join("objects");
        if fs.stat(&objects_dir).map_err(|source| Error::Io { path: objects_dir.clone(), source })?.is_none() {
            return Err(Error::NotARepository(git_dir));
        }

        let config_path = git_dir.join("config");
        let config_bytes = fs
            .read(&config_path, Default::default())
            .map_err(|source| Error::Io { path: config_path.clone(), source })?
            .unwrap_or_default();
        let config = git_config::Config::from_bytes(&config_bytes)?;
        let hash_kind = config.object_format()?;
        let core = config.core_settings()?;

        let store = git_odb::Store::at(&objects_dir, hash_kind)?;
        let objects = git_odb::Handle::new(Arc::new(store));
        let refs = git_ref::Store::at_with_reflog(&git_dir, hash_kind, core.logallrefupdates);
        let work_dir = if core.bare {
            None
        } else {
            Some(git_dir.parent().map(Path::to_path_buf).unwrap_or_else(|| git_dir.clone()))
        };

        Ok(Repository {
            fs,
            git_dir,
            work_dir,
            hash_kind,
            config,
            objects,
            refs,
            index: RefCell::new(index::Cache::default()),
        })
    }

    /// The git directory this handle was opened at.
    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    /// The work tree this repository checks out into, or `None` if it's bare.
    pub fn work_dir(&self) -> Option<&Path> {
        self.work_dir.as_deref()
    }

    /// This repository's object format, read from `extensions.objectformat` at open time.
    pub fn hash_kind(&self) -> git_hash::Kind {
        self.hash_kind
    }

    /// The parsed `config` file this repository was opened with.
    pub fn config(&self) -> &git_config::Config {
        &self.config
    }

    /// The filesystem this handle reads and writes through.
    pub fn filesystem(&self) -> &F {
        &self.fs
    }

    /// A handle onto the object database, cheap to clone and already carrying its own object
    /// cache; implements both [`git_odb::Find`] and [`git_odb::Write`].
    pub fn objects(&self) -> &git_odb::Handle {
        &self.objects
    }

    /// The reference store, already configured with this repository's `core.logallrefupdates`.
    pub fn refs(&self) -> &git_ref::Store {
        &self.refs
    }

    /// Decode the object named by `id`, or `None` if the object database doesn't have it.
    pub fn find_object(&self, id: &oid) -> Result<Option<git_object::Object>, Error> {
        match git_odb::Find::try_find(&self.objects, id, git_odb::Format::Content)? {
            Some(data) => Ok(Some(git_object::Object::from_bytes(data.kind, &data.bytes, self.hash_kind)?)),
            None => Ok(None),
        }
    }

    /// Serialize and write `object`, returning the id it hashes to.
    pub fn write_object(&self, object: &git_object::Object) -> Result<ObjectId, Error> {
        let mut buf = Vec::new();
        object.write_to(&mut buf).expect("encoding a canonical object cannot fail");
        Ok(git_odb::Write::write_buf(&self.objects, object.kind(), &buf)?)
    }

    /// A [`git_traverse::Source`] reading the tree at `root` through this repository's object
    /// database.
    pub fn tree_source(&self, root: ObjectId) -> git_traverse::TreeSource<'_, git_odb::Handle> {
        git_traverse::TreeSource::new(&self.objects, self.hash_kind, root)
    }

    /// A [`git_traverse::Source`] reading the resolved (stage 0) entries of `index`.
    pub fn stage_source<'a>(&self, index: &'a git_index::State) -> git_traverse::StageSource<'a> {
        git_traverse::StageSource::new(index, self.hash_kind)
    }

    /// A [`git_traverse::Source`] reading this repository's work tree. Fails if the repository is
    /// bare.
    pub fn workdir_source(&self) -> Result<git_traverse::WorkdirSource<'_, F>, Error> {
        let work_dir = self.work_dir.as_deref().ok_or(Error::Bare)?;
        Ok(git_traverse::WorkdirSource::new(&self.fs, work_dir, self.hash_kind))
    }

    /// The set of paths that differ between `previous` and `new`, via [`git_diff::tree_changes()`].
    pub fn tree_changes(&self, previous: ObjectId, new: ObjectId) -> Result<Vec<git_diff::TreeChange>, Error> {
        Ok(git_diff::tree_changes(&self.objects, self.hash_kind, previous, new)?)
    }

    /// Three-way merge `ours`/`base`/`theirs`, staging conflicts into `index` and writing the
    /// merged tree to this repository's object database. See [`git_merge::merge_trees()`].
    pub fn merge_trees(
        &self,
        index: &mut git_index::State,
        ours: ObjectId,
        base: ObjectId,
        theirs: ObjectId,
        options: git_merge::MergeOptions<'_>,
    ) -> Result<git_merge::TreeMergeOutcome, Error> {
        Ok(git_merge::merge_trees(&self.objects, self.hash_kind, index, ours, base, theirs, options)?)
    }

    /// Hold the named lock `<gitdir>/<key>` for the duration of `thunk`, committing whatever it
    /// wrote on success. The same primitive backs per-ref writes and the index rewrite below; this
    /// is the general-purpose `acquireLock` callers reach for when neither applies directly.
    pub fn acquire_lock<T>(
        &self,
        key: &str,
        fail_mode: git_lock::Fail,
        thunk: impl FnOnce(&mut git_lock::File) -> Result<T, git_lock::Error>,
    ) -> Result<T, Error> {
        Ok(git_lock::acquire(self.git_dir.join(key), fail_mode, git_lock::ContainingDirectory::CreateAllRaceproof, thunk)?)
    }
}
