//! The uniform filesystem contract every other crate in this workspace reads and writes through:
//! `read`/`write`/`mkdir`/`rm`/`rmdir`/`lstat`/`stat`/`readlink`/`symlink`. Absence is represented
//! with `Ok(None)` rather than an error, so callers don't have to match on `io::ErrorKind` at every
//! call site.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

use std::{
    io,
    path::{Path, PathBuf},
};

mod stat;
mod stdfs;

pub use stat::Stat;
pub use stdfs::StdFilesystem;

/// How [`Filesystem::read()`] should treat line endings.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadOptions {
    /// Normalize `\r\n` to `\n`, but only when the file's bytes are valid UTF-8 (binary files are
    /// returned unchanged), mirroring `core.autocrlf`'s checkin behavior.
    pub autocrlf: bool,
}

/// A host filesystem, abstracted so the object store, reference store and index can be driven by
/// something other than `std::fs` in tests or on unusual hosts.
pub trait Filesystem {
    /// Read `path`'s entire content, returning `Ok(None)` if it doesn't exist.
    fn read(&self, path: &Path, opts: ReadOptions) -> io::Result<Option<Vec<u8>>>;

    /// Write `content` to `path`, creating missing parent directories if the first attempt fails
    /// because they're absent, then retrying once.
    fn write(&self, path: &Path, content: &[u8]) -> io::Result<()>;

    /// Create `path` and any missing parents, succeeding if it already exists as a directory.
    fn mkdir(&self, path: &Path) -> io::Result<()>;

    /// Remove the file at `path`; absence is not an error.
    fn rm(&self, path: &Path) -> io::Result<()>;

    /// Remove the directory at `path` and everything under it, depth-first; absence is not an
    /// error.
    fn rmdir(&self, path: &Path) -> io::Result<()>;

    /// `stat(2)`-equivalent metadata for `path`, following a trailing symlink; `Ok(None)` if it
    /// doesn't exist.
    fn stat(&self, path: &Path) -> io::Result<Option<Stat>>;

    /// `lstat(2)`-equivalent metadata for `path`, not following a trailing symlink; `Ok(None)` if
    /// it doesn't exist.
    fn lstat(&self, path: &Path) -> io::Result<Option<Stat>>;

    /// The list of entry names directly inside the directory at `path`.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;

    /// The raw bytes of the symlink target at `path`, or `Ok(None)` if it doesn't exist.
    fn readlink(&self, path: &Path) -> io::Result<Option<Vec<u8>>>;

    /// Create a symlink at `path` pointing at `target`.
    fn symlink(&self, target: &Path, path: &Path) -> io::Result<()>;

    /// Flush `path`'s content to durable storage, if the underlying filesystem makes that
    /// distinction; a no-op is a legal implementation.
    fn fsync(&self, path: &Path) -> io::Result<()>;
}
