use std::{
    fs::File,
    io,
    marker::PhantomData,
    path::Path,
};

use tempfile::NamedTempFile;

use crate::registry;

/// Marks a [`Handle`] whose file is still open for writing.
#[derive(Debug)]
pub struct Writable;

/// Marks a [`Handle`] whose file has been flushed and is ready to be persisted.
#[derive(Debug)]
pub struct Closed;

/// Where a new tempfile's containing directory must already exist, or should be created.
#[derive(Debug, Clone, Copy)]
pub enum ContainingDirectory {
    /// The directory must already exist; creating the tempfile fails otherwise.
    Exists,
    /// Create the directory (and any missing parents) first, tolerating a race with another
    /// process doing the same.
    CreateAllRaceproof,
}

/// What happens to a tempfile that is dropped without being persisted. Currently there is only one
/// policy; this exists so a boundary-aware variant (removing now-empty parent directories up to a
/// given ancestor) can be added without changing every call site.
#[derive(Debug, Clone, Copy)]
pub enum AutoRemove {
    /// Remove just the tempfile itself; this is also `tempfile::NamedTempFile`'s own default.
    Tempfile,
}

/// A crash-safe tempfile: created next to its eventual destination, tracked in a process-global
/// registry so a `SIGTERM`/`SIGINT` still cleans it up (see [`crate::setup()`]), and either
/// persisted atomically into place or removed when dropped.
#[derive(Debug)]
pub struct Handle<Marker> {
    inner: Option<NamedTempFile>,
    id: registry::Id,
    _marker: PhantomData<Marker>,
}

impl Handle<Writable> {
    /// Create a new writable tempfile inside `containing_directory`, creating that directory first
    /// if `directory` asks for it.
    pub fn new(containing_directory: &Path, directory: ContainingDirectory, _cleanup: AutoRemove) -> io::Result<Self> {
        if let ContainingDirectory::CreateAllRaceproof = directory {
            std::fs::create_dir_all(containing_directory)?;
        }
        let inner = NamedTempFile::new_in(containing_directory)?;
        let id = registry::register(inner.path().to_owned());
        Ok(Handle {
            inner: Some(inner),
            id,
            _marker: PhantomData,
        })
    }

    /// Flush this tempfile's content to disk and mark it as ready to persist.
    pub fn close(mut self) -> io::Result<Handle<Closed>> {
        use io::Write;
        self.inner.as_mut().expect("present while writable").flush()?;
        let inner = self.inner.take();
        Ok(Handle {
            inner,
            id: self.id,
            _marker: PhantomData,
        })
    }
}

impl io::Write for Handle<Writable> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.as_mut().expect("present while writable").write(buf)
    }
    fn flush(&mut self) -> io::Result<()> {
        self.inner.as_mut().expect("present while writable").flush()
    }
}

impl Handle<Closed> {
    /// Atomically rename this tempfile to `target`, removing it from the cleanup registry. Returns
    /// the now-persisted file in case the caller wants to keep reading or writing it.
    pub fn persist(mut self, target: impl AsRef<Path>) -> io::Result<File> {
        let inner = self.inner.take().expect("only taken here or in Drop");
        let file = inner.persist(target).map_err(|err| err.error)?;
        registry::deregister(self.id);
        Ok(file)
    }
}

impl<Marker> Drop for Handle<Marker> {
    fn drop(&mut self) {
        if self.inner.is_some() {
            registry::deregister(self.id);
        }
        // `NamedTempFile`'s own `Drop` removes the underlying file unless it was persisted.
    }
}

impl<Marker> Handle<Marker> {
    /// The tempfile's current on-disk path.
    pub fn path(&self) -> &Path {
        self.inner.as_ref().expect("present until persisted").path()
    }
}
