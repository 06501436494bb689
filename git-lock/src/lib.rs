//! Per-resource mutual exclusion across processes, the way git itself locks a ref or the index:
//! create `<resource>.lock` exclusively, write the new content into it, then atomically rename it
//! over `<resource>` to publish the change (or drop it to discard).
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

use std::{
    fs::OpenOptions,
    io,
    path::{Path, PathBuf},
    thread,
    time::{Duration, Instant},
};

/// How long [`File::acquire_to_hold_resource()`] waits for a competing lock to be released before
/// giving up.
#[derive(Debug, Clone, Copy)]
pub enum Fail {
    /// Don't wait at all; fail immediately if the resource is already locked.
    Immediately,
    /// Retry with a short sleep between attempts until `duration` has elapsed.
    AfterDurationWithBackoff(Duration),
}

/// Where a lock's containing directory must already exist, or should be created.
#[derive(Debug, Clone, Copy)]
pub enum ContainingDirectory {
    /// The directory must already exist; acquiring the lock fails otherwise.
    Exists,
    /// Create the directory (and any missing parents) first, tolerating a race with another
    /// process doing the same.
    CreateAllRaceproof,
}

/// The error returned when a resource can't be locked or a lock can't be committed.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Another process (or another `File` in this one) is already holding the lock.
    #[error("A lock could not be obtained for resource {resource:?} before the configured time ran out")]
    Timeout {
        /// The resource path that couldn't be locked.
        resource: PathBuf,
    },
    /// An IO error occurred while creating, writing or committing the lock file.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// An acquired, exclusively-held lock file sitting next to the resource it protects, open for
/// writing the resource's new content.
#[derive(Debug)]
pub struct File {
    lock_path: PathBuf,
    resource_path: PathBuf,
    file: std::fs::File,
    id: git_tempfile::Id,
    committed: bool,
}

impl File {
    /// Try to exclusively create `<resource>.lock`, waiting according to `fail_mode` if it already
    /// exists, and return a `File` open for writing the resource's replacement content.
    pub fn acquire_to_hold_resource(
        resource: impl Into<PathBuf>,
        fail_mode: Fail,
        directory: ContainingDirectory,
    ) -> Result<Self, Error> {
        let resource_path = resource.into();
        let lock_path = lock_path_for(&resource_path);
        if let ContainingDirectory::CreateAllRaceproof = directory {
            if let Some(parent) = lock_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let deadline = match fail_mode {
            Fail::Immediately => None,
            Fail::AfterDurationWithBackoff(duration) => Some(Instant::now() + duration),
        };
        loop {
            match OpenOptions::new().write(true).create_new(true).open(&lock_path) {
                Ok(file) => {
                    let id = git_tempfile::register(lock_path.clone());
                    return Ok(File {
                        lock_path,
                        resource_path,
                        file,
                        id,
                        committed: false,
                    });
                }
                Err(err) if err.kind() == io::ErrorKind::AlreadyExists => match deadline {
                    Some(deadline) if Instant::now() < deadline => {
                        thread::sleep(Duration::from_millis(50));
                        continue;
                    }
                    Some(_) => return Err(Error::Timeout { resource: resource_path }),
                    None => return Err(Error::Timeout { resource: resource_path }),
                },
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// The path of the resource this lock guards, not the `.lock` file itself.
    pub fn resource_path(&self) -> &Path {
        &self.resource_path
    }

    /// Atomically rename the lock file over the resource it guards, publishing its content and
    /// releasing the lock.
    pub fn commit(mut self) -> Result<(), Error> {
        self.file.flush()?;
        std::fs::rename(&self.lock_path, &self.resource_path)?;
        git_tempfile::deregister(self.id);
        self.committed = true;
        Ok(())
    }
}

impl io::Write for File {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }
    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

impl Drop for File {
    fn drop(&mut self) {
        if !self.committed {
            git_tempfile::deregister(self.id);
            let _ = std::fs::remove_file(&self.lock_path);
        }
    }
}

/// Appends the literal suffix `.lock`, the way git does, rather than replacing any existing
/// extension: a ref name like `refs/tags/v1.2.3` must lock as `refs/tags/v1.2.3.lock`, not
/// `refs/tags/v1.2.lock`.
fn lock_path_for(resource: &Path) -> PathBuf {
    let mut name = resource.as_os_str().to_owned();
    name.push(".lock");
    PathBuf::from(name)
}

/// Run `thunk` while holding the named lock for `resource`, committing the `File` thunk wrote to
/// over `resource` if `thunk` succeeds, or discarding it otherwise. This is the `acquireLock`
/// primitive used by `git-ref`'s per-ref writes and `git-index`'s atomic rewrite.
pub fn acquire<T>(
    resource: impl Into<PathBuf>,
    fail_mode: Fail,
    directory: ContainingDirectory,
    thunk: impl FnOnce(&mut File) -> Result<T, Error>,
) -> Result<T, Error> {
    let mut file = File::acquire_to_hold_resource(resource, fail_mode, directory)?;
    let result = thunk(&mut file)?;
    file.commit()?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn commit_publishes_content_and_removes_the_lock_file() {
        let dir = tempfile::tempdir().unwrap();
        let resource = dir.path().join("config");
        std::fs::write(&resource, b"old").unwrap();

        let mut lock = File::acquire_to_hold_resource(&resource, Fail::Immediately, ContainingDirectory::Exists).unwrap();
        lock.write_all(b"new").unwrap();
        lock.commit().unwrap();

        assert_eq!(std::fs::read(&resource).unwrap(), b"new");
        assert!(!lock_path_for(&resource).exists());
    }

    #[test]
    fn a_second_acquisition_fails_immediately_while_the_first_is_held() {
        let dir = tempfile::tempdir().unwrap();
        let resource = dir.path().join("config");
        let _lock = File::acquire_to_hold_resource(&resource, Fail::Immediately, ContainingDirectory::Exists).unwrap();

        let second = File::acquire_to_hold_resource(&resource, Fail::Immediately, ContainingDirectory::Exists);
        assert!(matches!(second, Err(Error::Timeout { .. })));
    }

    #[test]
    fn dropping_without_committing_discards_the_lock_file() {
        let dir = tempfile::tempdir().unwrap();
        let resource = dir.path().join("config");
        let lock = File::acquire_to_hold_resource(&resource, Fail::Immediately, ContainingDirectory::Exists).unwrap();
        let lock_path = lock_path_for(&resource);
        assert!(lock_path.exists());
        drop(lock);
        assert!(!lock_path.exists());
        assert!(!resource.exists());
    }

    #[test]
    fn lock_path_appends_a_literal_suffix_rather_than_replacing_an_extension() {
        let resource = Path::new("refs/tags/v1.2.3");
        assert_eq!(lock_path_for(resource), Path::new("refs/tags/v1.2.3.lock"));
    }

    #[test]
    fn acquire_runs_the_thunk_and_commits_on_success() {
        let dir = tempfile::tempdir().unwrap();
        let resource = dir.path().join("HEAD");
        let value = acquire(&resource, Fail::Immediately, ContainingDirectory::Exists, |file| {
            file.write_all(b"ref: refs/heads/main\n").map_err(Error::from)?;
            Ok(42)
        })
        .unwrap();
        assert_eq!(value, 42);
        assert_eq!(std::fs::read(&resource).unwrap(), b"ref: refs/heads/main\n");
    }
}
