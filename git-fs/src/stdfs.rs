use std::{
    fs, io,
    path::{Path, PathBuf},
};

use crate::{Filesystem, ReadOptions, Stat};

/// The default [`Filesystem`] implementation, backed directly by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFilesystem;

fn ok_or_missing<T>(result: io::Result<T>) -> io::Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}

/// `\r\n` -> `\n`, applied only when `bytes` parses as UTF-8; binary content passes through
/// unchanged since CRLF sequences in it aren't line endings.
fn normalize_crlf(bytes: Vec<u8>) -> Vec<u8> {
    if std::str::from_utf8(&bytes).is_err() {
        return bytes;
    }
    let mut out = Vec::with_capacity(bytes.len());
    let mut iter = bytes.iter().copied().peekable();
    while let Some(b) = iter.next() {
        if b == b'\r' && iter.peek() == Some(&b'\n') {
            continue;
        }
        out.push(b);
    }
    out
}

impl Filesystem for StdFilesystem {
    fn read(&self, path: &Path, opts: ReadOptions) -> io::Result<Option<Vec<u8>>> {
        let content = ok_or_missing(fs::read(path))?;
        Ok(content.map(|bytes| if opts.autocrlf { normalize_crlf(bytes) } else { bytes }))
    }

    fn write(&self, path: &Path, content: &[u8]) -> io::Result<()> {
        match fs::write(path, content) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(path, content)
            }
            Err(err) => Err(err),
        }
    }

    fn mkdir(&self, path: &Path) -> io::Result<()> {
        match fs::create_dir_all(path) {
            Ok(()) => Ok(()),
            Err(err) if path.is_dir() => {
                let _ = err;
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    fn rm(&self, path: &Path) -> io::Result<()> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err),
        }
    }

    fn rmdir(&self, path: &Path) -> io::Result<()> {
        if !path.exists() {
            return Ok(());
        }
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            let file_type = entry.file_type()?;
            if file_type.is_dir() {
                self.rmdir(&entry.path())?;
            } else {
                fs::remove_file(entry.path())?;
            }
        }
        fs::remove_dir(path)
    }

    fn stat(&self, path: &Path) -> io::Result<Option<Stat>> {
        Ok(ok_or_missing(fs::metadata(path))?.map(|meta| Stat::from_metadata(&meta)))
    }

    fn lstat(&self, path: &Path) -> io::Result<Option<Stat>> {
        Ok(ok_or_missing(fs::symlink_metadata(path))?.map(|meta| Stat::from_metadata(&meta)))
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let mut out = Vec::new();
        for entry in fs::read_dir(path)? {
            out.push(entry?.path());
        }
        Ok(out)
    }

    fn readlink(&self, path: &Path) -> io::Result<Option<Vec<u8>>> {
        Ok(ok_or_missing(fs::read_link(path))?.map(|target| git_features::path::into_bytes(&target).to_vec()))
    }

    fn symlink(&self, target: &Path, path: &Path) -> io::Result<()> {
        platform::symlink(target, path)
    }

    fn fsync(&self, path: &Path) -> io::Result<()> {
        fs::File::open(path)?.sync_all()
    }
}

#[cfg(unix)]
mod platform {
    use std::{io, path::Path};

    pub(super) fn symlink(target: &Path, path: &Path) -> io::Result<()> {
        std::os::unix::fs::symlink(target, path)
    }
}

#[cfg(windows)]
mod platform {
    use std::{io, path::Path};

    pub(super) fn symlink(target: &Path, path: &Path) -> io::Result<()> {
        if target.is_dir() {
            std::os::windows::fs::symlink_dir(target, path)
        } else {
            std::os::windows::fs::symlink_file(target, path)
        }
    }
}
