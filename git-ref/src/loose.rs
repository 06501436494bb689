//! Loose references: one file per ref under the git directory, holding either a hex object id or
//! a `ref: <target>` symbolic redirect.
use std::path::{Path, PathBuf};

use bstr::ByteSlice;
use git_hash::ObjectId;

use crate::{FullName, Target};

const SYMREF_PREFIX: &[u8] = b"ref: ";

/// The error returned while reading or writing a loose ref file.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("loose ref {0} doesn't contain a valid object id or symbolic target")]
    Malformed(String),
    #[error(transparent)]
    InvalidName(#[from] git_validate::reference::name::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub(crate) fn path(git_dir: &Path, name: &FullName) -> PathBuf {
    git_dir.join(name.to_path())
}

/// Read the loose ref file for `name`, or `Ok(None)` if it's absent.
///
/// Per spec, a reader seeing a transient (empty or mid-rewrite) file retries once before giving
/// up, since a concurrent writer may be between its create and its atomic rename.
pub fn read(git_dir: &Path, name: &FullName) -> Result<Option<Target>, Error> {
    let path = path(git_dir, name);
    for attempt in 0..2 {
        match std::fs::read(&path) {
            Ok(bytes) => {
                let text = bytes.trim_end();
                if text.is_empty() {
                    if attempt == 0 {
                        continue;
                    }
                    return Err(Error::Malformed(name.to_string()));
                }
                return parse(name, text).map(Some);
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        }
    }
    unreachable!("loop always returns on its second iteration")
}

fn parse(name: &FullName, text: &[u8]) -> Result<Target, Error> {
    if let Some(target) = text.strip_prefix(SYMREF_PREFIX) {
        let target = FullName::new(target.trim().to_vec())?;
        return Ok(Target::Symbolic(target));
    }
    ObjectId::from_hex(text.trim()).map(Target::Object).map_err(|_| Error::Malformed(name.to_string()))
}

/// Write `target` to `name`'s loose ref file, creating parent directories as needed.
pub fn write(git_dir: &Path, name: &FullName, target: &Target) -> Result<(), Error> {
    let path = path(git_dir, name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = match target {
        Target::Object(id) => format!("{}\n", id.to_hex()),
        Target::Symbolic(target) => format!("ref: {target}\n"),
    };
    let lock = git_lock::File::acquire_to_hold_resource(
        path,
        git_lock::Fail::Immediately,
        git_lock::ContainingDirectory::CreateAllRaceproof,
    )
    .map_err(to_io_error)?;
    let mut lock = lock;
    std::io::Write::write_all(&mut lock, content.as_bytes())?;
    lock.commit().map_err(to_io_error)
}

/// Delete `name`'s loose ref file; absence is not an error.
pub fn delete(git_dir: &Path, name: &FullName) -> Result<(), Error> {
    match std::fs::remove_file(path(git_dir, name)) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}

/// Every loose ref name under `refs/` (and `HEAD`, `FETCH_HEAD`, etc. at the git directory root),
/// found by walking the directory tree.
pub fn iter(git_dir: &Path) -> Result<Vec<String>, Error> {
    let mut out = Vec::new();
    let refs_dir = git_dir.join("refs");
    if refs_dir.is_dir() {
        walk(&refs_dir, "refs", &mut out)?;
    }
    Ok(out)
}

fn walk(dir: &Path, prefix_name: &str, out: &mut Vec<String>) -> Result<(), Error> {
    let mut entries: Vec<_> = std::fs::read_dir(dir)?.collect::<Result<_, _>>()?;
    entries.sort_by_key(|entry| entry.file_name());
    for entry in entries {
        let file_type = entry.file_type()?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        let child_name = format!("{prefix_name}/{name}");
        if file_type.is_dir() {
            walk(&entry.path(), &child_name, out)?;
        } else {
            out.push(child_name);
        }
    }
    Ok(())
}

fn to_io_error(err: git_lock::Error) -> Error {
    match err {
        git_lock::Error::Io(err) => Error::Io(err),
        git_lock::Error::Timeout { resource } => {
            Error::Io(std::io::Error::new(std::io::ErrorKind::WouldBlock, format!("{} is locked", resource.display())))
        }
    }
}
