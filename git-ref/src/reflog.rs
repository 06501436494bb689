//! Reference logs: one append-only file per ref (when `core.logallrefupdates` is on), recording
//! every update as `<old-oid> <new-oid> <committer>\t<message>\n`.
use std::path::{Path, PathBuf};

use git_actor::Signature;
use git_hash::{Kind as HashKind, ObjectId};

use crate::FullName;

/// The error returned while appending to a reflog.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn path(git_dir: &Path, name: &FullName) -> PathBuf {
    git_dir.join("logs").join(name.to_path())
}

/// Append one entry to `name`'s reflog, creating the log (and its parent directories) on first
/// use. `old` is the null id for a ref's first entry.
pub fn append(git_dir: &Path, name: &FullName, old: &ObjectId, new: &ObjectId, committer: &Signature, message: &str) -> Result<(), Error> {
    let path = path(git_dir, name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut line = Vec::new();
    line.extend_from_slice(old.to_hex().as_bytes());
    line.push(b' ');
    line.extend_from_slice(new.to_hex().as_bytes());
    line.push(b' ');
    committer.write_to(&mut line)?;
    line.push(b'\t');
    line.extend_from_slice(message.as_bytes());
    line.push(b'\n');

    use std::io::Write as _;
    let mut file = std::fs::OpenOptions::new().create(true).append(true).open(&path)?;
    file.write_all(&line)
}

/// Read the full reflog for `name`, oldest entry first.
pub fn read(git_dir: &Path, name: &FullName, hash_kind: HashKind) -> Result<Vec<Entry>, Error> {
    let path = path(git_dir, name);
    let bytes = match std::fs::read(&path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err.into()),
    };
    let hex_len = hash_kind.len_in_hex();
    let mut out = Vec::new();
    for line in bytes.split(|&b| b == b'\n') {
        if line.is_empty() {
            continue;
        }
        if line.len() < hex_len * 2 + 2 {
            continue;
        }
        let old = ObjectId::from_hex(&line[..hex_len]).unwrap_or_else(|_| ObjectId::null(hash_kind));
        let new = ObjectId::from_hex(&line[hex_len + 1..hex_len * 2 + 1]).unwrap_or_else(|_| ObjectId::null(hash_kind));
        let rest = &line[hex_len * 2 + 2..];
        let message = rest.splitn(2, |&b| b == b'\t').nth(1).map(|m| String::from_utf8_lossy(m).into_owned()).unwrap_or_default();
        out.push(Entry { old, new, message });
    }
    Ok(out)
}

/// One parsed reflog line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// The ref's value before this update.
    pub old: ObjectId,
    /// The ref's value after this update.
    pub new: ObjectId,
    /// The free-form reason recorded for this update.
    pub message: String,
}
