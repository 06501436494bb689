//! `packed-refs`: a line-oriented snapshot of many refs in one file, consulted whenever a loose
//! ref file is absent.
use std::path::{Path, PathBuf};

use bstr::{BStr, ByteSlice};
use git_hash::ObjectId;

/// One entry parsed from a `packed-refs` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// The reference's full name.
    pub name: String,
    /// The object the ref points at directly.
    pub target: ObjectId,
    /// The peeled target of an annotated tag, if the file recorded one (a `^<oid>` line
    /// immediately following this entry).
    pub peeled: Option<ObjectId>,
}

/// The error returned while parsing a `packed-refs` file.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("packed-refs line {0} is malformed")]
    MalformedLine(usize),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A parsed `packed-refs` file, held fully in memory and sorted by name as git itself writes it.
#[derive(Debug, Clone, Default)]
pub struct Buffer {
    entries: Vec<Entry>,
}

impl Buffer {
    /// Read and parse the `packed-refs` file at `path`, or return an empty buffer if it doesn't
    /// exist.
    pub fn at(path: &Path) -> Result<Self, Error> {
        match std::fs::read(path) {
            Ok(bytes) => Self::from_bytes(&bytes),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Buffer::default()),
            Err(err) => Err(err.into()),
        }
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let mut entries: Vec<Entry> = Vec::new();
        for (line_number, line) in bytes.lines().enumerate() {
            let line_number = line_number + 1;
            if line.is_empty() || line[0] == b'#' {
                continue;
            }
            if line[0] == b'^' {
                let peeled = ObjectId::from_hex(&line[1..]).map_err(|_| Error::MalformedLine(line_number))?;
                match entries.last_mut() {
                    Some(last) => last.peeled = Some(peeled),
                    None => return Err(Error::MalformedLine(line_number)),
                }
                continue;
            }
            let line: &BStr = line.as_bstr();
            let mut parts = line.splitn(2, |&b| b == b' ');
            let oid_hex = parts.next().ok_or(Error::MalformedLine(line_number))?;
            let name = parts.next().ok_or(Error::MalformedLine(line_number))?;
            let target = ObjectId::from_hex(oid_hex).map_err(|_| Error::MalformedLine(line_number))?;
            entries.push(Entry {
                name: name.to_str_lossy().into_owned(),
                target,
                peeled: None,
            });
        }
        Ok(Buffer { entries })
    }

    /// Find the entry exactly matching `name`.
    pub fn find(&self, name: &str) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    /// All entries whose name starts with `prefix`, in file order (already sorted by name).
    pub fn iter_prefixed<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a Entry> + 'a {
        self.entries.iter().filter(move |entry| entry.name.starts_with(prefix))
    }

    /// Insert or replace `name`'s entry, keeping entries sorted by name as git requires.
    pub fn upsert(&mut self, name: String, target: ObjectId, peeled: Option<ObjectId>) {
        match self.entries.iter().position(|entry| entry.name == name) {
            Some(index) => {
                self.entries[index].target = target;
                self.entries[index].peeled = peeled;
            }
            None => {
                self.entries.push(Entry { name, target, peeled });
                self.entries.sort_by(|a, b| a.name.cmp(&b.name));
            }
        }
    }

    /// Remove `name`'s entry, if present.
    pub fn remove(&mut self, name: &str) {
        self.entries.retain(|entry| entry.name != name);
    }

    /// Serialize back to `packed-refs` format, including its required header comment.
    pub fn to_vec(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(b"# pack-refs with: peeled fully-peeled sorted\n");
        for entry in &self.entries {
            out.extend_from_slice(entry.target.to_hex().as_bytes());
            out.push(b' ');
            out.extend_from_slice(entry.name.as_bytes());
            out.push(b'\n');
            if let Some(peeled) = entry.peeled {
                out.push(b'^');
                out.extend_from_slice(peeled.to_hex().as_bytes());
                out.push(b'\n');
            }
        }
        out
    }

    /// Write this buffer back to `path` atomically via a per-resource lock.
    pub fn write_to(&self, path: &Path) -> Result<(), Error> {
        let lock = git_lock::File::acquire_to_hold_resource(
            path.to_owned(),
            git_lock::Fail::Immediately,
            git_lock::ContainingDirectory::CreateAllRaceproof,
        )
        .map_err(|err| match err {
            git_lock::Error::Io(err) => Error::Io(err),
            git_lock::Error::Timeout { .. } => Error::Io(std::io::Error::new(std::io::ErrorKind::WouldBlock, "packed-refs is locked")),
        })?;
        let mut lock = lock;
        std::io::Write::write_all(&mut lock, &self.to_vec())?;
        lock.commit().map_err(|err| match err {
            git_lock::Error::Io(err) => Error::Io(err),
            git_lock::Error::Timeout { .. } => unreachable!("commit doesn't time out"),
        })
    }

    /// Every entry's name, in file order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.name.as_str())
    }
}

pub(crate) fn path(git_dir: &Path) -> PathBuf {
    git_dir.join("packed-refs")
}
