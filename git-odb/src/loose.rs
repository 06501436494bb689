//! Loose objects: one file per object at `objects/<oid[0:2]>/<oid[2:]>`, zlib-deflated, wrapped.
use std::{
    io::{Read, Write as _},
    path::{Path, PathBuf},
};

use flate2::{bufread::ZlibDecoder, write::ZlibEncoder, Compression};
use git_hash::{oid, ObjectId};
use git_object::Kind;

/// The error returned by [`Store`]'s reads and writes.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("loose object {0} is not valid zlib-deflated data")]
    Inflate(ObjectId, #[source] std::io::Error),
    #[error("loose object {0}'s header is malformed")]
    MalformedHeader(ObjectId),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A loose object store rooted at a repository's `objects/` directory.
#[derive(Debug, Clone)]
pub struct Store {
    objects_dir: PathBuf,
}

fn loose_path(objects_dir: &Path, id: &oid) -> PathBuf {
    let hex = id.to_hex();
    objects_dir.join(&hex[..2]).join(&hex[2..])
}

impl Store {
    /// Point a new store at `objects_dir` (typically `<gitdir>/objects`).
    pub fn at(objects_dir: impl Into<PathBuf>) -> Self {
        Store {
            objects_dir: objects_dir.into(),
        }
    }

    /// The root directory this store reads and writes under.
    pub fn path(&self) -> &Path {
        &self.objects_dir
    }

    /// Whether a loose object for `id` exists on disk.
    pub fn contains(&self, id: &oid) -> bool {
        loose_path(&self.objects_dir, id).is_file()
    }

    /// Read and inflate the loose object at `id`, returning its wrapped `"<type> <len>\0<bytes>"`
    /// form, or `Ok(None)` if no loose file exists for it.
    pub fn read_wrapped(&self, id: &oid) -> Result<Option<Vec<u8>>, Error> {
        let path = loose_path(&self.objects_dir, id);
        let deflated = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let mut out = Vec::new();
        ZlibDecoder::new(&deflated[..])
            .read_to_end(&mut out)
            .map_err(|err| Error::Inflate(id.to_owned(), err))?;
        Ok(Some(out))
    }

    /// Read a loose object, splitting its wrapped form into `(kind, content)`.
    pub fn read(&self, id: &oid) -> Result<Option<(Kind, Vec<u8>)>, Error> {
        let wrapped = match self.read_wrapped(id)? {
            Some(w) => w,
            None => return Ok(None),
        };
        let header_end = wrapped
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| Error::MalformedHeader(id.to_owned()))?;
        let mut parts = wrapped[..header_end].splitn(2, |&b| b == b' ');
        let kind = Kind::from_bytes(parts.next().ok_or_else(|| Error::MalformedHeader(id.to_owned()))?)
            .map_err(|_| Error::MalformedHeader(id.to_owned()))?;
        Ok(Some((kind, wrapped[header_end + 1..].to_vec())))
    }

    /// Write `content` as a loose object of `kind`, computing its id with `hash_kind`. No-ops (and
    /// returns the existing id) if the object is already present, since objects are immutable.
    pub fn write(&self, kind: Kind, content: &[u8], hash_kind: git_hash::Kind) -> Result<ObjectId, Error> {
        let (id, wrapped) = crate::hash_object(kind, content, hash_kind);
        if self.contains(id.as_oid()) {
            return Ok(id);
        }
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::fast());
        encoder.write_all(&wrapped)?;
        let deflated = encoder.finish()?;

        let hex = id.to_hex();
        let dir = self.objects_dir.join(&hex[..2]);
        let target = dir.join(&hex[2..]);

        let mut tempfile = git_tempfile::Handle::new(
            &dir,
            git_tempfile::ContainingDirectory::CreateAllRaceproof,
            git_tempfile::AutoRemove::Tempfile,
        )?;
        std::io::Write::write_all(&mut tempfile, &deflated)?;
        let closed = tempfile.close()?;
        match closed.persist(&target) {
            Ok(_file) => {}
            Err(err) if target.is_file() => {
                // lost a race with another writer producing the same content-addressed object
                let _ = err;
            }
            Err(err) => return Err(err.into()),
        }
        Ok(id)
    }

    /// Every object id present in this store, in unspecified order.
    pub fn iter(&self) -> Result<impl Iterator<Item = ObjectId>, Error> {
        let mut out = Vec::new();
        if self.objects_dir.is_dir() {
            for dir_entry in std::fs::read_dir(&self.objects_dir)? {
                let dir_entry = dir_entry?;
                let dir_name = dir_entry.file_name();
                let dir_name = match dir_name.to_str() {
                    Some(name) if name.len() == 2 && name.bytes().all(|b| b.is_ascii_hexdigit()) => name.to_owned(),
                    _ => continue,
                };
                for file_entry in std::fs::read_dir(dir_entry.path())? {
                    let file_entry = file_entry?;
                    let file_name = file_entry.file_name();
                    if let Some(rest) = file_name.to_str() {
                        if let Ok(id) = ObjectId::from_hex(format!("{dir_name}{rest}").as_bytes()) {
                            out.push(id);
                        }
                    }
                }
            }
        }
        Ok(out.into_iter())
    }
}
