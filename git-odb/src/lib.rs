//! A content-addressed object store: loose objects under `objects/xx/…`, plus read-only access to
//! packed objects through `.idx`/`.pack` files and an optional multi-pack-index.
//!
//! Writes always go to the loose store; this crate never produces packs. Reads consult, in order,
//! an in-memory object cache, the canonical empty tree, the loose store, then each known pack
//! (through the multi-pack-index first if one is loaded, falling back to per-pack `.idx` lookup).
#![deny(unsafe_code)]
#![deny(rust_2018_idioms)]

mod cache;
pub mod loose;
pub mod pack;
mod store;

pub use store::{Handle, Store};

use git_hash::{oid, ObjectId};
use git_object::Kind;

/// How a caller wants an object's bytes back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// The exact bytes stored on disk (zlib-deflated, still wrapped).
    Deflated,
    /// Inflated but still wrapped in `"<type> <len>\0"`.
    Wrapped,
    /// The object's canonical payload, unwrapped and inflated.
    Content,
}

/// An object as returned by [`Find::try_find()`].
#[derive(Debug, Clone)]
pub struct Data {
    /// The object's id.
    pub id: ObjectId,
    /// The object's kind.
    pub kind: Kind,
    /// The bytes, in whichever [`Format`] was requested.
    pub bytes: Vec<u8>,
}

/// The error kinds this crate raises, matching the taxonomy every store consumer expects:
/// `NotFound` and `InternalError` are values a caller branches on, everything else is a corrupt
/// repository.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No loose object, pack or multi-pack-index contains this id.
    #[error("object {0} not found")]
    NotFound(ObjectId),
    /// The bytes read back for an object don't hash to the id that named them.
    #[error("object {expected} is corrupt: the bytes stored for it hash to {actual} instead")]
    InternalError {
        /// The id under which the object was looked up.
        expected: ObjectId,
        /// The id its stored bytes actually hash to.
        actual: ObjectId,
    },
    /// A short hex prefix matched more than one object.
    #[error("short id matches more than one object")]
    Ambiguous,
    /// A short hex string wasn't valid hex, or was shorter than 4 characters.
    #[error("{0} is not a valid (short) object id")]
    InvalidShortId(String),
    #[error(transparent)]
    Loose(#[from] loose::Error),
    #[error(transparent)]
    Pack(#[from] pack::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Read access to an object database.
pub trait Find {
    /// Look up `id`, returning its bytes in the requested `format`, or `Ok(None)` if no store
    /// contains it. The canonical empty tree is synthesized regardless of whether it's on disk.
    fn try_find(&self, id: &oid, format: Format) -> Result<Option<Data>, Error>;

    /// Whether `id` is known to this store, without materializing its bytes.
    fn contains(&self, id: &oid) -> bool {
        self.try_find(id, Format::Wrapped).ok().flatten().is_some()
    }

    /// Resolve a short hex prefix (≥4 characters) to the one object id it names.
    fn expand_oid(&self, short_hex: &str) -> Result<ObjectId, Error>;
}

/// Write access to an object database. Always writes loose objects; never overwrites.
pub trait Write {
    /// Write `bytes` as an object of `kind`, returning the id it hashes to. If an object with that
    /// id already exists, no write occurs.
    fn write_buf(&self, kind: Kind, bytes: &[u8]) -> Result<ObjectId, Error>;
}

/// Pure computation: hash `bytes` as an object of `kind` without touching disk, returning the id
/// and the wrapped (but not compressed) bytes that would be written.
pub fn hash_object(kind: Kind, bytes: &[u8], hash_kind: git_hash::Kind) -> (ObjectId, Vec<u8>) {
    let wrapped = git_hash::wrap(std::str::from_utf8(kind.as_bytes()).expect("ascii"), bytes);
    let id = git_hash::hash(hash_kind, &wrapped);
    (id, wrapped)
}
