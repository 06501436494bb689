//! Hashing primitives: computing an [`ObjectId`] over arbitrary bytes, and the single
//! `"<type> <len>\0"` wrapping scheme every loose and packed object uses before being hashed.
use sha1::Digest as _;

use crate::{Kind, ObjectId};

/// A running hash of the kind requested; feed it bytes in order and call [`Hasher::digest()`]
/// once, mirroring how `writeObject` streams a large blob without buffering it twice.
pub enum Hasher {
    /// Accumulates a SHA-1 digest.
    Sha1(sha1::Sha1),
    /// Accumulates a SHA-256 digest.
    Sha256(sha2::Sha256),
}

impl Hasher {
    /// Feed more bytes into the hash.
    pub fn update(&mut self, bytes: &[u8]) {
        match self {
            Hasher::Sha1(h) => sha1::Digest::update(h, bytes),
            Hasher::Sha256(h) => sha2::Digest::update(h, bytes),
        }
    }

    /// Consume the hasher and produce the resulting [`ObjectId`].
    pub fn digest(self) -> ObjectId {
        match self {
            Hasher::Sha1(h) => {
                let mut id = ObjectId::null(Kind::Sha1);
                id.as_mut_slice().copy_from_slice(&h.finalize());
                id
            }
            Hasher::Sha256(h) => {
                let mut id = ObjectId::null(Kind::Sha256);
                id.as_mut_slice().copy_from_slice(&h.finalize());
                id
            }
        }
    }
}

/// Create a fresh, empty [`Hasher`] for the given `kind`.
pub fn hasher(kind: Kind) -> Hasher {
    match kind {
        Kind::Sha1 => Hasher::Sha1(sha1::Sha1::new()),
        Kind::Sha256 => Hasher::Sha256(sha2::Sha256::new()),
    }
}

/// Hash `bytes` in one pass with the given `kind`, without any git-specific framing.
pub fn hash(kind: Kind, bytes: &[u8]) -> ObjectId {
    let mut h = hasher(kind);
    h.update(bytes);
    h.digest()
}

/// Confirms the backing crypto implementation produces the well-known hash of empty input.
/// Portable backends can't silently regress to something incompatible with on-disk objects, so
/// call this once at startup if the hashing backend is configurable.
pub fn hash_kind(kind: Kind) -> bool {
    let empty = hash(kind, b"");
    match kind {
        Kind::Sha1 => empty.to_hex() == "da39a3ee5e6b4b0d3255bfef95601890afd80709",
        Kind::Sha256 => {
            empty.to_hex() == "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        }
    }
}

/// Build the `"<type> <len>\0<bytes>"` frame every loose and packed object is hashed and stored
/// as.
pub fn wrap(kind_name: &str, bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(kind_name.len() + 1 + 20 + bytes.len());
    out.extend_from_slice(kind_name.as_bytes());
    out.push(b' ');
    out.extend_from_slice(itoa::Buffer::new().format(bytes.len()).as_bytes());
    out.push(0);
    out.extend_from_slice(bytes);
    out
}
