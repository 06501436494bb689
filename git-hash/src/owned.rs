use std::{cmp::Ordering, fmt, str::FromStr};

use crate::{borrowed::oid, Kind};

mod prefix_impl;
pub use prefix_impl::Prefix;
pub mod prefix {
    //! Errors produced when constructing or parsing a [`Prefix`][super::Prefix].
    pub use super::prefix_impl::{from_hex, Error};
}

const MAX_BYTES: usize = Kind::Sha256.len_in_bytes();

/// An owned hash identifying objects, refs or index entries, able to represent either a SHA-1 or
/// a SHA-256 digest depending on the repository's object format.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde1", derive(serde::Serialize, serde::Deserialize))]
pub enum ObjectId {
    /// A SHA-1 hash digest.
    Sha1([u8; Kind::Sha1.len_in_bytes()]),
    /// A SHA-256 hash digest.
    Sha256([u8; Kind::Sha256.len_in_bytes()]),
}

impl ObjectId {
    /// Create an all-zero id of the given `kind`, used as the 'null' placeholder in reference
    /// transactions and as the initial value before hashing.
    pub fn null(kind: Kind) -> Self {
        match kind {
            Kind::Sha1 => ObjectId::Sha1([0; Kind::Sha1.len_in_bytes()]),
            Kind::Sha256 => ObjectId::Sha256([0; Kind::Sha256.len_in_bytes()]),
        }
    }

    /// The canonical empty blob id, the hash of `"blob 0\0"`.
    ///
    /// For SHA-1 this is the well-known `e69de29b...`; for SHA-256 it's computed directly since
    /// git's own hash-function-transition constants for it aren't yet widely published.
    pub fn empty_blob(kind: Kind) -> Self {
        match kind {
            Kind::Sha1 => ObjectId::from_hex(b"e69de29bb2d1d6434b8b29ae775ad8c2e48c5391").expect("known valid"),
            Kind::Sha256 => crate::hash(kind, &crate::wrap("blob", b"")),
        }
    }

    /// The canonical empty tree id. Reads of this id must always succeed with an empty tree, even
    /// when no object with this id is present on disk.
    pub fn empty_tree(kind: Kind) -> Self {
        match kind {
            Kind::Sha1 => ObjectId::from_hex(b"4b825dc642cb6eb9a060e54bf8d69288fbee4904").expect("known valid"),
            Kind::Sha256 => crate::hash(kind, &crate::wrap("tree", b"")),
        }
    }

    /// The kind of hash this id holds.
    pub fn kind(&self) -> Kind {
        match self {
            ObjectId::Sha1(_) => Kind::Sha1,
            ObjectId::Sha256(_) => Kind::Sha256,
        }
    }

    /// Obtain a mutable view onto the raw bytes, sized according to [`kind()`][Self::kind()].
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        match self {
            ObjectId::Sha1(b) => &mut b[..],
            ObjectId::Sha256(b) => &mut b[..],
        }
    }

    /// Borrow this instance as a [`oid`].
    pub fn as_oid(&self) -> &oid {
        self.as_ref()
    }

    /// Parse an `ObjectId` from its ASCII hex representation, inferring the [`Kind`] from its
    /// length (40 hex chars for SHA-1, 64 for SHA-256).
    pub fn from_hex(hex: &[u8]) -> Result<Self, FromHexError> {
        fn kind_by_len(len: usize) -> Result<Kind, FromHexError> {
            match len {
                l if l == Kind::Sha1.len_in_hex() => Ok(Kind::Sha1),
                l if l == Kind::Sha256.len_in_hex() => Ok(Kind::Sha256),
                _ => Err(FromHexError::InvalidHexEncodingLength { length: len }),
            }
        }
        let kind = kind_by_len(hex.len())?;
        let mut id = ObjectId::null(kind);
        hex::decode_to_slice(hex, id.as_mut_slice()).map_err(|_| FromHexError::Invalid)?;
        Ok(id)
    }

    /// Construct an instance from raw bytes whose length must be 20 (SHA-1) or 32 (SHA-256),
    /// panicking otherwise. Used internally where the length has already been validated.
    pub(crate) fn from_bytes_or_panic(bytes: &[u8]) -> Self {
        Self::from_bytes(bytes).expect("caller already validated the length")
    }

    /// Construct an instance from raw (non-hex) bytes, inferring [`Kind`] from the length. Used
    /// to read an `ObjectId` straight out of a tree entry or pack index rather than hex text.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FromBytesError> {
        match bytes.len() {
            20 => {
                let mut buf = [0u8; 20];
                buf.copy_from_slice(bytes);
                Ok(ObjectId::Sha1(buf))
            }
            32 => {
                let mut buf = [0u8; 32];
                buf.copy_from_slice(bytes);
                Ok(ObjectId::Sha256(buf))
            }
            length => Err(FromBytesError { length }),
        }
    }
}

/// The error returned by [`ObjectId::from_bytes()`].
#[derive(Debug, thiserror::Error)]
#[error("A raw hash must be 20 or 32 bytes long, got {length}")]
pub struct FromBytesError {
    length: usize,
}

impl AsRef<oid> for ObjectId {
    fn as_ref(&self) -> &oid {
        let bytes: &[u8] = match self {
            ObjectId::Sha1(b) => &b[..],
            ObjectId::Sha256(b) => &b[..],
        };
        oid::from_bytes_unchecked(bytes)
    }
}

impl std::ops::Deref for ObjectId {
    type Target = oid;
    fn deref(&self) -> &Self::Target {
        self.as_ref()
    }
}

impl std::borrow::Borrow<oid> for ObjectId {
    fn borrow(&self) -> &oid {
        self.as_ref()
    }
}

impl PartialEq<oid> for ObjectId {
    fn eq(&self, other: &oid) -> bool {
        self.as_ref().as_bytes() == other.as_bytes()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.as_ref(), f)
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_ref(), f)
    }
}

impl FromStr for ObjectId {
    type Err = FromHexError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObjectId::from_hex(s.as_bytes())
    }
}

/// The error returned by [`ObjectId::from_hex()`].
#[derive(Debug, thiserror::Error)]
pub enum FromHexError {
    #[error("A hash's hexadecimal encoding must have exactly 40 or 64 characters, got {length}")]
    InvalidHexEncodingLength { length: usize },
    #[error("Invalid hexadecimal character encountered")]
    Invalid,
}

impl PartialOrd<oid> for ObjectId {
    fn partial_cmp(&self, other: &oid) -> Option<Ordering> {
        self.as_ref().as_bytes().partial_cmp(other.as_bytes())
    }
}
