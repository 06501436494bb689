//! Decode and encode the four object kinds git stores: blobs, trees, commits and annotated tags.
//!
//! Every object here is handled in its canonical, content-addressed form: the bytes returned by
//! [`Tree::write_to()`], [`Commit::write_to()`] and friends are exactly the bytes that, wrapped in
//! `"<type> <len>\0"` and hashed, reproduce the object's [`ObjectId`][git_hash::ObjectId].
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

use bstr::BString;
use quick_error::quick_error;

mod commit;
mod tag;
mod tree;

pub use commit::Commit;
pub use tag::Tag;
pub use tree::{Tree, TreeEntry, TreeEntryMode};

/// The four kinds of object git can store.
#[derive(PartialEq, Eq, Debug, Hash, Ord, PartialOrd, Clone, Copy)]
#[cfg_attr(feature = "serde1", derive(serde::Serialize, serde::Deserialize))]
pub enum Kind {
    /// File content, or a symlink target.
    Blob,
    /// A directory listing: `(mode, name, oid)` triples.
    Tree,
    /// A point in history: a tree plus zero or more parents and a signed message.
    Commit,
    /// A signed pointer to any other object, usually a commit.
    Tag,
}

impl Kind {
    /// The lowercase name git writes into an object's header, e.g. `b"blob"`.
    pub fn as_bytes(&self) -> &'static [u8] {
        match self {
            Kind::Blob => b"blob",
            Kind::Tree => b"tree",
            Kind::Commit => b"commit",
            Kind::Tag => b"tag",
        }
    }

    /// Parse a `Kind` from the header name git uses, e.g. `b"tree"`.
    pub fn from_bytes(input: &[u8]) -> Result<Self, UnknownKind> {
        Ok(match input {
            b"blob" => Kind::Blob,
            b"tree" => Kind::Tree,
            b"commit" => Kind::Commit,
            b"tag" => Kind::Tag,
            _ => return Err(UnknownKind(input.to_vec())),
        })
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(std::str::from_utf8(self.as_bytes()).expect("ascii"))
    }
}

/// The error returned by [`Kind::from_bytes()`].
#[derive(Debug, thiserror::Error)]
#[error("Unknown object type: {0:?}")]
pub struct UnknownKind(Vec<u8>);

/// A blob's content, borrowed from the buffer it was read into. Distinguished from a plain byte
/// slice only so call sites read clearly (`obj.data` rather than a bare `&[u8]`).
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct BlobRef<'a> {
    /// The blob's raw content.
    pub data: &'a [u8],
}

/// An object decoded from its canonical byte representation, with its id attached.
#[derive(Debug, Clone)]
pub enum Object {
    /// File content or a symlink target.
    Blob(BString),
    /// A directory listing.
    Tree(Tree),
    /// A point in history.
    Commit(Commit),
    /// A signed pointer to another object.
    Tag(Tag),
}

impl Object {
    /// This object's [`Kind`].
    pub fn kind(&self) -> Kind {
        match self {
            Object::Blob(_) => Kind::Blob,
            Object::Tree(_) => Kind::Tree,
            Object::Commit(_) => Kind::Commit,
            Object::Tag(_) => Kind::Tag,
        }
    }

    /// Serialize this object's canonical payload (the part that gets wrapped and hashed).
    pub fn write_to(&self, out: &mut Vec<u8>) -> Result<(), encode::Error> {
        match self {
            Object::Blob(data) => {
                out.extend_from_slice(data);
                Ok(())
            }
            Object::Tree(tree) => tree.write_to(out),
            Object::Commit(commit) => commit.write_to(out),
            Object::Tag(tag) => tag.write_to(out),
        }
    }

    /// Decode `data` as an object of the given `kind`. `hash_kind` is the repository's object
    /// format, needed only to know how many raw bytes make up a tree entry's id; commits and tags
    /// store ids as hex text and don't need it.
    pub fn from_bytes(kind: Kind, data: &[u8], hash_kind: git_hash::Kind) -> Result<Self, decode::Error> {
        Ok(match kind {
            Kind::Blob => Object::Blob(data.into()),
            Kind::Tree => Object::Tree(Tree::from_bytes(data, hash_kind)?),
            Kind::Commit => Object::Commit(Commit::from_bytes(data)?),
            Kind::Tag => Object::Tag(Tag::from_bytes(data)?),
        })
    }
}

/// Shared decode error plumbing used by [`Tree`], [`Commit`] and [`Tag`].
pub mod decode {
    quick_error! {
        /// The error returned when an object's canonical bytes don't parse.
        #[derive(Debug)]
        #[allow(missing_docs)]
        pub enum Error {
            Malformed(message: &'static str) {
                display("{}", message)
            }
            InvalidTreeEntryName(err: git_validate::tree::name::Error) {
                display("Invalid tree entry name")
                from()
                source(err)
            }
            InvalidHash(err: git_hash::FromHexError) {
                display("Invalid object id")
                from()
                source(err)
            }
            InvalidSignature(err: git_actor::Error) {
                display("Invalid actor signature")
                from()
                source(err)
            }
        }
    }
}

/// Shared encode error plumbing.
pub mod encode {
    /// The error returned when an object can't be serialized, currently infallible but kept as a
    /// named type so a future structural check has somewhere to live without breaking callers.
    #[derive(Debug, thiserror::Error)]
    pub enum Error {}
}
