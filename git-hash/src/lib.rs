//! This crate provides the object id ([`ObjectId`] and [`oid`]) used by all object, reference,
//! index and pack formats, along with the hashing primitives (SHA-1 and SHA-256) used to compute
//! them.
//!
//! The two object formats a repository can use are distinguished at the type level by [`Kind`],
//! and at the value level every [`ObjectId`] carries its own `Kind` so mixed-format repositories
//! (during a hash-algorithm transition) can still be represented in memory.
#![deny(unsafe_code)]
#![deny(rust_2018_idioms)]

mod borrowed;
mod kind;
mod owned;

pub use borrowed::oid;
pub use kind::Kind;
pub use owned::{prefix, ObjectId, Prefix};

pub use owned::{FromBytesError, FromHexError};

mod hasher;
pub use hasher::{hash, hash_kind, hasher, wrap, Hasher};
