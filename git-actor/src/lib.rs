//! The `Signature` identifying the author or committer of a commit or the tagger of an
//! annotated tag: a name, an email, and a [`Time`][git_date::Time].
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

use bstr::BString;

mod signature;
pub use signature::{Error, Signature, SignatureRef};

/// Parsing of the `name <email> time` line format shared by author, committer and tagger.
pub mod parse;

/// A trivial alias used where only the two name fields are relevant, e.g. when building a
/// signature from configuration before a timestamp is known.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde1", derive(serde::Serialize, serde::Deserialize))]
pub struct Identity {
    /// The actor's name.
    pub name: BString,
    /// The actor's email.
    pub email: BString,
}
