use bstr::{BStr, BString, ByteSlice};
use git_date::Time;

use quick_error::quick_error;

quick_error! {
    /// The error returned when parsing a [`Signature`] fails.
    #[derive(Debug)]
    #[allow(missing_docs)]
    pub enum Error {
        Parse(err: crate::parse::Error) {
            display("Could not parse a signature from its text form")
            from()
            source(err)
        }
    }
}

/// An actor's identity and the time they acted, as recorded in the author, committer or tagger
/// line of a commit or annotated tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde1", derive(serde::Serialize, serde::Deserialize))]
pub struct Signature {
    /// The actor's name.
    pub name: BString,
    /// The actor's email.
    pub email: BString,
    /// The time at which the action was performed.
    pub time: Time,
}

/// A borrowed variant of [`Signature`], used while decoding a commit or tag without copying the
/// name and email out of the object's buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignatureRef<'a> {
    /// The actor's name.
    pub name: &'a BStr,
    /// The actor's email.
    pub email: &'a BStr,
    /// The time at which the action was performed.
    pub time: Time,
}

impl Signature {
    /// Parse a `Signature` out of its serialized form: `Name <email> <seconds> <+HHMM>`.
    pub fn from_bytes(data: &[u8]) -> Result<Self, Error> {
        crate::parse::signature(data.as_bstr())
            .map(|(name, email, time)| Signature {
                name: name.to_owned(),
                email: email.to_owned(),
                time,
            })
            .map_err(Into::into)
    }

    /// Serialize this signature the way git writes it: `Name <email> <seconds> <+HHMM>`.
    pub fn write_to(&self, mut out: impl std::io::Write) -> std::io::Result<()> {
        out.write_all(&self.name)?;
        out.write_all(b" <")?;
        out.write_all(&self.email)?;
        out.write_all(b"> ")?;
        self.time.write_to(out)
    }

    /// Borrow this signature's fields.
    pub fn to_ref(&self) -> SignatureRef<'_> {
        SignatureRef {
            name: self.name.as_bstr(),
            email: self.email.as_bstr(),
            time: self.time,
        }
    }
}

impl<'a> SignatureRef<'a> {
    /// Copy this borrowed signature into an owned [`Signature`].
    pub fn to_owned(&self) -> Signature {
        Signature {
            name: self.name.to_owned(),
            email: self.email.to_owned(),
            time: self.time,
        }
    }
}

impl From<SignatureRef<'_>> for Signature {
    fn from(s: SignatureRef<'_>) -> Self {
        s.to_owned()
    }
}
