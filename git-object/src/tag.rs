use bstr::{BString, ByteSlice};
use git_hash::ObjectId;

use crate::{decode, Kind};

/// An annotated tag: a signed pointer to another object, usually a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde1", derive(serde::Serialize, serde::Deserialize))]
pub struct Tag {
    /// The id of the object this tag points to.
    pub target: ObjectId,
    /// The kind of object `target` refers to.
    pub target_kind: Kind,
    /// The tag's name, e.g. `v1.0.0`.
    pub name: BString,
    /// Who created the tag, and when. Absent for some tags created by very old git versions.
    pub tagger: Option<git_actor::Signature>,
    /// The tag's message.
    pub message: BString,
    /// The raw, unverified OpenPGP signature over this tag's other fields, if any.
    pub pgp_signature: Option<BString>,
}

impl Tag {
    /// Decode a tag's canonical byte representation.
    pub fn from_bytes(mut data: &[u8]) -> Result<Self, decode::Error> {
        let mut target = None;
        let mut target_kind = None;
        let mut name = None;
        let mut tagger = None;

        loop {
            if data.starts_with(b"\n") {
                data = &data[1..];
                break;
            }
            let nl = data
                .iter()
                .position(|b| *b == b'\n')
                .ok_or(decode::Error::Malformed("header line not terminated"))?;
            let (line, rest) = data.split_at(nl);
            data = &rest[1..];

            let space = line
                .iter()
                .position(|b| *b == b' ')
                .ok_or(decode::Error::Malformed("header line missing a keyword"))?;
            let (keyword, value) = (&line[..space], &line[space + 1..]);
            match keyword {
                b"object" => target = Some(ObjectId::from_hex(value)?),
                b"type" => target_kind = Some(Kind::from_bytes(value).map_err(|_| decode::Error::Malformed("unknown tag target type"))?),
                b"tag" => name = Some(BString::from(value)),
                b"tagger" => tagger = Some(git_actor::Signature::from_bytes(value)?),
                _ => {}
            }
        }

        let (message, pgp_signature) = split_trailing_pgp_signature(data);

        Ok(Tag {
            target: target.ok_or(decode::Error::Malformed("tag is missing an object header"))?,
            target_kind: target_kind.ok_or(decode::Error::Malformed("tag is missing a type header"))?,
            name: name.ok_or(decode::Error::Malformed("tag is missing a tag header"))?,
            tagger,
            message,
            pgp_signature,
        })
    }

    /// Serialize this tag's canonical byte representation.
    pub fn write_to(&self, out: &mut Vec<u8>) -> Result<(), crate::encode::Error> {
        out.extend_from_slice(b"object ");
        out.extend_from_slice(self.target.to_hex().as_bytes());
        out.push(b'\n');
        out.extend_from_slice(b"type ");
        out.extend_from_slice(self.target_kind.as_bytes());
        out.push(b'\n');
        out.extend_from_slice(b"tag ");
        out.extend_from_slice(&self.name);
        out.push(b'\n');
        if let Some(tagger) = &self.tagger {
            out.extend_from_slice(b"tagger ");
            tagger.write_to(&mut *out).expect("writing to a Vec never fails");
            out.push(b'\n');
        }
        out.push(b'\n');
        out.extend_from_slice(&self.message);
        if let Some(pgp_signature) = &self.pgp_signature {
            out.extend_from_slice(pgp_signature);
        }
        Ok(())
    }
}

/// Unlike a commit's `gpgsig` header, a tag's PGP signature (when present) is appended verbatim
/// after the message body rather than stored as a header, so it has to be split back out here.
fn split_trailing_pgp_signature(data: &[u8]) -> (BString, Option<BString>) {
    const MARKER: &[u8] = b"-----BEGIN PGP SIGNATURE-----";
    match data.find(MARKER) {
        Some(pos) => (data[..pos].into(), Some(data[pos..].into())),
        None => (data.into(), None),
    }
}
