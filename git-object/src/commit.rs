use bstr::{BStr, BString, ByteSlice};
use git_hash::ObjectId;

use crate::decode;

/// A commit: a tree, zero or more parents, an author and committer, and a free-form message.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde1", derive(serde::Serialize, serde::Deserialize))]
pub struct Commit {
    /// The id of the tree this commit records.
    pub tree: ObjectId,
    /// The ids of this commit's parents, in the order they were recorded. Empty for a root commit.
    pub parents: Vec<ObjectId>,
    /// Who wrote the commit's content, and when.
    pub author: git_actor::Signature,
    /// Who created this commit object, and when; usually equal to `author` except after a rebase
    /// or amend.
    pub committer: git_actor::Signature,
    /// The raw, unverified OpenPGP signature over this commit's other fields, if any.
    pub gpgsig: Option<BString>,
    /// The commit's message, including everything after the header's blank line.
    pub message: BString,
}

impl Commit {
    /// Decode a commit's canonical byte representation.
    pub fn from_bytes(mut data: &[u8]) -> Result<Self, decode::Error> {
        let mut tree = None;
        let mut parents = Vec::new();
        let mut author = None;
        let mut committer = None;
        let mut gpgsig = None;

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
                b"tree" => tree = Some(parse_hex_id(value)?),
                b"parent" => parents.push(parse_hex_id(value)?),
                b"author" => author = Some(git_actor::Signature::from_bytes(value)?),
                b"committer" => committer = Some(git_actor::Signature::from_bytes(value)?),
                b"gpgsig" => {
                    let (block, rest) = take_continuation_block(value, data);
                    gpgsig = Some(block);
                    data = rest;
                }
                _ => {} // unknown extra header, e.g. `encoding` or `mergetag`; preserved only in message tail
            }
        }

        Ok(Commit {
            tree: tree.ok_or(decode::Error::Malformed("commit is missing a tree header"))?,
            parents,
            author: author.ok_or(decode::Error::Malformed("commit is missing an author header"))?,
            committer: committer.ok_or(decode::Error::Malformed("commit is missing a committer header"))?,
            gpgsig,
            message: data.into(),
        })
    }

    /// Serialize this commit's canonical byte representation.
    pub fn write_to(&self, out: &mut Vec<u8>) -> Result<(), crate::encode::Error> {
        out.extend_from_slice(b"tree ");
        out.extend_from_slice(self.tree.to_hex().as_bytes());
        out.push(b'\n');
        for parent in &self.parents {
            out.extend_from_slice(b"parent ");
            out.extend_from_slice(parent.to_hex().as_bytes());
            out.push(b'\n');
        }
        out.extend_from_slice(b"author ");
        self.author.write_to(&mut *out).expect("writing to a Vec never fails");
        out.push(b'\n');
        out.extend_from_slice(b"committer ");
        self.committer.write_to(&mut *out).expect("writing to a Vec never fails");
        out.push(b'\n');
        if let Some(gpgsig) = &self.gpgsig {
            out.extend_from_slice(b"gpgsig ");
            write_continuation_block(gpgsig.as_bstr(), out);
        }
        out.push(b'\n');
        out.extend_from_slice(&self.message);
        Ok(())
    }
}

fn parse_hex_id(value: &[u8]) -> Result<ObjectId, decode::Error> {
    Ok(ObjectId::from_hex(value)?)
}

/// `gpgsig` values are continued across subsequent lines that start with a single space; this
/// collects those continuation lines and strips the leading space, returning the block and the
/// remaining unconsumed header/body bytes.
fn take_continuation_block<'a>(first_line: &'a [u8], mut rest: &'a [u8]) -> (BString, &'a [u8]) {
    let mut block: BString = first_line.into();
    loop {
        if rest.first() == Some(&b' ') {
            let nl = rest.iter().position(|b| *b == b'\n').unwrap_or(rest.len());
            block.push(b'\n');
            block.extend_from_slice(&rest[1..nl]);
            rest = rest.get(nl + 1..).unwrap_or(&[]);
        } else {
            break;
        }
    }
    (block, rest)
}

fn write_continuation_block(value: &BStr, out: &mut Vec<u8>) {
    let mut lines = value.split(|&b| b == b'\n');
    if let Some(first) = lines.next() {
        out.extend_from_slice(first);
    }
    for line in lines {
        out.push(b'\n');
        out.push(b' ');
        out.extend_from_slice(line);
    }
}
