//! Pack index (`.idx`) version 2: a 256-entry fanout table over a sorted OID table, parallel CRC32
//! and offset tables, and a side table for offsets ≥ 2GiB.
use std::path::Path;

use git_hash::{Kind as HashKind, ObjectId};

const MAGIC: u32 = 0xff744f63;
const VERSION: u32 = 2;

/// The error returned while parsing a `.idx` file.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("pack index at {0} is too short to contain a valid header")]
    Truncated(std::path::PathBuf),
    #[error("pack index at {0} has an unsupported version or is not a git pack index")]
    UnsupportedVersion(std::path::PathBuf),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A parsed `.idx` file, kept fully in memory.
#[derive(Debug, Clone)]
pub struct Index {
    hash_kind: HashKind,
    fanout: [u32; 256],
    oids: Vec<ObjectId>,
    crc32: Vec<u32>,
    offsets: Vec<u32>,
    large_offsets: Vec<u64>,
    /// The checksum of the `.pack` file this index belongs to.
    pub pack_checksum: ObjectId,
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_be_bytes(bytes[at..at + 4].try_into().expect("4 bytes"))
}

fn read_u64(bytes: &[u8], at: usize) -> u64 {
    u64::from_be_bytes(bytes[at..at + 8].try_into().expect("8 bytes"))
}

impl Index {
    /// Parse a version-2 `.idx` file at `path`, whose object ids are `hash_kind`-sized.
    pub fn at(path: &Path, hash_kind: HashKind) -> Result<Self, Error> {
        let data = std::fs::read(path)?;
        Self::from_bytes(&data, hash_kind).map_err(|err| match err {
            ParseError::Truncated => Error::Truncated(path.to_owned()),
            ParseError::UnsupportedVersion => Error::UnsupportedVersion(path.to_owned()),
        })
    }

    fn from_bytes(data: &[u8], hash_kind: HashKind) -> Result<Self, ParseError> {
        if data.len() < 8 + 256 * 4 {
            return Err(ParseError::Truncated);
        }
        if read_u32(data, 0) != MAGIC || read_u32(data, 4) != VERSION {
            return Err(ParseError::UnsupportedVersion);
        }
        let mut fanout = [0u32; 256];
        let mut pos = 8;
        for slot in fanout.iter_mut() {
            *slot = read_u32(data, pos);
            pos += 4;
        }
        let num_objects = fanout[255] as usize;
        let hash_len = hash_kind.len_in_bytes();

        let oid_table_len = num_objects * hash_len;
        let crc_table_len = num_objects * 4;
        let offset_table_len = num_objects * 4;

        if data.len() < pos + oid_table_len + crc_table_len + offset_table_len + hash_len * 2 {
            return Err(ParseError::Truncated);
        }

        let mut oids = Vec::with_capacity(num_objects);
        for i in 0..num_objects {
            let start = pos + i * hash_len;
            oids.push(ObjectId::from_bytes(&data[start..start + hash_len]).expect("hash_len matches Kind"));
        }
        pos += oid_table_len;

        let mut crc32 = Vec::with_capacity(num_objects);
        for i in 0..num_objects {
            crc32.push(read_u32(data, pos + i * 4));
        }
        pos += crc_table_len;

        let mut offsets = Vec::with_capacity(num_objects);
        let mut num_large = 0usize;
        for i in 0..num_objects {
            let value = read_u32(data, pos + i * 4);
            if value & 0x8000_0000 != 0 {
                num_large = num_large.max((value & 0x7fff_ffff) as usize + 1);
            }
            offsets.push(value);
        }
        pos += offset_table_len;

        let large_offset_table_len = num_large * 8;
        if data.len() < pos + large_offset_table_len + hash_len * 2 {
            return Err(ParseError::Truncated);
        }
        let mut large_offsets = Vec::with_capacity(num_large);
        for i in 0..num_large {
            large_offsets.push(read_u64(data, pos + i * 8));
        }
        pos += large_offset_table_len;

        let pack_checksum = ObjectId::from_bytes(&data[pos..pos + hash_len]).expect("hash_len matches Kind");

        Ok(Index {
            hash_kind,
            fanout,
            oids,
            crc32,
            offsets,
            large_offsets,
            pack_checksum,
        })
    }

    /// The number of objects this index describes.
    pub fn num_objects(&self) -> usize {
        self.oids.len()
    }

    /// The hash kind this index's entries use.
    pub fn hash_kind(&self) -> HashKind {
        self.hash_kind
    }

    /// Find `id`'s position in the sorted OID table, via the fanout table and a binary search
    /// narrowed to the matching first-byte bucket.
    pub fn lookup(&self, id: &git_hash::oid) -> Option<usize> {
        let first_byte = id.as_bytes()[0] as usize;
        let lower = if first_byte == 0 { 0 } else { self.fanout[first_byte - 1] as usize };
        let upper = self.fanout[first_byte] as usize;
        self.oids[lower..upper]
            .binary_search_by(|candidate| candidate.as_oid().cmp(id))
            .ok()
            .map(|offset| lower + offset)
    }

    /// The object id at `index` (as returned by [`lookup()`][Self::lookup()]).
    pub fn oid_at(&self, index: usize) -> &ObjectId {
        &self.oids[index]
    }

    /// The CRC32 of the (still compressed) entry at `index`.
    pub fn crc32_at(&self, index: usize) -> u32 {
        self.crc32[index]
    }

    /// The byte offset into the pack file of the entry at `index`, resolving the large-offset side
    /// table if the primary table's high bit is set.
    pub fn pack_offset_at(&self, index: usize) -> u64 {
        let value = self.offsets[index];
        if value & 0x8000_0000 != 0 {
            self.large_offsets[(value & 0x7fff_ffff) as usize]
        } else {
            value as u64
        }
    }

    /// Every object id in this index, in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = &ObjectId> {
        self.oids.iter()
    }
}

enum ParseError {
    Truncated,
    UnsupportedVersion,
}
