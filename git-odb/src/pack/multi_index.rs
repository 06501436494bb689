//! The multi-pack-index (MIDX): a single fanout + OID lookup spanning every pack in the object
//! store, mapping each OID directly to `(pack index, offset)` without consulting individual `.idx`
//! files first.
use std::path::{Path, PathBuf};

use git_hash::{Kind as HashKind, ObjectId};

const SIGNATURE: &[u8; 4] = b"MIDX";
const CHUNK_PACKNAMES: [u8; 4] = *b"PNAM";
const CHUNK_FANOUT: [u8; 4] = *b"OIDF";
const CHUNK_LOOKUP: [u8; 4] = *b"OIDL";
const CHUNK_OFFSETS: [u8; 4] = *b"OOFF";
const CHUNK_LARGE_OFFSETS: [u8; 4] = *b"LOFF";

/// The error returned while parsing a multi-pack-index.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("multi-pack-index at {0} doesn't start with the 'MIDX' signature")]
    BadSignature(PathBuf),
    #[error("multi-pack-index at {0} is missing its {1:?} chunk")]
    MissingChunk(PathBuf, [u8; 4]),
    #[error("multi-pack-index at {0} is truncated")]
    Truncated(PathBuf),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A parsed multi-pack-index file.
#[derive(Debug, Clone)]
pub struct File {
    pack_names: Vec<String>,
    fanout: [u32; 256],
    oids: Vec<ObjectId>,
    offsets: Vec<(u32, u64)>,
}

fn read_u32(data: &[u8], at: usize) -> u32 {
    u32::from_be_bytes(data[at..at + 4].try_into().expect("4 bytes"))
}

fn read_u64(data: &[u8], at: usize) -> u64 {
    u64::from_be_bytes(data[at..at + 8].try_into().expect("8 bytes"))
}

impl File {
    /// Parse the multi-pack-index at `path`; `hash_kind` sizes each OID entry.
    pub fn at(path: &Path, hash_kind: HashKind) -> Result<Self, Error> {
        let data = std::fs::read(path)?;
        Self::from_bytes(&data, hash_kind, path)
    }

    fn from_bytes(data: &[u8], hash_kind: HashKind, path: &Path) -> Result<Self, Error> {
        if data.len() < 12 || &data[0..4] != SIGNATURE {
            return Err(Error::BadSignature(path.to_owned()));
        }
        let num_chunks = data[6] as usize;
        let num_packs = read_u32(data, 8) as usize;

        let table_start = 12;
        let mut chunks = Vec::with_capacity(num_chunks);
        for i in 0..num_chunks {
            let entry_start = table_start + i * 12;
            if data.len() < entry_start + 12 {
                return Err(Error::Truncated(path.to_owned()));
            }
            let id: [u8; 4] = data[entry_start..entry_start + 4].try_into().expect("4 bytes");
            let offset = read_u64(data, entry_start + 4);
            chunks.push((id, offset as usize));
        }
        // the terminating entry after the last real chunk marks the end of the final chunk.
        let terminator_start = table_start + num_chunks * 12;
        let end_offset = if data.len() >= terminator_start + 12 {
            read_u64(data, terminator_start + 4) as usize
        } else {
            data.len()
        };

        let chunk_span = |wanted: [u8; 4]| -> Result<(usize, usize), Error> {
            let position = chunks.iter().position(|(id, _)| *id == wanted).ok_or_else(|| Error::MissingChunk(path.to_owned(), wanted))?;
            let start = chunks[position].1;
            let stop = chunks.get(position + 1).map(|(_, off)| *off).unwrap_or(end_offset);
            Ok((start, stop))
        };

        let (names_start, names_end) = chunk_span(CHUNK_PACKNAMES)?;
        let pack_names: Vec<String> = data[names_start..names_end]
            .split(|&b| b == 0)
            .filter(|s| !s.is_empty())
            .map(|s| String::from_utf8_lossy(s).into_owned())
            .collect();

        let (fanout_start, _) = chunk_span(CHUNK_FANOUT)?;
        let mut fanout = [0u32; 256];
        for (i, slot) in fanout.iter_mut().enumerate() {
            *slot = read_u32(data, fanout_start + i * 4);
        }
        let num_objects = fanout[255] as usize;

        let (lookup_start, _) = chunk_span(CHUNK_LOOKUP)?;
        let hash_len = hash_kind.len_in_bytes();
        let mut oids = Vec::with_capacity(num_objects);
        for i in 0..num_objects {
            let start = lookup_start + i * hash_len;
            oids.push(ObjectId::from_bytes(&data[start..start + hash_len]).expect("hash_len matches Kind"));
        }

        let (offsets_start, _) = chunk_span(CHUNK_OFFSETS)?;
        let large_offsets_span = chunk_span(CHUNK_LARGE_OFFSETS).ok();
        let mut offsets = Vec::with_capacity(num_objects);
        for i in 0..num_objects {
            let entry_start = offsets_start + i * 8;
            let pack_index = read_u32(data, entry_start);
            let raw_offset = read_u32(data, entry_start + 4);
            let offset = if raw_offset & 0x8000_0000 != 0 {
                let (large_start, _) = large_offsets_span.ok_or_else(|| Error::MissingChunk(path.to_owned(), CHUNK_LARGE_OFFSETS))?;
                read_u64(data, large_start + (raw_offset & 0x7fff_ffff) as usize * 8)
            } else {
                raw_offset as u64
            };
            offsets.push((pack_index, offset));
        }
        let _ = num_packs;

        Ok(File {
            pack_names,
            fanout,
            oids,
            offsets,
        })
    }

    /// The pack file names this index spans, in the order its internal pack indices reference.
    pub fn pack_names(&self) -> &[String] {
        &self.pack_names
    }

    /// Find `id`, returning the index of the pack it lives in (per [`pack_names()`][Self::pack_names()])
    /// and its byte offset within that pack.
    pub fn lookup(&self, id: &git_hash::oid) -> Option<(u32, u64)> {
        let first_byte = id.as_bytes()[0] as usize;
        let lower = if first_byte == 0 { 0 } else { self.fanout[first_byte - 1] as usize };
        let upper = self.fanout[first_byte] as usize;
        self.oids[lower..upper]
            .binary_search_by(|candidate| candidate.as_oid().cmp(id))
            .ok()
            .map(|position| self.offsets[lower + position])
    }
}
