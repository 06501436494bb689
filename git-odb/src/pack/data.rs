//! The `.pack` file itself: a header, then a sequence of entries each holding a type+size header
//! followed by zlib-deflated content (plain for the four object kinds, or a delta instruction
//! stream for `ofs-delta`/`ref-delta` entries).
use std::{io::Read, path::Path};

use git_hash::{Kind as HashKind, ObjectId};
use git_object::Kind;
use memmap2::Mmap;

use super::delta;

/// The error returned while reading a pack entry.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("pack at {0} doesn't start with the 'PACK' signature")]
    BadSignature(std::path::PathBuf),
    #[error("pack entry header is truncated")]
    TruncatedHeader,
    #[error("pack entry at offset {0} isn't valid zlib-deflated data")]
    Inflate(u64, #[source] std::io::Error),
    #[error("ofs-delta at offset {0} resolves to a negative base offset")]
    NegativeBaseOffset(u64),
    #[error(transparent)]
    Delta(#[from] delta::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy)]
enum EntryHeader {
    Kind(Kind),
    OfsDelta { base_distance: u64 },
    RefDelta { base_id: ObjectId },
}

/// A memory-mapped `.pack` file.
pub struct File {
    data: Mmap,
    hash_kind: HashKind,
}

impl File {
    /// Map the pack at `path` into memory. `hash_kind` sizes ref-delta base ids.
    pub fn at(path: &Path, hash_kind: HashKind) -> Result<Self, Error> {
        let file = std::fs::File::open(path)?;
        let data = unsafe_mmap(&file)?;
        if data.len() < 12 || &data[0..4] != b"PACK" {
            return Err(Error::BadSignature(path.to_owned()));
        }
        Ok(File { data, hash_kind })
    }

    /// Resolve the object stored at `offset`, recursively applying any delta chain, and returning
    /// its final `(kind, content)`.
    pub fn entry_at(&self, offset: u64, resolve_ref_delta: impl Fn(&git_hash::oid) -> Option<(Kind, Vec<u8>)> + Copy) -> Result<(Kind, Vec<u8>), Error> {
        let (header, header_len, inflated_len) = self.read_entry_header(offset)?;
        let compressed_start = offset as usize + header_len;
        match header {
            EntryHeader::Kind(kind) => {
                let bytes = self.inflate_at(compressed_start, inflated_len, offset)?;
                Ok((kind, bytes))
            }
            EntryHeader::OfsDelta { base_distance } => {
                if base_distance > offset {
                    return Err(Error::NegativeBaseOffset(offset));
                }
                let base_offset = offset - base_distance;
                let delta_bytes = self.inflate_at(compressed_start, inflated_len, offset)?;
                let (kind, base) = self.entry_at(base_offset, resolve_ref_delta)?;
                let content = delta::apply(&base, &delta_bytes)?;
                Ok((kind, content))
            }
            EntryHeader::RefDelta { base_id } => {
                let delta_bytes = self.inflate_at(compressed_start, inflated_len, offset)?;
                let (kind, base) = resolve_ref_delta(base_id.as_oid())
                    .ok_or(Error::TruncatedHeader)?;
                let content = delta::apply(&base, &delta_bytes)?;
                Ok((kind, content))
            }
        }
    }

    fn inflate_at(&self, start: usize, declared_len: u64, offset_for_error: u64) -> Result<Vec<u8>, Error> {
        let mut out = Vec::with_capacity(declared_len as usize);
        let mut decoder = flate2::bufread::ZlibDecoder::new(&self.data[start..]);
        decoder
            .read_to_end(&mut out)
            .map_err(|err| Error::Inflate(offset_for_error, err))?;
        Ok(out)
    }

    fn read_entry_header(&self, offset: u64) -> Result<(EntryHeader, usize, u64), Error> {
        let mut pos = offset as usize;
        let first = *self.data.get(pos).ok_or(Error::TruncatedHeader)?;
        pos += 1;
        let type_id = (first >> 4) & 0b111;
        let mut size: u64 = (first & 0b1111) as u64;
        let mut shift = 4;
        let mut more = first & 0x80 != 0;
        while more {
            let byte = *self.data.get(pos).ok_or(Error::TruncatedHeader)?;
            pos += 1;
            size |= ((byte & 0x7f) as u64) << shift;
            shift += 7;
            more = byte & 0x80 != 0;
        }

        let header = match type_id {
            1 => EntryHeader::Kind(Kind::Commit),
            2 => EntryHeader::Kind(Kind::Tree),
            3 => EntryHeader::Kind(Kind::Blob),
            4 => EntryHeader::Kind(Kind::Tag),
            6 => {
                let mut c = *self.data.get(pos).ok_or(Error::TruncatedHeader)?;
                pos += 1;
                let mut base_distance: u64 = (c & 0x7f) as u64;
                while c & 0x80 != 0 {
                    c = *self.data.get(pos).ok_or(Error::TruncatedHeader)?;
                    pos += 1;
                    base_distance += 1;
                    base_distance = (base_distance << 7) | (c & 0x7f) as u64;
                }
                EntryHeader::OfsDelta { base_distance }
            }
            7 => {
                let hash_len = self.hash_kind.len_in_bytes();
                let bytes = self.data.get(pos..pos + hash_len).ok_or(Error::TruncatedHeader)?;
                let base_id = ObjectId::from_bytes(bytes).expect("hash_len matches Kind");
                pos += hash_len;
                EntryHeader::RefDelta { base_id }
            }
            _ => return Err(Error::TruncatedHeader),
        };
        Ok((header, pos - offset as usize, size))
    }
}

/// Pack files are treated as immutable for the lifetime of the mapping.
fn unsafe_mmap(file: &std::fs::File) -> std::io::Result<Mmap> {
    #[allow(unsafe_code)]
    unsafe {
        Mmap::map(file)
    }
}
