use bstr::{BString, ByteSlice};
use git_hash::{Kind as HashKind, ObjectId};

use crate::{
    entry::{Entry, ExtendedFlags, Flags, Mode, Stage, Stat},
    Error, Version,
};

const MAGIC: &[u8; 4] = b"DIRC";
const NAME_LENGTH_SENTINEL: u16 = 0x0fff;

fn read_u16(data: &[u8], at: usize) -> u16 {
    u16::from_be_bytes(data[at..at + 2].try_into().expect("2 bytes"))
}

fn read_u32(data: &[u8], at: usize) -> u32 {
    u32::from_be_bytes(data[at..at + 4].try_into().expect("4 bytes"))
}

pub(crate) fn header(data: &[u8]) -> Result<(Version, u32), Error> {
    if data.len() < 12 || &data[0..4] != MAGIC {
        return Err(Error::BadSignature);
    }
    let version = match read_u32(data, 4) {
        2 => Version::V2,
        3 => Version::V3,
        other => return Err(Error::UnsupportedVersion(other)),
    };
    Ok((version, read_u32(data, 8)))
}

pub(crate) fn verify_checksum(data: &[u8], hash_kind: HashKind) -> Result<(), Error> {
    let hash_len = hash_kind.len_in_bytes();
    if data.len() < hash_len {
        return Err(Error::Truncated);
    }
    let (body, trailer) = data.split_at(data.len() - hash_len);
    let expected = ObjectId::from_bytes(trailer).expect("hash_len matches Kind");
    let actual = git_hash::hash(hash_kind, body);
    if actual == expected {
        Ok(())
    } else {
        Err(Error::ChecksumMismatch { expected, actual })
    }
}

/// Parse one entry starting at `pos`, returning it and the offset of the entry immediately
/// following it (after padding).
pub(crate) fn entry(data: &[u8], pos: usize, version: Version, hash_kind: HashKind) -> Result<(Entry, usize), Error> {
    let hash_len = hash_kind.len_in_bytes();
    let fixed_len_before_hash = 40;
    if data.len() < pos + fixed_len_before_hash + hash_len + 2 {
        return Err(Error::Truncated);
    }

    let ctime_secs = read_u32(data, pos);
    let ctime_nsecs = read_u32(data, pos + 4);
    let mtime_secs = read_u32(data, pos + 8);
    let mtime_nsecs = read_u32(data, pos + 12);
    let dev = read_u32(data, pos + 16);
    let ino = read_u32(data, pos + 20);
    let mode_bits = read_u32(data, pos + 24);
    let uid = read_u32(data, pos + 28);
    let gid = read_u32(data, pos + 32);
    let size = read_u32(data, pos + 36);

    let oid_start = pos + fixed_len_before_hash;
    let id = ObjectId::from_bytes(&data[oid_start..oid_start + hash_len]).expect("hash_len matches Kind");

    let flags_start = oid_start + hash_len;
    let flags = Flags::from_bits_truncate(read_u16(data, flags_start));
    let mut cursor = flags_start + 2;

    let mut extended = ExtendedFlags::empty();
    if flags.contains(Flags::EXTENDED) {
        if version == Version::V2 {
            return Err(Error::ExtendedFlagsInV2);
        }
        if data.len() < cursor + 2 {
            return Err(Error::Truncated);
        }
        let bits = read_u16(data, cursor);
        extended = ExtendedFlags::from_bits(bits).ok_or(Error::ReservedExtendedFlagBitSet)?;
        cursor += 2;
    }

    // A field pinned at the sentinel is ambiguous on its own: it's either a name exactly
    // NAME_LENGTH_SENTINEL bytes long or one that overflowed the 12-bit field entirely. Both are
    // written without a trailing length, so resolve it the same way either way - scan for the NUL
    // that padding always leaves after the path.
    let name_len_field = (flags & Flags::NAME_MASK).bits();
    let name_len = if name_len_field == NAME_LENGTH_SENTINEL {
        let relative_nul = data[cursor..]
            .iter()
            .position(|&byte| byte == 0)
            .ok_or(Error::Truncated)?;
        relative_nul
    } else {
        name_len_field as usize
    };

    if data.len() < cursor + name_len {
        return Err(Error::Truncated);
    }
    let path = BString::from(data[cursor..cursor + name_len].to_vec());
    validate_path(&path)?;
    cursor += name_len;

    let entry_len = cursor - pos;
    let padded_len = (entry_len + 8) & !7;
    let next_pos = pos + padded_len;
    if data.len() < next_pos {
        return Err(Error::Truncated);
    }
    if !data[cursor..next_pos].iter().all(|&byte| byte == 0) {
        return Err(Error::MalformedPadding);
    }

    let mode = Mode::from_bits(mode_bits).ok_or(Error::UnsupportedMode(mode_bits))?;
    let stage_bits = ((flags & Flags::STAGE_MASK).bits()) >> 12;

    Ok((
        Entry {
            stat: Stat {
                ctime_secs,
                ctime_nsecs,
                mtime_secs,
                mtime_nsecs,
                dev,
                ino,
                uid,
                gid,
                size,
            },
            id,
            mode,
            stage: Stage::from_bits(stage_bits),
            assume_valid: flags.contains(Flags::ASSUME_VALID),
            skip_worktree: extended.contains(ExtendedFlags::SKIP_WORKTREE),
            intent_to_add: extended.contains(ExtendedFlags::INTENT_TO_ADD),
            path,
        },
        next_pos,
    ))
}

fn validate_path(path: &BString) -> Result<(), Error> {
    for segment in path.split(|&b| b == b'/') {
        if git_validate::tree::name(segment.as_bstr()).is_err() {
            return Err(Error::UnsafePath(path.clone()));
        }
    }
    Ok(())
}
